use std::path::{Path, PathBuf};

use {
    skillsync_common::{Error, Result},
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::SkillsyncConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skillsync.toml",
    "skillsync.yaml",
    "skillsync.yml",
    "skillsync.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<SkillsyncConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./skillsync.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/skillsync/skillsync.{toml,yaml,yml,json}` (user-global)
///
/// Returns `SkillsyncConfig::default()` if no config file is found or the
/// file cannot be parsed.
pub fn discover_and_load() -> SkillsyncConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SkillsyncConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.is_file() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Returns the user-global config directory (`~/.config/skillsync/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skillsync").map(|d| d.config_dir().to_path_buf())
}

/// Returns the invoking user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Apply `SKILLSYNC_*` environment overrides on top of a loaded config.
///
/// - `SKILLSYNC_SOURCE_DIR` replaces `source_dir`
/// - `SKILLSYNC_DEFAULT_SCOPE` replaces `default_scope`
/// - `SKILLSYNC_STAGED` (`1`/`true`/`yes` or `0`/`false`/`no`) sets `install.staged`
pub fn apply_env_overrides(config: SkillsyncConfig) -> SkillsyncConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: SkillsyncConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SkillsyncConfig {
    if let Some(dir) = lookup("SKILLSYNC_SOURCE_DIR").filter(|v| !v.is_empty()) {
        config.source_dir = PathBuf::from(dir);
    }
    if let Some(scope) = lookup("SKILLSYNC_DEFAULT_SCOPE").filter(|v| !v.is_empty()) {
        config.default_scope = scope;
    }
    if let Some(raw) = lookup("SKILLSYNC_STAGED") {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => config.install.staged = true,
            "0" | "false" | "no" => config.install.staged = false,
            other => warn!(value = other, "ignoring unrecognized SKILLSYNC_STAGED value"),
        }
    }
    config
}

fn parse_config(raw: &str, path: &Path) -> Result<SkillsyncConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    let parsed: std::result::Result<SkillsyncConfig, String> = match ext {
        "toml" => toml::from_str(raw).map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
        "json" => serde_json::from_str(raw).map_err(|e| e.to_string()),
        _ => return Err(Error::message(format!("unsupported config format: .{ext}"))),
    };
    parsed.map_err(|e| Error::message(format!("invalid config {}: {e}", path.display())))
}
