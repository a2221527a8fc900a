//! Config schema for `skillsync.{toml,yaml,yml,json}`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Installer directories that live next to the skills in the source tree
/// and are never skills themselves.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "skills-manager",
    "antigravity-installer",
    "opencode-installer",
];

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsyncConfig {
    /// Canonical source root holding one directory per skill. Relative paths
    /// are resolved against the current working directory.
    pub source_dir: PathBuf,
    /// Scope used when `--scope` is omitted (`global` or `workspace`).
    pub default_scope: String,
    /// Directory names under `source_dir` that are never treated as skills.
    pub exclude: Vec<String>,
    pub install: InstallConfig,
}

impl Default for SkillsyncConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("skills"),
            default_scope: "global".into(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
            install: InstallConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Copy into a hidden sibling directory and rename it into place instead
    /// of deleting the old installation first.
    pub staged: bool,
}
