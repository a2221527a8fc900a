//! Configuration loading and env substitution for skillsync.
//!
//! Config files: `skillsync.toml`, `skillsync.yaml`, or `skillsync.json`
//! Searched in `./` then `~/.config/skillsync/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file text.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file, home_dir,
        load_config,
    },
    schema::{InstallConfig, SkillsyncConfig},
};
