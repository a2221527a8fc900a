//! Skill synchronization: destination resolution, source catalog, and the
//! install/list/remove engine.
//!
//! Skills are directories containing a `SKILL.md` descriptor. They are copied
//! verbatim from a source tree into the directory each target tool reads.

pub mod catalog;
pub mod error;
pub mod report;
pub mod sync;
pub mod target;

pub use {
    catalog::{Catalog, SKILL_DESCRIPTOR, Skill},
    error::{Error, Result},
    report::{BatchKind, BatchReport, BatchStatus, ItemOutcome, ItemStatus},
    sync::{
        InstallMode, InstallOutcome, RemoveOutcome, install_all, install_many, install_skill,
        list_installed, remove_all, remove_skill,
    },
    target::{Resolution, Scope, SyncEnv, Target, resolve, resolve_named},
};
