use std::path::{Path, PathBuf};

use skillsync_common::FromMessage;

use crate::target::{SCOPE_NAMES, TARGET_NAMES};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown target '{name}' (expected one of: {expected})", expected = TARGET_NAMES)]
    UnknownTarget { name: String },

    #[error("unknown scope '{name}' (expected one of: {expected})", expected = SCOPE_NAMES)]
    UnknownScope { name: String },

    #[error("skill '{name}' not found in {}", .root.display())]
    SkillNotFound { name: String, root: PathBuf },

    #[error("invalid skill name '{name}'")]
    InvalidSkillName { name: String },

    #[error("source skills directory not found at {}", .path.display())]
    SourceRootMissing { path: PathBuf },

    #[error("cannot determine the home directory")]
    HomeDirUnavailable,

    #[error(
        "refusing to install {}: destination {} overlaps the source",
        .skill.display(),
        .dest.display()
    )]
    PathCollision { skill: PathBuf, dest: PathBuf },

    #[error("failed to {op} {}: {source}", .path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn fs(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    /// Convert a directory-walk failure into [`Error::Filesystem`], keeping the
    /// path the walker was visiting (or `fallback` when it has none).
    #[must_use]
    pub fn walk(op: &'static str, fallback: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(fallback).to_path_buf();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        Self::Filesystem { op, path, source }
    }

    /// The offending path, for errors that carry one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Filesystem { path, .. } | Self::SourceRootMissing { path } => Some(path),
            Self::PathCollision { dest, .. } => Some(dest),
            _ => None,
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

skillsync_common::impl_context!();
