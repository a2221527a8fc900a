//! Targets, scopes, and destination-root resolution.
//!
//! Each [`Target`] is a consumer tool that reads skills from its own
//! directory. The capability table below is the only place that knows which
//! scopes a target supports and where its skills live.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use {
    serde::{Deserialize, Serialize},
    tracing::warn,
};

use crate::error::{Error, Result};

pub const TARGET_NAMES: &str = "opencode, antigravity";
pub const SCOPE_NAMES: &str = "global, workspace";

/// Consumer tool that skills are synced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Open Code: `~/.config/opencode/skills`, global only.
    OpenCode,
    /// Antigravity: `~/.gemini/antigravity/skills` or `<project>/.agent/skills`.
    Antigravity,
}

/// Where skills are installed for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Shared across all projects, under the user's home directory.
    #[default]
    Global,
    /// Local to the current project.
    Workspace,
}

/// Scopes a target accepts and the one it falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub scopes: &'static [Scope],
    pub default_scope: Scope,
}

impl Target {
    pub const ALL: [Self; 2] = [Self::OpenCode, Self::Antigravity];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenCode => "opencode",
            Self::Antigravity => "antigravity",
        }
    }

    /// Human-facing product name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenCode => "Open Code",
            Self::Antigravity => "Antigravity",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::OpenCode => Capabilities {
                scopes: &[Scope::Global],
                default_scope: Scope::Global,
            },
            Self::Antigravity => Capabilities {
                scopes: &[Scope::Global, Scope::Workspace],
                default_scope: Scope::Global,
            },
        }
    }

    pub fn supports(self, scope: Scope) -> bool {
        self.capabilities().scopes.contains(&scope)
    }

    /// Destination root for a scope this target supports.
    fn root_for(self, scope: Scope, env: &SyncEnv) -> PathBuf {
        match (self, scope) {
            (Self::OpenCode, _) => env.home.join(".config").join("opencode").join("skills"),
            (Self::Antigravity, Scope::Global) => {
                env.home.join(".gemini").join("antigravity").join("skills")
            },
            (Self::Antigravity, Scope::Workspace) => {
                find_agent_dir(&env.cwd)
                    .unwrap_or_else(|| env.cwd.join(".agent"))
                    .join("skills")
            },
        }
    }
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Workspace => "workspace",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownTarget {
                name: name.to_string(),
            })
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "workspace" => Ok(Self::Workspace),
            _ => Err(Error::UnknownScope {
                name: s.trim().to_string(),
            }),
        }
    }
}

/// Process-level inputs to path resolution, passed explicitly so tests can
/// point them at temporary directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEnv {
    pub home: PathBuf,
    pub cwd: PathBuf,
}

impl SyncEnv {
    pub fn new(home: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            cwd: cwd.into(),
        }
    }
}

/// Outcome of resolving a (target, scope) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub target: Target,
    /// Scope the caller asked for.
    pub requested_scope: Scope,
    /// Scope actually used after capability fallback.
    pub scope: Scope,
    /// Directory holding one subdirectory per installed skill.
    pub root: PathBuf,
}

impl Resolution {
    /// Whether the requested scope was replaced by the target's default.
    pub fn coerced(&self) -> bool {
        self.requested_scope != self.scope
    }
}

/// Resolve the destination root for `target` in `scope`.
///
/// A scope the target does not support is replaced by the target's default
/// scope. Never creates directories.
pub fn resolve(target: Target, scope: Scope, env: &SyncEnv) -> Resolution {
    let effective = if target.supports(scope) {
        scope
    } else {
        let fallback = target.capabilities().default_scope;
        warn!(
            %target,
            requested = %scope,
            using = %fallback,
            "{} does not support {scope} scope, using {fallback} scope",
            target.display_name()
        );
        fallback
    };

    Resolution {
        target,
        requested_scope: scope,
        scope: effective,
        root: target.root_for(effective, env),
    }
}

/// Parse identifiers at the boundary and resolve them.
pub fn resolve_named(target: &str, scope: &str, env: &SyncEnv) -> Result<Resolution> {
    let target = target.parse::<Target>()?;
    let scope = scope.parse::<Scope>()?;
    Ok(resolve(target, scope, env))
}

/// Walk up from `start` looking for an existing `.agent` directory. The
/// filesystem root itself is not searched.
fn find_agent_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .filter(|dir| dir.parent().is_some())
        .map(|dir| dir.join(".agent"))
        .find(|candidate| candidate.is_dir())
}
