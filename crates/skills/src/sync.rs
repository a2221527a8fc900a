//! Install, list, and remove skills in a destination root.
//!
//! Install is delete-then-copy. In [`InstallMode::Replace`] the previous copy
//! is deleted before the new one is written, so a crash in between leaves the
//! skill missing or partially copied. [`InstallMode::Staged`] copies into a
//! hidden sibling first and only deletes the old copy once the new one is
//! complete; the final rename is atomic where the filesystem supports it.

use std::path::{Path, PathBuf};

use {
    serde::Serialize,
    tracing::{debug, info, warn},
};

use crate::{
    catalog::{Catalog, validate_skill_name},
    error::{Context, Error, Result},
    report::{BatchKind, BatchReport},
};

/// How [`install_skill`] replaces an existing installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMode {
    /// Delete the old copy, then copy the source in place.
    #[default]
    Replace,
    /// Copy to `.<name>.staging-<pid>`, then swap it in with a rename.
    Staged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    pub name: String,
    pub destination: PathBuf,
    /// A previous installation was deleted.
    pub replaced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed(PathBuf),
    NotInstalled(PathBuf),
}

/// Install `name` from the catalog into `dest_root/name`, replacing any
/// existing copy. Creates `dest_root` if needed.
pub fn install_skill(
    catalog: &Catalog,
    name: &str,
    dest_root: &Path,
    mode: InstallMode,
) -> Result<InstallOutcome> {
    let source = catalog.source_path(name)?;
    ensure_disjoint(&source, dest_root, name)?;
    std::fs::create_dir_all(dest_root).map_err(|e| Error::fs("create", dest_root, e))?;
    let dest = dest_root.join(name);

    let replaced = match mode {
        InstallMode::Replace => {
            let replaced = clear_path(&dest)?;
            if replaced {
                debug!(path = %dest.display(), "removed existing installation");
            }
            copy_dir_recursive(&source, &dest)?;
            replaced
        },
        InstallMode::Staged => {
            let staging = dest_root.join(format!(".{name}.staging-{}", std::process::id()));
            clear_path(&staging)?;
            match swap_in_staged(&source, &staging, &dest) {
                Ok(replaced) => replaced,
                Err(e) => {
                    discard_staging(&staging);
                    return Err(e);
                },
            }
        },
    };

    info!(skill = %name, dest = %dest.display(), replaced, "installed skill");
    Ok(InstallOutcome {
        name: name.to_string(),
        destination: dest,
        replaced,
    })
}

/// Install each of `names`, continuing past failures.
pub fn install_many<S: AsRef<str>>(
    catalog: &Catalog,
    names: &[S],
    dest_root: &Path,
    mode: InstallMode,
) -> BatchReport {
    let mut report = BatchReport::new(BatchKind::Install);
    for name in names {
        let name = name.as_ref();
        let result = install_skill(catalog, name, dest_root, mode);
        if let Err(ref e) = result {
            warn!(skill = %name, error = %e, "install failed");
        }
        report.record_install(name, result);
    }
    report
}

/// Install every catalog skill in catalog order.
pub fn install_all(catalog: &Catalog, dest_root: &Path, mode: InstallMode) -> Result<BatchReport> {
    let names = catalog.list_all()?;
    debug!(count = names.len(), "installing all skills");
    Ok(install_many(catalog, &names, dest_root, mode))
}

/// Names of installed skills under `dest_root`, sorted. A missing root yields
/// an empty list.
pub fn list_installed(dest_root: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dest_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::fs("read", dest_root, e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::fs("read", dest_root, e))?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !name.starts_with('.') && entry.path().is_dir() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Delete `dest_root/name`. Absent skills are not an error.
pub fn remove_skill(name: &str, dest_root: &Path) -> Result<RemoveOutcome> {
    validate_skill_name(name)?;
    let dest = dest_root.join(name);
    if clear_path(&dest)? {
        info!(skill = %name, path = %dest.display(), "removed skill");
        Ok(RemoveOutcome::Removed(dest))
    } else {
        debug!(skill = %name, path = %dest.display(), "skill not installed");
        Ok(RemoveOutcome::NotInstalled(dest))
    }
}

/// Remove every installed skill found by [`list_installed`], continuing past
/// failures.
pub fn remove_all(dest_root: &Path) -> Result<BatchReport> {
    let mut report = BatchReport::new(BatchKind::Remove);
    for name in list_installed(dest_root)? {
        let result = remove_skill(&name, dest_root);
        if let Err(ref e) = result {
            warn!(skill = %name, error = %e, "remove failed");
        }
        report.record_remove(&name, result);
    }
    Ok(report)
}

/// Copy into `staging`, then replace `dest` with it.
fn swap_in_staged(source: &Path, staging: &Path, dest: &Path) -> Result<bool> {
    copy_dir_recursive(source, staging)?;
    let replaced = clear_path(dest)?;
    std::fs::rename(staging, dest).map_err(|e| Error::fs("rename", staging, e))?;
    Ok(replaced)
}

fn discard_staging(staging: &Path) {
    match std::fs::remove_dir_all(staging) {
        Ok(()) => {},
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => {
            warn!(path = %staging.display(), error = %e, "failed to clean up staging directory");
        },
    }
}

/// Fail when `dest_root/name` is the source skill, or one contains the other.
/// Both sides are canonicalized so a symlinked destination root is caught.
fn ensure_disjoint(source: &Path, dest_root: &Path, name: &str) -> Result<()> {
    let source = std::fs::canonicalize(source).map_err(|e| Error::fs("resolve", source, e))?;
    let dest = canonicalize_existing_prefix(dest_root)?.join(name);
    if dest.starts_with(&source) || source.starts_with(&dest) {
        return Err(Error::PathCollision { skill: source, dest });
    }
    Ok(())
}

/// Canonicalize the longest existing ancestor of `path` and append the rest,
/// so a destination root that does not exist yet can still be compared.
fn canonicalize_existing_prefix(path: &Path) -> Result<PathBuf> {
    let Some(existing) = path.ancestors().find(|p| p.exists()) else {
        return Ok(path.to_path_buf());
    };
    let canonical =
        std::fs::canonicalize(existing).map_err(|e| Error::fs("resolve", existing, e))?;
    let rest = path.strip_prefix(existing).unwrap_or(Path::new(""));
    Ok(canonical.join(rest))
}

/// Delete whatever is at `path` without following a symlink.
/// Returns whether something was deleted.
fn clear_path(path: &Path) -> Result<bool> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::fs("inspect", path, e)),
    };

    if meta.is_dir() {
        std::fs::remove_dir_all(path).map_err(|e| Error::fs("remove", path, e))?;
    } else {
        std::fs::remove_file(path).map_err(|e| Error::fs("remove", path, e))?;
    }
    Ok(true)
}

/// Recursively copy `src` into `dest`, following symlinks so the destination
/// holds plain files and directories.
fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).map_err(|e| Error::fs("create", dest, e))?;

    for entry in walkdir::WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| Error::walk("copy", src, e))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("walked outside {}", src.display()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| Error::fs("create", &target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::fs("create", parent, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| Error::fs("copy", entry.path(), e))?;
        }
    }

    Ok(())
}
