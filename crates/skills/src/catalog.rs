use std::path::{Path, PathBuf};

use {serde::Serialize, tracing::debug};

use crate::error::{Error, Result};

/// Descriptor file every skill directory must contain.
pub const SKILL_DESCRIPTOR: &str = "SKILL.md";

/// A skill folder under the source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    /// Directory name, also the name it is installed under.
    pub name: String,
    /// Source directory, copied verbatim on install.
    pub path: PathBuf,
}

impl Skill {
    /// Whether the source directory still holds a descriptor.
    pub fn exists(&self) -> bool {
        is_skill_dir(&self.path)
    }
}

/// The canonical source tree: one directory per skill.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    exclude: Vec<String>,
}

impl Catalog {
    /// Open the source root. Fails when it is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::SourceRootMissing { path: root });
        }
        Ok(Self {
            root,
            exclude: Vec::new(),
        })
    }

    /// Directory names that are never treated as skills.
    #[must_use]
    pub fn with_excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All skills, sorted by name.
    ///
    /// Hidden entries, non-directories, excluded names, and directories
    /// without a `SKILL.md` are skipped.
    pub fn skills(&self) -> Result<Vec<Skill>> {
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| Error::fs("read", &self.root, e))?;

        let mut skills = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::fs("read", &self.root, e))?;
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!(?path, "skipping non UTF-8 entry");
                continue;
            };
            if name.starts_with('.') || !path.is_dir() {
                continue;
            }
            if self.is_excluded(&name) {
                debug!(%name, "skipping excluded directory");
                continue;
            }
            if !is_skill_dir(&path) {
                debug!(?path, "skipping directory without {SKILL_DESCRIPTOR}");
                continue;
            }
            skills.push(Skill { name, path });
        }

        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    /// Names of all skills, sorted.
    pub fn list_all(&self) -> Result<Vec<String>> {
        Ok(self.skills()?.into_iter().map(|s| s.name).collect())
    }

    pub fn exists(&self, name: &str) -> bool {
        validate_skill_name(name).is_ok()
            && !self.is_excluded(name)
            && is_skill_dir(&self.root.join(name))
    }

    /// Source directory of `name`, or [`Error::SkillNotFound`].
    pub fn source_path(&self, name: &str) -> Result<PathBuf> {
        validate_skill_name(name)?;
        if !self.exists(name) {
            return Err(Error::SkillNotFound {
                name: name.to_string(),
                root: self.root.clone(),
            });
        }
        Ok(self.root.join(name))
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name)
    }
}

/// A directory is a skill when it contains the descriptor file.
pub fn is_skill_dir(path: &Path) -> bool {
    path.is_dir() && path.join(SKILL_DESCRIPTOR).is_file()
}

/// Reject names that would resolve outside a single directory level.
pub fn validate_skill_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidSkillName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn write_skill(root: &Path, name: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(SKILL_DESCRIPTOR),
            format!("---\nname: {name}\n---\nbody\n"),
        )
        .unwrap();
    }

    #[test]
    fn lists_skills_in_lexicographic_order() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["pdf", "docx", "git-formatter"] {
            write_skill(tmp.path(), name);
        }

        let catalog = Catalog::open(tmp.path()).unwrap();
        assert_eq!(catalog.list_all().unwrap(), vec![
            "docx",
            "git-formatter",
            "pdf"
        ]);
    }

    #[test]
    fn skips_hidden_descriptorless_and_plain_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "pdf");
        write_skill(tmp.path(), ".hidden");
        std::fs::create_dir_all(tmp.path().join("notes")).unwrap();
        std::fs::write(tmp.path().join("notes/README.md"), "not a skill").unwrap();
        std::fs::write(tmp.path().join("marketplace.json"), "{}").unwrap();

        let catalog = Catalog::open(tmp.path()).unwrap();
        assert_eq!(catalog.list_all().unwrap(), vec!["pdf"]);
        assert!(!catalog.exists("notes"));
    }

    #[test]
    fn excluded_directories_are_not_skills() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "pdf");
        write_skill(tmp.path(), "skills-manager");

        let catalog = Catalog::open(tmp.path())
            .unwrap()
            .with_excludes(["skills-manager"]);
        assert_eq!(catalog.list_all().unwrap(), vec!["pdf"]);
        assert!(!catalog.exists("skills-manager"));
        assert!(matches!(
            catalog.source_path("skills-manager"),
            Err(Error::SkillNotFound { .. })
        ));
    }

    #[test]
    fn source_path_of_known_and_missing_skill() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "pdf");
        let catalog = Catalog::open(tmp.path()).unwrap();

        assert_eq!(catalog.source_path("pdf").unwrap(), tmp.path().join("pdf"));
        let err = catalog.source_path("docx").unwrap_err();
        assert!(matches!(err, Error::SkillNotFound { ref name, .. } if name == "docx"));
    }

    #[test]
    fn rejects_path_like_names() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = Catalog::open(tmp.path()).unwrap();
        for name in ["", "..", "../etc", "a/b", ".git"] {
            assert!(
                matches!(
                    catalog.source_path(name),
                    Err(Error::InvalidSkillName { .. })
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Catalog::open(tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::SourceRootMissing { .. }));
    }

    #[test]
    fn skill_exists_tracks_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "pdf");
        let catalog = Catalog::open(tmp.path()).unwrap();
        let skill = catalog.skills().unwrap().remove(0);
        assert!(skill.exists());

        std::fs::remove_file(skill.path.join(SKILL_DESCRIPTOR)).unwrap();
        assert!(!skill.exists());
    }
}
