//! Per-skill outcomes for batch operations.

use std::path::PathBuf;

use serde::Serialize;

use crate::{
    error::Error,
    sync::{InstallOutcome, RemoveOutcome},
};

/// Which batch operation produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Install,
    Remove,
}

/// What happened to a single skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Copied into a destination that had no previous copy.
    Installed,
    /// Previous copy deleted, then copied again.
    Replaced,
    Removed,
    /// Remove requested for a skill that was not there.
    NotInstalled,
    Failed,
}

impl ItemStatus {
    pub fn is_failure(self) -> bool {
        self == Self::Failed
    }
}

/// Aggregate status of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    Partial,
    Failed,
    /// Nothing to do.
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub name: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of an install or remove across several skills.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub kind: BatchKind,
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn record_install(&mut self, name: &str, result: Result<InstallOutcome, Error>) {
        let item = match result {
            Ok(outcome) => ItemOutcome {
                name: name.to_string(),
                status: if outcome.replaced {
                    ItemStatus::Replaced
                } else {
                    ItemStatus::Installed
                },
                path: Some(outcome.destination),
                error: None,
            },
            Err(e) => Self::failure(name, &e),
        };
        self.items.push(item);
    }

    pub fn record_remove(&mut self, name: &str, result: Result<RemoveOutcome, Error>) {
        let item = match result {
            Ok(RemoveOutcome::Removed(path)) => ItemOutcome {
                name: name.to_string(),
                status: ItemStatus::Removed,
                path: Some(path),
                error: None,
            },
            Ok(RemoveOutcome::NotInstalled(path)) => ItemOutcome {
                name: name.to_string(),
                status: ItemStatus::NotInstalled,
                path: Some(path),
                error: None,
            },
            Err(e) => Self::failure(name, &e),
        };
        self.items.push(item);
    }

    fn failure(name: &str, err: &Error) -> ItemOutcome {
        ItemOutcome {
            name: name.to_string(),
            status: ItemStatus::Failed,
            path: err.path().map(PathBuf::from),
            error: Some(err.to_string()),
        }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status.is_failure())
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.total() - self.failed()
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|i| i.status.is_failure())
    }

    pub fn status(&self) -> BatchStatus {
        match (self.total(), self.failed()) {
            (0, _) => BatchStatus::Empty,
            (_, 0) => BatchStatus::Success,
            (total, failed) if failed == total => BatchStatus::Failed,
            _ => BatchStatus::Partial,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn installed(name: &str, replaced: bool) -> Result<InstallOutcome, Error> {
        Ok(InstallOutcome {
            name: name.to_string(),
            destination: PathBuf::from("/dest").join(name),
            replaced,
        })
    }

    #[test]
    fn empty_report() {
        let report = BatchReport::new(BatchKind::Install);
        assert_eq!(report.status(), BatchStatus::Empty);
        assert!(!report.has_failures());
    }

    #[test]
    fn partial_install_report() {
        let mut report = BatchReport::new(BatchKind::Install);
        report.record_install("pdf", installed("pdf", false));
        report.record_install("docx", installed("docx", true));
        report.record_install("xlsx", Err(Error::SkillNotFound {
            name: "xlsx".into(),
            root: PathBuf::from("/src"),
        }));

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.status(), BatchStatus::Partial);
        assert_eq!(report.items[1].status, ItemStatus::Replaced);
        assert!(report.items[2].error.as_deref().unwrap().contains("xlsx"));
    }

    #[test]
    fn all_failed_report() {
        let mut report = BatchReport::new(BatchKind::Remove);
        report.record_remove(
            "pdf",
            Err(Error::fs(
                "remove",
                "/dest/pdf",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            )),
        );
        assert_eq!(report.status(), BatchStatus::Failed);
        assert_eq!(report.items[0].path, Some(PathBuf::from("/dest/pdf")));
    }

    #[test]
    fn not_installed_counts_as_success() {
        let mut report = BatchReport::new(BatchKind::Remove);
        report.record_remove("pdf", Ok(RemoveOutcome::NotInstalled("/dest/pdf".into())));
        assert_eq!(report.status(), BatchStatus::Success);
        assert_eq!(report.items[0].status, ItemStatus::NotInstalled);
    }

    #[test]
    fn serializes_snake_case() {
        let mut report = BatchReport::new(BatchKind::Remove);
        report.record_remove("pdf", Ok(RemoveOutcome::NotInstalled("/dest/pdf".into())));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "remove");
        assert_eq!(json["items"][0]["status"], "not_installed");
        assert!(json["items"][0].get("error").is_none());
    }
}
