//! Outcome records produced by a sort run.
//!
//! Records are for display only. They are returned to the caller and never
//! written to disk.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What happened to one source entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Moved to `destination`. `category` is `None` for whole directories.
    Moved {
        #[serde(skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        destination: PathBuf,
        /// True when a numeric suffix was added to avoid a collision.
        renamed: bool,
    },
    /// Matched the ignore list.
    SkippedIgnored,
    /// A directory (without directory sorting) or a special file.
    SkippedNotAFile,
    /// The move failed; the run carried on.
    Failed { reason: String },
}

/// One processed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortRecord {
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl SortRecord {
    pub fn is_moved(&self) -> bool {
        matches!(self.outcome, Outcome::Moved { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::SkippedIgnored | Outcome::SkippedNotAFile
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

/// The ordered result of a sort run.
#[derive(Debug, Clone, Serialize)]
pub struct SortReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub dry_run: bool,
    pub records: Vec<SortRecord>,
}

impl SortReport {
    pub fn moved_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_moved()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }

    /// True if no entry failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Moved entries per category. Directories count under their own name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            if let Outcome::Moved { category, .. } = &record.outcome {
                let key = category.clone().unwrap_or_else(|| "(folders)".to_string());
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Looks up the record for an entry name.
    pub fn record(&self, name: &str) -> Option<&SortRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SortReport {
        SortReport {
            source: PathBuf::from("/src"),
            destination: PathBuf::from("/dst"),
            dry_run: false,
            records: vec![
                SortRecord {
                    name: "a.txt".to_string(),
                    path: PathBuf::from("/src/a.txt"),
                    outcome: Outcome::Moved {
                        category: Some("Docs".to_string()),
                        destination: PathBuf::from("/dst/Docs/a.txt"),
                        renamed: false,
                    },
                },
                SortRecord {
                    name: "b.txt".to_string(),
                    path: PathBuf::from("/src/b.txt"),
                    outcome: Outcome::Failed {
                        reason: "permission denied".to_string(),
                    },
                },
                SortRecord {
                    name: ".DS_Store".to_string(),
                    path: PathBuf::from("/src/.DS_Store"),
                    outcome: Outcome::SkippedIgnored,
                },
            ],
        }
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.moved_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert!(!report.is_complete_success());
        assert_eq!(report.category_counts().get("Docs"), Some(&1));
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(report()).unwrap();
        let first = &value["records"][0];
        assert_eq!(first["outcome"], "moved");
        assert_eq!(first["category"], "Docs");
        assert_eq!(first["renamed"], false);
        assert_eq!(value["records"][1]["reason"], "permission denied");
        assert_eq!(value["records"][2]["outcome"], "skipped_ignored");
    }
}
