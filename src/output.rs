//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables.

use crate::report::{Outcome, SortRecord, SortReport};
use crate::sorter::SortObserver;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use desksave::output::OutputFormatter;
    /// OutputFormatter::error("Failed to load file type mapping");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates and returns a progress bar for file operations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use desksave::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Formats one record as a single styled line.
    pub fn format_record(record: &SortRecord, dry_run: bool) -> String {
        match &record.outcome {
            Outcome::Moved {
                category,
                destination,
                renamed,
            } => {
                let verb = if dry_run { "Would move" } else { "Moved" };
                let target = match category {
                    Some(category) => format!("{}/", category),
                    None => "destination root".to_string(),
                };
                let mut line = format!("{} {} {} → {}", "✓".green(), verb, record.name, target);
                if *renamed {
                    let new_name = destination
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    line.push_str(&format!(" (as {})", new_name).yellow().to_string());
                }
                line
            }
            Outcome::SkippedIgnored => {
                format!("{} Skipped {} (ignored)", "-".dimmed(), record.name)
            }
            Outcome::SkippedNotAFile => {
                format!("{} Skipped {} (not a file)", "-".dimmed(), record.name)
            }
            Outcome::Failed { reason } => {
                format!("{} {}: {}", "✗".red(), record.name, reason.red())
            }
        }
    }

    /// Prints a summary table with file statistics by category.
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_category_len
        );
    }

    /// Prints the closing summary of a run.
    pub fn report_summary(report: &SortReport) {
        Self::summary_table(&report.category_counts(), report.moved_count());

        println!();
        if report.skipped_count() > 0 {
            Self::info(&format!("Skipped {} entries", report.skipped_count()));
        }

        if report.dry_run {
            Self::dry_run_notice("No files were moved.");
        } else if report.is_complete_success() {
            Self::success(&format!(
                "Sorted into {}",
                report.destination.display()
            ));
        } else {
            Self::warning(&format!(
                "{} entries could not be moved. See the errors above.",
                report.failed_count()
            ));
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Shows a progress bar and prints each record above it.
pub struct ProgressObserver {
    bar: Option<ProgressBar>,
    dry_run: bool,
}

impl ProgressObserver {
    pub fn new(dry_run: bool) -> Self {
        Self { bar: None, dry_run }
    }

    /// Clears the bar once the run is over.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl SortObserver for ProgressObserver {
    fn started(&mut self, total: usize) {
        self.bar = Some(OutputFormatter::create_progress_bar(total as u64));
    }

    fn recorded(&mut self, record: &SortRecord) {
        let line = OutputFormatter::format_record(record, self.dry_run);
        match &self.bar {
            Some(bar) if !bar.is_hidden() => {
                bar.println(line);
                bar.inc(1);
            }
            _ => println!("{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(outcome: Outcome) -> SortRecord {
        SortRecord {
            name: "a.txt".to_string(),
            path: PathBuf::from("/src/a.txt"),
            outcome,
        }
    }

    #[test]
    fn test_format_moved_record() {
        colored::control::set_override(false);
        let line = OutputFormatter::format_record(
            &record(Outcome::Moved {
                category: Some("Docs".to_string()),
                destination: PathBuf::from("/dst/Docs/a (1).txt"),
                renamed: true,
            }),
            false,
        );
        assert_eq!(line, "✓ Moved a.txt → Docs/ (as a (1).txt)");
    }

    #[test]
    fn test_format_dry_run_and_failures() {
        colored::control::set_override(false);
        let planned = OutputFormatter::format_record(
            &record(Outcome::Moved {
                category: Some("Docs".to_string()),
                destination: PathBuf::from("/dst/Docs/a.txt"),
                renamed: false,
            }),
            true,
        );
        assert_eq!(planned, "✓ Would move a.txt → Docs/");

        let failed = OutputFormatter::format_record(
            &record(Outcome::Failed {
                reason: "denied".to_string(),
            }),
            false,
        );
        assert_eq!(failed, "✗ a.txt: denied");
    }
}
