//! Command-line interface module for desksave.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Merging command-line flags with the settings file
//! - Running a sort and presenting its report
//! - Showing and exporting the extension mapping

use crate::config::{Settings, default_destination, default_source};
use crate::error::Result;
use crate::file_types::FileTypeMap;
use crate::output::{OutputFormatter, ProgressObserver};
use crate::report::SortReport;
use crate::sorter::{SortRequest, sort_directory, sort_directory_with};
use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "desksave", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move files from a source directory into category folders
    Sort(SortArgs),
    /// Show the extension mapping that a sort would use
    Types(TypesArgs),
    /// Write the built-in extension mapping to a JSON file
    InitTypes {
        /// Where to write the mapping
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// Directory to sort (default: your Desktop)
    pub source: Option<PathBuf>,

    /// Directory that receives the category folders (default: your Documents)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Sort your Downloads folder instead of the Desktop
    #[arg(long, conflicts_with = "source")]
    pub downloads: bool,

    /// JSON file mapping extensions to categories
    #[arg(short = 't', long)]
    pub file_types: Option<PathBuf>,

    /// Settings file (default: ./.desksaverc.toml, then the user config dir)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Name or path to leave alone. Repeatable.
    #[arg(short, long = "ignore", value_name = "NAME_OR_PATH")]
    pub ignore: Vec<String>,

    /// Category folder for unmapped extensions
    #[arg(long, value_name = "CATEGORY")]
    pub fallback: Option<String>,

    /// Sort into <destination>/<YYYY-MM>/<source name>
    #[arg(long)]
    pub dated: bool,

    /// Move whole folders to the destination instead of skipping them
    #[arg(long)]
    pub include_dirs: bool,

    /// Leave every dot-prefixed entry alone
    #[arg(long)]
    pub skip_hidden: bool,

    /// Show what would happen without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TypesArgs {
    /// JSON file mapping extensions to categories
    #[arg(short = 't', long)]
    pub file_types: Option<PathBuf>,

    /// Settings file
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Print the mapping as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the parsed command line.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Sort(args) => {
            let settings = Settings::load(args.settings.as_deref())
                .context("Error loading settings")?;
            run_sort(&args, &settings).map(|_| ())
        }
        Command::Types(args) => {
            let settings = Settings::load(args.settings.as_deref())
                .context("Error loading settings")?;
            show_types(&args, &settings)
        }
        Command::InitTypes { path, force } => init_types(&path, force),
    }
}

/// Merges command-line flags over settings into a [`SortRequest`].
///
/// Flags win over the settings file, which wins over platform defaults.
pub fn build_request(args: &SortArgs, settings: &Settings) -> Result<SortRequest> {
    let source = match &args.source {
        Some(path) => path.clone(),
        None if args.downloads => default_source(true)?,
        None => match &settings.sort.source {
            Some(path) => path.clone(),
            None => default_source(false)?,
        },
    };

    let destination = match args.destination.as_ref().or(settings.sort.destination.as_ref()) {
        Some(path) => path.clone(),
        None => default_destination()?,
    };

    let mut file_types = settings.file_type_map(args.file_types.as_deref())?;
    if let Some(fallback) = &args.fallback {
        file_types = file_types.with_fallback(fallback)?;
    }

    let mut rules = settings.ignore.clone();
    rules.skip_hidden |= args.skip_hidden;
    for item in &args.ignore {
        if item.contains(['/', '\\']) {
            rules.paths.push(absolute(Path::new(item)));
        } else {
            rules.names.push(item.clone());
        }
    }

    let mut ignore = rules.compile(&source)?;

    // Our own documents may live in the folder being sorted.
    let own_files = [
        args.settings.as_ref(),
        args.file_types.as_ref().or(settings.sort.file_types.as_ref()),
    ];
    for path in own_files.into_iter().flatten() {
        ignore.add_path(path.clone());
    }

    Ok(SortRequest {
        include_directories: args.include_dirs || settings.sort.include_directories,
        dated: args.dated || settings.sort.dated,
        dry_run: args.dry_run,
        ..SortRequest::new(source, destination, file_types, ignore)
    })
}

/// Runs a sort and prints its report.
pub fn run_sort(args: &SortArgs, settings: &Settings) -> anyhow::Result<SortReport> {
    let request = build_request(args, settings).context("Could not prepare the sort")?;

    if args.json {
        let report = sort_directory(&request).context("Could not start sorting")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    OutputFormatter::info(&format!(
        "Sorting {} into {}",
        request.source.display(),
        request.destination.display()
    ));
    if request.dry_run {
        OutputFormatter::dry_run_notice("Nothing will be moved.");
    }

    let mut progress = ProgressObserver::new(request.dry_run);
    let report =
        sort_directory_with(&request, &mut progress).context("Could not start sorting")?;
    progress.finish();

    OutputFormatter::report_summary(&report);
    Ok(report)
}

/// Prints the effective extension mapping.
pub fn show_types(args: &TypesArgs, settings: &Settings) -> anyhow::Result<()> {
    let map = settings
        .file_type_map(args.file_types.as_deref())
        .context("Error loading file type mapping")?;

    if args.json {
        println!("{}", map.to_json_pretty()?);
        return Ok(());
    }

    for (category, extensions) in map.categories() {
        OutputFormatter::header(category);
        println!("  {}", extensions.join(" "));
    }
    println!();
    OutputFormatter::info(&format!(
        "Anything else goes to '{}'",
        map.fallback()
    ));
    Ok(())
}

/// Writes the built-in mapping as a flat JSON document.
pub fn init_types(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    let json = FileTypeMap::builtin().to_json_pretty()?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;

    OutputFormatter::success(&format!("Wrote the built-in mapping to {}", path.display()));
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sort_flags() {
        let cli = Cli::try_parse_from([
            "desksave", "-vv", "sort", "/src", "-d", "/dst", "-i", "keep.txt", "-i",
            "/src/also.txt", "--dated", "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Sort(args) = cli.command else {
            panic!("expected sort command");
        };
        assert_eq!(args.source, Some(PathBuf::from("/src")));
        assert_eq!(args.destination, Some(PathBuf::from("/dst")));
        assert_eq!(args.ignore, vec!["keep.txt", "/src/also.txt"]);
        assert!(args.dated);
        assert!(args.dry_run);
        assert!(!args.include_dirs);
    }

    #[test]
    fn test_downloads_conflicts_with_source() {
        let result = Cli::try_parse_from(["desksave", "sort", "/src", "--downloads"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        settings.sort.source = Some(PathBuf::from("/settings/src"));
        settings.sort.destination = Some(PathBuf::from("/settings/dst"));
        settings.sort.dated = true;

        let args = SortArgs {
            destination: Some(PathBuf::from("/flag/dst")),
            fallback: Some("Misc".to_string()),
            ignore: vec!["keep.txt".to_string(), "/settings/src/pinned.pdf".to_string()],
            ..SortArgs::default()
        };

        let request = build_request(&args, &settings).unwrap();
        assert_eq!(request.source, PathBuf::from("/settings/src"));
        assert_eq!(request.destination, PathBuf::from("/flag/dst"));
        assert!(request.dated);
        assert_eq!(request.file_types.fallback(), "Misc");
        assert!(request.ignore.is_ignored(Path::new("/settings/src/keep.txt")));
        assert!(request.ignore.is_ignored(Path::new("/settings/src/pinned.pdf")));
        assert!(request.ignore.is_ignored(Path::new("/settings/src/.DS_Store")));
        assert!(!request.ignore.is_ignored(Path::new("/settings/src/other.pdf")));
    }

    #[test]
    fn test_init_types_refuses_to_overwrite() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("file_types.json");
        fs::write(&path, "{}").unwrap();

        assert!(init_types(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        init_types(&path, true).unwrap();
        let written = FileTypeMap::load(&path).unwrap();
        assert_eq!(written, FileTypeMap::builtin());
    }
}
