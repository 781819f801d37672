//! Sorts the direct entries of a source directory into category folders.
//!
//! A run has two phases. Validation and enumeration ([`scan`],
//! [`check_destination`]) fail fast with a [`PathError`] before anything is
//! touched. Traversal ([`Sorter::run`]) then visits every entry exactly once
//! and records an [`Outcome`] for it; a failing entry never stops the run.

use crate::error::{PathError, Result};
use crate::file_types::FileTypeMap;
use crate::ignore::IgnoreList;
use crate::mover::{DryRunMover, FsMover, Mover, move_into_dir};
use crate::report::{Outcome, SortRecord, SortReport};
use chrono::{Local, NaiveDate};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a source entry, as reported by the directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Moved as a link, classified by its own name.
    Symlink,
    /// Sockets, FIFOs, devices, or entries whose type could not be read.
    Other,
}

/// A direct entry of the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub name: OsString,
    pub kind: EntryKind,
}

impl SourceEntry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| path.as_os_str().to_os_string());
        Self { path, name, kind }
    }
}

/// Receives progress while a run is going.
pub trait SortObserver {
    /// Called once before traversal with the number of entries.
    fn started(&mut self, _total: usize) {}

    /// Called once per entry, in order.
    fn recorded(&mut self, _record: &SortRecord) {}
}

impl SortObserver for () {}

/// Validates the source directory and lists its direct entries.
///
/// Entries come back sorted by name so runs are deterministic.
pub fn scan(source: &Path) -> std::result::Result<Vec<SourceEntry>, PathError> {
    let metadata = fs::metadata(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PathError::SourceMissing(source.to_path_buf()),
        _ => PathError::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(PathError::SourceNotDirectory(source.to_path_buf()));
    }

    let unreadable = |e: io::Error| PathError::SourceUnreadable {
        path: source.to_path_buf(),
        source: e,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(source).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let kind = match entry.file_type() {
            Ok(t) if t.is_file() => EntryKind::File,
            Ok(t) if t.is_dir() => EntryKind::Directory,
            Ok(t) if t.is_symlink() => EntryKind::Symlink,
            _ => EntryKind::Other,
        };
        entries.push(SourceEntry {
            path: entry.path(),
            name: entry.file_name(),
            kind,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Checks that the destination exists and is a directory.
pub fn check_destination(destination: &Path) -> std::result::Result<(), PathError> {
    match fs::metadata(destination) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PathError::DestinationNotDirectory(
            destination.to_path_buf(),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(PathError::DestinationMissing(destination.to_path_buf()))
        }
        Err(e) => Err(PathError::DestinationUnavailable {
            path: destination.to_path_buf(),
            source: e,
        }),
    }
}

/// Returns `<destination>/<YYYY-MM>/<source folder name>`.
pub fn dated_destination(destination: &Path, source: &Path, date: NaiveDate) -> PathBuf {
    let source_name = source.file_name().unwrap_or(OsStr::new("source"));
    destination
        .join(date.format("%Y-%m").to_string())
        .join(source_name)
}

/// Classifies entries and moves them through a [`Mover`].
#[derive(Debug, Clone)]
pub struct Sorter<'a> {
    file_types: &'a FileTypeMap,
    ignore: &'a IgnoreList,
    include_directories: bool,
    protected: Option<PathBuf>,
}

impl<'a> Sorter<'a> {
    pub fn new(file_types: &'a FileTypeMap, ignore: &'a IgnoreList) -> Self {
        Self {
            file_types,
            ignore,
            include_directories: false,
            protected: None,
        }
    }

    /// Move whole directories to the destination root instead of skipping them.
    pub fn include_directories(mut self, include: bool) -> Self {
        self.include_directories = include;
        self
    }

    /// Never move a directory that is, or contains, `path`.
    ///
    /// `path` should be canonical; it is compared against canonicalized
    /// directory entries.
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected = Some(path.into());
        self
    }

    /// Sorts every entry into `destination` and returns one record per entry.
    pub fn run<M, O>(
        &self,
        entries: &[SourceEntry],
        destination: &Path,
        mover: &mut M,
        observer: &mut O,
    ) -> Vec<SortRecord>
    where
        M: Mover + ?Sized,
        O: SortObserver + ?Sized,
    {
        observer.started(entries.len());

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let outcome = self.sort_entry(entry, destination, mover);
            let record = SortRecord {
                name: entry.name.to_string_lossy().into_owned(),
                path: entry.path.clone(),
                outcome,
            };
            observer.recorded(&record);
            records.push(record);
        }
        records
    }

    fn sort_entry<M: Mover + ?Sized>(
        &self,
        entry: &SourceEntry,
        destination: &Path,
        mover: &mut M,
    ) -> Outcome {
        if self.ignore.is_ignored(&entry.path) {
            tracing::debug!(entry = %entry.path.display(), "ignored");
            return Outcome::SkippedIgnored;
        }

        let (category, target_dir) = match entry.kind {
            EntryKind::Other => return Outcome::SkippedNotAFile,
            EntryKind::Directory if !self.include_directories => {
                tracing::debug!(entry = %entry.path.display(), "skipping directory");
                return Outcome::SkippedNotAFile;
            }
            EntryKind::Directory if self.is_protected(&entry.path) => {
                tracing::debug!(entry = %entry.path.display(), "directory holds the destination");
                return Outcome::SkippedIgnored;
            }
            EntryKind::Directory if already_in(&entry.path, destination) => {
                tracing::debug!(entry = %entry.path.display(), "directory is already in place");
                return Outcome::SkippedIgnored;
            }
            EntryKind::Directory => (None, destination.to_path_buf()),
            EntryKind::File | EntryKind::Symlink => {
                let category = self.file_types.category_for_path(&entry.path);
                (Some(category.to_string()), destination.join(category))
            }
        };

        match move_into_dir(mover, &entry.path, &entry.name, &target_dir) {
            Ok((target, renamed)) => {
                tracing::debug!(
                    entry = %entry.path.display(),
                    to = %target.display(),
                    renamed,
                    "moved"
                );
                Outcome::Moved {
                    category,
                    destination: target,
                    renamed,
                }
            }
            Err(e) => {
                tracing::warn!(entry = %entry.path.display(), error = %e, "could not move entry");
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn is_protected(&self, dir: &Path) -> bool {
        let Some(protected) = &self.protected else {
            return false;
        };
        dir.canonicalize()
            .map(|dir| protected.starts_with(dir))
            .unwrap_or(false)
    }
}

/// Whether `entry` is a direct child of `dir`, comparing canonical paths.
///
/// When source and destination are the same folder, its subfolders
/// (category folders included) are already where a directory move would
/// put them.
fn already_in(entry: &Path, dir: &Path) -> bool {
    let Some(parent) = entry.parent() else {
        return false;
    };
    match (parent.canonicalize(), dir.canonicalize()) {
        (Ok(parent), Ok(dir)) => parent == dir,
        _ => false,
    }
}

/// Everything a sort run needs.
#[derive(Debug, Clone)]
pub struct SortRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub file_types: FileTypeMap,
    pub ignore: IgnoreList,
    /// Move whole directories instead of skipping them.
    pub include_directories: bool,
    /// Sort into `<destination>/<YYYY-MM>/<source name>`.
    pub dated: bool,
    /// Plan only; touch nothing.
    pub dry_run: bool,
}

impl SortRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        file_types: FileTypeMap,
        ignore: IgnoreList,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            file_types,
            ignore,
            include_directories: false,
            dated: false,
            dry_run: false,
        }
    }
}

/// Runs a complete sort.
///
/// # Errors
///
/// Returns a [`PathError`] when the source or destination is unusable. Per
/// entry failures are in the report, not here.
///
/// # Examples
///
/// ```no_run
/// use desksave::{FileTypeMap, IgnoreList, SortRequest, sort_directory};
///
/// let request = SortRequest::new(
///     "/home/me/Desktop",
///     "/home/me/Documents",
///     FileTypeMap::builtin(),
///     IgnoreList::empty(),
/// );
/// let report = sort_directory(&request)?;
/// println!("moved {} files", report.moved_count());
/// # Ok::<(), desksave::Error>(())
/// ```
pub fn sort_directory(request: &SortRequest) -> Result<SortReport> {
    sort_directory_with(request, &mut ())
}

/// Like [`sort_directory`], reporting progress to `observer`.
pub fn sort_directory_with<O: SortObserver + ?Sized>(
    request: &SortRequest,
    observer: &mut O,
) -> Result<SortReport> {
    let entries = scan(&request.source)?;
    check_destination(&request.destination)?;

    let destination = if request.dated {
        dated_destination(
            &request.destination,
            &request.source,
            Local::now().date_naive(),
        )
    } else {
        request.destination.clone()
    };

    let unavailable = |path: &Path, e: io::Error| PathError::DestinationUnavailable {
        path: path.to_path_buf(),
        source: e,
    };

    if request.dated && !request.dry_run {
        fs::create_dir_all(&destination).map_err(|e| unavailable(&destination, e))?;
    }

    let base = request
        .destination
        .canonicalize()
        .map_err(|e| unavailable(&request.destination, e))?;
    let protected = match destination.strip_prefix(&request.destination) {
        Ok(rest) => base.join(rest),
        Err(_) => base,
    };

    tracing::info!(
        source = %request.source.display(),
        destination = %destination.display(),
        entries = entries.len(),
        dry_run = request.dry_run,
        "sorting"
    );

    let sorter = Sorter::new(&request.file_types, &request.ignore)
        .include_directories(request.include_directories)
        .protect(protected);

    let records = if request.dry_run {
        sorter.run(&entries, &destination, &mut DryRunMover::new(), observer)
    } else {
        sorter.run(&entries, &destination, &mut FsMover, observer)
    };

    let report = SortReport {
        source: request.source.clone(),
        destination,
        dry_run: request.dry_run,
        records,
    };

    tracing::info!(
        moved = report.moved_count(),
        skipped = report.skipped_count(),
        failed = report.failed_count(),
        "sort finished"
    );

    Ok(report)
}
