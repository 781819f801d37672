/// Filesystem seam for moving entries into category directories.
///
/// The sorter never touches the filesystem directly for mutations. It goes
/// through a [`Mover`], so classification can run against a real directory
/// ([`FsMover`]), as a dry run ([`DryRunMover`]), or against a test double.
use crate::error::EntryError;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Highest numeric suffix tried before giving up on a name collision.
pub const MAX_COLLISION_SUFFIX: u32 = 9999;

/// Mutating filesystem operations used by a sort run.
#[cfg_attr(test, mockall::automock)]
pub trait Mover {
    /// Whether anything (file, directory or link) occupies `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Creates `path` and any missing parents.
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;

    /// Moves `from` to `to`. `to` is known not to exist.
    fn move_entry(&mut self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Moves entries on the real filesystem.
#[derive(Debug, Default)]
pub struct FsMover;

impl Mover for FsMover {
    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as taken
        path.symlink_metadata().is_ok()
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    // No-overwrite is best effort: rename replaces anything created at `to`
    // after `free_destination` checked it.
    fn move_entry(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices && is_plain_file(from) => {
                tracing::debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "rename crosses devices, copying instead"
                );
                fs::copy(from, to)?;
                if let Err(e) = fs::remove_file(from) {
                    // Leave the source in place rather than lose either copy.
                    let _ = fs::remove_file(to);
                    return Err(e);
                }
                Ok(())
            }
            other => other,
        }
    }
}

/// True for regular files only. Links are not followed, so a symlink is
/// never copied as its target's contents.
fn is_plain_file(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_file())
}

/// Plans moves without touching the filesystem.
///
/// Planned destinations are remembered so that two entries with the same
/// name get the same collision suffixes a real run would give them.
#[derive(Debug, Default)]
pub struct DryRunMover {
    planned: HashSet<PathBuf>,
}

impl DryRunMover {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mover for DryRunMover {
    fn exists(&self, path: &Path) -> bool {
        self.planned.contains(path) || path.symlink_metadata().is_ok()
    }

    fn create_dir_all(&mut self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn move_entry(&mut self, _from: &Path, to: &Path) -> io::Result<()> {
        self.planned.insert(to.to_path_buf());
        Ok(())
    }
}

/// Builds the `n`th collision candidate for a file name.
///
/// `report.pdf` becomes `report (1).pdf`; names without an extension, and
/// dot-prefixed names like `.bashrc`, get the suffix at the end.
pub fn candidate_name(name: &OsStr, n: u32) -> OsString {
    let path = Path::new(name);
    let suffix = format!(" ({})", n);

    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => {
            let mut candidate = stem.to_os_string();
            candidate.push(suffix);
            candidate.push(".");
            candidate.push(ext);
            candidate
        }
        _ => {
            let mut candidate = name.to_os_string();
            candidate.push(suffix);
            candidate
        }
    }
}

/// Finds a free path for `name` inside `dir`.
///
/// Returns the path and whether it had to be renamed. Existing files are
/// never overwritten.
pub fn free_destination<M: Mover + ?Sized>(
    mover: &M,
    dir: &Path,
    name: &OsStr,
) -> Result<(PathBuf, bool), EntryError> {
    let direct = dir.join(name);
    if !mover.exists(&direct) {
        return Ok((direct, false));
    }

    (1..=MAX_COLLISION_SUFFIX)
        .map(|n| dir.join(candidate_name(name, n)))
        .find(|candidate| !mover.exists(candidate))
        .map(|candidate| (candidate, true))
        .ok_or_else(|| EntryError::NoFreeName {
            name: name.to_string_lossy().into_owned(),
            dir: dir.to_path_buf(),
        })
}

/// Moves `from` into `dir`, creating `dir` first and avoiding collisions.
///
/// Returns the final path and whether the entry was renamed.
pub fn move_into_dir<M: Mover + ?Sized>(
    mover: &mut M,
    from: &Path,
    name: &OsStr,
    dir: &Path,
) -> Result<(PathBuf, bool), EntryError> {
    mover
        .create_dir_all(dir)
        .map_err(|source| EntryError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let (target, renamed) = free_destination(mover, dir, name)?;

    mover
        .move_entry(from, &target)
        .map_err(|source| EntryError::Move {
            from: from.to_path_buf(),
            to: target.clone(),
            source,
        })?;

    Ok((target, renamed))
}
