//! desksave - Move loose files into category folders
//!
//! This library scans a source directory (usually the Desktop or Downloads),
//! classifies each file by extension using a JSON mapping, and moves it into
//! `<destination>/<Category>/`. Every entry gets an outcome in the returned
//! report; one failed move never stops the rest of the run.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_types;
pub mod ignore;
pub mod logging;
pub mod mover;
pub mod output;
pub mod report;
pub mod sorter;

pub use config::Settings;
pub use error::{ConfigError, EntryError, Error, PathError, Result};
pub use file_types::FileTypeMap;
pub use ignore::{IgnoreList, IgnoreRules};
pub use report::{Outcome, SortRecord, SortReport};
pub use sorter::{SortRequest, sort_directory, sort_directory_with};

pub use cli::{Cli, run_cli};
