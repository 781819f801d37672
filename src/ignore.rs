//! Ignore list for source entries.
//!
//! An entry is ignored when any rule matches, checked in this order:
//! 1. Exact file name (case-sensitive)
//! 2. Exact full path (relative rules are resolved against the source dir,
//!    and both sides are made absolute before comparing)
//! 3. Glob pattern, against the file name or the full path
//! 4. Regex, against the file name
//! 5. Hidden file switch, for names starting with `.`
//!
//! The list lives for one run only and is never written back.

use crate::error::ConfigError;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Names ignored when no settings file says otherwise.
pub const DEFAULT_IGNORED_NAMES: &[&str] = &[".DS_Store", ".localized"];

/// Ignore rules as written in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreRules {
    /// Exact file or folder names (e.g. ".DS_Store", "README.md").
    #[serde(default = "default_ignored_names")]
    pub names: Vec<String>,

    /// Exact paths. Relative paths are taken from the source directory.
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Glob patterns (e.g. "*.part", "Screenshot*").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,

    /// Skip every dot-prefixed name. Off by default.
    #[serde(default)]
    pub skip_hidden: bool,
}

fn default_ignored_names() -> Vec<String> {
    DEFAULT_IGNORED_NAMES.iter().map(|s| s.to_string()).collect()
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self {
            names: default_ignored_names(),
            paths: Vec::new(),
            patterns: Vec::new(),
            regex: Vec::new(),
            skip_hidden: false,
        }
    }
}

impl IgnoreRules {
    /// Rules that ignore nothing.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            ..Self::default()
        }
    }

    /// Compiles the rules for a run over `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(&self, source: &Path) -> Result<IgnoreList, ConfigError> {
        IgnoreList::new(self, source)
    }
}

/// Compiled ignore rules, ready for matching.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    names: HashSet<String>,
    paths: HashSet<PathBuf>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
    skip_hidden: bool,
}

impl IgnoreList {
    fn new(rules: &IgnoreRules, source: &Path) -> Result<Self, ConfigError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let paths = rules
            .paths
            .iter()
            .map(|path| absolute(&source.join(path)))
            .collect();

        Ok(Self {
            names: rules.names.iter().cloned().collect(),
            paths,
            patterns,
            regexes,
            skip_hidden: rules.skip_hidden,
        })
    }

    /// A list that ignores nothing.
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
            paths: HashSet::new(),
            patterns: Vec::new(),
            regexes: Vec::new(),
            skip_hidden: false,
        }
    }

    /// Adds an exact name.
    pub fn add_name(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Adds an exact path.
    pub fn add_path(&mut self, path: impl Into<PathBuf>) {
        self.paths.insert(absolute(&path.into()));
    }

    /// Returns true if the entry at `path` must not be touched.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.names.contains(file_name.as_ref()) {
            return true;
        }

        if !self.paths.is_empty() && self.paths.contains(&absolute(path)) {
            return true;
        }

        if self
            .patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name) || pattern.matches_path(path))
        {
            return true;
        }

        if self.regexes.iter().any(|regex| regex.is_match(&file_name)) {
            return true;
        }

        self.skip_hidden && file_name.starts_with('.')
    }
}

/// Listed paths and entry paths are compared in this form, so a relative
/// source still matches absolute rules.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::empty()
    }
}
