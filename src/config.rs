//! Settings file support.
//!
//! Settings are optional. They supply defaults for a sort run that the
//! command line can override. They are stored as TOML:
//!
//! ```toml
//! [sort]
//! source = "/home/me/Desktop"
//! destination = "/home/me/Documents"
//! file_types = "file_types.json"
//! fallback_category = "Other"
//! dated = false
//! include_directories = false
//!
//! [ignore]
//! names = [".DS_Store", ".localized"]
//! paths = []
//! patterns = ["*.part"]
//! regex = []
//! skip_hidden = false
//! ```
//!
//! Relative paths in `[sort]` are resolved against the settings file's own
//! directory.

use crate::error::{ConfigError, PathError};
use crate::file_types::{DEFAULT_FALLBACK, FileTypeMap};
use crate::ignore::IgnoreRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the settings file looked up in the current directory.
pub const LOCAL_SETTINGS_FILE: &str = ".desksaverc.toml";

/// Complete settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub sort: SortSettings,

    #[serde(default)]
    pub ignore: IgnoreRules,
}

/// The `[sort]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortSettings {
    /// Directory to sort. Defaults to the platform Desktop.
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Directory receiving category folders. Defaults to the platform Documents.
    #[serde(default)]
    pub destination: Option<PathBuf>,

    /// Mapping document. The built-in mapping is used when absent.
    #[serde(default)]
    pub file_types: Option<PathBuf>,

    /// Category for unmapped extensions.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,

    /// Sort into `<destination>/<YYYY-MM>/<source name>`.
    #[serde(default)]
    pub dated: bool,

    /// Move whole directories to the destination root.
    #[serde(default)]
    pub include_directories: bool,
}

fn default_fallback_category() -> String {
    DEFAULT_FALLBACK.to_string()
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            file_types: None,
            fallback_category: default_fallback_category(),
            dated: false,
            include_directories: false,
        }
    }
}

impl Settings {
    /// Load settings, with fallback to defaults.
    ///
    /// Attempts to load settings in the following order:
    /// 1. If `settings_path` is provided, load from that file
    /// 2. Look for `.desksaverc.toml` in the current directory
    /// 3. Look for `desksave/config.toml` in the platform config directory
    /// 4. Fall back to default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a file is explicitly provided but cannot be read,
    /// or if any file found is not valid.
    pub fn load(settings_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = settings_path {
            return Self::load_from_file(path);
        }

        let local = PathBuf::from(LOCAL_SETTINGS_FILE);
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Some(user) = user_settings_path()
            && user.exists()
        {
            return Self::load_from_file(&user);
        }

        tracing::debug!("no settings file found, using defaults");
        Ok(Self::default())
    }

    /// Load settings from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if file does not exist.
    /// Returns `ConfigError::Settings` if TOML parsing fails.
    /// Returns `ConfigError::Io` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut settings = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            settings.sort.resolve_relative(base);
        }

        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parses a settings document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Builds the extension mapping these settings describe.
    ///
    /// `override_path`, when given, replaces `[sort].file_types`.
    pub fn file_type_map(&self, override_path: Option<&Path>) -> Result<FileTypeMap, ConfigError> {
        let map = match override_path.or(self.sort.file_types.as_deref()) {
            Some(path) => FileTypeMap::load(path)?,
            None => FileTypeMap::builtin(),
        };
        map.with_fallback(&self.sort.fallback_category)
    }
}

impl SortSettings {
    fn resolve_relative(&mut self, base: &Path) {
        for path in [&mut self.source, &mut self.destination, &mut self.file_types]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// `<config dir>/desksave/config.toml`, if the platform has a config dir.
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("desksave").join("config.toml"))
}

/// The platform Desktop, or Downloads when `downloads` is set.
pub fn default_source(downloads: bool) -> Result<PathBuf, PathError> {
    if downloads {
        dirs::download_dir().ok_or(PathError::NoDefault("Downloads"))
    } else {
        dirs::desktop_dir().ok_or(PathError::NoDefault("Desktop"))
    }
}

/// The platform Documents directory.
pub fn default_destination() -> Result<PathBuf, PathError> {
    dirs::document_dir().ok_or(PathError::NoDefault("Documents"))
}
