//! Extension to category mapping.
//!
//! A [`FileTypeMap`] decides which category folder a file goes to. Extensions
//! are stored lowercase with a leading dot (`.jpg`), lookups are
//! case-insensitive, and anything without a mapping lands in the fallback
//! category.
//!
//! # Examples
//!
//! ```
//! use desksave::file_types::FileTypeMap;
//!
//! let map = FileTypeMap::builtin();
//! assert_eq!(map.category_for("holiday.JPG"), "Images");
//! assert_eq!(map.category_for("notes"), "Other");
//!
//! let custom = FileTypeMap::from_json_str(r#"{".txt": "Docs"}"#).unwrap();
//! assert_eq!(custom.category_for("a.txt"), "Docs");
//! assert_eq!(custom.category_for("b.unknown"), "Other");
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Category used for files whose extension has no mapping.
pub const DEFAULT_FALLBACK: &str = "Other";

/// Maps lowercase extensions to category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeMap {
    extensions: HashMap<String, String>,
    fallback: String,
}

/// One category in the grouped document format.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategorySpec {
    extensions: Vec<String>,
}

impl FileTypeMap {
    /// Creates an empty map. Every file falls back to [`DEFAULT_FALLBACK`].
    pub fn new() -> Self {
        Self {
            extensions: HashMap::new(),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }

    /// Creates a map with the built-in mappings.
    pub fn builtin() -> Self {
        let mut map = Self::new();
        map.populate_standard_mappings();
        map
    }

    fn populate_standard_mappings(&mut self) {
        const STANDARD: &[(&str, &[&str])] = &[
            (
                "Images",
                &[
                    "jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp", "heic", "heif",
                    "svg", "ico", "psd", "raw", "ai", "ps", "indd",
                ],
            ),
            (
                "Audio",
                &[
                    "mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "aif", "aiff", "cda", "mid",
                    "midi", "mpa", "wpl",
                ],
            ),
            (
                "Videos",
                &[
                    "mp4", "mkv", "avi", "mov", "flv", "wmv", "webm", "m4v", "mpg", "mpeg", "h264",
                    "3gp",
                ],
            ),
            (
                "Documents",
                &["pdf", "doc", "docx", "odt", "rtf", "tex", "txt", "wpd", "md"],
            ),
            ("Spreadsheets", &["csv", "xls", "xlsx", "xlsm", "ods"]),
            ("Presentations", &["ppt", "pptx", "pps", "key", "odp"]),
            (
                "Archives",
                &[
                    "zip", "rar", "7z", "tar", "gz", "bz2", "xz", "arj", "z", "deb", "pkg", "rpm",
                ],
            ),
            ("Disc Images", &["iso", "dmg", "toast", "vcd", "bin"]),
            (
                "Executables",
                &["exe", "bat", "com", "jar", "msi", "apk", "gadget", "wsf", "cgi"],
            ),
            (
                "Code",
                &[
                    "py", "pl", "js", "ts", "rs", "go", "java", "c", "cpp", "h", "hpp", "sh",
                    "html", "htm", "css", "yaml", "yml", "toml",
                ],
            ),
            (
                "Data",
                &["dat", "db", "dbf", "log", "mdb", "sav", "sql", "xml", "json"],
            ),
            (
                "Email",
                &["email", "eml", "emlx", "msg", "oft", "ost", "pst", "vcf"],
            ),
            ("Fonts", &["fnt", "fon", "otf", "ttf", "woff", "woff2"]),
        ];

        for (category, extensions) in STANDARD {
            for ext in *extensions {
                self.extensions
                    .insert(format!(".{}", ext), (*category).to_string());
            }
        }
    }

    /// Loads a mapping document from disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist,
    /// `ConfigError::Io` if it cannot be read, and any error from
    /// [`FileTypeMap::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let map = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            extensions = map.len(),
            "loaded file type mapping"
        );
        Ok(map)
    }

    /// Parses a mapping document.
    ///
    /// Two shapes are accepted. The flat shape maps extensions to categories:
    ///
    /// ```json
    /// { ".jpg": "Images", "pdf": "Documents" }
    /// ```
    ///
    /// The grouped shape lists extensions per category, and is chosen when
    /// every top-level value is an object:
    ///
    /// ```json
    /// { "Images": { "extensions": ["jpg", "png"] } }
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let object = match serde_json::from_str::<Value>(text)? {
            Value::Object(object) => object,
            other => return Err(ConfigError::NotAnObject(json_type(&other))),
        };

        let mut map = Self::new();
        let grouped = !object.is_empty() && object.values().all(Value::is_object);

        if grouped {
            for (category, spec) in object {
                let spec: CategorySpec = serde_json::from_value(spec)?;
                for ext in &spec.extensions {
                    map.insert(ext, &category)?;
                }
            }
        } else {
            for (ext, category) in object {
                match category {
                    Value::String(category) => map.insert(&ext, &category)?,
                    other => {
                        return Err(ConfigError::InvalidCategory {
                            extension: ext,
                            found: json_type(&other),
                        });
                    }
                }
            }
        }

        Ok(map)
    }

    /// Adds an extension to category mapping.
    ///
    /// The extension is normalized first, so `"JPG"`, `".jpg"` and `".Jpg"`
    /// are the same key. Mapping an extension again to the same category is
    /// a no-op; mapping it to a different one is an error.
    pub fn insert(&mut self, extension: &str, category: &str) -> Result<(), ConfigError> {
        let ext = normalize_extension(extension)
            .ok_or_else(|| ConfigError::InvalidExtension(extension.to_string()))?;
        validate_category(category)?;

        if let Some(existing) = self.extensions.get(&ext)
            && existing != category
        {
            return Err(ConfigError::ConflictingExtension {
                extension: ext,
                first: existing.clone(),
                second: category.to_string(),
            });
        }

        self.extensions.insert(ext, category.to_string());
        Ok(())
    }

    /// Replaces the fallback category.
    pub fn with_fallback(mut self, fallback: &str) -> Result<Self, ConfigError> {
        validate_category(fallback)?;
        self.fallback = fallback.to_string();
        Ok(self)
    }

    /// The category for unmapped files.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Looks up a normalized or raw extension.
    ///
    /// ```
    /// use desksave::file_types::FileTypeMap;
    ///
    /// let map = FileTypeMap::builtin();
    /// assert_eq!(map.extension_to_category("PDF"), Some("Documents"));
    /// assert_eq!(map.extension_to_category(".xyz"), None);
    /// ```
    pub fn extension_to_category(&self, extension: &str) -> Option<&str> {
        let ext = normalize_extension(extension)?;
        self.extensions.get(&ext).map(String::as_str)
    }

    /// Returns the category folder for a file name.
    pub fn category_for(&self, file_name: &str) -> &str {
        extension_of(file_name)
            .and_then(|ext| self.extensions.get(&ext))
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }

    /// Returns the category folder for a path, using its final component.
    pub fn category_for_path(&self, path: &Path) -> &str {
        match path.file_name() {
            Some(name) => self.category_for(&name.to_string_lossy()),
            None => &self.fallback,
        }
    }

    /// Extensions grouped by category, both sorted.
    pub fn categories(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (ext, category) in &self.extensions {
            groups.entry(category.as_str()).or_default().push(ext.as_str());
        }
        for extensions in groups.values_mut() {
            extensions.sort_unstable();
        }
        groups
    }

    /// Serializes the mapping in the flat document shape.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let sorted: BTreeMap<&str, &str> = self
            .extensions
            .iter()
            .map(|(ext, category)| (ext.as_str(), category.as_str()))
            .collect();
        serde_json::to_string_pretty(&sorted)
    }

    /// Number of mapped extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for FileTypeMap {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Normalizes an extension to lowercase with a single leading dot.
///
/// Returns `None` for empty input, a bare dot, or anything that could never
/// be the last extension of a file name (inner dots, path separators).
///
/// ```
/// use desksave::file_types::normalize_extension;
///
/// assert_eq!(normalize_extension("JPG"), Some(".jpg".to_string()));
/// assert_eq!(normalize_extension(".Pdf"), Some(".pdf".to_string()));
/// assert_eq!(normalize_extension("."), None);
/// assert_eq!(normalize_extension(".tar.gz"), None);
/// ```
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() || bare.contains(['.', '/', '\\']) || bare.contains(char::is_whitespace)
    {
        return None;
    }
    Some(format!(".{}", bare.to_lowercase()))
}

/// Returns the lowercase last extension of a file name, with leading dot.
///
/// Dot-prefixed names without a further dot (`.bashrc`) have no extension.
pub fn extension_of(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_string_lossy();
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

fn validate_category(category: &str) -> Result<(), ConfigError> {
    let invalid = category.trim().is_empty()
        || category == "."
        || category == ".."
        || category.contains(['/', '\\']);
    if invalid {
        return Err(ConfigError::InvalidCategoryName(category.to_string()));
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
