//! Rules - which inbox files move where

mod matcher;
mod template;

pub use matcher::{match_rule, match_rule_index, validate_rule};
pub use template::{Destination, expand_template, extract_date, resolve_destination};

use serde::{Deserialize, Serialize};

/// A matching and destination policy for inbox files
///
/// Field names follow the persisted settings layout (`fileExtensions`,
/// `rootFolder`, ...), so a rule round-trips through the settings file
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rule {
    /// Name pattern, also used to locate the date for dated templates.
    /// Empty matches any name.
    pub regex: String,

    /// Extensions without dots, separated by `|` (e.g. `jpg|png`)
    pub file_extensions: String,

    /// Base destination folder
    pub root_folder: String,

    /// Destination sub-path template (`YYYY`, `YY`, `M`..`MMMM`)
    pub folder_structure: String,
}

impl Rule {
    /// Create a rule moving files with the given extensions under `root_folder`
    pub fn new(file_extensions: impl Into<String>, root_folder: impl Into<String>) -> Self {
        Self {
            file_extensions: file_extensions.into(),
            root_folder: root_folder.into(),
            ..Default::default()
        }
    }

    /// Set the name pattern
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = regex.into();
        self
    }

    /// Set the folder structure template
    pub fn with_folder_structure(mut self, folder_structure: impl Into<String>) -> Self {
        self.folder_structure = folder_structure.into();
        self
    }

    /// Whether the destination depends on a date in the file name
    pub fn is_dated(&self) -> bool {
        !self.folder_structure.is_empty()
    }
}

/// Byte offset of the final extension (the dot included), if the name has one.
///
/// The extension is the shortest suffix of the form `.xyz` containing no
/// further dot or slash.
fn extension_start(file_name: &str) -> Option<usize> {
    let dot = file_name.rfind('.')?;
    let ext = &file_name[dot + 1..];
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(dot)
}

/// File name with its final extension removed
pub fn strip_extension(file_name: &str) -> &str {
    match extension_start(file_name) {
        Some(dot) => &file_name[..dot],
        None => file_name,
    }
}

/// File name with its final extension lowercased
pub fn lowercase_extension(file_name: &str) -> String {
    match extension_start(file_name) {
        Some(dot) => format!("{}{}", &file_name[..dot], file_name[dot..].to_lowercase()),
        None => file_name.to_string(),
    }
}
