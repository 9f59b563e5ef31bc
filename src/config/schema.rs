//! Settings schema

use crate::error::ProcessError;
use crate::rules::Rule;
use crate::store::FileStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process-wide settings
///
/// Missing keys in the persisted object fall back to the defaults, so older
/// or partial settings files load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Folder scanned on every run
    pub inbox_folder: String,

    /// Seconds between automatic runs (`None` = manual only)
    pub interval: Option<u64>,

    /// Lowercase file extensions before moving
    pub convert_extensions_to_lowercase: bool,

    /// Rules in evaluation order
    pub rules: Vec<Rule>,

    /// Desktop notifications for configuration and collision errors
    pub notify_on_error: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inbox_folder: String::new(),
            interval: None,
            convert_extensions_to_lowercase: false,
            rules: vec![Rule::default()],
            notify_on_error: false,
        }
    }
}

impl Settings {
    /// Delay between automatic runs, if automatic runs are enabled
    pub fn interval(&self) -> Option<Duration> {
        self.interval
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Point the processor at a new inbox folder, which must exist
    pub fn set_inbox_folder(
        &mut self,
        folder: &str,
        store: &dyn FileStore,
    ) -> Result<(), ProcessError> {
        if !store.get(folder).is_some_and(|e| e.is_folder()) {
            return Err(ProcessError::MissingInbox(folder.to_string()));
        }
        self.inbox_folder = folder.to_string();
        Ok(())
    }

    /// Append an empty rule, returning its index
    pub fn add_rule(&mut self) -> usize {
        self.rules.push(Rule::default());
        self.rules.len() - 1
    }

    /// Remove a rule by index
    pub fn remove_rule(&mut self, index: usize) -> Option<Rule> {
        if index < self.rules.len() {
            Some(self.rules.remove(index))
        } else {
            None
        }
    }

    /// Swap a rule with the one before it
    pub fn move_rule_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.rules.len() {
            return false;
        }
        self.rules.swap(index, index - 1);
        true
    }

    /// Swap a rule with the one after it
    pub fn move_rule_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.rules.len() {
            return false;
        }
        self.rules.swap(index, index + 1);
        true
    }
}

/// Parse an interval as typed by the user: empty or `off` disables automatic runs
pub fn parse_interval(input: &str) -> Result<Option<u64>, std::num::ParseIntError> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    input.parse().map(Some)
}
