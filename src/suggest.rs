//! Folder suggest - autocomplete for folder path inputs
//!
//! The folder list is a snapshot taken when the suggester is created. It
//! does not follow later changes to the store; suggesters are short-lived
//! and recreated whenever a settings input is shown.

use std::fmt;
use std::time::{Duration, Instant};

use crate::store::FileStore;

/// Most suggestions shown at once
pub const MAX_SUGGESTIONS: usize = 1000;

/// Delay between losing focus and hiding the dropdown, so that a pending
/// click still lands on its item
pub const BLUR_GRACE: Duration = Duration::from_millis(200);

/// Contents of the dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestions<'a> {
    Items(Vec<&'a str>),
    /// Rendered as a "No results" placeholder
    NoResults,
}

impl Suggestions<'_> {
    pub fn len(&self) -> usize {
        match self {
            Suggestions::Items(items) => items.len(),
            Suggestions::NoResults => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type OnSelect = Box<dyn FnMut(&str) + Send>;

/// Incremental, case-insensitive folder autocomplete bound to one text input
pub struct FolderSuggest {
    folders: Vec<String>,
    value: String,
    open: bool,
    highlighted: usize,
    hide_at: Option<Instant>,
    on_select: Option<OnSelect>,
}

impl fmt::Debug for FolderSuggest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderSuggest")
            .field("folders", &self.folders.len())
            .field("value", &self.value)
            .field("open", &self.open)
            .field("highlighted", &self.highlighted)
            .finish()
    }
}

impl FolderSuggest {
    pub fn new(folders: Vec<String>) -> Self {
        Self {
            folders,
            value: String::new(),
            open: false,
            highlighted: 0,
            hide_at: None,
            on_select: None,
        }
    }

    /// Snapshot the folders of a store
    pub fn from_store(store: &dyn FileStore) -> Self {
        Self::new(store.folders())
    }

    /// Start with an existing input value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Callback invoked with the chosen folder
    pub fn on_select(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    /// Current input value
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Index of the highlighted suggestion, if the dropdown has items
    pub fn highlighted(&self) -> Option<usize> {
        (self.open && !self.suggestions().is_empty()).then_some(self.highlighted)
    }

    /// The input gained focus: show the dropdown
    pub fn focus(&mut self) {
        self.open = true;
        self.hide_at = None;
        self.highlighted = 0;
    }

    /// The input text changed
    pub fn input(&mut self, text: impl Into<String>) {
        self.value = text.into();
        self.highlighted = 0;
    }

    /// Folders containing the current input, case-insensitively, in snapshot order
    pub fn suggestions(&self) -> Suggestions<'_> {
        let query = self.value.to_lowercase();
        let items: Vec<&str> = self
            .folders
            .iter()
            .filter(|folder| folder.to_lowercase().contains(&query))
            .take(MAX_SUGGESTIONS)
            .map(String::as_str)
            .collect();

        if items.is_empty() {
            Suggestions::NoResults
        } else {
            Suggestions::Items(items)
        }
    }

    /// Move the highlight down, wrapping around
    pub fn next(&mut self) {
        let count = self.suggestions().len();
        if count > 0 {
            self.highlighted = (self.highlighted + 1) % count;
        }
    }

    /// Move the highlight up, wrapping around
    pub fn previous(&mut self) {
        let count = self.suggestions().len();
        if count > 0 {
            self.highlighted = (self.highlighted + count - 1) % count;
        }
    }

    /// Choose the suggestion at `index`: set the input, notify, hide the dropdown
    pub fn select(&mut self, index: usize) -> Option<String> {
        if !self.open {
            return None;
        }
        let folder = match self.suggestions() {
            Suggestions::Items(items) => items.get(index).map(|s| s.to_string())?,
            Suggestions::NoResults => return None,
        };

        self.value = folder.clone();
        if let Some(callback) = self.on_select.as_mut() {
            callback(&folder);
        }
        self.hide();
        Some(folder)
    }

    pub fn select_highlighted(&mut self) -> Option<String> {
        self.select(self.highlighted)
    }

    /// The input lost focus: hide once the grace delay has passed
    pub fn blur(&mut self, now: Instant) {
        if self.open {
            self.hide_at = Some(now + BLUR_GRACE);
        }
    }

    /// Apply a pending hide whose delay has elapsed
    pub fn tick(&mut self, now: Instant) {
        if self.hide_at.is_some_and(|at| now >= at) {
            self.hide();
        }
    }

    fn hide(&mut self) {
        self.open = false;
        self.hide_at = None;
        self.highlighted = 0;
    }
}
