//! Folder picker state

use crate::suggest::FolderSuggest;

/// How the picker was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(String),
    Cancelled,
}

/// Terminal folder picker state
#[derive(Debug)]
pub struct PickerState {
    /// Title of the input box
    pub title: String,

    /// Text typed so far
    pub input: String,

    /// Cursor position in characters
    pub cursor: usize,

    /// Whether the input has focus
    pub focused: bool,

    /// Autocomplete bound to the input
    pub suggest: FolderSuggest,

    /// Set once the user confirms or cancels
    pub outcome: Option<PickerOutcome>,
}

impl PickerState {
    pub fn new(title: impl Into<String>, mut suggest: FolderSuggest) -> Self {
        let input = suggest.value().to_string();
        suggest.focus();
        Self {
            title: title.into(),
            cursor: input.chars().count(),
            input,
            focused: true,
            suggest,
            outcome: None,
        }
    }

    /// Push the edited text into the suggester
    pub fn sync_input(&mut self) {
        if !self.suggest.is_open() {
            self.suggest.focus();
        }
        self.suggest.input(self.input.clone());
    }

    /// Take the chosen folder back into the input
    pub fn sync_selection(&mut self) {
        self.input = self.suggest.value().to_string();
        self.cursor = self.input.chars().count();
    }

    pub fn finish(&mut self, outcome: PickerOutcome) {
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_value_opens_dropdown() {
        let suggest = FolderSuggest::new(vec!["Inbox".into()]).with_value("Inb");
        let state = PickerState::new("Inbox folder", suggest);

        assert_eq!(state.input, "Inb");
        assert_eq!(state.cursor, 3);
        assert!(state.suggest.is_open());
    }
}
