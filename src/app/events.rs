//! Key handling for the folder picker

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

use super::state::{PickerOutcome, PickerState};

pub fn handle_key(state: &mut PickerState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.finish(PickerOutcome::Cancelled);
        return;
    }

    match key.code {
        KeyCode::Esc => state.finish(PickerOutcome::Cancelled),
        KeyCode::Enter => {
            if state.suggest.highlighted().is_some() {
                if state.suggest.select_highlighted().is_some() {
                    state.sync_selection();
                }
            } else {
                let typed = state.input.trim().to_string();
                state.finish(PickerOutcome::Selected(typed));
            }
        }
        KeyCode::Tab => {
            state.focused = !state.focused;
            if state.focused {
                state.suggest.focus();
            } else {
                state.suggest.blur(Instant::now());
            }
        }
        KeyCode::Down => {
            if !state.suggest.is_open() {
                state.suggest.focus();
            } else {
                state.suggest.next();
            }
        }
        KeyCode::Up => state.suggest.previous(),
        _ if state.focused => {
            let before = state.input.clone();
            handle_text_input(&mut state.input, &mut state.cursor, key);
            if state.input != before {
                state.sync_input();
            }
        }
        _ => {}
    }
}

/// Byte offset of the `cursor`-th character
fn byte_pos(input: &str, cursor: usize) -> usize {
    input
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(input.len())
}

fn handle_text_input(input: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => {
            let pos = byte_pos(input, *cursor);
            input.insert(pos, c);
            *cursor += 1;
        }
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let pos = byte_pos(input, *cursor);
                input.remove(pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < input.chars().count() {
                let pos = byte_pos(input, *cursor);
                input.remove(pos);
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            if *cursor < input.chars().count() {
                *cursor += 1;
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = input.chars().count(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::FolderSuggest;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn picker() -> PickerState {
        let suggest = FolderSuggest::new(vec!["Archive".into(), "Inbox".into(), "Inbox/Old".into()]);
        PickerState::new("Folder", suggest)
    }

    #[test]
    fn test_typing_filters_and_enter_selects() {
        let mut state = picker();
        for c in "inb".chars() {
            handle_key(&mut state, key(KeyCode::Char(c)));
        }
        handle_key(&mut state, key(KeyCode::Down));
        handle_key(&mut state, key(KeyCode::Enter));

        assert_eq!(state.input, "Inbox/Old");
        assert!(!state.suggest.is_open());

        handle_key(&mut state, key(KeyCode::Enter));
        assert_eq!(
            state.outcome,
            Some(PickerOutcome::Selected("Inbox/Old".to_string()))
        );
    }

    #[test]
    fn test_escape_cancels() {
        let mut state = picker();
        handle_key(&mut state, key(KeyCode::Esc));

        assert_eq!(state.outcome, Some(PickerOutcome::Cancelled));
    }

    #[test]
    fn test_text_editing() {
        let mut input = String::from("ab");
        let mut cursor = 2;

        handle_text_input(&mut input, &mut cursor, key(KeyCode::Left));
        handle_text_input(&mut input, &mut cursor, key(KeyCode::Char('é')));
        assert_eq!(input, "aéb");
        handle_text_input(&mut input, &mut cursor, key(KeyCode::Backspace));
        handle_text_input(&mut input, &mut cursor, key(KeyCode::Delete));
        assert_eq!(input, "a");
        assert_eq!(cursor, 1);
    }
}
