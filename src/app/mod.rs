//! Terminal folder picker backed by [`FolderSuggest`]

mod events;
mod state;
mod ui;

pub use state::{PickerOutcome, PickerState};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};

use crate::suggest::FolderSuggest;

/// Let the user pick a folder. Returns `None` if the picker was cancelled.
pub fn pick_folder(title: &str, suggest: FolderSuggest) -> Result<Option<String>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut state = PickerState::new(title, suggest);
    let result = run_picker(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(match state.outcome {
        Some(PickerOutcome::Selected(folder)) => Some(folder),
        Some(PickerOutcome::Cancelled) | None => None,
    })
}

fn run_picker(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut PickerState,
) -> Result<()> {
    while state.outcome.is_none() {
        terminal.draw(|frame| ui::render(frame, state))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == crossterm::event::KeyEventKind::Press
        {
            events::handle_key(state, key);
        }

        // Apply a pending blur once its grace delay has passed
        state.suggest.tick(Instant::now());
    }

    Ok(())
}
