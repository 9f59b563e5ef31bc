//! UI rendering for the folder picker

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
};

use super::state::PickerState;
use crate::suggest::Suggestions;

const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;

/// Render the picker
pub fn render(frame: &mut Frame, state: &PickerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_input(frame, state, chunks[0]);
    render_dropdown(frame, state, chunks[1]);
    render_help(frame, chunks[2]);
}

fn render_input(frame: &mut Frame, state: &PickerState, area: Rect) {
    let border = if state.focused { ACCENT } else { DIM };
    let input = Paragraph::new(state.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", state.title)),
    );
    frame.render_widget(input, area);

    if state.focused {
        let offset = u16::try_from(state.cursor).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(offset);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_dropdown(frame: &mut Frame, state: &PickerState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(DIM))
        .title(" Folders ");

    if !state.suggest.is_open() {
        frame.render_widget(block, area);
        return;
    }

    match state.suggest.suggestions() {
        Suggestions::Items(items) => {
            let items: Vec<ListItem> = items
                .into_iter()
                .map(|folder| ListItem::new(Line::from(folder)))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▸ ");

            let mut list_state = ListState::default().with_selected(state.suggest.highlighted());
            frame.render_stateful_widget(list, area, &mut list_state);
        }
        Suggestions::NoResults => {
            let placeholder = Paragraph::new(Line::from(Span::styled(
                "No results",
                Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
            )))
            .block(block);
            frame.render_widget(placeholder, area);
        }
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(ACCENT);
    let help = Line::from(vec![
        Span::styled(" ↑/↓", key),
        Span::raw(" choose  "),
        Span::styled("Enter", key),
        Span::raw(" select/confirm  "),
        Span::styled("Tab", key),
        Span::raw(" focus  "),
        Span::styled("Esc", key),
        Span::raw(" cancel"),
    ]);
    frame.render_widget(Paragraph::new(help), area);
}
