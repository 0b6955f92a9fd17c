//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, InputMode, SyncIndicator};
use crate::output::truncate;

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_items(frame, app, chunks[0]);
    draw_input(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);
    draw_sync_indicator(frame, app);

    if let Some(notice) = &app.notice {
        draw_notice(frame, &notice.title, &notice.message);
    } else if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the todo list
fn draw_items(frame: &mut Frame, app: &App, area: Rect) {
    let list = app.session.list();
    let editing = app.editing_position();
    let max_len = area.width.saturating_sub(8) as usize;

    let items: Vec<ListItem> = list
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let number = Span::styled(
                format!("{:>3}. ", i + 1),
                Style::default().add_modifier(Modifier::DIM),
            );
            let text_style = if editing == Some(i) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let text = Span::styled(truncate(&item.text, max_len), text_style);
            ListItem::new(Line::from(vec![number, text]))
        })
        .collect();

    let title = match app.session.last_synced() {
        Some(time) => format!(
            " Todos ({}) · synced {} ",
            list.len(),
            time.with_timezone(&chrono::Local).format("%H:%M:%S")
        ),
        None => format!(" Todos ({}) ", list.len()),
    };

    let border_style = if app.input_mode == InputMode::Normal {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if items.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No todos. Press a to add one.",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.selected));

    frame.render_stateful_widget(list_widget, area, &mut state);
}

/// Draw the input line
fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = match (app.input_mode, app.editing_position()) {
        (InputMode::Insert, Some(position)) => format!(" Edit #{} ", position + 1),
        (InputMode::Insert, None) => " Add ".to_string(),
        (InputMode::Normal, _) => " Input ".to_string(),
    };

    let style = if app.input_mode == InputMode::Insert {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let input = app.session.list().input();
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style);
    frame.render_widget(Paragraph::new(input).block(block), area);

    if app.input_mode == InputMode::Insert {
        let cursor_x = area.x + 1 + input.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.input_mode == InputMode::Insert {
        "Enter:commit  Esc:cancel".to_string()
    } else {
        "a:add  e:edit  d:del  s:save  r:reload  X:clear  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw sync indicator in top-right corner
fn draw_sync_indicator(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.width < 5 {
        return;
    }

    let (icon, style) = match app.sync_status {
        SyncIndicator::Synced => ("✓", Style::default().fg(Color::Green)),
        SyncIndicator::Syncing => ("↻", Style::default().fg(Color::Yellow)),
        SyncIndicator::Idle => ("○", Style::default().add_modifier(Modifier::DIM)),
        SyncIndicator::Error => ("✗", Style::default().fg(Color::Red)),
    };

    let indicator = Paragraph::new(Span::styled(icon, style));
    let indicator_area = Rect::new(area.width - 2, 0, 1, 1);
    frame.render_widget(indicator, indicator_area);
}

/// Centered popup of at most `width` x `height`
fn popup_area(frame: &Frame, width: u16, height: u16) -> Rect {
    let area = frame.area();
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Draw a failed remote call
fn draw_notice(frame: &mut Frame, title: &str, message: &str) {
    let area = popup_area(frame, 60, 9);
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to dismiss",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(format!(" {} ", title.to_uppercase()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = popup_area(frame, 50, 20);
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from(""),
        Line::from("List:"),
        Line::from("  a, i        Add item"),
        Line::from("  e, Enter    Edit selected item"),
        Line::from("  d           Delete selected item"),
        Line::from("  Esc         Cancel add/edit"),
        Line::from(""),
        Line::from("Server:"),
        Line::from("  s           Save list"),
        Line::from("  r           Reload list"),
        Line::from("  X X         Clear server list"),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}
