pub mod date_input;
pub mod form;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Feedback line shown under a screen after an action
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn error(message: impl ToString) -> Self {
        Notice::Error(message.to_string())
    }

    pub fn info(message: impl ToString) -> Self {
        Notice::Info(message.to_string())
    }
}

/// Blocks for the next key press; releases and non-key events yield `None`.
pub fn read_key() -> Result<Option<KeyCode>> {
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key.code)),
        _ => Ok(None),
    }
}

/// Title bar, body and a help line; returns the body area.
pub fn screen_layout<B: Backend>(f: &mut Frame<B>, title: &str, help: &str) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(title.to_string())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let help = Paragraph::new(help.to_string())
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    chunks[1]
}

pub fn render_notice<B: Backend>(f: &mut Frame<B>, notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };

    let (title, text, color) = match notice {
        Notice::Info(text) => ("Aviso", text, Color::Green),
        Notice::Error(text) => ("Erro", text, Color::Red),
    };

    let area = centered_rect(60, 20, f.size());
    let popup = Paragraph::new(format!("{text}\n\nPressione qualquer tecla"))
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(tui::widgets::Clear, area);
    f.render_widget(popup, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
