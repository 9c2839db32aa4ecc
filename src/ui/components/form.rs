use chrono::NaiveDate;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::date_input::DateInputState;

pub enum FieldInput {
    Text(String),
    /// Rendered masked
    Secret(String),
    /// `(value, label)` pairs; `None` selected means no answer
    Choice {
        options: &'static [(&'static str, &'static str)],
        selected: Option<usize>,
    },
    Date(DateInputState),
}

pub struct FormField {
    pub label: &'static str,
    pub input: FieldInput,
}

impl FormField {
    pub fn text(label: &'static str) -> Self {
        Self {
            label,
            input: FieldInput::Text(String::new()),
        }
    }

    pub fn secret(label: &'static str) -> Self {
        Self {
            label,
            input: FieldInput::Secret(String::new()),
        }
    }

    pub fn choice(label: &'static str, options: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            label,
            input: FieldInput::Choice { options, selected: None },
        }
    }

    pub fn date(label: &'static str, initial: NaiveDate) -> Self {
        Self {
            label,
            input: FieldInput::Date(DateInputState::new(initial)),
        }
    }

    fn display(&self, editing: bool) -> String {
        let cursor = if editing { "|" } else { "" };
        match &self.input {
            FieldInput::Text(value) => format!("{value}{cursor}"),
            FieldInput::Secret(value) => format!("{}{cursor}", "*".repeat(value.chars().count())),
            FieldInput::Choice { options, selected } => {
                let label = selected.and_then(|i| options.get(i)).map_or("(não informado)", |(_, label)| *label);
                if editing { format!("< {label} >") } else { label.to_string() }
            }
            FieldInput::Date(date) => date.display(),
        }
    }
}

pub enum FormEvent {
    Submit,
    Cancel,
}

pub struct FormState {
    pub fields: Vec<FormField>,
    pub current_field: usize,
    pub editing: bool,
}

impl FormState {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            current_field: 0,
            editing: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if let Some(FieldInput::Date(date)) = self.fields.get_mut(self.current_field).map(|f| &mut f.input) {
            if date.editing != self.editing {
                date.toggle_editing();
            }
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.current_field = (self.current_field + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.current_field = (self.current_field + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        let Some(field) = self.fields.get_mut(self.current_field) else {
            return;
        };

        match &mut field.input {
            FieldInput::Text(value) | FieldInput::Secret(value) => match key {
                KeyCode::Char(c) => value.push(c),
                KeyCode::Backspace => {
                    value.pop();
                }
                _ => {}
            },
            FieldInput::Choice { options, selected } => {
                let count = options.len();
                if count == 0 {
                    return;
                }
                *selected = match (key, *selected) {
                    (KeyCode::Right | KeyCode::Char(' '), None) => Some(0),
                    (KeyCode::Right | KeyCode::Char(' '), Some(i)) => Some((i + 1) % count),
                    (KeyCode::Left, None) => Some(count - 1),
                    (KeyCode::Left, Some(i)) => Some((i + count - 1) % count),
                    (KeyCode::Backspace, _) => None,
                    (_, current) => current,
                };
            }
            FieldInput::Date(date) => date.handle_key(key),
        }
    }

    /// Enter toggles editing, Esc leaves editing or cancels, `s` submits.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<FormEvent> {
        match key {
            KeyCode::Esc if self.editing => self.toggle_editing(),
            KeyCode::Esc => return Some(FormEvent::Cancel),
            KeyCode::Enter => self.toggle_editing(),
            KeyCode::Tab if self.editing => {
                self.toggle_editing();
                self.next_field();
            }
            _ if self.editing => self.edit_current_field(key),
            KeyCode::Up => self.previous_field(),
            KeyCode::Down | KeyCode::Tab => self.next_field(),
            KeyCode::Char('s') | KeyCode::Char('S') => return Some(FormEvent::Submit),
            _ => {}
        }
        None
    }

    /// Text fields come back trimmed, secrets verbatim
    pub fn text(&self, index: usize) -> &str {
        match self.fields.get(index).map(|f| &f.input) {
            Some(FieldInput::Text(value)) => value.trim(),
            Some(FieldInput::Secret(value)) => value,
            _ => "",
        }
    }

    pub fn choice(&self, index: usize) -> Option<&'static str> {
        match self.fields.get(index).map(|f| &f.input) {
            Some(FieldInput::Choice { options, selected }) => selected.and_then(|i| options.get(i)).map(|(v, _)| *v),
            _ => None,
        }
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        match self.fields.get(index).map(|f| &f.input) {
            Some(FieldInput::Date(date)) => Some(date.date),
            _ => None,
        }
    }

    pub fn set_text(&mut self, index: usize, text: &str) {
        if let Some(FormField {
            input: FieldInput::Text(value) | FieldInput::Secret(value),
            ..
        }) = self.fields.get_mut(index)
        {
            *value = text.to_string();
        }
    }
}

pub fn render_form<B: Backend>(f: &mut Frame<B>, form: &FormState, title: &str, area: Rect) {
    let items: Vec<ListItem> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == form.current_field;
            let editing = selected && form.editing;

            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value_style = if editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label), label_style),
                Span::styled(field.display(editing), value_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(list, area);
}
