use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::ClientSummary;
use crate::ui::components::{read_key, render_notice, screen_layout, Notice};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HomeEntry {
    Login,
    Register,
    ChangePassword,
    ServiceRegistration,
    Cart,
    Logout,
    Quit,
}

impl HomeEntry {
    fn label(self) -> &'static str {
        match self {
            HomeEntry::Login => "Entrar",
            HomeEntry::Register => "Cadastrar cliente",
            HomeEntry::ChangePassword => "Trocar senha",
            HomeEntry::ServiceRegistration => "Cadastrar serviço",
            HomeEntry::Cart => "Carrinho de solicitações",
            HomeEntry::Logout => "Sair da conta",
            HomeEntry::Quit => "Fechar aplicativo",
        }
    }
}

pub enum HomeAction {
    Open(HomeEntry),
    Quit,
}

pub struct HomeState {
    client: Option<ClientSummary>,
    list_state: ListState,
    pub notice: Option<Notice>,
}

impl HomeState {
    pub fn new(client: Option<ClientSummary>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            client,
            list_state,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Menu entries; the cart and service registration need a logged-in client.
    pub fn entries(&self) -> Vec<HomeEntry> {
        if self.client.is_some() {
            vec![
                HomeEntry::Cart,
                HomeEntry::ServiceRegistration,
                HomeEntry::ChangePassword,
                HomeEntry::Logout,
                HomeEntry::Quit,
            ]
        } else {
            vec![
                HomeEntry::Login,
                HomeEntry::Register,
                HomeEntry::ChangePassword,
                HomeEntry::Quit,
            ]
        }
    }

    fn selected_entry(&self) -> Option<HomeEntry> {
        self.list_state.selected().and_then(|i| self.entries().get(i).copied())
    }

    pub fn next(&mut self) {
        let len = self.entries().len();
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % len);
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.entries().len();
        let i = self.list_state.selected().map_or(0, |i| (i + len - 1) % len);
        self.list_state.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<HomeAction> {
        if self.notice.take().is_some() {
            return None;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => Some(HomeAction::Quit),
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                None
            }
            KeyCode::Enter => match self.selected_entry() {
                Some(HomeEntry::Quit) => Some(HomeAction::Quit),
                Some(entry) => Some(HomeAction::Open(entry)),
                None => None,
            },
            _ => None,
        }
    }
}

pub fn render_home<B: Backend>(f: &mut Frame<B>, state: &mut HomeState) {
    let body = screen_layout(
        f,
        "TI Services - Portal do Cliente",
        "Up/Down - Navegar | Enter - Abrir | Q - Sair",
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)].as_ref())
        .split(body);

    let status = match &state.client {
        Some(client) => format!("Conectado como {} ({})", client.name, client.login),
        None => "Nenhum cliente conectado".to_string(),
    };
    let status = Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Sessão"));
    f.render_widget(status, chunks[0]);

    let items: Vec<ListItem> = state
        .entries()
        .into_iter()
        .map(|entry| ListItem::new(entry.label()))
        .collect();
    let menu = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Menu"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(menu, chunks[1], &mut state.list_state);

    render_notice(f, state.notice.as_ref());
}

pub fn handle_input(state: &mut HomeState) -> Result<Option<HomeAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> ClientSummary {
        ClientSummary {
            id: 1,
            name: "Ana Souza".to_string(),
            login: "ana@empresa.com".to_string(),
        }
    }

    #[test]
    fn cart_only_offered_when_logged_in() {
        assert!(!HomeState::new(None).entries().contains(&HomeEntry::Cart));
        assert!(HomeState::new(Some(logged_in())).entries().contains(&HomeEntry::Cart));
    }

    #[test]
    fn enter_opens_selected_entry() {
        let mut state = HomeState::new(None);
        state.handle_key(KeyCode::Down);
        assert!(matches!(
            state.handle_key(KeyCode::Enter),
            Some(HomeAction::Open(HomeEntry::Register))
        ));
    }

    #[test]
    fn notice_swallows_first_key() {
        let mut state = HomeState::new(None).with_notice(Notice::info("ok"));
        assert!(state.handle_key(KeyCode::Char('q')).is_none());
        assert!(matches!(state.handle_key(KeyCode::Char('q')), Some(HomeAction::Quit)));
    }

    #[test]
    fn selection_wraps() {
        let mut state = HomeState::new(Some(logged_in()));
        state.handle_key(KeyCode::Up);
        assert!(matches!(state.handle_key(KeyCode::Enter), Some(HomeAction::Quit)));
    }
}
