use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::cart::Cart;
use crate::models::{NewServiceRequest, Service};
use crate::ui::components::{read_key, render_notice, screen_layout, Notice};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pane {
    Services,
    Requests,
}

pub enum CartAction {
    Back,
    Reload,
    Save(Vec<NewServiceRequest>),
}

pub struct CartState {
    services: Vec<Service>,
    pub cart: Cart,
    pub focus: Pane,
    services_state: ListState,
    requests_state: TableState,
    pub notice: Option<Notice>,
}

fn step(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (selected, forward) {
        (None, _) => 0,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

fn money(value: f64) -> String {
    format!("R$ {value:.2}").replace('.', ",")
}

impl CartState {
    pub fn new(services: Vec<Service>, cart: Cart) -> Self {
        let mut services_state = ListState::default();
        services_state.select((!services.is_empty()).then_some(0));
        let mut requests_state = TableState::default();
        requests_state.select((!cart.is_empty()).then_some(0));

        Self {
            services,
            cart,
            focus: Pane::Services,
            services_state,
            requests_state,
            notice: None,
        }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Services => Pane::Requests,
            Pane::Requests => Pane::Services,
        };
    }

    fn move_selection(&mut self, forward: bool) {
        match self.focus {
            Pane::Services => {
                let next = step(self.services_state.selected(), self.services.len(), forward);
                self.services_state.select(next);
            }
            Pane::Requests => {
                let next = step(self.requests_state.selected(), self.cart.len(), forward);
                self.requests_state.select(next);
            }
        }
    }

    pub fn add_selected(&mut self, today: NaiveDate) {
        let Some(service) = self.services_state.selected().and_then(|i| self.services.get(i)) else {
            return;
        };
        self.cart.add_service(service, today);
        self.requests_state.select(Some(self.cart.len() - 1));
    }

    pub fn remove_selected(&mut self) {
        let Some(index) = self.requests_state.selected() else {
            return;
        };
        if self.cart.remove(index).is_none() {
            return;
        }

        let selected = if self.cart.is_empty() {
            None
        } else {
            Some(index.min(self.cart.len() - 1))
        };
        self.requests_state.select(selected);
    }

    pub fn handle_key(&mut self, key: KeyCode, today: NaiveDate) -> Option<CartAction> {
        if self.notice.take().is_some() {
            return None;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Some(CartAction::Back),
            KeyCode::Tab => self.toggle_focus(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Char('a') => self.add_selected(today),
            KeyCode::Enter if self.focus == Pane::Services => self.add_selected(today),
            KeyCode::Char('d') | KeyCode::Delete if self.focus == Pane::Requests => self.remove_selected(),
            KeyCode::Char('s') => return Some(CartAction::Save(self.cart.to_requests())),
            KeyCode::Char('r') => return Some(CartAction::Reload),
            _ => {}
        }
        None
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).border_style(style).title(title)
}

pub fn render_cart<B: Backend>(f: &mut Frame<B>, state: &mut CartState) {
    let body = screen_layout(
        f,
        "Carrinho de Solicitações",
        "Tab - Trocar painel | A/Enter - Adicionar | D - Remover | S - Salvar | R - Recarregar | Esc - Voltar",
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(40),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(body);

    let services: Vec<ListItem> = state
        .services
        .iter()
        .map(|service| {
            ListItem::new(Spans::from(vec![
                Span::styled(service.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(
                    "  {}  ({} dias)  {}",
                    money(service.price),
                    service.lead_time_days,
                    service.description
                )),
            ]))
        })
        .collect();
    let services = List::new(services)
        .block(pane_block("Serviços disponíveis", state.focus == Pane::Services))
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("> ");
    f.render_stateful_widget(services, chunks[0], &mut state.services_state);

    let header = Row::new(["Serviço", "Pedido", "Status", "Valor", "Previsão"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .cart
        .items()
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(item.service_name.clone()),
                Cell::from(item.order_date.format("%d/%m/%Y").to_string()),
                Cell::from(item.status.clone()),
                Cell::from(money(item.charged_price)),
                Cell::from(item.expected_date.format("%d/%m/%Y").to_string()),
            ])
        })
        .collect();
    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(15),
        Constraint::Percentage(20),
        Constraint::Percentage(15),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(pane_block("Minhas solicitações", state.focus == Pane::Requests))
        .highlight_style(Style::default().fg(Color::Yellow))
        .widths(&widths);
    f.render_stateful_widget(table, chunks[1], &mut state.requests_state);

    let total = Paragraph::new(format!("Total: {}  ({} itens)", money(state.cart.total()), state.cart.len()))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(total, chunks[2]);

    render_notice(f, state.notice.as_ref());
}

pub fn handle_input(state: &mut CartState) -> Result<Option<CartAction>> {
    let today = Local::now().date_naive();
    Ok(read_key()?.and_then(|key| state.handle_key(key, today)))
}
