use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::models::LoginPayload;
use crate::ui::components::form::{render_form, FormEvent, FormField, FormState};
use crate::ui::components::{read_key, render_notice, screen_layout, Notice};
use crate::validation::{require_fields, validate_login};

const LOGIN: usize = 0;
const PASSWORD: usize = 1;

pub enum LoginAction {
    Cancel,
    Submit(LoginPayload),
}

pub struct LoginState {
    pub form: FormState,
    pub notice: Option<Notice>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            form: FormState::new(vec![FormField::text("E-mail"), FormField::secret("Senha")]),
            notice: None,
        }
    }

    fn submit(&mut self) -> Option<LoginAction> {
        let payload = LoginPayload {
            login: Some(self.form.text(LOGIN).to_string()),
            password: Some(self.form.text(PASSWORD).to_string()),
        };

        let checked = require_fields(payload.missing_fields())
            .and_then(|()| validate_login(self.form.text(LOGIN)));
        match checked {
            Ok(()) => Some(LoginAction::Submit(payload)),
            Err(err) => {
                self.notice = Some(Notice::error(err));
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<LoginAction> {
        if self.notice.take().is_some() {
            return None;
        }

        match self.form.handle_key(key)? {
            FormEvent::Cancel => Some(LoginAction::Cancel),
            FormEvent::Submit => self.submit(),
        }
    }
}

pub fn render_login<B: Backend>(f: &mut Frame<B>, state: &mut LoginState) {
    let help = if state.form.editing {
        "Enter - Confirmar campo | Esc - Cancelar edição"
    } else {
        "Enter - Editar campo | Up/Down - Navegar | S - Entrar | Esc - Voltar"
    };
    let body = screen_layout(f, "Login", help);
    render_form(f, &state.form, "Credenciais", body);
    render_notice(f, state.notice.as_ref());
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_password_is_reported_locally() {
        let mut state = LoginState::new();
        state.form.set_text(LOGIN, "ana@empresa.com");
        assert!(state.handle_key(KeyCode::Char('s')).is_none());
        assert_eq!(
            state.notice,
            Some(Notice::Error("Campos obrigatórios faltando: senha".to_string()))
        );
    }

    #[test]
    fn submits_filled_form() {
        let mut state = LoginState::new();
        state.form.set_text(LOGIN, "ana@empresa.com");
        state.form.set_text(PASSWORD, "Abc123!");
        match state.handle_key(KeyCode::Char('s')) {
            Some(LoginAction::Submit(payload)) => {
                assert_eq!(payload.login.as_deref(), Some("ana@empresa.com"));
                assert_eq!(payload.password.as_deref(), Some("Abc123!"));
            }
            _ => panic!("expected submit"),
        }
    }
}
