use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::models::ChangePasswordPayload;
use crate::ui::components::form::{render_form, FormEvent, FormField, FormState};
use crate::ui::components::{read_key, render_notice, screen_layout, Notice};
use crate::validation::{self, require_fields, validate_password, validate_password_confirmation};

const LOGIN: usize = 0;
const CURRENT: usize = 1;
const NEW: usize = 2;
const CONFIRMATION: usize = 3;

pub enum PasswordWizardAction {
    Cancel,
    Submit(ChangePasswordPayload),
}

pub struct PasswordWizardState {
    pub form: FormState,
    pub notice: Option<Notice>,
}

impl PasswordWizardState {
    /// `login` pre-fills the e-mail of the connected client.
    pub fn new(login: Option<&str>) -> Self {
        let mut form = FormState::new(vec![
            FormField::text("E-mail"),
            FormField::secret("Senha atual"),
            FormField::secret("Nova senha"),
            FormField::secret("Confirmação da nova senha"),
        ]);
        if let Some(login) = login {
            form.set_text(LOGIN, login);
            form.current_field = CURRENT;
        }

        Self { form, notice: None }
    }

    pub fn to_payload(&self) -> validation::Result<ChangePasswordPayload> {
        let payload = ChangePasswordPayload {
            login: Some(self.form.text(LOGIN).to_string()),
            current_password: Some(self.form.text(CURRENT).to_string()),
            new_password: Some(self.form.text(NEW).to_string()),
        };

        require_fields(payload.missing_fields())?;
        validate_password(self.form.text(NEW))?;
        validate_password_confirmation(self.form.text(NEW), self.form.text(CONFIRMATION))?;

        Ok(payload)
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<PasswordWizardAction> {
        if self.notice.take().is_some() {
            return None;
        }

        match self.form.handle_key(key)? {
            FormEvent::Cancel => Some(PasswordWizardAction::Cancel),
            FormEvent::Submit => match self.to_payload() {
                Ok(payload) => Some(PasswordWizardAction::Submit(payload)),
                Err(err) => {
                    self.notice = Some(Notice::error(err));
                    None
                }
            },
        }
    }
}

pub fn render_password_wizard<B: Backend>(f: &mut Frame<B>, state: &mut PasswordWizardState) {
    let help = if state.form.editing {
        "Enter - Confirmar campo | Esc - Cancelar edição"
    } else {
        "Enter - Editar campo | Up/Down - Navegar | S - Salvar | Esc - Voltar"
    };
    let body = screen_layout(f, "Troca de Senha", help);
    render_form(f, &state.form, "Senha", body);
    render_notice(f, state.notice.as_ref());
}

pub fn handle_input(state: &mut PasswordWizardState) -> Result<Option<PasswordWizardAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    fn filled(new: &str, confirmation: &str) -> PasswordWizardState {
        let mut state = PasswordWizardState::new(Some("ana@empresa.com"));
        state.form.set_text(CURRENT, "Abc123!");
        state.form.set_text(NEW, new);
        state.form.set_text(CONFIRMATION, confirmation);
        state
    }

    #[test]
    fn prefills_connected_login() {
        let state = PasswordWizardState::new(Some("ana@empresa.com"));
        assert_eq!(state.form.text(LOGIN), "ana@empresa.com");
        assert_eq!(state.form.current_field, CURRENT);
    }

    #[test]
    fn weak_new_password_rejected() {
        assert_eq!(filled("abc123", "abc123").to_payload().unwrap_err(), ValidationError::WeakPassword);
    }

    #[test]
    fn confirmation_must_match() {
        assert_eq!(
            filled("Xyz789#", "Xyz789!").to_payload().unwrap_err(),
            ValidationError::PasswordMismatch
        );
    }

    #[test]
    fn valid_change_builds_payload() {
        let payload = filled("Xyz789#", "Xyz789#").to_payload().unwrap();
        assert_eq!(payload.new_password.as_deref(), Some("Xyz789#"));
        assert_eq!(payload.current_password.as_deref(), Some("Abc123!"));
    }
}
