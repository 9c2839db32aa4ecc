use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::models::NewService;
use crate::ui::components::form::{render_form, FormEvent, FormField, FormState};
use crate::ui::components::{read_key, render_notice, screen_layout, Notice};
use crate::validation::{self, validate_service, ValidationError};

const NAME: usize = 0;
const DESCRIPTION: usize = 1;
const PRICE: usize = 2;
const LEAD_TIME: usize = 3;

pub enum ServiceWizardAction {
    Cancel,
    Submit(NewService),
}

pub struct ServiceWizardState {
    pub form: FormState,
    pub notice: Option<Notice>,
}

/// Accepts both `1200.50` and `1200,50`.
fn parse_number(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse::<f64>().ok()
}

impl ServiceWizardState {
    pub fn new() -> Self {
        Self {
            form: FormState::new(vec![
                FormField::text("Nome"),
                FormField::text("Descrição"),
                FormField::text("Preço (R$)"),
                FormField::text("Prazo (dias)"),
            ]),
            notice: None,
        }
    }

    /// Clears the form after a successful registration.
    pub fn reset(&mut self, notice: Notice) {
        *self = Self::new();
        self.notice = Some(notice);
    }

    pub fn to_service(&self) -> validation::Result<NewService> {
        let name = self.form.text(NAME);
        let description = self.form.text(DESCRIPTION);
        if name.is_empty() || description.is_empty() || self.form.text(PRICE).is_empty() || self.form.text(LEAD_TIME).is_empty() {
            return Err(ValidationError::ServiceFieldsRequired);
        }

        let price = parse_number(self.form.text(PRICE)).ok_or(ValidationError::InvalidPrice)?;
        let lead_time = parse_number(self.form.text(LEAD_TIME)).ok_or(ValidationError::InvalidLeadTime)?;
        let lead_time_days = validate_service(name, description, price, lead_time)?;

        Ok(NewService {
            name: name.to_string(),
            description: description.to_string(),
            price,
            lead_time_days,
        })
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<ServiceWizardAction> {
        if self.notice.take().is_some() {
            return None;
        }

        match self.form.handle_key(key)? {
            FormEvent::Cancel => Some(ServiceWizardAction::Cancel),
            FormEvent::Submit => match self.to_service() {
                Ok(service) => Some(ServiceWizardAction::Submit(service)),
                Err(err) => {
                    self.notice = Some(Notice::error(err));
                    None
                }
            },
        }
    }
}

pub fn render_service_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ServiceWizardState) {
    let help = if state.form.editing {
        "Enter - Confirmar campo | Esc - Cancelar edição"
    } else {
        "Enter - Editar campo | Up/Down - Navegar | S - Cadastrar | Esc - Voltar"
    };
    let body = screen_layout(f, "Cadastro de Serviço", help);
    render_form(f, &state.form, "Serviço de TI", body);
    render_notice(f, state.notice.as_ref());
}

pub fn handle_input(state: &mut ServiceWizardState) -> Result<Option<ServiceWizardAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
