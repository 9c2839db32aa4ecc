use anyhow::Result;
use chrono::{Local, Months, NaiveDate};
use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::models::RegisterClientPayload;
use crate::ui::components::form::{render_form, FormEvent, FormField, FormState};
use crate::ui::components::{read_key, render_notice, screen_layout, Notice};
use crate::validation::{self, validate_login, validate_password_confirmation, RegistrationFields, MINIMUM_AGE};

pub const MARITAL_STATUS: &[(&str, &str)] = &[
    ("solteiro", "Solteiro(a)"),
    ("casado", "Casado(a)"),
    ("divorciado", "Divorciado(a)"),
    ("viuvo", "Viúvo(a)"),
];

pub const EDUCATION: &[(&str, &str)] = &[
    ("1incompleto", "1º grau incompleto"),
    ("1completo", "1º grau completo"),
    ("2grau", "2º grau completo"),
    ("superior", "Nível superior"),
    ("pos", "Pós-graduação"),
];

#[derive(Clone, Copy)]
enum Field {
    Login = 0,
    Password,
    Confirmation,
    Name,
    Cpf,
    BirthDate,
    Phone,
    MaritalStatus,
    Education,
}

pub enum RegistrationAction {
    Cancel,
    Submit(RegisterClientPayload),
}

pub struct RegistrationWizardState {
    pub form: FormState,
    pub notice: Option<Notice>,
}

impl RegistrationWizardState {
    pub fn new(today: NaiveDate) -> Self {
        let initial_birth_date = today
            .checked_sub_months(Months::new(12 * MINIMUM_AGE as u32))
            .unwrap_or(today);

        Self {
            form: FormState::new(vec![
                FormField::text("E-mail"),
                FormField::secret("Senha"),
                FormField::secret("Confirmação da senha"),
                FormField::text("Nome completo"),
                FormField::text("CPF (NNN.NNN.NNN-NN)"),
                FormField::date("Data de nascimento", initial_birth_date),
                FormField::text("Telefone (opcional)"),
                FormField::choice("Estado civil", MARITAL_STATUS),
                FormField::choice("Escolaridade", EDUCATION),
            ]),
            notice: None,
        }
    }

    fn text(&self, field: Field) -> &str {
        self.form.text(field as usize)
    }

    /// Runs the shared rules in form order and builds the request body.
    pub fn to_payload(&self, today: NaiveDate) -> validation::Result<RegisterClientPayload> {
        let birth_date = self
            .form
            .date(Field::BirthDate as usize)
            .ok_or(validation::ValidationError::InvalidDate("dataNascimento"))?;
        let phone = Some(self.text(Field::Phone)).filter(|p| !p.is_empty());

        validate_login(self.text(Field::Login))?;
        validate_password_confirmation(self.text(Field::Password), self.text(Field::Confirmation))?;
        RegistrationFields {
            login: self.text(Field::Login),
            password: self.text(Field::Password),
            name: self.text(Field::Name),
            cpf: self.text(Field::Cpf),
            birth_date,
            phone,
        }
        .validate(today)?;

        Ok(RegisterClientPayload {
            login: Some(self.text(Field::Login).to_string()),
            password: Some(self.text(Field::Password).to_string()),
            name: Some(self.text(Field::Name).to_string()),
            cpf: Some(self.text(Field::Cpf).to_string()),
            birth_date: Some(birth_date.format("%Y-%m-%d").to_string()),
            phone: phone.map(str::to_string),
            marital_status: self.form.choice(Field::MaritalStatus as usize).map(str::to_string),
            education: self.form.choice(Field::Education as usize).map(str::to_string),
        })
    }

    pub fn handle_key(&mut self, key: KeyCode, today: NaiveDate) -> Option<RegistrationAction> {
        if self.notice.take().is_some() {
            return None;
        }

        match self.form.handle_key(key)? {
            FormEvent::Cancel => Some(RegistrationAction::Cancel),
            FormEvent::Submit => match self.to_payload(today) {
                Ok(payload) => Some(RegistrationAction::Submit(payload)),
                Err(err) => {
                    self.notice = Some(Notice::error(err));
                    None
                }
            },
        }
    }
}

pub fn render_registration_wizard<B: Backend>(f: &mut Frame<B>, state: &mut RegistrationWizardState) {
    let help = if state.form.editing {
        "Enter - Confirmar campo | Left/Right - Alterar opção ou parte da data | Esc - Cancelar edição"
    } else {
        "Enter - Editar campo | Up/Down - Navegar | S - Cadastrar | Esc - Voltar"
    };
    let body = screen_layout(f, "Cadastro de Cliente", help);
    render_form(f, &state.form, "Dados do cliente", body);
    render_notice(f, state.notice.as_ref());
}

pub fn handle_input(state: &mut RegistrationWizardState) -> Result<Option<RegistrationAction>> {
    let today = Local::now().date_naive();
    Ok(read_key()?.and_then(|key| state.handle_key(key, today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn filled() -> RegistrationWizardState {
        let mut state = RegistrationWizardState::new(today());
        state.form.set_text(Field::Login as usize, "ana@empresa.com");
        state.form.set_text(Field::Password as usize, "Abc123!");
        state.form.set_text(Field::Confirmation as usize, "Abc123!");
        state.form.set_text(Field::Name as usize, "Ana Souza");
        state.form.set_text(Field::Cpf as usize, "123.456.789-09");
        state
    }

    #[test]
    fn default_birth_date_is_of_age() {
        let state = RegistrationWizardState::new(today());
        assert_eq!(
            state.form.date(Field::BirthDate as usize),
            NaiveDate::from_ymd_opt(2008, 10, 16)
        );
    }

    #[test]
    fn builds_payload_from_valid_form() {
        let mut state = filled();
        state.form.current_field = Field::Education as usize;
        state.form.handle_key(KeyCode::Enter);
        state.form.handle_key(KeyCode::Right);
        state.form.handle_key(KeyCode::Enter);

        let payload = state.to_payload(today()).unwrap();
        assert_eq!(payload.birth_date.as_deref(), Some("2008-10-16"));
        assert_eq!(payload.education.as_deref(), Some("1incompleto"));
        assert_eq!(payload.marital_status, None);
        assert_eq!(payload.phone, None);
        assert!(payload.missing_fields().is_empty());
    }

    #[test]
    fn confirmation_checked_before_other_fields() {
        let mut state = filled();
        state.form.set_text(Field::Confirmation as usize, "Abc123?");
        state.form.set_text(Field::Cpf as usize, "111.111.111-11");
        assert_eq!(state.to_payload(today()).unwrap_err(), ValidationError::PasswordMismatch);
    }

    #[test]
    fn invalid_cpf_blocks_submission() {
        let mut state = filled();
        state.form.set_text(Field::Cpf as usize, "123.456.789-00");
        assert!(state.handle_key(KeyCode::Char('s'), today()).is_none());
        assert_eq!(state.notice, Some(Notice::error(ValidationError::InvalidCpf)));
    }
}
