//! Field rules shared by the API handlers and the terminal forms.
//!
//! Every rule reports failures through [`ValidationError`], whose `Display`
//! output is the message shown to the end user.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

/// Characters a password must draw at least one of.
pub const PASSWORD_SPECIALS: &str = "@#$%&*!?/\\|-_=+.";

/// Characters a password may never contain.
pub const PASSWORD_FORBIDDEN: &str = "¨{}[]´`~^:;<>,\"'";

pub const MINIMUM_AGE: i32 = 18;

static LOGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("login pattern compiles"));

static CPF_MASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("cpf pattern compiles"));

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Campos obrigatórios faltando: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("E-mail é obrigatório.")]
    LoginRequired,

    #[error("E-mail inválido.")]
    InvalidLogin,

    #[error("Senha é obrigatória.")]
    PasswordRequired,

    #[error("Senha e confirmação devem ser iguais.")]
    PasswordMismatch,

    #[error(
        "Senha deve ter pelo menos 6 caracteres, com número, letra maiúscula e caractere especial permitido, sem caracteres proibidos."
    )]
    WeakPassword,

    #[error("Nome é obrigatório.")]
    NameRequired,

    #[error("Nome deve ter pelo menos duas palavras e a primeira com 2+ caracteres.")]
    NameTooShort,

    #[error("Nome não pode conter caracteres especiais.")]
    NameSpecialCharacters,

    #[error("CPF é obrigatório.")]
    CpfRequired,

    #[error("CPF deve estar no formato NNN.NNN.NNN-NN.")]
    CpfMask,

    #[error("CPF inválido.")]
    InvalidCpf,

    #[error("Data inválida em {0}: use AAAA-MM-DD.")]
    InvalidDate(&'static str),

    #[error("Cliente deve ser maior de idade.")]
    Underage,

    #[error("Telefone deve ter 10 ou 11 dígitos (com DDD).")]
    InvalidPhone,

    #[error("Todos os campos são obrigatórios.")]
    ServiceFieldsRequired,

    #[error("Preço deve ser numérico e maior que zero.")]
    InvalidPrice,

    #[error("Prazo deve ser um número inteiro em dias.")]
    InvalidLeadTime,

    #[error("Solicitação {index}: {source}")]
    RequestItem {
        index: usize,
        source: Box<ValidationError>,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

pub fn require_fields(missing: Vec<&'static str>) -> Result<()> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

pub fn validate_login(login: &str) -> Result<()> {
    if login.is_empty() {
        return Err(ValidationError::LoginRequired);
    }
    if !LOGIN_RE.is_match(login) {
        return Err(ValidationError::InvalidLogin);
    }
    Ok(())
}

pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 6
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
        && !password.chars().any(|c| PASSWORD_FORBIDDEN.contains(c))
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if !is_strong_password(password) {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<()> {
    if password.is_empty() || confirmation.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.len() < 2 || tokens[0].chars().count() < 2 {
        return Err(ValidationError::NameTooShort);
    }

    if name
        .chars()
        .any(|c| PASSWORD_FORBIDDEN.contains(c) || PASSWORD_SPECIALS.contains(c))
    {
        return Err(ValidationError::NameSpecialCharacters);
    }

    Ok(())
}

pub fn has_cpf_mask(cpf: &str) -> bool {
    CPF_MASK_RE.is_match(cpf)
}

/// Checks the two CPF check digits, ignoring any non-digit characters.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn check_digit(digits: &[u32]) -> u32 {
    let first_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (first_weight - i as u32))
        .sum();

    match (sum * 10) % 11 {
        10 => 0,
        remainder => remainder,
    }
}

pub fn validate_cpf(cpf: &str) -> Result<()> {
    if cpf.is_empty() {
        return Err(ValidationError::CpfRequired);
    }
    if !has_cpf_mask(cpf) {
        return Err(ValidationError::CpfMask);
    }
    if !is_valid_cpf(cpf) {
        return Err(ValidationError::InvalidCpf);
    }
    Ok(())
}

/// Completed years between `birth_date` and `today`.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth_date.year();
    let had_birthday = (today.month(), today.day()) >= (birth_date.month(), birth_date.day());
    if had_birthday { years } else { years - 1 }
}

pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<()> {
    if age_on(birth_date, today) < MINIMUM_AGE {
        return Err(ValidationError::Underage);
    }
    Ok(())
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate(field))
}

/// An absent or empty phone is accepted.
pub fn validate_phone(phone: Option<&str>) -> Result<()> {
    let Some(phone) = phone.filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=11).contains(&digits) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::InvalidPrice);
    }
    Ok(())
}

/// Returns the lead time as whole days.
pub fn validate_lead_time(days: f64) -> Result<i64> {
    if !days.is_finite() || days.fract() != 0.0 || days <= 0.0 || days > i64::MAX as f64 {
        return Err(ValidationError::InvalidLeadTime);
    }
    Ok(days as i64)
}

pub fn validate_service(name: &str, description: &str, price: f64, lead_time_days: f64) -> Result<i64> {
    if name.trim().is_empty() || description.trim().is_empty() {
        return Err(ValidationError::ServiceFieldsRequired);
    }
    validate_price(price)?;
    validate_lead_time(lead_time_days)
}

/// Registration form contents, checked in the order the form presents them.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationFields<'a> {
    pub login: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub cpf: &'a str,
    pub birth_date: NaiveDate,
    pub phone: Option<&'a str>,
}

impl RegistrationFields<'_> {
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        validate_login(self.login)?;
        validate_password(self.password)?;
        validate_name(self.name)?;
        validate_cpf(self.cpf)?;
        validate_birth_date(self.birth_date, today)?;
        validate_phone(self.phone)
    }
}
