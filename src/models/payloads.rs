//! Request bodies accepted by the REST API.
//!
//! Every field is optional so a missing value can be reported by name
//! instead of failing deserialization.

use serde::{Deserialize, Serialize};

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

fn collect_missing(fields: &[(&'static str, bool)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginPayload {
    pub login: Option<String>,
    #[serde(rename = "senha")]
    pub password: Option<String>,
}

impl LoginPayload {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("login", present(&self.login)),
            ("senha", present(&self.password)),
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangePasswordPayload {
    pub login: Option<String>,
    #[serde(rename = "senhaAtual")]
    pub current_password: Option<String>,
    #[serde(rename = "novaSenha")]
    pub new_password: Option<String>,
}

impl ChangePasswordPayload {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("login", present(&self.login)),
            ("senhaAtual", present(&self.current_password)),
            ("novaSenha", present(&self.new_password)),
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterClientPayload {
    pub login: Option<String>,
    #[serde(rename = "senha")]
    pub password: Option<String>,
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub cpf: Option<String>,
    #[serde(rename = "dataNascimento")]
    pub birth_date: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "estadoCivil")]
    pub marital_status: Option<String>,
    #[serde(rename = "escolaridade")]
    pub education: Option<String>,
}

impl RegisterClientPayload {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("login", present(&self.login)),
            ("senha", present(&self.password)),
            ("nome", present(&self.name)),
            ("cpf", present(&self.cpf)),
            ("dataNascimento", present(&self.birth_date)),
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicePayload {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    pub price: Option<f64>,
    #[serde(rename = "prazoDias")]
    pub lead_time_days: Option<f64>,
}

impl ServicePayload {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("nome", present(&self.name)),
            ("descricao", present(&self.description)),
            ("preco", self.price.is_some()),
            ("prazoDias", self.lead_time_days.is_some()),
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestItemPayload {
    #[serde(rename = "servicoId")]
    pub service_id: Option<i64>,
    #[serde(rename = "dataPedido")]
    pub order_date: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "precoCobrado")]
    pub charged_price: Option<f64>,
    #[serde(rename = "dataPrevista")]
    pub expected_date: Option<String>,
}

impl RequestItemPayload {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("servicoId", self.service_id.is_some()),
            ("dataPedido", present(&self.order_date)),
            ("precoCobrado", self.charged_price.is_some()),
            ("dataPrevista", present(&self.expected_date)),
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaceRequestsPayload {
    #[serde(rename = "solicitacoes")]
    pub requests: Option<Vec<RequestItemPayload>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_count_as_missing() {
        let payload: RegisterClientPayload = serde_json::from_value(serde_json::json!({
            "login": "a@b.com",
            "senha": "",
            "nome": null,
            "cpf": "123.456.789-09"
        }))
        .unwrap();

        assert_eq!(payload.missing_fields(), vec!["senha", "nome", "dataNascimento"]);
    }

    #[test]
    fn optional_registration_fields_are_not_required() {
        let payload = RegisterClientPayload {
            login: Some("a@b.com".into()),
            password: Some("Abc123!".into()),
            name: Some("Ana Souza".into()),
            cpf: Some("123.456.789-09".into()),
            birth_date: Some("1990-01-01".into()),
            ..Default::default()
        };
        assert!(payload.missing_fields().is_empty());
    }

    #[test]
    fn request_item_status_is_optional() {
        let item: RequestItemPayload = serde_json::from_value(serde_json::json!({
            "servicoId": 1,
            "dataPedido": "2026-01-10",
            "precoCobrado": 150.0,
            "dataPrevista": "2026-01-12"
        }))
        .unwrap();
        assert!(item.missing_fields().is_empty());
        assert!(item.status.is_none());
    }
}
