use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Client {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
    pub marital_status: Option<String>,
    pub education: Option<String>,
}

/// Row to insert at registration, password already hashed
#[derive(Debug, Clone)]
pub struct NewClient {
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
    pub marital_status: Option<String>,
    pub education: Option<String>,
}

/// Identity handed back to the caller after a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub login: String,
}

impl From<&Client> for ClientSummary {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            login: client.login.clone(),
        }
    }
}
