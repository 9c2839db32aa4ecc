use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "preco")]
    pub price: f64,
    #[serde(rename = "prazoDias")]
    pub lead_time_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewService {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "preco")]
    pub price: f64,
    #[serde(rename = "prazoDias")]
    pub lead_time_days: i64,
}
