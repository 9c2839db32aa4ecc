use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS: &str = "EM ELABORAÇÃO";

/// A stored request joined with the name of the service it references
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequestView {
    pub id: i64,
    #[serde(rename = "dataPedido")]
    pub order_date: NaiveDate,
    pub status: String,
    #[serde(rename = "precoCobrado")]
    pub charged_price: f64,
    #[serde(rename = "dataPrevista")]
    pub expected_date: NaiveDate,
    #[serde(rename = "servicoNome")]
    pub service_name: String,
    #[serde(rename = "servicoId")]
    pub service_id: i64,
}

/// One item of a cart save, as sent on the wire and inserted in storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceRequest {
    #[serde(rename = "servicoId")]
    pub service_id: i64,
    #[serde(rename = "dataPedido")]
    pub order_date: NaiveDate,
    pub status: String,
    #[serde(rename = "precoCobrado")]
    pub charged_price: f64,
    #[serde(rename = "dataPrevista")]
    pub expected_date: NaiveDate,
}

impl From<&ServiceRequestView> for NewServiceRequest {
    fn from(view: &ServiceRequestView) -> Self {
        Self {
            service_id: view.service_id,
            order_date: view.order_date,
            status: view.status.clone(),
            charged_price: view.charged_price,
            expected_date: view.expected_date,
        }
    }
}
