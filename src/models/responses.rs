use serde::{Deserialize, Serialize};

use super::{ClientSummary, Service, ServiceRequestView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(rename = "cliente")]
    pub client: ClientSummary,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCreated {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "servicos")]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestList {
    #[serde(rename = "solicitacoes")]
    pub requests: Vec<ServiceRequestView>,
}

/// Envelope payload for responses that carry only `success` and `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoData {}
