//! HTTP client the terminal application uses to reach the REST API.

use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{
    ChangePasswordPayload, ClientSummary, LoginData, LoginPayload, NewService, NewServiceRequest, NoData,
    RegisterClientPayload, RequestList, Service, ServiceCreated, ServiceList, ServiceRequestView,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with `success: false`; `message` is meant for the user.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("Falha de comunicação com o servidor: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resposta inesperada do servidor: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Endereço da API inválido: {0}")]
    InvalidUrl(String),

    #[error("Nenhum cliente autenticado.")]
    NotLoggedIn,
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Deserialize)]
struct RawEnvelope {
    success: bool,
    message: Option<String>,
    #[serde(flatten)]
    data: Map<String, Value>,
}

/// The logged-in client and the bearer token issued for it
#[derive(Debug, Clone)]
pub struct Session {
    pub client: ClientSummary,
    pub token: String,
}

#[derive(Serialize)]
struct ReplaceRequestsBody<'a> {
    #[serde(rename = "solicitacoes")]
    requests: &'a [NewServiceRequest],
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            session: None,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Drops the local session without contacting the server.
    pub fn forget_session(&mut self) {
        self.session = None;
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was ruled out in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(ClientError::NotLoggedIn)
    }

    /// Authenticates and keeps the session for later calls. Returns the server message.
    pub async fn login(&mut self, login: &str, password: &str) -> Result<String> {
        let payload = LoginPayload {
            login: Some(login.to_string()),
            password: Some(password.to_string()),
        };
        let response = self.http.post(self.endpoint(&["auth", "login"])).json(&payload).send().await?;
        let (message, data): (_, LoginData) = decode(response).await?;

        tracing::debug!(client_id = data.client.id, "logged in");
        self.session = Some(Session {
            client: data.client,
            token: data.token,
        });

        Ok(message.unwrap_or_default())
    }

    /// Ends the session on the server; the local session is dropped either way.
    pub async fn logout(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.endpoint(&["auth", "logout"]))
            .header(AUTHORIZATION, format!("Bearer {}", session.token))
            .send()
            .await?;
        decode::<NoData>(response).await?;

        Ok(())
    }

    pub async fn change_password(&self, payload: &ChangePasswordPayload) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(&["auth", "change-password"]))
            .json(payload)
            .send()
            .await?;
        let (message, NoData {}) = decode(response).await?;
        Ok(message.unwrap_or_default())
    }

    pub async fn register_client(&self, payload: &RegisterClientPayload) -> Result<String> {
        let response = self.http.post(self.endpoint(&["clientes"])).json(payload).send().await?;
        let (message, NoData {}) = decode(response).await?;
        Ok(message.unwrap_or_default())
    }

    pub async fn create_service(&self, service: &NewService) -> Result<i64> {
        let response = self.http.post(self.endpoint(&["servicos"])).json(service).send().await?;
        let (_, created): (_, ServiceCreated) = decode(response).await?;
        Ok(created.id)
    }

    pub async fn list_services(&self) -> Result<Vec<Service>> {
        let response = self.http.get(self.endpoint(&["servicos"])).send().await?;
        let (_, list): (_, ServiceList) = decode(response).await?;
        Ok(list.services)
    }

    /// Requests of the logged-in client
    pub async fn list_requests(&self) -> Result<Vec<ServiceRequestView>> {
        let session = self.require_session()?;
        let response = self
            .http
            .get(self.endpoint(&["solicitacoes", &session.client.login]))
            .header(AUTHORIZATION, format!("Bearer {}", session.token))
            .send()
            .await?;
        let (_, list): (_, RequestList) = decode(response).await?;
        Ok(list.requests)
    }

    /// Replaces every stored request of the logged-in client with `requests`
    pub async fn replace_requests(&self, requests: &[NewServiceRequest]) -> Result<String> {
        let session = self.require_session()?;
        let response = self
            .http
            .put(self.endpoint(&["solicitacoes", &session.client.login]))
            .header(AUTHORIZATION, format!("Bearer {}", session.token))
            .json(&ReplaceRequestsBody { requests })
            .send()
            .await?;
        let (message, NoData {}) = decode(response).await?;
        Ok(message.unwrap_or_default())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<(Option<String>, T)> {
    let status = response.status();
    let body = response.bytes().await?;

    let envelope: RawEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(ClientError::Api {
                status,
                message: format!("Erro HTTP {}", status.as_u16()),
            });
        }
        Err(err) => return Err(err.into()),
    };

    if !status.is_success() || !envelope.success {
        return Err(ClientError::Api {
            status,
            message: envelope
                .message
                .unwrap_or_else(|| format!("Erro HTTP {}", status.as_u16())),
        });
    }

    let data = serde_json::from_value(Value::Object(envelope.data))?;
    Ok((envelope.message, data))
}
