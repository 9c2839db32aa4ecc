//! REST endpoints.
//!
//! All JSON responses share one envelope: `{success, message?, ...data}`.

mod auth;
mod clients;
mod requests;
mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::error::{ApiError, DATABASE_ERROR};
use crate::models::NoData;

pub const SESSION_REJECTED: &str = "Sessão inválida ou expirada";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }
}

impl Envelope<NoData> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(message, NoData {})
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: NoData {},
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub type ApiResult<T> = Result<Envelope<T>, ApiError>;

/// Unwraps a JSON body, turning extractor rejections into envelope errors.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| ApiError::BadRequest(format!("Corpo da requisição inválido: {}", rejection.body_text())))
}

async fn client_id_for(state: &AppState, login: &str) -> Result<i64, ApiError> {
    state
        .db
        .get_client_id(login)
        .await
        .map_err(ApiError::storage(DATABASE_ERROR))?
        .ok_or(ApiError::NotFound("Cliente não encontrado"))
}

/// Checks that the bearer token in `headers` belongs to `client_id`.
async fn authorize(state: &AppState, headers: &HeaderMap, client_id: i64) -> Result<(), ApiError> {
    if !state.config.require_session {
        return Ok(());
    }

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(crate::auth::bearer_token)
        .ok_or(ApiError::Unauthorized(SESSION_REJECTED))?;

    let owner = state
        .db
        .get_session_client(&crate::auth::token_digest(token), chrono::Utc::now())
        .await
        .map_err(ApiError::storage(DATABASE_ERROR))?;

    if owner != Some(client_id) {
        return Err(ApiError::Unauthorized(SESSION_REJECTED));
    }
    Ok(())
}

async fn root() -> &'static str {
    "Backend de Serviços de TI rodando"
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root))
        .route("/auth/login", post(auth::login))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/logout", post(auth::logout))
        .route("/clientes", post(clients::register))
        .route("/servicos", get(services::list).post(services::create))
        .route("/solicitacoes/:login", get(requests::list).put(requests::replace))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
