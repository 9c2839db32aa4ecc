use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use super::{ApiResult, AppState, Envelope, SESSION_REJECTED, json_body};
use crate::auth::{bearer_token, hash_password, issue_token, token_digest, verify_password};
use crate::error::{ApiError, DATABASE_ERROR};
use crate::models::{ChangePasswordPayload, ClientSummary, LoginData, LoginPayload, NoData};
use crate::validation;

pub async fn login(State(state): State<AppState>, body: Result<Json<LoginPayload>, JsonRejection>) -> ApiResult<LoginData> {
    let payload = json_body(body)?;
    validation::require_fields(payload.missing_fields())?;
    let login = payload.login.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let client = state
        .db
        .get_client_by_login(&login)
        .await
        .map_err(ApiError::storage(DATABASE_ERROR))?
        .filter(|client| verify_password(&password, &client.password_hash))
        .ok_or(ApiError::Unauthorized("Login ou senha inválidos"))?;

    let now = Utc::now();
    let issued = issue_token();
    state
        .db
        .create_session(&issued.digest, client.id, now + state.config.session_ttl())
        .await
        .map_err(ApiError::storage(DATABASE_ERROR))?;

    match state.db.purge_expired_sessions(now).await {
        Ok(0) => {}
        Ok(purged) => tracing::debug!(purged, "purged expired sessions"),
        Err(err) => tracing::warn!("failed to purge expired sessions: {err:#}"),
    }

    tracing::info!(client_id = client.id, "client authenticated");

    Ok(Envelope::ok(
        "Autenticação realizada com sucesso",
        LoginData {
            client: ClientSummary::from(&client),
            token: issued.token,
        },
    ))
}

pub async fn change_password(
    State(state): State<AppState>,
    body: Result<Json<ChangePasswordPayload>, JsonRejection>,
) -> ApiResult<NoData> {
    let payload = json_body(body)?;
    validation::require_fields(payload.missing_fields())?;
    let login = payload.login.unwrap_or_default();
    let current_password = payload.current_password.unwrap_or_default();
    let new_password = payload.new_password.unwrap_or_default();

    let client = state
        .db
        .get_client_by_login(&login)
        .await
        .map_err(ApiError::storage(DATABASE_ERROR))?
        .filter(|client| verify_password(&current_password, &client.password_hash))
        .ok_or(ApiError::Unauthorized("Autenticação inválida"))?;

    validation::validate_password(&new_password)?;

    state
        .db
        .update_password(client.id, &hash_password(&new_password))
        .await
        .map_err(ApiError::storage("Erro ao atualizar senha"))?;

    tracing::info!(client_id = client.id, "password changed, sessions revoked");

    Ok(Envelope::message("Senha atualizada com sucesso"))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<NoData> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::Unauthorized(SESSION_REJECTED))?;

    let removed = state
        .db
        .delete_session(&token_digest(token))
        .await
        .map_err(ApiError::storage(DATABASE_ERROR))?;

    if !removed {
        return Err(ApiError::Unauthorized(SESSION_REJECTED));
    }

    Ok(Envelope::message("Sessão encerrada com sucesso"))
}
