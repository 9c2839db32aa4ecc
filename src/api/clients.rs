use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Local;

use super::{ApiResult, AppState, Envelope, json_body};
use crate::auth::hash_password;
use crate::db::is_unique_violation;
use crate::error::{ApiError, DATABASE_ERROR};
use crate::models::{NewClient, NoData, RegisterClientPayload};
use crate::validation::{self, RegistrationFields};

const DUPLICATE_LOGIN: &str = "Login já existente";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterClientPayload>, JsonRejection>,
) -> ApiResult<NoData> {
    let payload = json_body(body)?;
    validation::require_fields(payload.missing_fields())?;

    let login = payload.login.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    let name = payload.name.unwrap_or_default();
    let cpf = payload.cpf.unwrap_or_default();
    let birth_date = validation::parse_date("dataNascimento", payload.birth_date.as_deref().unwrap_or_default())?;
    let phone = non_empty(payload.phone);

    RegistrationFields {
        login: &login,
        password: &password,
        name: &name,
        cpf: &cpf,
        birth_date,
        phone: phone.as_deref(),
    }
    .validate(Local::now().date_naive())?;

    let existing = state
        .db
        .get_client_id(&login)
        .await
        .map_err(ApiError::storage(DATABASE_ERROR))?;
    if existing.is_some() {
        return Err(ApiError::Conflict(DUPLICATE_LOGIN));
    }

    let client = NewClient {
        login,
        password_hash: hash_password(&password),
        name: name.trim().to_string(),
        cpf,
        birth_date,
        phone,
        marital_status: non_empty(payload.marital_status),
        education: non_empty(payload.education),
    };

    let id = state.db.create_client(&client).await.map_err(|err| {
        // Two registrations can race past the lookup above.
        if is_unique_violation(&err) {
            ApiError::Conflict(DUPLICATE_LOGIN)
        } else {
            ApiError::storage("Erro ao cadastrar cliente")(err)
        }
    })?;

    tracing::info!(client_id = id, "client registered");

    Ok(Envelope::message("Cliente cadastrado com sucesso"))
}
