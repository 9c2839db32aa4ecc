use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::{ApiResult, AppState, Envelope, json_body};
use crate::error::ApiError;
use crate::models::{NewService, ServiceCreated, ServiceList, ServicePayload};
use crate::validation;

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ServicePayload>, JsonRejection>,
) -> ApiResult<ServiceCreated> {
    let payload = json_body(body)?;
    validation::require_fields(payload.missing_fields())?;

    let name = payload.name.unwrap_or_default();
    let description = payload.description.unwrap_or_default();
    let price = payload.price.unwrap_or_default();
    let lead_time_days = validation::validate_service(
        &name,
        &description,
        price,
        payload.lead_time_days.unwrap_or_default(),
    )?;

    let service = NewService {
        name,
        description,
        price,
        lead_time_days,
    };
    let id = state
        .db
        .create_service(&service)
        .await
        .map_err(ApiError::storage("Erro ao cadastrar serviço"))?;

    tracing::info!(service_id = id, "service registered");

    Ok(Envelope::ok("Serviço cadastrado com sucesso", ServiceCreated { id }))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<ServiceList> {
    let services = state
        .db
        .get_services()
        .await
        .map_err(ApiError::storage("Erro ao consultar serviços"))?;

    Ok(Envelope::data(ServiceList { services }))
}
