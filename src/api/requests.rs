use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use super::{ApiResult, AppState, Envelope, authorize, client_id_for};
use crate::error::ApiError;
use crate::models::{DEFAULT_STATUS, NewServiceRequest, NoData, ReplaceRequestsPayload, RequestItemPayload, RequestList};
use crate::validation::{self, ValidationError};

const INVALID_LIST: &str = "Lista de solicitações inválida";

pub async fn list(State(state): State<AppState>, Path(login): Path<String>, headers: HeaderMap) -> ApiResult<RequestList> {
    let client_id = client_id_for(&state, &login).await?;
    authorize(&state, &headers, client_id).await?;

    let requests = state
        .db
        .get_requests_by_client(client_id)
        .await
        .map_err(ApiError::storage("Erro ao consultar solicitações"))?;

    Ok(Envelope::data(RequestList { requests }))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(login): Path<String>,
    headers: HeaderMap,
    body: Result<Json<ReplaceRequestsPayload>, JsonRejection>,
) -> ApiResult<NoData> {
    let items = body
        .ok()
        .and_then(|Json(payload)| payload.requests)
        .ok_or_else(|| ApiError::BadRequest(INVALID_LIST.to_string()))?;

    let client_id = client_id_for(&state, &login).await?;
    authorize(&state, &headers, client_id).await?;

    // Validate everything up front so a bad item never touches storage.
    let requests = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            parse_item(item).map_err(|source| ValidationError::RequestItem {
                index: i + 1,
                source: Box::new(source),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    state
        .db
        .replace_requests(client_id, &requests)
        .await
        .map_err(ApiError::storage("Erro ao salvar solicitações"))?;

    tracing::info!(client_id, count = requests.len(), "request list replaced");

    Ok(Envelope::message("Solicitações atualizadas com sucesso"))
}

fn parse_item(item: &RequestItemPayload) -> validation::Result<NewServiceRequest> {
    validation::require_fields(item.missing_fields())?;

    let order_date = validation::parse_date("dataPedido", item.order_date.as_deref().unwrap_or_default())?;
    let expected_date = validation::parse_date("dataPrevista", item.expected_date.as_deref().unwrap_or_default())?;
    let charged_price = item.charged_price.unwrap_or_default();
    validation::validate_price(charged_price)?;

    let status = item
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STATUS)
        .to_string();

    Ok(NewServiceRequest {
        service_id: item.service_id.unwrap_or_default(),
        order_date,
        status,
        charged_price,
        expected_date,
    })
}
