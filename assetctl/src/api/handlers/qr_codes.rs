use crate::AppState;
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::api::models::qr_codes::{BatchCreate, ListQrCodesQuery, QrBatchResponse, QrCodeResponse};
use crate::db::handlers::{QrCodes, qr_codes::QrCodeFilter};
use crate::errors::{Error, Result};
use crate::scan::payload::scan_url;
use crate::types::{QrBatchId, QrCodeId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

fn label_url(state: &AppState, code: &str) -> Option<String> {
    state
        .config
        .public_url
        .as_ref()
        .and_then(|base| scan_url(base, code).ok())
        .map(|url| url.to_string())
}

#[utoipa::path(
    get,
    path = "/qr-batches",
    tag = "qr_codes",
    summary = "List QR-code batches",
    description = "Newest batch first.",
    params(Pagination),
    responses(
        (status = 200, description = "Page of batches", body = PaginatedResponse<QrBatchResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_batches(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<QrBatchResponse>>> {
    let mut tx = state.store.begin().await;
    let batches = QrCodes::new(&mut tx).list_batches(0, None).await?;
    Ok(Json(pagination.page(batches.into_iter().map(QrBatchResponse::from).collect())))
}

#[utoipa::path(
    post,
    path = "/qr-batches",
    tag = "qr_codes",
    summary = "Generate QR-code batch",
    description = "Mints a batch of new, unassigned codes.",
    request_body = BatchCreate,
    responses(
        (status = 201, description = "Batch created", body = QrBatchResponse),
        (status = 400, description = "Quantity out of range"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_batch(
    State(state): State<AppState>,
    Json(create): Json<BatchCreate>,
) -> Result<(StatusCode, Json<QrBatchResponse>)> {
    let limits = &state.config.qr_codes;
    let quantity = create.quantity.unwrap_or(limits.default_batch_size);
    if !(1..=limits.max_batch_size).contains(&quantity) {
        return Err(Error::BadRequest {
            message: format!("Quantity must be between 1 and {}", limits.max_batch_size),
        });
    }

    let mut tx = state.store.begin().await;
    let batch = QrCodes::new(&mut tx).create_batch(quantity, Utc::now()).await?;
    tx.commit();
    tracing::info!(batch_id = %batch.id, quantity, "Generated QR-code batch");
    Ok((StatusCode::CREATED, Json(QrBatchResponse::from(batch))))
}

#[utoipa::path(
    get,
    path = "/qr-batches/{id}",
    tag = "qr_codes",
    summary = "Get QR-code batch",
    params(("id" = String, Path, description = "Batch ID")),
    responses(
        (status = 200, description = "Batch with its codes", body = QrBatchResponse),
        (status = 404, description = "Batch not found"),
    )
)]
#[tracing::instrument(skip_all, fields(batch_id = %id))]
pub async fn get_batch(State(state): State<AppState>, Path(id): Path<QrBatchId>) -> Result<Json<QrBatchResponse>> {
    let mut tx = state.store.begin().await;
    match QrCodes::new(&mut tx).get_batch(&id).await? {
        Some(batch) => Ok(Json(QrBatchResponse::from(batch))),
        None => Err(Error::NotFound {
            resource: "QR batch".to_string(),
            id,
        }),
    }
}

#[utoipa::path(
    get,
    path = "/qr-codes",
    tag = "qr_codes",
    summary = "List QR codes",
    description = "Codes across all batches, newest batch first.",
    params(ListQrCodesQuery),
    responses(
        (status = 200, description = "Page of codes", body = PaginatedResponse<QrCodeResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_codes(
    State(state): State<AppState>,
    Query(query): Query<ListQrCodesQuery>,
) -> Result<Json<PaginatedResponse<QrCodeResponse>>> {
    let filter = QrCodeFilter {
        assigned: query.assigned,
        search: query.search.clone(),
        ..Default::default()
    };

    let mut tx = state.store.begin().await;
    let codes = QrCodes::new(&mut tx).list_codes(&filter).await?;
    let rows = codes
        .into_iter()
        .map(|code| {
            let url = label_url(&state, &code.code.id);
            QrCodeResponse::new(code, url)
        })
        .collect();
    Ok(Json(query.pagination.page(rows)))
}

#[utoipa::path(
    get,
    path = "/qr-codes/{id}",
    tag = "qr_codes",
    summary = "Get QR code",
    params(("id" = String, Path, description = "QR code ID")),
    responses(
        (status = 200, description = "Code details with its label link", body = QrCodeResponse),
        (status = 404, description = "Code not found"),
    )
)]
#[tracing::instrument(skip_all, fields(code_id = %id))]
pub async fn get_code(State(state): State<AppState>, Path(id): Path<QrCodeId>) -> Result<Json<QrCodeResponse>> {
    let mut tx = state.store.begin().await;
    let code = QrCodes::new(&mut tx).get_code(&id).await?.ok_or_else(|| Error::NotFound {
        resource: "QR code".to_string(),
        id: id.clone(),
    })?;
    let url = label_url(&state, &id);
    Ok(Json(QrCodeResponse::new(code, url)))
}
