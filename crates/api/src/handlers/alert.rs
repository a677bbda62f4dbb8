//! Handlers for the `/alerts` resource and its lifecycle transitions.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use storewatch_core::alert::{validate_transition, AlertStatus};
use storewatch_core::error::CoreError;
use storewatch_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use storewatch_core::types::DbId;
use storewatch_db::models::alert::{
    AcknowledgeRequest, Alert, AlertFilter, ResolveRequest,
};
use storewatch_db::repositories::AlertRepo;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Query parameters for `GET /alerts`.
#[derive(Debug, Deserialize)]
pub struct AlertListQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub site_id: Option<DbId>,
    pub tenant_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/alerts
///
/// List alerts newest first with optional status / severity / site / tenant
/// filters, paginated with a total count.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AlertListQuery>,
) -> AppResult<Json<PageResponse<Alert>>> {
    let filter = AlertFilter {
        status: params.status,
        severity: params.severity,
        site_id: params.site_id,
        tenant_id: params.tenant_id,
    };

    let alerts = AlertRepo::list(&state.pool, &filter, params.limit, params.offset).await?;
    let total = AlertRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        data: alerts,
        total,
        limit: clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        offset: clamp_offset(params.offset),
    }))
}

/// GET /api/v1/alerts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = AlertRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Alert", id }))?;
    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/v1/alerts/{id}/acknowledge
///
/// `active -> acknowledged`, stamping the acting user and time. Any other
/// starting state is a 409 `INVALID_TRANSITION`.
pub async fn acknowledge(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AcknowledgeRequest>,
) -> AppResult<Json<DataResponse<Alert>>> {
    match AlertRepo::acknowledge(&state.pool, id, input.actor_id).await? {
        Some(alert) => Ok(Json(DataResponse { data: alert })),
        None => Err(transition_rejection(&state, id, AlertStatus::Acknowledged).await),
    }
}

/// POST /api/v1/alerts/{id}/resolve
///
/// `active|acknowledged -> resolved`, stamping the acting user, time and
/// optional notes. `resolved` is terminal; resolving again is a 409.
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResolveRequest>,
) -> AppResult<Json<DataResponse<Alert>>> {
    match AlertRepo::resolve(&state.pool, id, input.actor_id, input.notes.as_deref()).await? {
        Some(alert) => Ok(Json(DataResponse { data: alert })),
        None => Err(transition_rejection(&state, id, AlertStatus::Resolved).await),
    }
}

/// Explain why a guarded status update matched no row: the alert either
/// does not exist (404) or sits in a state the transition rules reject
/// (409), leaving it untouched either way.
async fn transition_rejection(state: &AppState, id: DbId, target: AlertStatus) -> AppError {
    match AlertRepo::get(&state.pool, id).await {
        Ok(Some(alert)) => match alert.status.parse::<AlertStatus>() {
            Ok(current) => match validate_transition(current, target) {
                Err(e) => AppError::Core(e),
                // The guard and the re-fetch disagree: another writer moved
                // the alert between the two queries.
                Ok(()) => AppError::Core(CoreError::Conflict(
                    "Alert status changed concurrently; retry".to_string(),
                )),
            },
            Err(e) => AppError::Core(e),
        },
        Ok(None) => AppError::Core(CoreError::NotFound { entity: "Alert", id }),
        Err(e) => AppError::Database(e),
    }
}
