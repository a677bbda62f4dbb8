//! Handlers for the `/alert-rules` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storewatch_core::alert::Severity;
use storewatch_core::error::CoreError;
use storewatch_core::rules::RuleCondition;
use storewatch_core::types::DbId;
use storewatch_db::models::alert_rule::{AlertRule, CreateAlertRule, UpdateAlertRule};
use storewatch_db::repositories::AlertRuleRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /alert-rules`.
#[derive(Debug, Deserialize)]
pub struct RuleListQuery {
    pub tenant_id: Option<DbId>,
}

/// POST /api/v1/alert-rules
///
/// Create a rule. `condition` and `severity` are validated here so a typo
/// surfaces as a 400 instead of a skipped rule at evaluation time.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAlertRule>,
) -> AppResult<(StatusCode, Json<DataResponse<AlertRule>>)> {
    input.condition.parse::<RuleCondition>().map_err(AppError::Core)?;
    if let Some(severity) = input.severity.as_deref() {
        severity.parse::<Severity>().map_err(AppError::Core)?;
    }

    let rule = AlertRuleRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /api/v1/alert-rules
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RuleListQuery>,
) -> AppResult<Json<DataResponse<Vec<AlertRule>>>> {
    let rules = AlertRuleRepo::list(&state.pool, params.tenant_id).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// GET /api/v1/alert-rules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AlertRule>>> {
    let rule = AlertRuleRepo::get(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AlertRule",
            id,
        }))?;
    Ok(Json(DataResponse { data: rule }))
}

/// PATCH /api/v1/alert-rules/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAlertRule>,
) -> AppResult<Json<DataResponse<AlertRule>>> {
    if let Some(condition) = input.condition.as_deref() {
        condition.parse::<RuleCondition>().map_err(AppError::Core)?;
    }
    if let Some(severity) = input.severity.as_deref() {
        severity.parse::<Severity>().map_err(AppError::Core)?;
    }

    let rule = AlertRuleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AlertRule",
            id,
        }))?;
    Ok(Json(DataResponse { data: rule }))
}

/// DELETE /api/v1/alert-rules/{id}
///
/// Alerts already raised by the rule survive with their `rule_id` nulled.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = AlertRuleRepo::delete(&state.pool, id).await?;
    if deleted > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "AlertRule",
            id,
        }))
    }
}
