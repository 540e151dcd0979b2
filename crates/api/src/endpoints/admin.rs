//! Admin endpoints: manual actions and escalation overrides.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use gavel_common::AppResult;
use gavel_core::IssueActionInput;
use gavel_db::entities::{enforcement_action::ActionKind, escalation_override};
use serde::{Deserialize, Serialize};

use crate::endpoints::violations::ActionResponse;
use crate::{extractors::AuthAdmin, middleware::AppState, response::ApiResponse};

/// Issue action request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueActionRequest {
    pub account_id: String,
    pub kind: ActionKind,
    pub message: String,
    pub effective_from: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Set override request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOverrideRequest {
    pub account_id: String,
    pub pinned_kind: ActionKind,
}

/// Clear override request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearOverrideRequest {
    pub account_id: String,
}

/// Override response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideResponse {
    pub id: String,
    pub account_id: String,
    pub pinned_kind: ActionKind,
    pub set_by: String,
    pub created_at: String,
}

impl From<escalation_override::Model> for OverrideResponse {
    fn from(o: escalation_override::Model) -> Self {
        Self {
            id: o.id,
            account_id: o.account_id,
            pinned_kind: o.pinned_kind,
            set_by: o.set_by,
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

/// Clear override response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearOverrideResponse {
    pub cleared: bool,
}

async fn issue_action(
    AuthAdmin(admin_id): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<IssueActionRequest>,
) -> AppResult<ApiResponse<ActionResponse>> {
    let action = state
        .executor
        .issue_manual(
            &admin_id,
            IssueActionInput {
                account_id: req.account_id,
                kind: req.kind,
                message: req.message,
                effective_from: req.effective_from,
                deadline: req.deadline,
            },
        )
        .await?;

    Ok(ApiResponse::ok(action.into()))
}

async fn set_override(
    AuthAdmin(admin_id): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<SetOverrideRequest>,
) -> AppResult<ApiResponse<OverrideResponse>> {
    let set = state
        .override_service
        .set(&admin_id, &req.account_id, req.pinned_kind)
        .await?;

    Ok(ApiResponse::ok(set.into()))
}

async fn clear_override(
    AuthAdmin(admin_id): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<ClearOverrideRequest>,
) -> AppResult<ApiResponse<ClearOverrideResponse>> {
    let cleared = state
        .override_service
        .clear(&admin_id, &req.account_id)
        .await?;

    Ok(ApiResponse::ok(ClearOverrideResponse { cleared }))
}

/// Create the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/actions/issue", post(issue_action))
        .route("/overrides/set", post(set_override))
        .route("/overrides/clear", post(clear_override))
}
