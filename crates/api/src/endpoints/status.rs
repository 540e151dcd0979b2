//! Account status endpoints.

use axum::{Json, Router, extract::State, routing::post};
use gavel_common::AppResult;
use gavel_db::entities::account::AccountStatus;
use gavel_db::repositories::ViolationCounts;
use serde::{Deserialize, Serialize};

use crate::endpoints::violations::{ActionResponse, ViolationResponse};
use crate::{extractors::AuthAdmin, middleware::AppState, response::ApiResponse};

/// Account status request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusRequest {
    pub account_id: String,
}

/// Account status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusResponse {
    pub current_status: AccountStatus,
    pub violation_counts: ViolationCounts,
    pub recent_violations: Vec<ViolationResponse>,
    pub last_action: Option<ActionResponse>,
    pub active_actions: Vec<ActionResponse>,
    pub history: Vec<ActionResponse>,
}

async fn account_status(
    AuthAdmin(_admin_id): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<AccountStatusRequest>,
) -> AppResult<ApiResponse<AccountStatusResponse>> {
    let report = state.status_service.get_status(&req.account_id).await?;

    Ok(ApiResponse::ok(AccountStatusResponse {
        current_status: report.current_status,
        violation_counts: report.violation_counts,
        recent_violations: report
            .recent_violations
            .into_iter()
            .map(Into::into)
            .collect(),
        last_action: report.last_action.map(Into::into),
        active_actions: report.active_actions.into_iter().map(Into::into).collect(),
        history: report.history.into_iter().map(Into::into).collect(),
    }))
}

/// Create the status router.
pub fn router() -> Router<AppState> {
    Router::new().route("/status", post(account_status))
}
