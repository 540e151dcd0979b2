//! Violation ingestion endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use gavel_common::AppResult;
use gavel_core::RecordViolationInput;
use gavel_db::entities::{enforcement_action, violation};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthIngest, middleware::AppState, response::ApiResponse};

/// Record violation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViolationRequest {
    pub account_id: String,
    pub severity: violation::Severity,
    pub reason: String,
    pub detected_at: Option<DateTime<Utc>>,
}

/// Recorded violation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViolationResponse {
    pub violation: ViolationResponse,
    /// Set when a critical violation triggered an immediate suspension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast_path_action: Option<ActionResponse>,
}

/// Violation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationResponse {
    pub id: String,
    pub account_id: String,
    pub severity: violation::Severity,
    pub reason: String,
    pub detected_at: String,
    pub created_at: String,
}

impl From<violation::Model> for ViolationResponse {
    fn from(v: violation::Model) -> Self {
        Self {
            id: v.id,
            account_id: v.account_id,
            severity: v.severity,
            reason: v.reason,
            detected_at: v.detected_at.to_rfc3339(),
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

/// Enforcement action response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub id: String,
    pub account_id: String,
    pub kind: enforcement_action::ActionKind,
    pub message: String,
    pub effective_from: String,
    pub deadline: Option<String>,
    pub processed_at: Option<String>,
    pub issued_by: Option<String>,
    pub created_at: String,
}

impl From<enforcement_action::Model> for ActionResponse {
    fn from(a: enforcement_action::Model) -> Self {
        Self {
            id: a.id,
            account_id: a.account_id,
            kind: a.kind,
            message: a.message,
            effective_from: a.effective_from.to_rfc3339(),
            deadline: a.deadline.map(|t| t.to_rfc3339()),
            processed_at: a.processed_at.map(|t| t.to_rfc3339()),
            issued_by: a.issued_by,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

async fn record_violation(
    _: AuthIngest,
    State(state): State<AppState>,
    Json(req): Json<RecordViolationRequest>,
) -> AppResult<ApiResponse<RecordViolationResponse>> {
    let recorded = state
        .violation_service
        .record(RecordViolationInput {
            account_id: req.account_id,
            severity: req.severity,
            reason: req.reason,
            detected_at: req.detected_at,
        })
        .await?;

    Ok(ApiResponse::ok(RecordViolationResponse {
        violation: recorded.violation.into(),
        fast_path_action: recorded.fast_path_action.map(Into::into),
    }))
}

/// Create the violations router.
pub fn router() -> Router<AppState> {
    Router::new().route("/record", post(record_violation))
}
