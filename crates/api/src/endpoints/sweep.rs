//! Deadline sweep trigger endpoint.

use axum::{Router, extract::State, routing::post};
use gavel_common::AppResult;
use gavel_core::SweepSummary;

use crate::{extractors::AuthSweeper, middleware::AppState, response::ApiResponse};

/// Run one deadline sweep.
///
/// Always returns 200 with the summary: per-row failures are reported in
/// the body, not as an HTTP error, so the scheduler does not retry a run
/// whose rows are already claimed.
async fn run_sweep(
    _: AuthSweeper,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SweepSummary>> {
    let summary = state.sweep.run().await?;
    Ok(ApiResponse::ok(summary))
}

/// Create the sweep router.
pub fn router() -> Router<AppState> {
    Router::new().route("/run", post(run_sweep))
}
