//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use gavel_common::config::Config;
use gavel_core::{
    ActionExecutor, DeadlineProcessor, OverrideService, StatusService, ViolationService,
};

/// The caller identity resolved from a bearer token.
#[derive(Debug, Clone)]
pub enum Principal {
    /// An administrative operator.
    Admin {
        /// Identifier recorded as `issued_by` on manual actions.
        id: String,
    },
    /// The external sweep scheduler.
    Scheduler,
    /// The external violation detector.
    Ingest,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub violation_service: ViolationService,
    pub executor: ActionExecutor,
    pub sweep: DeadlineProcessor,
    pub status_service: StatusService,
    pub override_service: OverrideService,
    pub config: Arc<Config>,
}

/// Authentication middleware.
///
/// Resolves the bearer token to a [`Principal`] and stashes it in the
/// request extensions. Unknown or absent tokens leave no principal; the
/// extractors reject those requests.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let principal = if token == state.config.auth.scheduler_token {
            Some(Principal::Scheduler)
        } else if token == state.config.auth.ingest_token {
            Some(Principal::Ingest)
        } else {
            state
                .config
                .admin_id_for_token(token)
                .map(|id| Principal::Admin { id: id.to_string() })
        };

        if let Some(principal) = principal {
            req.extensions_mut().insert(principal);
        }
    }

    next.run(req).await
}
