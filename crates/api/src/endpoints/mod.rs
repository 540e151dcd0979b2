//! API endpoints.

mod admin;
mod status;
mod sweep;
mod violations;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/violations", violations::router())
        .nest("/admin", admin::router())
        .nest("/sweep", sweep::router())
        .nest("/accounts", status::router())
}
