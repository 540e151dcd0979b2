//! API integration tests.
//!
//! These tests exercise the router, authentication middleware and
//! handlers against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use gavel_api::{
    middleware::{AppState, auth_middleware},
    router as api_router,
};
use gavel_common::config::{
    AdminToken, AuthConfig, Config, DatabaseConfig, ServerConfig, SweepConfig,
};
use gavel_core::{
    ActionExecutor, DeadlineProcessor, OverrideService, StatusService, TracingSink,
    ViolationService,
};
use gavel_db::entities::{account, enforcement_action, violation};
use gavel_db::repositories::{AccountRepository, EnforcementRepository, ViolationRepository};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            admin_tokens: vec![AdminToken {
                id: "admin1".to_string(),
                token: "admin-secret".to_string(),
            }],
            scheduler_token: "sched-secret".to_string(),
            ingest_token: "ingest-secret".to_string(),
        },
        sweep: SweepConfig::default(),
    }
}

fn test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let config = Arc::new(test_config());

    let account_repo = AccountRepository::new(Arc::clone(&db));
    let enforcement_repo = EnforcementRepository::new(Arc::clone(&db));
    let violation_repo = ViolationRepository::new(Arc::clone(&db));

    let executor = ActionExecutor::new(
        Arc::clone(&db),
        account_repo.clone(),
        enforcement_repo.clone(),
        Arc::new(TracingSink),
    );
    let sweep = DeadlineProcessor::new(
        account_repo.clone(),
        enforcement_repo.clone(),
        executor.clone(),
        config.sweep.clone(),
    );
    let violation_service = ViolationService::new(
        account_repo.clone(),
        violation_repo.clone(),
        executor.clone(),
        config.sweep.escalation_window_hours,
    );
    let override_service = OverrideService::new(account_repo.clone(), enforcement_repo.clone());
    let status_service = StatusService::new(account_repo, violation_repo, enforcement_repo);

    AppState {
        violation_service,
        executor,
        sweep,
        status_service,
        override_service,
        config,
    }
}

fn test_app(state: AppState) -> Router {
    Router::new()
        .merge(api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn post_json(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app(test_state(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    ));

    let res = app
        .oneshot(post_json("/sweep/run", None, "{}"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ingest_token_cannot_trigger_sweep() {
    let app = test_app(test_state(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    ));

    let res = app
        .oneshot(post_json("/sweep/run", Some("ingest-secret"), "{}"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_scheduler_token_cannot_issue_actions() {
    let app = test_app(test_state(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    ));

    let res = app
        .oneshot(post_json(
            "/admin/actions/issue",
            Some("sched-secret"),
            r#"{"accountId":"acct1","kind":"warning","message":"hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sweep_with_no_due_rows_returns_empty_summary() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<enforcement_action::Model>::new()])
        .into_connection();
    let app = test_app(test_state(db));

    let res = app
        .oneshot(post_json("/sweep/run", Some("sched-secret"), "{}"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["escalated"], serde_json::json!([]));
    assert_eq!(json["data"]["skipped"], 0);
}

#[tokio::test]
async fn test_status_of_unknown_account_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<account::Model>::new()])
        .into_connection();
    let app = test_app(test_state(db));

    let res = app
        .oneshot(post_json(
            "/accounts/status",
            Some("admin-secret"),
            r#"{"accountId":"ghost"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "UNKNOWN_ACCOUNT");
}

#[tokio::test]
async fn test_record_low_severity_violation() {
    let now = Utc::now();
    let account_row = account::Model {
        id: "acct1".to_string(),
        status: account::AccountStatus::Active,
        created_at: now.into(),
    };
    let violation_row = violation::Model {
        id: "v1".to_string(),
        account_id: "acct1".to_string(),
        severity: violation::Severity::Low,
        reason: "Spam content".to_string(),
        detected_at: now.into(),
        created_at: now.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[account_row]])
        .append_query_results([[violation_row]])
        .into_connection();
    let app = test_app(test_state(db));

    let res = app
        .oneshot(post_json(
            "/violations/record",
            Some("ingest-secret"),
            r#"{"accountId":"acct1","severity":"low","reason":"Spam content"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["violation"]["severity"], "low");
    assert!(json["data"].get("fastPathAction").is_none());
}

#[tokio::test]
async fn test_admin_cannot_pin_reinstatement_override() {
    let app = test_app(test_state(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    ));

    let res = app
        .oneshot(post_json(
            "/admin/overrides/set",
            Some("admin-secret"),
            r#"{"accountId":"acct1","pinnedKind":"reinstatement"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
