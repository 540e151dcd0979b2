//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use crate::middleware::Principal;

/// Authenticated admin extractor. Holds the admin identifier.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub String);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::Admin { id }) => Ok(Self(id.clone())),
            Some(_) => Err((StatusCode::FORBIDDEN, "Admin token required")),
            None => Err((StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}

/// Extractor for the violation detector principal.
///
/// Admins may also submit violations, for backfills and manual reports.
#[derive(Debug, Clone)]
pub struct AuthIngest;

impl<S> FromRequestParts<S> for AuthIngest
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::Ingest | Principal::Admin { .. }) => Ok(Self),
            Some(Principal::Scheduler) => {
                Err((StatusCode::FORBIDDEN, "Ingest token required"))
            }
            None => Err((StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}

/// Extractor for sweep triggers.
///
/// The external scheduler is the primary caller; admins may also trigger
/// a sweep by hand.
#[derive(Debug, Clone)]
pub struct AuthSweeper;

impl<S> FromRequestParts<S> for AuthSweeper
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::Scheduler | Principal::Admin { .. }) => Ok(Self),
            Some(Principal::Ingest) => {
                Err((StatusCode::FORBIDDEN, "Scheduler token required"))
            }
            None => Err((StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}
