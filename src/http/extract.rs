//! Bearer-token extractors.
//!
//! Authentication is an explicit per-route choice: handlers that must know
//! the caller take [`AuthUser`]; handlers that only record identity when
//! one happens to be present take [`OptionalUser`]. Routes without either
//! are open.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::Utc;

use super::error::AppError;
use super::state::AppState;
use crate::auth::{bearer_token, Claims};

fn claims_from_parts(parts: &Parts, state: &AppState) -> Option<Claims> {
    let header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = bearer_token(header)?;
    state.tokens.verify(token, Utc::now()).ok()
}

/// Required bearer identity; rejects with 401 when absent or invalid.
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        claims_from_parts(parts, state)
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
    }
}

/// Best-effort bearer identity; any failure yields `None`.
pub struct OptionalUser(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(claims_from_parts(parts, state)))
    }
}
