// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Routes that need a caller take [`SessionUser`]; public reads that show
//! more to signed-in callers take [`OptionalSession`].

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use fieldbook_api::{ApiError, AuthenticatedSession, IdentityVerifier};
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// An authenticated caller.
///
/// # Authentication Flow
///
/// 1. Extract `Authorization: Bearer <token>`
/// 2. Verify the token through `IdentityVerifier::verify`, which checks
///    expiry and that the session's role claim still matches the account
/// 3. Return the verified session
///
/// # Errors
///
/// Rejects with 401 if the header is missing or malformed or the token
/// cannot be verified.
pub struct SessionUser(pub AuthenticatedSession);

/// A caller who may or may not be signed in.
///
/// A missing header yields `None`; a header that is present but invalid
/// still rejects with 401.
pub struct OptionalSession(pub Option<AuthenticatedSession>);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, HttpError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header: &str = value.to_str().map_err(|_| {
        warn!("Invalid Authorization header encoding");
        unauthenticated("Invalid Authorization header")
    })?;
    header.strip_prefix("Bearer ").map(Some).ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        unauthenticated("Expected 'Authorization: Bearer <token>'")
    })
}

fn unauthenticated(reason: &str) -> HttpError {
    HttpError::from(ApiError::Unauthenticated {
        reason: reason.to_string(),
    })
}

async fn verify(state: &AppState, token: &str) -> Result<AuthenticatedSession, HttpError> {
    let session: AuthenticatedSession = state
        .identity
        .verify(token)
        .await
        .map_err(|e| HttpError::from(ApiError::from(e)))?;
    debug!(
        user_id = %session.actor.user_id,
        role = %session.actor.role,
        "Session validated"
    );
    Ok(session)
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = bearer_token(parts)?.ok_or_else(|| {
            debug!("Missing Authorization header");
            unauthenticated("Missing Authorization header")
        })?;
        Ok(Self(verify(state, token).await?))
    }
}

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(Self(Some(verify(state, token).await?))),
            None => Ok(Self(None)),
        }
    }
}
