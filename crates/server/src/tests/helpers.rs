// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helpers for driving the router.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use fieldbook::Policy;
use fieldbook_api::handlers::{login, register};
use fieldbook_api::request_response::{LoginRequest, RegisterRequest};
use fieldbook_api::{
    AnyMailer, AuthenticatedSession, ConsoleMailer, IdentityVerifier, ServiceSettings, Services,
};
use fieldbook_persistence::Store;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;
use tower::ServiceExt;

use crate::{AppState, build_router};

pub const PASSWORD: &str = "Sunny-Fields-42";

fn fixed_now() -> OffsetDateTime {
    datetime!(2026-10-15 09:00 UTC)
}

pub fn create_test_app_state() -> AppState {
    create_test_app_state_over(
        Store::new_in_memory().expect("Failed to create in-memory store"),
        Policy::new(None),
    )
}

/// Builds services over an existing store, e.g. to name a super admin
/// bootstrapped through an earlier state.
pub fn create_test_app_state_over(store: Store, policy: Policy) -> AppState {
    let settings: ServiceSettings = ServiceSettings {
        password_hash_cost: 4,
        ..ServiceSettings::default()
    };
    let services: Services<AnyMailer> =
        Services::new(store, policy, AnyMailer::Console(ConsoleMailer), &settings)
            .with_clock(fixed_now);
    Arc::new(services)
}

pub fn create_test_app() -> (AppState, Router) {
    let state: AppState = create_test_app_state();
    let app: Router = build_router(state.clone());
    (state, app)
}

/// Registers and signs in directly through the handlers.
pub async fn signup(state: &AppState, email: &str, name: &str, role: &str) -> AuthenticatedSession {
    register(
        state,
        RegisterRequest {
            email: String::from(email),
            display_name: String::from(name),
            password: String::from(PASSWORD),
            role: String::from(role),
        },
    )
    .await
    .unwrap();
    sign_in(state, email).await
}

/// Signs in an existing account with the shared test password.
pub async fn sign_in(state: &AppState, email: &str) -> AuthenticatedSession {
    let response = login(
        state,
        LoginRequest {
            email: String::from(email),
            password: String::from(PASSWORD),
        },
    )
    .await
    .unwrap();
    state.identity.verify(&response.token).await.unwrap()
}

/// Sends one request and returns the status with the parsed JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request: Request<Body> = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
