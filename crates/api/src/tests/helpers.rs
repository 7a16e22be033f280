// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::{Arc, Mutex};

use fieldbook::Policy;
use fieldbook_domain::{Facility, Reservation};
use fieldbook_persistence::Store;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::handlers::{
    approve_facility, bootstrap_admin, create_facility, create_reservation, login, register,
};
use crate::request_response::{
    CreateReservationRequest, FacilityRequest, LoginRequest, RegisterRequest, ReviewRequest,
};
use crate::{
    AuthenticatedSession, Email, IdentityVerifier, MailError, Mailer, ServiceSettings, Services,
};

pub const PASSWORD: &str = "Sunny-Fields-42";
pub const TOMORROW: &str = "2026-10-16";

pub fn fixed_now() -> OffsetDateTime {
    datetime!(2026-10-15 09:00 UTC)
}

/// Keeps every email it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Refuses every email.
#[derive(Clone, Copy, Default)]
pub struct FailingMailer;

impl Mailer for FailingMailer {
    async fn send(&self, _email: &Email) -> Result<(), MailError> {
        Err(MailError::Send(String::from("relay unreachable")))
    }
}

pub fn services_with<M: Mailer>(mailer: M) -> Services<M> {
    let settings: ServiceSettings = ServiceSettings {
        password_hash_cost: 4,
        ..ServiceSettings::default()
    };
    Services::new(
        Store::new_in_memory().unwrap(),
        Policy::new(None),
        mailer,
        &settings,
    )
    .with_clock(fixed_now)
}

pub fn services() -> Services<RecordingMailer> {
    services_with(RecordingMailer::default())
}

pub async fn sign_in<M: Mailer>(services: &Services<M>, email: &str) -> AuthenticatedSession {
    let response = login(
        services,
        LoginRequest {
            email: String::from(email),
            password: String::from(PASSWORD),
        },
    )
    .await
    .unwrap();
    services.identity.verify(&response.token).await.unwrap()
}

/// Registers an account and signs it in.
pub async fn signup<M: Mailer>(
    services: &Services<M>,
    email: &str,
    name: &str,
    role: &str,
) -> AuthenticatedSession {
    register(
        services,
        RegisterRequest {
            email: String::from(email),
            display_name: String::from(name),
            password: String::from(PASSWORD),
            role: String::from(role),
        },
    )
    .await
    .unwrap();
    sign_in(services, email).await
}

/// Bootstraps the first administrator and signs it in.
pub async fn admin_session<M: Mailer>(services: &Services<M>) -> AuthenticatedSession {
    bootstrap_admin(services, "admin@example.com", PASSWORD)
        .await
        .unwrap()
        .unwrap();
    sign_in(services, "admin@example.com").await
}

pub fn facility_request(name: &str) -> FacilityRequest {
    FacilityRequest {
        name: String::from(name),
        location: String::from("North Park"),
        price_per_hour: 6000,
        opening_time: String::from("08:00"),
        closing_time: String::from("22:00"),
        version: None,
    }
}

pub async fn approved_facility<M: Mailer>(
    services: &Services<M>,
    owner: &AuthenticatedSession,
    admin: &AuthenticatedSession,
    name: &str,
) -> Facility {
    let created = create_facility(services, owner, facility_request(name))
        .await
        .unwrap();
    approve_facility(
        services,
        admin,
        created.facility.id.as_str(),
        ReviewRequest::default(),
    )
    .await
    .unwrap()
    .facility
}

pub async fn request_slot<M: Mailer>(
    services: &Services<M>,
    client: &AuthenticatedSession,
    facility: &Facility,
    start: &str,
    end: &str,
) -> Reservation {
    create_reservation(
        services,
        client,
        CreateReservationRequest {
            field_id: facility.id.to_string(),
            date: String::from(TOMORROW),
            start_time: String::from(start),
            end_time: String::from(end),
        },
    )
    .await
    .unwrap()
    .reservation
}

/// A running platform: one admin, one associate owning an approved
/// facility, and one client.
pub struct World<M> {
    pub services: Services<M>,
    pub admin: AuthenticatedSession,
    pub owner: AuthenticatedSession,
    pub client: AuthenticatedSession,
    pub facility: Facility,
}

pub async fn world_with<M: Mailer>(mailer: M) -> World<M> {
    let services: Services<M> = services_with(mailer);
    let admin: AuthenticatedSession = admin_session(&services).await;
    let owner: AuthenticatedSession =
        signup(&services, "owner@example.com", "Olive Owner", "associate").await;
    let client: AuthenticatedSession =
        signup(&services, "client@example.com", "Cleo Client", "client").await;
    let facility: Facility = approved_facility(&services, &owner, &admin, "Court One").await;
    World {
        services,
        admin,
        owner,
        client,
        facility,
    }
}

pub async fn world() -> World<RecordingMailer> {
    world_with(RecordingMailer::default()).await
}
