// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Store;
use fieldbook::{
    ActorContext, Policy, ReservationCommand, plan_create_facility, plan_create_reservation,
    plan_facility_transition, plan_register, plan_reservation_transition,
};
use fieldbook_domain::{
    Facility, FacilityDetails, FacilityTransition, Reservation, Role, TimeSlot, User,
};
use time::macros::{date, datetime, time};
use time::{Date, OffsetDateTime};

pub fn now() -> OffsetDateTime {
    datetime!(2026-10-15 09:00 UTC)
}

pub fn today() -> Date {
    date!(2026 - 10 - 15)
}

pub fn tomorrow() -> Date {
    date!(2026 - 10 - 16)
}

pub fn policy() -> Policy {
    Policy::new(None)
}

pub fn details(name: &str) -> FacilityDetails {
    FacilityDetails {
        name: String::from(name),
        location: String::from("North Park"),
        price_per_hour: 6000,
        opening_time: time!(8:00),
        closing_time: time!(22:00),
    }
}

pub fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot::parse(start, end).unwrap()
}

/// Registers a user through the account planner and stores it.
pub async fn register(store: &Store, email: &str, role: Role) -> User {
    let outcome = plan_register(email, "Test User", role, now()).unwrap();
    store
        .create_user(&outcome.user, "not-a-real-hash", &outcome.audit_event)
        .await
        .unwrap();
    outcome.user
}

/// Stores an admin directly, bypassing self-registration rules.
pub async fn admin(store: &Store) -> User {
    let mut outcome = plan_register("admin@example.com", "Admin", Role::Client, now()).unwrap();
    outcome.user.role = Role::Admin;
    store
        .create_user(&outcome.user, "not-a-real-hash", &outcome.audit_event)
        .await
        .unwrap();
    outcome.user
}

/// Creates and approves a facility owned by `owner`.
pub async fn approved_facility(store: &Store, owner: &User, admin: &User) -> Facility {
    let created = plan_create_facility(
        &policy(),
        &ActorContext::from_user(owner),
        details("Field 1"),
        now(),
    )
    .unwrap();
    store
        .create_facility(&created.facility, &created.audit_event)
        .await
        .unwrap();

    let approved = plan_facility_transition(
        &policy(),
        &ActorContext::from_user(admin),
        &created.facility,
        FacilityTransition::Approve,
        0,
        None,
        now(),
    )
    .unwrap();
    store
        .update_facility(
            &approved.facility,
            created.facility.version,
            &approved.audit_event,
            today(),
        )
        .await
        .unwrap();
    approved.facility
}

/// Creates a pending reservation for tomorrow.
pub async fn pending_reservation(
    store: &Store,
    client: &User,
    facility: &Facility,
    slot: TimeSlot,
) -> Reservation {
    let outcome = plan_create_reservation(
        &policy(),
        &ActorContext::from_user(client),
        facility,
        tomorrow(),
        slot,
        today(),
        now(),
    )
    .unwrap();
    store
        .create_reservation(&outcome.reservation, &outcome.audit_event)
        .await
        .unwrap();
    outcome.reservation
}

/// Confirms a reservation as `actor`, reading the same-day confirmations first.
pub async fn confirm(
    store: &Store,
    actor: &User,
    facility: &Facility,
    reservation: &Reservation,
) -> Reservation {
    let confirmed = store
        .list_confirmed_on(&reservation.field_id, reservation.date)
        .await
        .unwrap();
    let outcome = plan_reservation_transition(
        &policy(),
        &ActorContext::from_user(actor),
        facility,
        reservation,
        &ReservationCommand::Confirm,
        &confirmed,
        now(),
    )
    .unwrap();
    store
        .update_reservation(
            &outcome.reservation,
            reservation.version,
            &outcome.audit_event,
        )
        .await
        .unwrap();
    outcome.reservation
}
