// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ActorContext, Policy};
use fieldbook_domain::{
    Facility, FacilityDetails, FacilityId, FacilityStatus, Reservation, ReservationId,
    ReservationStatus, Role, TimeSlot, User, UserId, UserStatus,
};
use time::macros::{date, datetime, time};
use time::{Date, OffsetDateTime};

pub const SUPER_ADMIN: &str = "admin-root";

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
    Policy::new(Some(UserId::new(SUPER_ADMIN)))
}

pub fn actor(id: &str, role: Role) -> ActorContext {
    ActorContext::new(UserId::new(id), role, UserStatus::Active)
}

pub fn disabled_actor(id: &str, role: Role) -> ActorContext {
    ActorContext::new(UserId::new(id), role, UserStatus::Disabled)
}

pub fn admin() -> ActorContext {
    actor("admin-1", Role::Admin)
}

pub fn super_admin() -> ActorContext {
    actor(SUPER_ADMIN, Role::Admin)
}

pub fn owner() -> ActorContext {
    actor("owner-1", Role::Associate)
}

pub fn other_associate() -> ActorContext {
    actor("owner-2", Role::Associate)
}

pub fn client() -> ActorContext {
    actor("client-1", Role::Client)
}

pub fn user(id: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        email: format!("{id}@example.com"),
        display_name: id.to_uppercase(),
        role,
        status: UserStatus::Active,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn details() -> FacilityDetails {
    FacilityDetails {
        name: String::from("Field 1"),
        location: String::from("North Park"),
        price_per_hour: 5000,
        opening_time: time!(8:00),
        closing_time: time!(22:00),
    }
}

pub fn facility(status: FacilityStatus) -> Facility {
    Facility {
        id: FacilityId::new("field-1"),
        owner_id: UserId::new("owner-1"),
        details: details(),
        status,
        reviewed_by: None,
        reviewed_at: None,
        review_note: None,
        version: 1,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot::parse(start, end).unwrap()
}

pub fn reservation(id: &str, client: &str, slot: TimeSlot, status: ReservationStatus) -> Reservation {
    Reservation {
        id: ReservationId::new(id),
        field_id: FacilityId::new("field-1"),
        client_id: UserId::new(client),
        date: tomorrow(),
        slot,
        total_price: 5000,
        status,
        status_reason: None,
        version: 1,
        created_at: now(),
        updated_at: now(),
    }
}
