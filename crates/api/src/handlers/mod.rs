// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request handlers.
//!
//! Each handler takes the shared [`Services`](crate::Services), the
//! authenticated caller where one is required, and the request DTO.

mod accounts;
mod activity;
mod facilities;
mod reservations;

pub use accounts::{
    bootstrap_admin, create_user, login, logout, register, set_role, set_status,
    toggle_user_status, whoami,
};
pub use activity::{audit_log, list_notifications, mark_notification_read};
pub use facilities::{
    add_favorite, approve_facility, availability, create_facility, edit_facility, facility_detail,
    facility_reservations, list_approved_facilities, list_favorites, list_my_facilities,
    reject_facility, remove_favorite, review_queue, toggle_facility_status,
};
pub use reservations::{
    cancel_reservation, complete_reservation, confirm_reservation, create_reservation,
    my_reservations, override_reservation, send_ticket_email,
};

use fieldbook::{Action, CoreError, Resource};
use fieldbook_domain::{
    Facility, FacilityId, Reservation, ReservationId, Role, TimeSlot, User, UserId, parse_date,
};
use fieldbook_persistence::Store;
use time::Date;
use tracing::warn;

use crate::Services;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::identity::AuthenticatedSession;
use crate::mail::Mailer;

/// Runs a policy check outside a planning function.
fn authorize<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    action: Action,
    resource: Resource<'_>,
) -> Result<(), ApiError> {
    services
        .policy
        .authorize(&session.actor, action, resource)
        .map_err(|denial| translate_core_error(CoreError::from(denial)))
}

async fn load_facility(store: &Store, id: &FacilityId) -> Result<Facility, ApiError> {
    store
        .get_facility(id)
        .await
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("facility", id.as_str()))
}

async fn load_reservation(store: &Store, id: &ReservationId) -> Result<Reservation, ApiError> {
    store
        .get_reservation(id)
        .await
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("reservation", id.as_str()))
}

async fn load_user(store: &Store, id: &UserId) -> Result<User, ApiError> {
    store
        .get_user(id)
        .await
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("user", id.as_str()))
}

/// Translates a planning error, naming the holder of a blocking reservation.
async fn plan_error(store: &Store, err: CoreError) -> ApiError {
    let mut translated: ApiError = translate_core_error(err);
    if let ApiError::ConflictingReservation {
        holder_id,
        holder_name,
        ..
    } = &mut translated
    {
        match store.get_user(&UserId::new(holder_id.as_str())).await {
            Ok(Some(holder)) => *holder_name = holder.display_name,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to look up reservation holder"),
        }
    }
    translated
}

fn parse_role(value: &str) -> Result<Role, ApiError> {
    value.parse::<Role>().map_err(translate_domain_error)
}

fn parse_date_field(value: &str) -> Result<Date, ApiError> {
    parse_date(value).map_err(translate_domain_error)
}

fn parse_slot(start: &str, end: &str) -> Result<TimeSlot, ApiError> {
    TimeSlot::parse(start, end).map_err(translate_domain_error)
}
