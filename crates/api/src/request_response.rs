// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests carry raw text for dates, times and enumerations so that
//! malformed values are reported as `InvalidInput` on the named field.

use fieldbook_audit::AuditEvent;
use fieldbook_domain::{Facility, Notification, Reservation, TimeSlot, User, iso_date};
use time::{Date, OffsetDateTime};

/// Self-registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    /// `client` or `associate`.
    pub role: String,
}

/// Credentials for a new session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// An account created by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    /// Any role, including `admin`.
    pub role: String,
}

/// A role change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// An account status change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SetStatusRequest {
    /// `active` or `disabled`.
    pub status: String,
}

/// Facility details for creation or edit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FacilityRequest {
    pub name: String,
    pub location: String,
    /// Price in cents per hour.
    pub price_per_hour: i64,
    /// `HH:MM`.
    pub opening_time: String,
    /// `HH:MM`.
    pub closing_time: String,
    /// On edit, the version the caller last read. The edit is refused if
    /// the facility changed since.
    #[serde(default)]
    pub version: Option<i64>,
}

/// An approve or reject decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// A new reservation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateReservationRequest {
    pub field_id: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub start_time: String,
    /// `HH:MM`.
    pub end_time: String,
}

/// An administrative status override.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverrideRequest {
    pub status: String,
    pub reason: String,
}

/// Availability of a facility on one date, optionally checking a slot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// A plain acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    /// A successful acknowledgement with `message`.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// A user, after a change or lookup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

/// A newly issued session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: User,
}

/// A facility, after a change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FacilityResponse {
    pub success: bool,
    pub message: String,
    pub facility: Facility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_warning: Option<String>,
}

/// A list of facilities.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FacilityListResponse {
    pub facilities: Vec<Facility>,
}

/// A reservation, after a change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReservationResponse {
    pub success: bool,
    pub message: String,
    pub reservation: Reservation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_warning: Option<String>,
}

/// A list of reservations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<Reservation>,
}

/// Result of checking one slot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConflictResponse {
    pub conflict: bool,
    pub with_reservation_id: Option<String>,
}

/// Confirmed slots of a facility on one date.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AvailabilityResponse {
    pub field_id: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Confirmed slots, in booking order.
    pub booked: Vec<TimeSlot>,
    /// Present when a slot was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<ConflictResponse>,
}

/// Outcome of adding or removing a favorite.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FavoriteResponse {
    pub success: bool,
    pub message: String,
    pub facility_id: String,
    /// Whether the facility is a favorite after the request.
    pub favorite: bool,
}

/// The caller's notifications, newest first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread: usize,
}

/// One stored audit event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEntry {
    pub event_id: i64,
    #[serde(flatten)]
    pub event: AuditEvent,
}

/// The audit timeline of one entity, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditLogResponse {
    pub entity_id: String,
    pub events: Vec<AuditEntry>,
}
