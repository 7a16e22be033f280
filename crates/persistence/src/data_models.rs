// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and conversions between stored text and domain values.
//!
//! Dates are stored as `YYYY-MM-DD`, times of day as `HH:MM` and instants as
//! RFC 3339 text. Enumerations are stored by their `as_str` names.

use diesel::prelude::*;
use fieldbook_audit::{Action, Actor, AuditEvent, EntityKind, EntityRef};
use fieldbook_domain::{
    Facility, FacilityDetails, FacilityId, Notification, NotificationId, Reservation,
    ReservationId, Role, TimeSlot, User, UserId, parse_date, parse_time,
};
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{audit_events, facilities, notifications, reservations, sessions, users};
use crate::error::PersistenceError;

/// Formats an instant for storage.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented in RFC 3339.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::QueryFailed(format!("Failed to format timestamp: {e}")))
}

/// Parses a stored RFC 3339 instant.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptValue` if the text is not RFC 3339.
pub fn parse_timestamp(column: &'static str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|_| corrupt(column, value))
}

fn corrupt(column: &'static str, value: &str) -> PersistenceError {
    PersistenceError::CorruptValue {
        column,
        value: value.to_string(),
    }
}

fn parse_enum<T: FromStr>(column: &'static str, value: &str) -> Result<T, PersistenceError> {
    value.parse::<T>().map_err(|_| corrupt(column, value))
}

fn parse_optional_timestamp(
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(|v| parse_timestamp(column, v)).transpose()
}

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub token: String,
    pub user_id: UserId,
    /// Role the user held when the session was issued.
    pub role_claim: Role,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// A user together with their password hash, for login checks only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub fn into_credentials(self) -> Result<Credentials, PersistenceError> {
        let user: User = User {
            id: UserId::new(self.id),
            email: self.email,
            display_name: self.display_name,
            role: parse_enum("users.role", &self.role)?,
            status: parse_enum("users.status", &self.status)?,
            created_at: parse_timestamp("users.created_at", &self.created_at)?,
            updated_at: parse_timestamp("users.updated_at", &self.updated_at)?,
        };
        Ok(Credentials {
            user,
            password_hash: self.password_hash,
        })
    }

    pub fn into_user(self) -> Result<User, PersistenceError> {
        self.into_credentials().map(|c| c.user)
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = facilities)]
pub(crate) struct FacilityRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub location: String,
    pub price_per_hour: i64,
    pub opening_time: String,
    pub closing_time: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub review_note: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl FacilityRow {
    pub fn into_facility(self) -> Result<Facility, PersistenceError> {
        let details: FacilityDetails = FacilityDetails {
            name: self.name,
            location: self.location,
            price_per_hour: self.price_per_hour,
            opening_time: parse_time(&self.opening_time)
                .map_err(|_| corrupt("facilities.opening_time", &self.opening_time))?,
            closing_time: parse_time(&self.closing_time)
                .map_err(|_| corrupt("facilities.closing_time", &self.closing_time))?,
        };
        Ok(Facility {
            id: FacilityId::new(self.id),
            owner_id: UserId::new(self.owner_id),
            details,
            status: parse_enum("facilities.status", &self.status)?,
            reviewed_by: self.reviewed_by.map(UserId::new),
            reviewed_at: parse_optional_timestamp(
                "facilities.reviewed_at",
                self.reviewed_at.as_deref(),
            )?,
            review_note: self.review_note,
            version: self.version,
            created_at: parse_timestamp("facilities.created_at", &self.created_at)?,
            updated_at: parse_timestamp("facilities.updated_at", &self.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = reservations)]
pub(crate) struct ReservationRow {
    pub id: String,
    pub field_id: String,
    pub client_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub total_price: i64,
    pub status: String,
    pub status_reason: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl ReservationRow {
    pub fn into_reservation(self) -> Result<Reservation, PersistenceError> {
        let slot: TimeSlot = TimeSlot::parse(&self.start_time, &self.end_time).map_err(|_| {
            corrupt(
                "reservations.start_time",
                &format!("{}-{}", self.start_time, self.end_time),
            )
        })?;
        Ok(Reservation {
            id: ReservationId::new(self.id),
            field_id: FacilityId::new(self.field_id),
            client_id: UserId::new(self.client_id),
            date: parse_date(&self.date).map_err(|_| corrupt("reservations.date", &self.date))?,
            slot,
            total_price: self.total_price,
            status: parse_enum("reservations.status", &self.status)?,
            status_reason: self.status_reason,
            version: self.version,
            created_at: parse_timestamp("reservations.created_at", &self.created_at)?,
            updated_at: parse_timestamp("reservations.updated_at", &self.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = notifications)]
pub(crate) struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub related_id: Option<String>,
    pub is_read: i32,
    pub created_at: String,
}

impl NotificationRow {
    pub fn into_notification(self) -> Result<Notification, PersistenceError> {
        Ok(Notification {
            id: NotificationId::new(self.id),
            user_id: UserId::new(self.user_id),
            kind: parse_enum("notifications.kind", &self.kind)?,
            title: self.title,
            message: self.message,
            related_id: self.related_id,
            read: self.is_read != 0,
            created_at: parse_timestamp("notifications.created_at", &self.created_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
pub(crate) struct SessionRow {
    pub token: String,
    pub user_id: String,
    pub role_claim: String,
    pub created_at: String,
    pub expires_at: String,
}

impl SessionRow {
    pub fn into_session(self) -> Result<SessionData, PersistenceError> {
        Ok(SessionData {
            role_claim: parse_enum("sessions.role_claim", &self.role_claim)?,
            created_at: parse_timestamp("sessions.created_at", &self.created_at)?,
            expires_at: parse_timestamp("sessions.expires_at", &self.expires_at)?,
            token: self.token,
            user_id: UserId::new(self.user_id),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
pub(crate) struct AuditEventRow {
    pub event_id: i64,
    pub entity_kind: String,
    pub entity_id: String,
    pub actor_id: String,
    pub actor_role: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub before_status: Option<String>,
    pub after_status: Option<String>,
    pub reason: Option<String>,
    pub recorded_at: String,
}

impl AuditEventRow {
    pub fn into_recorded(self) -> Result<RecordedAuditEvent, PersistenceError> {
        let event: AuditEvent = AuditEvent::new(
            Actor::new(
                UserId::new(self.actor_id),
                parse_enum("audit_events.actor_role", &self.actor_role)?,
            ),
            Action::new(self.action_name, self.action_details),
            EntityRef::new(
                parse_enum::<EntityKind>("audit_events.entity_kind", &self.entity_kind)?,
                self.entity_id,
            ),
            self.before_status,
            self.after_status,
            parse_timestamp("audit_events.recorded_at", &self.recorded_at)?,
        )
        .with_reason(self.reason);
        Ok(RecordedAuditEvent {
            event_id: self.event_id,
            event,
        })
    }
}

/// An audit event as stored, with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAuditEvent {
    pub event_id: i64,
    pub event: AuditEvent,
}
