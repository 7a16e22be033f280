// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility and favorite mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_audit::AuditEvent;
use fieldbook_domain::{Facility, FacilityId, FacilityStatus, UserId, format_time};
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::data_models::format_timestamp;
use crate::diesel_schema::{facilities, favorites};
use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;
use crate::queries::facilities::facility_version;
use crate::queries::reservations::count_future_confirmed;

/// Inserts a new facility and its audit event.
///
/// # Returns
///
/// The audit event ID.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn insert_facility(
    conn: &mut SqliteConnection,
    facility: &Facility,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let created_at: String = format_timestamp(facility.created_at)?;
    let updated_at: String = format_timestamp(facility.updated_at)?;

    conn.immediate_transaction(|conn| {
        diesel::insert_into(facilities::table)
            .values((
                facilities::id.eq(facility.id.as_str()),
                facilities::owner_id.eq(facility.owner_id.as_str()),
                facilities::name.eq(&facility.details.name),
                facilities::location.eq(&facility.details.location),
                facilities::price_per_hour.eq(facility.details.price_per_hour),
                facilities::opening_time.eq(format_time(facility.details.opening_time)),
                facilities::closing_time.eq(format_time(facility.details.closing_time)),
                facilities::status.eq(facility.status.as_str()),
                facilities::version.eq(facility.version),
                facilities::created_at.eq(&created_at),
                facilities::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

        let event_id: i64 = insert_audit_event(conn, event)?;
        info!(facility_id = %facility.id, owner_id = %facility.owner_id, "Facility created");
        Ok(event_id)
    })
}

/// Writes a facility if its stored version still equals `expected_version`.
///
/// A write that leaves the facility `disabled` re-counts confirmed
/// reservations dated `today` or later inside the transaction.
///
/// # Returns
///
/// The audit event ID.
///
/// # Errors
///
/// Returns `PersistenceError::StaleVersion` if the facility changed since it
/// was read, `PersistenceError::HasFutureReservations` if upcoming confirmed
/// reservations appeared, or another error if the write fails.
pub fn update_facility(
    conn: &mut SqliteConnection,
    facility: &Facility,
    expected_version: i64,
    event: &AuditEvent,
    today: Date,
) -> Result<i64, PersistenceError> {
    let updated_at: String = format_timestamp(facility.updated_at)?;
    let reviewed_at: Option<String> = facility.reviewed_at.map(format_timestamp).transpose()?;

    conn.immediate_transaction(|conn| {
        let found: i64 =
            facility_version(conn, &facility.id)?.ok_or_else(|| PersistenceError::NotFound {
                collection: "facilities",
                id: facility.id.to_string(),
            })?;
        if found != expected_version {
            return Err(PersistenceError::StaleVersion {
                collection: "facilities",
                id: facility.id.to_string(),
                expected: expected_version,
                found,
            });
        }

        if facility.status == FacilityStatus::Disabled {
            let count: usize = count_future_confirmed(conn, &facility.id, today)?;
            if count > 0 {
                warn!(
                    facility_id = %facility.id,
                    count,
                    "Confirmed reservations appeared before disabling"
                );
                return Err(PersistenceError::HasFutureReservations { count });
            }
        }

        diesel::update(facilities::table)
            .filter(facilities::id.eq(facility.id.as_str()))
            .set((
                facilities::name.eq(&facility.details.name),
                facilities::location.eq(&facility.details.location),
                facilities::price_per_hour.eq(facility.details.price_per_hour),
                facilities::opening_time.eq(format_time(facility.details.opening_time)),
                facilities::closing_time.eq(format_time(facility.details.closing_time)),
                facilities::status.eq(facility.status.as_str()),
                facilities::reviewed_by.eq(facility.reviewed_by.as_ref().map(UserId::as_str)),
                facilities::reviewed_at.eq(reviewed_at.as_deref()),
                facilities::review_note.eq(facility.review_note.as_deref()),
                facilities::version.eq(facility.version),
                facilities::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

        let event_id: i64 = insert_audit_event(conn, event)?;
        info!(
            facility_id = %facility.id,
            status = facility.status.as_str(),
            version = facility.version,
            "Facility updated"
        );
        Ok(event_id)
    })
}

/// Adds a favorite.
///
/// # Returns
///
/// `false` if the facility was already a favorite.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn add_favorite(
    conn: &mut SqliteConnection,
    user_id: &UserId,
    facility_id: &FacilityId,
    now: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let inserted: usize = diesel::insert_or_ignore_into(favorites::table)
        .values((
            favorites::user_id.eq(user_id.as_str()),
            favorites::facility_id.eq(facility_id.as_str()),
            favorites::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;
    Ok(inserted > 0)
}

/// Removes a favorite.
///
/// # Returns
///
/// `false` if the facility was not a favorite.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_favorite(
    conn: &mut SqliteConnection,
    user_id: &UserId,
    facility_id: &FacilityId,
) -> Result<bool, PersistenceError> {
    let deleted: usize = diesel::delete(
        favorites::table
            .filter(favorites::user_id.eq(user_id.as_str()))
            .filter(favorites::facility_id.eq(facility_id.as_str())),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}
