// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook::find_conflict;
use fieldbook_audit::AuditEvent;
use fieldbook_domain::{Facility, Reservation, ReservationStatus, format_date, format_time};
use tracing::{info, warn};

use crate::data_models::format_timestamp;
use crate::diesel_schema::reservations;
use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;
use crate::queries::facilities::get_facility;
use crate::queries::reservations::{list_confirmed_on, reservation_version};

/// Inserts a new reservation and its audit event.
///
/// # Returns
///
/// The audit event ID.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn insert_reservation(
    conn: &mut SqliteConnection,
    reservation: &Reservation,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let created_at: String = format_timestamp(reservation.created_at)?;
    let updated_at: String = format_timestamp(reservation.updated_at)?;

    conn.immediate_transaction(|conn| {
        diesel::insert_into(reservations::table)
            .values((
                reservations::id.eq(reservation.id.as_str()),
                reservations::field_id.eq(reservation.field_id.as_str()),
                reservations::client_id.eq(reservation.client_id.as_str()),
                reservations::date.eq(format_date(reservation.date)),
                reservations::start_time.eq(format_time(reservation.slot.start())),
                reservations::end_time.eq(format_time(reservation.slot.end())),
                reservations::total_price.eq(reservation.total_price),
                reservations::status.eq(reservation.status.as_str()),
                reservations::status_reason.eq(reservation.status_reason.as_deref()),
                reservations::version.eq(reservation.version),
                reservations::created_at.eq(&created_at),
                reservations::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

        let event_id: i64 = insert_audit_event(conn, event)?;
        info!(
            reservation_id = %reservation.id,
            field_id = %reservation.field_id,
            date = %reservation.date,
            slot = %reservation.slot,
            "Reservation created"
        );
        Ok(event_id)
    })
}

/// Writes a reservation's status if its stored version still equals
/// `expected_version`.
///
/// A write that leaves the reservation `confirmed` re-runs the overlap check
/// against the confirmed reservations committed so far, inside the same
/// transaction.
///
/// # Returns
///
/// The audit event ID.
///
/// # Errors
///
/// Returns `PersistenceError::StaleVersion` if the reservation changed since
/// it was read, `PersistenceError::ConcurrentConflict` if an overlapping
/// reservation was confirmed in the meantime, or another error if the write
/// fails.
pub fn update_reservation(
    conn: &mut SqliteConnection,
    reservation: &Reservation,
    expected_version: i64,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let updated_at: String = format_timestamp(reservation.updated_at)?;

    conn.immediate_transaction(|conn| {
        let found: i64 = reservation_version(conn, &reservation.id)?.ok_or_else(|| {
            PersistenceError::NotFound {
                collection: "reservations",
                id: reservation.id.to_string(),
            }
        })?;
        if found != expected_version {
            return Err(PersistenceError::StaleVersion {
                collection: "reservations",
                id: reservation.id.to_string(),
                expected: expected_version,
                found,
            });
        }

        if reservation.status == ReservationStatus::Confirmed {
            let facility: Option<Facility> = get_facility(conn, &reservation.field_id)?;
            if let Some(facility) = facility.filter(|f| !f.is_bookable()) {
                warn!(
                    reservation_id = %reservation.id,
                    field_id = %reservation.field_id,
                    status = facility.status.as_str(),
                    "Facility closed to bookings before confirmation"
                );
                return Err(PersistenceError::FacilityNotBookable {
                    field_id: reservation.field_id.to_string(),
                    status: facility.status.as_str().to_string(),
                });
            }

            let confirmed: Vec<Reservation> =
                list_confirmed_on(conn, &reservation.field_id, reservation.date)?;
            let blocking: Option<&Reservation> = find_conflict(
                &confirmed,
                &reservation.field_id,
                reservation.date,
                &reservation.slot,
                Some(&reservation.id),
            );
            if let Some(blocking) = blocking {
                warn!(
                    reservation_id = %reservation.id,
                    blocking_id = %blocking.id,
                    field_id = %reservation.field_id,
                    date = %reservation.date,
                    "Overlapping reservation confirmed concurrently"
                );
                return Err(PersistenceError::ConcurrentConflict {
                    blocking_id: blocking.id.to_string(),
                });
            }
        }

        diesel::update(reservations::table)
            .filter(reservations::id.eq(reservation.id.as_str()))
            .set((
                reservations::status.eq(reservation.status.as_str()),
                reservations::status_reason.eq(reservation.status_reason.as_deref()),
                reservations::version.eq(reservation.version),
                reservations::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

        let event_id: i64 = insert_audit_event(conn, event)?;
        info!(
            reservation_id = %reservation.id,
            status = reservation.status.as_str(),
            version = reservation.version,
            "Reservation updated"
        );
        Ok(event_id)
    })
}
