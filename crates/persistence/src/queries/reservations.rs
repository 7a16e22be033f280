// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_domain::{
    FacilityId, Reservation, ReservationId, ReservationStatus, UserId, format_date,
};
use time::Date;
use tracing::debug;

use crate::data_models::ReservationRow;
use crate::diesel_schema::reservations;
use crate::error::PersistenceError;

/// Retrieves a reservation by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the reservation is not found.
pub fn get_reservation(
    conn: &mut SqliteConnection,
    reservation_id: &ReservationId,
) -> Result<Option<Reservation>, PersistenceError> {
    debug!(reservation_id = %reservation_id, "Looking up reservation");

    let result: Result<ReservationRow, diesel::result::Error> = reservations::table
        .filter(reservations::id.eq(reservation_id.as_str()))
        .select(ReservationRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_reservation().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists confirmed reservations on one facility and date, in creation order.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_confirmed_on(
    conn: &mut SqliteConnection,
    field_id: &FacilityId,
    date: Date,
) -> Result<Vec<Reservation>, PersistenceError> {
    let rows: Vec<ReservationRow> = reservations::table
        .filter(reservations::field_id.eq(field_id.as_str()))
        .filter(reservations::date.eq(format_date(date)))
        .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
        .select(ReservationRow::as_select())
        .order(reservations::seq.asc())
        .load(conn)?;

    rows.into_iter().map(ReservationRow::into_reservation).collect()
}

/// Lists a client's reservations, latest date first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_reservations_by_client(
    conn: &mut SqliteConnection,
    client_id: &UserId,
) -> Result<Vec<Reservation>, PersistenceError> {
    let rows: Vec<ReservationRow> = reservations::table
        .filter(reservations::client_id.eq(client_id.as_str()))
        .select(ReservationRow::as_select())
        .order((reservations::date.desc(), reservations::start_time.asc()))
        .load(conn)?;

    rows.into_iter().map(ReservationRow::into_reservation).collect()
}

/// Lists every reservation on a facility, by date and start time.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_reservations_by_field(
    conn: &mut SqliteConnection,
    field_id: &FacilityId,
) -> Result<Vec<Reservation>, PersistenceError> {
    let rows: Vec<ReservationRow> = reservations::table
        .filter(reservations::field_id.eq(field_id.as_str()))
        .select(ReservationRow::as_select())
        .order((
            reservations::date.asc(),
            reservations::start_time.asc(),
            reservations::seq.asc(),
        ))
        .load(conn)?;

    rows.into_iter().map(ReservationRow::into_reservation).collect()
}

/// Counts confirmed reservations on a facility dated `today` or later.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_future_confirmed(
    conn: &mut SqliteConnection,
    field_id: &FacilityId,
    today: Date,
) -> Result<usize, PersistenceError> {
    let count: i64 = reservations::table
        .filter(reservations::field_id.eq(field_id.as_str()))
        .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
        .filter(reservations::date.ge(format_date(today)))
        .count()
        .get_result(conn)?;

    super::count_to_usize(count)
}

/// Returns the stored version of a reservation, if it exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn reservation_version(
    conn: &mut SqliteConnection,
    reservation_id: &ReservationId,
) -> Result<Option<i64>, PersistenceError> {
    reservations::table
        .filter(reservations::id.eq(reservation_id.as_str()))
        .select(reservations::version)
        .first::<i64>(conn)
        .optional()
        .map_err(PersistenceError::from)
}
