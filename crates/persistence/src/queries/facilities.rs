// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility and favorite queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_domain::{Facility, FacilityId, FacilityStatus, UserId};
use tracing::debug;

use crate::data_models::FacilityRow;
use crate::diesel_schema::{facilities, favorites};
use crate::error::PersistenceError;

/// Retrieves a facility by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the facility is not found.
pub fn get_facility(
    conn: &mut SqliteConnection,
    facility_id: &FacilityId,
) -> Result<Option<Facility>, PersistenceError> {
    debug!(facility_id = %facility_id, "Looking up facility");

    let result: Result<FacilityRow, diesel::result::Error> = facilities::table
        .filter(facilities::id.eq(facility_id.as_str()))
        .select(FacilityRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_facility().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists facilities with the given status, ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_facilities_by_status(
    conn: &mut SqliteConnection,
    status: FacilityStatus,
) -> Result<Vec<Facility>, PersistenceError> {
    let rows: Vec<FacilityRow> = facilities::table
        .filter(facilities::status.eq(status.as_str()))
        .select(FacilityRow::as_select())
        .order((facilities::name.asc(), facilities::id.asc()))
        .load(conn)?;

    rows.into_iter().map(FacilityRow::into_facility).collect()
}

/// Lists every facility owned by `owner_id`, ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_facilities_by_owner(
    conn: &mut SqliteConnection,
    owner_id: &UserId,
) -> Result<Vec<Facility>, PersistenceError> {
    let rows: Vec<FacilityRow> = facilities::table
        .filter(facilities::owner_id.eq(owner_id.as_str()))
        .select(FacilityRow::as_select())
        .order((facilities::name.asc(), facilities::id.asc()))
        .load(conn)?;

    rows.into_iter().map(FacilityRow::into_facility).collect()
}

/// Lists the facilities a user has favorited, most recent first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_favorite_facilities(
    conn: &mut SqliteConnection,
    user_id: &UserId,
) -> Result<Vec<Facility>, PersistenceError> {
    let rows: Vec<FacilityRow> = favorites::table
        .inner_join(facilities::table)
        .filter(favorites::user_id.eq(user_id.as_str()))
        .select(FacilityRow::as_select())
        .order((favorites::created_at.desc(), facilities::id.asc()))
        .load(conn)?;

    rows.into_iter().map(FacilityRow::into_facility).collect()
}

/// Returns the stored version of a facility, if it exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn facility_version(
    conn: &mut SqliteConnection,
    facility_id: &FacilityId,
) -> Result<Option<i64>, PersistenceError> {
    facilities::table
        .filter(facilities::id.eq(facility_id.as_str()))
        .select(facilities::version)
        .first::<i64>(conn)
        .optional()
        .map_err(PersistenceError::from)
}
