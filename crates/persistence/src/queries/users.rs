// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_domain::{User, UserId};
use tracing::debug;

use crate::data_models::{Credentials, SessionData, SessionRow, UserRow};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: &UserId,
) -> Result<Option<User>, PersistenceError> {
    debug!(user_id = %user_id, "Looking up user");

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::id.eq(user_id.as_str()))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_user().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves a user and password hash by normalized email.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user has this email.
pub fn get_credentials_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<Credentials>, PersistenceError> {
    debug!(email, "Looking up credentials");

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::email.eq(email))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_credentials().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Counts stored users.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut SqliteConnection) -> Result<usize, PersistenceError> {
    let count: i64 = users::table.count().get_result(conn)?;
    super::count_to_usize(count)
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the token is unknown.
pub fn get_session(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    let result: Result<SessionRow, diesel::result::Error> = sessions::table
        .filter(sessions::token.eq(token))
        .select(SessionRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_session().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
