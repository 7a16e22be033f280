// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_audit::AuditEvent;
use fieldbook_domain::{User, UserId};
use tracing::{debug, info};

use crate::data_models::{SessionData, format_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;

/// Inserts a new user and its audit event.
///
/// # Returns
///
/// The audit event ID.
///
/// # Errors
///
/// Returns `PersistenceError::Duplicate` if the email is taken, or another
/// error if the write fails.
pub fn insert_user(
    conn: &mut SqliteConnection,
    user: &User,
    password_hash: &str,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let created_at: String = format_timestamp(user.created_at)?;
    let updated_at: String = format_timestamp(user.updated_at)?;

    conn.immediate_transaction(|conn| {
        diesel::insert_into(users::table)
            .values((
                users::id.eq(user.id.as_str()),
                users::email.eq(&user.email),
                users::display_name.eq(&user.display_name),
                users::password_hash.eq(password_hash),
                users::role.eq(user.role.as_str()),
                users::status.eq(user.status.as_str()),
                users::created_at.eq(&created_at),
                users::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

        let event_id: i64 = insert_audit_event(conn, event)?;
        info!(user_id = %user.id, role = user.role.as_str(), "User created");
        Ok(event_id)
    })
}

/// Writes a user's role and status and revokes all of their sessions.
///
/// # Returns
///
/// The audit event ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist, or
/// another error if the write fails.
pub fn update_user_access(
    conn: &mut SqliteConnection,
    user: &User,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let updated_at: String = format_timestamp(user.updated_at)?;

    conn.immediate_transaction(|conn| {
        let updated: usize = diesel::update(users::table)
            .filter(users::id.eq(user.id.as_str()))
            .set((
                users::role.eq(user.role.as_str()),
                users::status.eq(user.status.as_str()),
                users::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;
        if updated == 0 {
            return Err(PersistenceError::NotFound {
                collection: "users",
                id: user.id.to_string(),
            });
        }

        let revoked: usize = delete_sessions_for_user(conn, &user.id)?;
        let event_id: i64 = insert_audit_event(conn, event)?;

        info!(
            user_id = %user.id,
            role = user.role.as_str(),
            status = user.status.as_str(),
            revoked,
            "User access updated"
        );
        Ok(event_id)
    })
}

/// Stores a new session.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_session(
    conn: &mut SqliteConnection,
    session: &SessionData,
) -> Result<(), PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::token.eq(&session.token),
            sessions::user_id.eq(session.user_id.as_str()),
            sessions::role_claim.eq(session.role_claim.as_str()),
            sessions::created_at.eq(format_timestamp(session.created_at)?),
            sessions::expires_at.eq(format_timestamp(session.expires_at)?),
        ))
        .execute(conn)?;

    debug!(user_id = %session.user_id, "Session created");
    Ok(())
}

/// Deletes a session.
///
/// # Returns
///
/// Whether a session was deleted.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(conn: &mut SqliteConnection, token: &str) -> Result<bool, PersistenceError> {
    let deleted: usize = diesel::delete(sessions::table.filter(sessions::token.eq(token)))
        .execute(conn)?;
    Ok(deleted > 0)
}

/// Deletes every session of a user.
///
/// # Returns
///
/// The number of sessions deleted.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: &UserId,
) -> Result<usize, PersistenceError> {
    let deleted: usize =
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id.as_str())))
            .execute(conn)?;
    Ok(deleted)
}
