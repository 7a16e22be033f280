// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_domain::{Notification, NotificationId, UserId};

use crate::data_models::NotificationRow;
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Lists a user's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_notifications(
    conn: &mut SqliteConnection,
    user_id: &UserId,
) -> Result<Vec<Notification>, PersistenceError> {
    let rows: Vec<NotificationRow> = notifications::table
        .filter(notifications::user_id.eq(user_id.as_str()))
        .select(NotificationRow::as_select())
        .order(notifications::seq.desc())
        .load(conn)?;

    rows.into_iter()
        .map(NotificationRow::into_notification)
        .collect()
}

/// Retrieves a notification by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the notification is not found.
pub fn get_notification(
    conn: &mut SqliteConnection,
    notification_id: &NotificationId,
) -> Result<Option<Notification>, PersistenceError> {
    let result: Result<NotificationRow, diesel::result::Error> = notifications::table
        .filter(notifications::id.eq(notification_id.as_str()))
        .select(NotificationRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_notification().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
