// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_domain::{Notification, NotificationId};

use crate::data_models::format_timestamp;
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Inserts a notification.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &Notification,
) -> Result<(), PersistenceError> {
    diesel::insert_into(notifications::table)
        .values((
            notifications::id.eq(notification.id.as_str()),
            notifications::user_id.eq(notification.user_id.as_str()),
            notifications::kind.eq(notification.kind.as_str()),
            notifications::title.eq(&notification.title),
            notifications::message.eq(&notification.message),
            notifications::related_id.eq(notification.related_id.as_deref()),
            notifications::is_read.eq(i32::from(notification.read)),
            notifications::created_at.eq(format_timestamp(notification.created_at)?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Marks a notification as read.
///
/// # Returns
///
/// Whether the notification exists.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn mark_notification_read(
    conn: &mut SqliteConnection,
    notification_id: &NotificationId,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(notifications::table)
        .filter(notifications::id.eq(notification_id.as_str()))
        .set(notifications::is_read.eq(1))
        .execute(conn)?;
    Ok(updated > 0)
}
