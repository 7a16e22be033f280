// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook::{Action, Resource};
use fieldbook_domain::{Notification, NotificationId};
use fieldbook_persistence::RecordedAuditEvent;
use tracing::debug;

use super::authorize;
use crate::Services;
use crate::error::{ApiError, translate_persistence_error};
use crate::identity::AuthenticatedSession;
use crate::mail::Mailer;
use crate::request_response::{
    AuditEntry, AuditLogResponse, NotificationListResponse, SuccessResponse,
};

/// Lists the caller's notifications, newest first.
///
/// # Errors
///
/// Returns `Transient` if the store cannot be read.
pub async fn list_notifications<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
) -> Result<NotificationListResponse, ApiError> {
    let notifications: Vec<Notification> = services
        .store
        .list_notifications(&session.actor.user_id)
        .await
        .map_err(translate_persistence_error)?;
    let unread: usize = notifications.iter().filter(|n| !n.read).count();
    Ok(NotificationListResponse {
        notifications,
        unread,
    })
}

/// Marks one of the caller's notifications as read.
///
/// # Errors
///
/// Returns `NotFound` for unknown notifications and for those addressed to
/// someone else.
pub async fn mark_notification_read<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    notification_id: &str,
) -> Result<SuccessResponse, ApiError> {
    let id: NotificationId = NotificationId::new(notification_id);
    let owned: bool = services
        .store
        .get_notification(&id)
        .await
        .map_err(translate_persistence_error)?
        .is_some_and(|n| n.user_id == session.actor.user_id);
    if !owned {
        return Err(ApiError::not_found("notification", notification_id));
    }

    services
        .store
        .mark_notification_read(&id)
        .await
        .map_err(translate_persistence_error)?;
    debug!(notification_id, user_id = %session.actor.user_id, "Notification read");
    Ok(SuccessResponse::ok("Notification marked as read"))
}

/// Returns the audit timeline of one entity. Admin only.
///
/// # Errors
///
/// Returns `Forbidden` for non-admins.
pub async fn audit_log<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    entity_id: &str,
) -> Result<AuditLogResponse, ApiError> {
    authorize(services, session, Action::ViewAuditLog, Resource::System)?;
    let events: Vec<RecordedAuditEvent> = services
        .store
        .list_audit_events(entity_id)
        .await
        .map_err(translate_persistence_error)?;

    Ok(AuditLogResponse {
        entity_id: entity_id.to_string(),
        events: events
            .into_iter()
            .map(|recorded| AuditEntry {
                event_id: recorded.event_id,
                event: recorded.event,
            })
            .collect(),
    })
}
