// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook_domain::{NotificationKind, ReservationStatus};

use crate::handlers::{
    cancel_reservation, confirm_reservation, list_notifications, mark_notification_read,
    send_ticket_email,
};
use crate::tests::helpers::{FailingMailer, request_slot, signup, world, world_with};
use crate::{ApiError, NOTIFICATION_WARNING};

#[tokio::test]
async fn test_mail_failure_does_not_undo_confirmation() {
    let w = world_with(FailingMailer).await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;

    let confirmed = confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();
    assert_eq!(confirmed.reservation.status, ReservationStatus::Confirmed);
    assert_eq!(
        confirmed.notification_warning.as_deref(),
        Some(NOTIFICATION_WARNING)
    );

    let stored = w
        .services
        .store
        .get_reservation(&pending.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReservationStatus::Confirmed);

    let inbox = list_notifications(&w.services, &w.client).await.unwrap();
    assert_eq!(inbox.notifications.len(), 1);
    assert_eq!(
        inbox.notifications[0].kind,
        NotificationKind::ReservationConfirmed
    );
}

#[tokio::test]
async fn test_cancellation_emails_client() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;

    cancel_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();

    let sent = w.services.dispatcher.mailer().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Your reservation was cancelled");
    assert!(sent[0].text.starts_with("Hello Cleo Client,"));
}

#[tokio::test]
async fn test_notifications_are_read_by_their_recipient_only() {
    let w = world().await;
    request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;

    let inbox = list_notifications(&w.services, &w.owner).await.unwrap();
    assert_eq!(inbox.unread, 2);
    let request_notice = inbox
        .notifications
        .iter()
        .find(|n| n.kind == NotificationKind::ReservationRequested)
        .unwrap();
    let id: &str = request_notice.id.as_str();

    let foreign = mark_notification_read(&w.services, &w.client, id)
        .await
        .unwrap_err();
    assert_eq!(foreign, ApiError::not_found("notification", id));

    mark_notification_read(&w.services, &w.owner, id)
        .await
        .unwrap();
    let inbox = list_notifications(&w.services, &w.owner).await.unwrap();
    assert_eq!(inbox.unread, 1);
    assert!(inbox.notifications.iter().any(|n| n.id.as_str() == id && n.read));
}

#[tokio::test]
async fn test_ticket_email_requires_confirmed_reservation() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;

    let early = send_ticket_email(&w.services, &w.client, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(early, ApiError::InvalidInput { ref field, .. } if field == "reservation"));

    confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();
    send_ticket_email(&w.services, &w.client, pending.id.as_str())
        .await
        .unwrap();

    let sent = w.services.dispatcher.mailer().sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|e| e.subject == "Your booking ticket"));
    assert!(sent[1].text.contains("Court One on 2026-10-16 from 10:00 to 11:00"));
}

#[tokio::test]
async fn test_ticket_email_is_limited_to_participants() {
    let w = world().await;
    let stranger = signup(&w.services, "stranger@example.com", "Stan Stranger", "client").await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;
    confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();

    let err = send_ticket_email(&w.services, &stranger, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));

    send_ticket_email(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_ticket_email_is_transient() {
    let w = world_with(FailingMailer).await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;
    confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();

    let err = send_ticket_email(&w.services, &w.client, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transient { .. }));
}
