// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end booking flows through the handlers.

use fieldbook_domain::{FacilityStatus, NotificationKind, ReservationStatus};

use crate::ApiError;
use crate::handlers::{
    audit_log, cancel_reservation, complete_reservation, confirm_reservation, create_reservation,
    list_notifications, my_reservations, override_reservation, toggle_facility_status,
};
use crate::request_response::{CreateReservationRequest, OverrideRequest};
use crate::tests::helpers::{RecordingMailer, TOMORROW, World, request_slot, signup, world};

#[tokio::test]
async fn test_client_books_and_owner_confirms() {
    let w = world().await;

    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;
    assert_eq!(pending.status, ReservationStatus::Pending);
    assert_eq!(pending.total_price, 6000);
    assert_eq!(pending.version, 1);

    let owner_inbox = list_notifications(&w.services, &w.owner).await.unwrap();
    assert!(
        owner_inbox
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::ReservationRequested)
    );

    let confirmed = confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();
    assert_eq!(confirmed.reservation.status, ReservationStatus::Confirmed);
    assert_eq!(confirmed.reservation.version, 2);
    assert_eq!(confirmed.notification_warning, None);

    let client_inbox = list_notifications(&w.services, &w.client).await.unwrap();
    assert_eq!(client_inbox.unread, 1);
    assert_eq!(
        client_inbox.notifications[0].kind,
        NotificationKind::ReservationConfirmed
    );

    let sent = w.services.dispatcher.mailer().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "client@example.com");
    assert_eq!(sent[0].subject, "Your booking ticket");
    assert!(sent[0].text.contains(&format!("Reference: {}", pending.id)));
    assert!(sent[0].text.contains(&format!(
        "Details: http://localhost:3000/facilities/{}",
        w.facility.id
    )));

    let mine = my_reservations(&w.services, &w.client).await.unwrap();
    assert_eq!(mine.reservations.len(), 1);
    assert_eq!(mine.reservations[0].status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_overlapping_confirmation_names_the_holder() {
    let w = world().await;
    let second_client = signup(&w.services, "second@example.com", "Sam Second", "client").await;

    let first = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;
    let overlapping =
        request_slot(&w.services, &second_client, &w.facility, "10:30", "11:30").await;
    let adjacent = request_slot(&w.services, &second_client, &w.facility, "11:00", "12:00").await;

    confirm_reservation(&w.services, &w.owner, first.id.as_str())
        .await
        .unwrap();

    let err = confirm_reservation(&w.services, &w.owner, overlapping.id.as_str())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::ConflictingReservation {
            reservation_id: first.id.to_string(),
            holder_id: w.client.user.id.to_string(),
            holder_name: String::from("Cleo Client"),
        }
    );

    let adjacent = confirm_reservation(&w.services, &w.owner, adjacent.id.as_str())
        .await
        .unwrap();
    assert_eq!(adjacent.reservation.status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_concurrent_confirmations_admit_one() {
    let w = world().await;
    let second_client = signup(&w.services, "second@example.com", "Sam Second", "client").await;

    let a = request_slot(&w.services, &w.client, &w.facility, "18:00", "19:00").await;
    let b = request_slot(&w.services, &second_client, &w.facility, "18:30", "19:30").await;

    let (first, second) = tokio::join!(
        confirm_reservation(&w.services, &w.owner, a.id.as_str()),
        confirm_reservation(&w.services, &w.admin, b.id.as_str()),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = outcomes.into_iter().find_map(Result::err).unwrap();
    assert!(
        matches!(
            loser,
            ApiError::ConflictingReservation { .. } | ApiError::ConcurrentConflict { .. }
        ),
        "unexpected error: {loser:?}"
    );
}

#[tokio::test]
async fn test_booking_rules_are_enforced() {
    let w = world().await;

    let past = create_reservation(
        &w.services,
        &w.client,
        CreateReservationRequest {
            field_id: w.facility.id.to_string(),
            date: String::from("2026-10-14"),
            start_time: String::from("10:00"),
            end_time: String::from("11:00"),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(past, ApiError::InvalidInput { ref field, .. } if field == "date"));

    let late = create_reservation(
        &w.services,
        &w.client,
        CreateReservationRequest {
            field_id: w.facility.id.to_string(),
            date: String::from(TOMORROW),
            start_time: String::from("21:30"),
            end_time: String::from("22:30"),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(late, ApiError::InvalidInput { ref field, .. } if field == "time_slot"));

    let by_owner = create_reservation(
        &w.services,
        &w.owner,
        CreateReservationRequest {
            field_id: w.facility.id.to_string(),
            date: String::from(TOMORROW),
            start_time: String::from("10:00"),
            end_time: String::from("11:00"),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(by_owner, ApiError::Forbidden { .. }));
}

#[tokio::test]
async fn test_client_cannot_confirm_own_reservation() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;

    let err = confirm_reservation(&w.services, &w.client, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[tokio::test]
async fn test_lifecycle_rejects_undefined_moves() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;

    let err = complete_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition { .. }));

    cancel_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();
    let again = cancel_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(again, ApiError::AlreadyInState { .. }));
}

#[tokio::test]
async fn test_facility_with_upcoming_bookings_cannot_be_disabled() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;
    confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();

    let err = toggle_facility_status(&w.services, &w.owner, w.facility.id.as_str())
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::HasFutureReservations { count: 1 });

    cancel_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();
    let disabled = toggle_facility_status(&w.services, &w.owner, w.facility.id.as_str())
        .await
        .unwrap();
    assert_eq!(disabled.facility.status, FacilityStatus::Disabled);

    let blocked = request_slot_err(&w, "12:00", "13:00").await;
    assert!(matches!(blocked, ApiError::Forbidden { .. }));

    let enabled = toggle_facility_status(&w.services, &w.owner, w.facility.id.as_str())
        .await
        .unwrap();
    assert_eq!(enabled.facility.status, FacilityStatus::Approved);
}

#[tokio::test]
async fn test_pending_booking_cannot_be_confirmed_on_disabled_facility() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;

    let disabled = toggle_facility_status(&w.services, &w.owner, w.facility.id.as_str())
        .await
        .unwrap();
    assert_eq!(disabled.facility.status, FacilityStatus::Disabled);

    let err = confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));

    let forced = override_reservation(
        &w.services,
        &w.admin,
        pending.id.as_str(),
        OverrideRequest {
            status: String::from("confirmed"),
            reason: String::from("Booked by phone"),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(forced, ApiError::Forbidden { .. }));

    let mine = my_reservations(&w.services, &w.client).await.unwrap();
    assert_eq!(mine.reservations[0].status, ReservationStatus::Pending);

    cancel_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();
}

async fn request_slot_err(
    w: &World<RecordingMailer>,
    start: &str,
    end: &str,
) -> ApiError {
    create_reservation(
        &w.services,
        &w.client,
        CreateReservationRequest {
            field_id: w.facility.id.to_string(),
            date: String::from(TOMORROW),
            start_time: String::from(start),
            end_time: String::from(end),
        },
    )
    .await
    .unwrap_err()
}

#[tokio::test]
async fn test_admin_override_requires_reason_and_emails_client() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;
    confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();

    let blank = override_reservation(
        &w.services,
        &w.admin,
        pending.id.as_str(),
        OverrideRequest {
            status: String::from("pending"),
            reason: String::from("   "),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(blank, ApiError::InvalidInput { ref field, .. } if field == "reason"));

    let same = override_reservation(
        &w.services,
        &w.admin,
        pending.id.as_str(),
        OverrideRequest {
            status: String::from("confirmed"),
            reason: String::from("No change"),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(same, ApiError::AlreadyInState { .. }));

    let reverted = override_reservation(
        &w.services,
        &w.admin,
        pending.id.as_str(),
        OverrideRequest {
            status: String::from("pending"),
            reason: String::from("Double-booked by phone"),
        },
    )
    .await
    .unwrap();
    assert_eq!(reverted.reservation.status, ReservationStatus::Pending);
    assert_eq!(
        reverted.reservation.status_reason.as_deref(),
        Some("Double-booked by phone")
    );

    let sent = w.services.dispatcher.mailer().sent();
    let status_mail = sent
        .iter()
        .find(|e| e.subject == "Your reservation status changed")
        .unwrap();
    assert!(status_mail.text.contains("Status: Confirmed to Pending"));
    assert!(status_mail.text.contains("Reason: Double-booked by phone"));
}

#[tokio::test]
async fn test_audit_log_records_each_step() {
    let w = world().await;
    let pending = request_slot(&w.services, &w.client, &w.facility, "10:00", "11:00").await;
    confirm_reservation(&w.services, &w.owner, pending.id.as_str())
        .await
        .unwrap();

    let log = audit_log(&w.services, &w.admin, pending.id.as_str())
        .await
        .unwrap();
    let actions: Vec<&str> = log
        .events
        .iter()
        .map(|e| e.event.action.name.as_str())
        .collect();
    assert_eq!(actions, vec!["CreateReservation", "ConfirmReservation"]);
    assert_eq!(log.events[1].event.actor.id, w.owner.user.id);
    assert_eq!(log.events[1].event.before.as_deref(), Some("pending"));
    assert_eq!(log.events[1].event.after.as_deref(), Some("confirmed"));

    let denied = audit_log(&w.services, &w.client, pending.id.as_str())
        .await
        .unwrap_err();
    assert!(matches!(denied, ApiError::Forbidden { .. }));
}
