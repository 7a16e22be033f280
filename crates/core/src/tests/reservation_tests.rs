// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    admin, client, facility, now, other_associate, owner, policy, reservation, slot, today,
    tomorrow,
};
use crate::{
    CoreError, Denial, EmailTemplate, ReservationCommand, ReservationOutcome,
    plan_create_reservation, plan_reservation_transition,
};
use fieldbook_domain::{
    DomainError, Facility, FacilityStatus, NotificationKind, Reservation, ReservationId,
    ReservationStatus, UserId,
};
use time::Duration;

fn approved() -> Facility {
    facility(FacilityStatus::Approved)
}

fn pending(id: &str) -> Reservation {
    reservation(id, "client-1", slot("10:00", "11:00"), ReservationStatus::Pending)
}

#[test]
fn test_client_creates_pending_reservation_and_owner_is_notified() {
    let outcome: ReservationOutcome = plan_create_reservation(
        &policy(),
        &client(),
        &approved(),
        tomorrow(),
        slot("10:00", "11:30"),
        today(),
        now(),
    )
    .unwrap();

    assert_eq!(outcome.reservation.status, ReservationStatus::Pending);
    assert_eq!(outcome.reservation.total_price, 7500);
    assert_eq!(outcome.reservation.client_id, UserId::new("client-1"));
    assert_eq!(outcome.reservation.version, 1);
    assert_eq!(outcome.audit_event.after.as_deref(), Some("pending"));
    assert_eq!(outcome.notices.len(), 1);
    assert_eq!(outcome.notices[0].recipient, UserId::new("owner-1"));
    assert_eq!(outcome.notices[0].kind, NotificationKind::ReservationRequested);
    assert!(outcome.notices[0].emails.is_empty());
}

#[test]
fn test_reservation_on_unapproved_facility_is_denied() {
    let result: Result<ReservationOutcome, CoreError> = plan_create_reservation(
        &policy(),
        &client(),
        &facility(FacilityStatus::Pending),
        tomorrow(),
        slot("10:00", "11:00"),
        today(),
        now(),
    );
    assert!(matches!(
        result,
        Err(CoreError::Denied(Denial::FacilityNotBookable { .. }))
    ));
}

#[test]
fn test_reservation_in_the_past_or_outside_hours_is_rejected() {
    let past: Result<ReservationOutcome, CoreError> = plan_create_reservation(
        &policy(),
        &client(),
        &approved(),
        today() - Duration::days(1),
        slot("10:00", "11:00"),
        today(),
        now(),
    );
    assert!(matches!(
        past,
        Err(CoreError::DomainViolation(DomainError::DateInPast { .. }))
    ));

    let early: Result<ReservationOutcome, CoreError> = plan_create_reservation(
        &policy(),
        &client(),
        &approved(),
        tomorrow(),
        slot("07:00", "09:00"),
        today(),
        now(),
    );
    assert!(matches!(
        early,
        Err(CoreError::DomainViolation(
            DomainError::OutsideOpeningHours { .. }
        ))
    ));
}

#[test]
fn test_confirm_without_conflict_notifies_client_with_ticket() {
    let outcome: ReservationOutcome = plan_reservation_transition(
        &policy(),
        &owner(),
        &approved(),
        &pending("r-1"),
        &ReservationCommand::Confirm,
        &[],
        now(),
    )
    .unwrap();

    assert_eq!(outcome.reservation.status, ReservationStatus::Confirmed);
    assert_eq!(outcome.reservation.version, 2);
    assert_eq!(outcome.audit_event.before.as_deref(), Some("pending"));
    assert_eq!(outcome.audit_event.after.as_deref(), Some("confirmed"));
    assert_eq!(outcome.notices.len(), 1);
    assert_eq!(outcome.notices[0].recipient, UserId::new("client-1"));
    assert_eq!(outcome.notices[0].kind, NotificationKind::ReservationConfirmed);
    assert_eq!(outcome.notices[0].emails, vec![EmailTemplate::Ticket]);
}

#[test]
fn test_confirm_requires_bookable_facility() {
    let disabled: Facility = facility(FacilityStatus::Disabled);

    let result: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &owner(),
        &disabled,
        &pending("r-1"),
        &ReservationCommand::Confirm,
        &[],
        now(),
    );
    assert_eq!(
        result,
        Err(CoreError::Denied(Denial::FacilityNotBookable {
            status: FacilityStatus::Disabled
        }))
    );

    let forced: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &admin(),
        &disabled,
        &pending("r-1"),
        &ReservationCommand::Override {
            target: ReservationStatus::Confirmed,
            reason: String::from("Booked by phone"),
        },
        &[],
        now(),
    );
    assert!(matches!(
        forced,
        Err(CoreError::Denied(Denial::FacilityNotBookable { .. }))
    ));

    let cancelled: ReservationOutcome = plan_reservation_transition(
        &policy(),
        &owner(),
        &disabled,
        &pending("r-1"),
        &ReservationCommand::Cancel,
        &[],
        now(),
    )
    .unwrap();
    assert_eq!(cancelled.reservation.status, ReservationStatus::Cancelled);
}

#[test]
fn test_confirm_with_overlap_reports_blocker() {
    let blocker: Reservation = reservation(
        "r-1",
        "client-9",
        slot("10:00", "11:00"),
        ReservationStatus::Confirmed,
    );
    let candidate: Reservation = reservation(
        "r-2",
        "client-1",
        slot("10:30", "11:30"),
        ReservationStatus::Pending,
    );

    let result: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &owner(),
        &approved(),
        &candidate,
        &ReservationCommand::Confirm,
        &[blocker],
        now(),
    );

    assert_eq!(
        result,
        Err(CoreError::ConflictingReservation {
            reservation_id: ReservationId::new("r-1"),
            holder_id: UserId::new("client-9"),
        })
    );
}

#[test]
fn test_confirming_confirmed_is_already_in_state_without_notices() {
    let confirmed: Reservation = reservation(
        "r-1",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Confirmed,
    );
    let result: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &owner(),
        &approved(),
        &confirmed,
        &ReservationCommand::Confirm,
        std::slice::from_ref(&confirmed),
        now(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::AlreadyInState { .. }))
    ));
}

#[test]
fn test_terminal_reservation_cannot_be_reconfirmed_ordinarily() {
    let cancelled: Reservation = reservation(
        "r-1",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Cancelled,
    );
    let result: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &owner(),
        &approved(),
        &cancelled,
        &ReservationCommand::Confirm,
        &[],
        now(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidTransition { .. }
        ))
    ));
}

#[test]
fn test_authorization_runs_before_status_checks() {
    let confirmed: Reservation = reservation(
        "r-1",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Confirmed,
    );
    let result: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &other_associate(),
        &approved(),
        &confirmed,
        &ReservationCommand::Confirm,
        &[],
        now(),
    );
    assert!(matches!(
        result,
        Err(CoreError::Denied(Denial::NotOwner { .. }))
    ));

    let by_client: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &client(),
        &approved(),
        &pending("r-2"),
        &ReservationCommand::Cancel,
        &[],
        now(),
    );
    assert!(matches!(
        by_client,
        Err(CoreError::Denied(Denial::InsufficientRole { .. }))
    ));
}

#[test]
fn test_cancel_sends_cancellation_and_complete_is_silent() {
    let cancelled: ReservationOutcome = plan_reservation_transition(
        &policy(),
        &owner(),
        &approved(),
        &pending("r-1"),
        &ReservationCommand::Cancel,
        &[],
        now(),
    )
    .unwrap();
    assert_eq!(cancelled.notices[0].kind, NotificationKind::ReservationCancelled);
    assert_eq!(cancelled.notices[0].emails, vec![EmailTemplate::Cancellation]);

    let confirmed: Reservation = reservation(
        "r-2",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Confirmed,
    );
    let completed: ReservationOutcome = plan_reservation_transition(
        &policy(),
        &admin(),
        &approved(),
        &confirmed,
        &ReservationCommand::Complete,
        &[],
        now(),
    )
    .unwrap();
    assert_eq!(completed.reservation.status, ReservationStatus::Completed);
    assert!(completed.notices.is_empty());
}

#[test]
fn test_override_requires_reason() {
    let result: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &admin(),
        &approved(),
        &pending("r-1"),
        &ReservationCommand::Override {
            target: ReservationStatus::Completed,
            reason: String::from("   "),
        },
        &[],
        now(),
    );
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::MissingOverrideReason))
    );
}

#[test]
fn test_override_records_reason_and_sends_status_change_email() {
    let completed: Reservation = reservation(
        "r-1",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Completed,
    );
    let outcome: ReservationOutcome = plan_reservation_transition(
        &policy(),
        &admin(),
        &approved(),
        &completed,
        &ReservationCommand::Override {
            target: ReservationStatus::Cancelled,
            reason: String::from(" Field flooded "),
        },
        &[],
        now(),
    )
    .unwrap();

    assert_eq!(outcome.reservation.status, ReservationStatus::Cancelled);
    assert_eq!(
        outcome.reservation.status_reason.as_deref(),
        Some("Field flooded")
    );
    assert_eq!(outcome.audit_event.reason.as_deref(), Some("Field flooded"));
    assert_eq!(
        outcome.notices[0].emails,
        vec![
            EmailTemplate::Cancellation,
            EmailTemplate::StatusChange {
                previous: ReservationStatus::Completed,
                current: ReservationStatus::Cancelled,
                reason: String::from("Field flooded"),
            },
        ]
    );
}

#[test]
fn test_override_into_confirmed_still_checks_conflicts() {
    let blocker: Reservation = reservation(
        "r-1",
        "client-9",
        slot("10:00", "11:00"),
        ReservationStatus::Confirmed,
    );
    let cancelled: Reservation = reservation(
        "r-2",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Cancelled,
    );
    let result: Result<ReservationOutcome, CoreError> = plan_reservation_transition(
        &policy(),
        &owner(),
        &approved(),
        &cancelled,
        &ReservationCommand::Override {
            target: ReservationStatus::Confirmed,
            reason: String::from("Customer called back"),
        },
        &[blocker],
        now(),
    );
    assert!(matches!(
        result,
        Err(CoreError::ConflictingReservation { .. })
    ));
}

#[test]
fn test_override_to_pending_notifies_status_change() {
    let confirmed: Reservation = reservation(
        "r-1",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Confirmed,
    );
    let outcome: ReservationOutcome = plan_reservation_transition(
        &policy(),
        &owner(),
        &approved(),
        &confirmed,
        &ReservationCommand::Override {
            target: ReservationStatus::Pending,
            reason: String::from("Payment pending"),
        },
        &[],
        now(),
    )
    .unwrap();

    assert_eq!(
        outcome.notices[0].kind,
        NotificationKind::ReservationStatusChanged
    );
    assert_eq!(outcome.notices[0].emails.len(), 1);
    assert!(outcome.notices[0].message.contains("Confirmed"));
}
