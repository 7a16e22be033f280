// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, FacilityId, Reservation, ReservationId, ReservationStatus, TimeSlot, UserId,
    compute_total_price,
};
use time::OffsetDateTime;
use time::macros::{date, datetime};

#[test]
fn test_ordinary_transition_table() {
    use ReservationStatus::{Cancelled, Completed, Confirmed, Pending};

    let allowed: [(ReservationStatus, ReservationStatus); 4] = [
        (Pending, Confirmed),
        (Pending, Cancelled),
        (Confirmed, Cancelled),
        (Confirmed, Completed),
    ];

    for from in ReservationStatus::ALL {
        for to in ReservationStatus::ALL {
            let result: Result<(), DomainError> = from.validate_transition(to);
            if from == to {
                assert!(
                    matches!(result, Err(DomainError::AlreadyInState { .. })),
                    "{from} -> {to}"
                );
            } else if allowed.contains(&(from, to)) {
                assert!(result.is_ok(), "{from} -> {to}");
            } else {
                assert!(
                    matches!(result, Err(DomainError::InvalidTransition { .. })),
                    "{from} -> {to}"
                );
            }
        }
    }
}

#[test]
fn test_terminal_statuses_have_no_ordinary_exit() {
    for status in ReservationStatus::ALL {
        let has_exit: bool = ReservationStatus::ALL
            .iter()
            .any(|target| status.can_transition_to(*target));
        assert_eq!(status.is_terminal(), !has_exit, "{status}");
    }
}

#[test]
fn test_override_allows_any_distinct_status() {
    assert!(
        ReservationStatus::Completed
            .validate_override(ReservationStatus::Pending)
            .is_ok()
    );
    assert!(
        ReservationStatus::Cancelled
            .validate_override(ReservationStatus::Confirmed)
            .is_ok()
    );
    assert!(matches!(
        ReservationStatus::Cancelled.validate_override(ReservationStatus::Cancelled),
        Err(DomainError::AlreadyInState { .. })
    ));
}

#[test]
fn test_status_parses_both_spellings() {
    assert_eq!(
        "canceled".parse::<ReservationStatus>().unwrap(),
        ReservationStatus::Cancelled
    );
    assert_eq!(
        "Confirmed".parse::<ReservationStatus>().unwrap(),
        ReservationStatus::Confirmed
    );
    assert!("archived".parse::<ReservationStatus>().is_err());
}

#[test]
fn test_total_price_is_prorated_by_minute() {
    let hour: TimeSlot = TimeSlot::parse("10:00", "11:00").unwrap();
    let ninety: TimeSlot = TimeSlot::parse("10:00", "11:30").unwrap();
    assert_eq!(compute_total_price(5000, &hour), 5000);
    assert_eq!(compute_total_price(5000, &ninety), 7500);
    assert_eq!(compute_total_price(0, &ninety), 0);
}

#[test]
fn test_reservation_json_shape() {
    let at: OffsetDateTime = datetime!(2026-10-15 12:00 UTC);
    let reservation: Reservation = Reservation {
        id: ReservationId::new("r1"),
        field_id: FacilityId::new("f1"),
        client_id: UserId::new("c1"),
        date: date!(2026 - 10 - 20),
        slot: TimeSlot::parse("10:00", "11:00").unwrap(),
        total_price: 5000,
        status: ReservationStatus::Pending,
        status_reason: None,
        version: 1,
        created_at: at,
        updated_at: at,
    };

    let value: serde_json::Value = serde_json::to_value(&reservation).unwrap();
    assert_eq!(value["date"], "2026-10-20");
    assert_eq!(value["start_time"], "10:00");
    assert_eq!(value["end_time"], "11:00");
    assert_eq!(value["status"], "pending");
    assert_eq!(value["field_id"], "f1");

    let back: Reservation = serde_json::from_value(value).unwrap();
    assert_eq!(back, reservation);
}
