// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, FacilityDetails, FacilityStatus, FacilityTransition};
use time::macros::time;

fn details() -> FacilityDetails {
    FacilityDetails {
        name: String::from("  Field 1 "),
        location: String::from(" North Park "),
        price_per_hour: 5000,
        opening_time: time!(8:00),
        closing_time: time!(22:00),
    }
}

#[test]
fn test_review_transitions_from_pending() {
    assert_eq!(
        FacilityStatus::Pending
            .apply(FacilityTransition::Approve)
            .unwrap(),
        FacilityStatus::Approved
    );
    assert_eq!(
        FacilityStatus::Pending
            .apply(FacilityTransition::Reject)
            .unwrap(),
        FacilityStatus::Rejected
    );
}

#[test]
fn test_toggle_between_approved_and_disabled() {
    assert_eq!(
        FacilityStatus::Approved
            .apply(FacilityTransition::Disable)
            .unwrap(),
        FacilityStatus::Disabled
    );
    assert_eq!(
        FacilityStatus::Disabled
            .apply(FacilityTransition::Enable)
            .unwrap(),
        FacilityStatus::Approved
    );
}

#[test]
fn test_reapplying_current_status_is_already_in_state() {
    assert!(matches!(
        FacilityStatus::Approved.apply(FacilityTransition::Approve),
        Err(DomainError::AlreadyInState {
            entity: "facility",
            status: "approved"
        })
    ));
    assert!(matches!(
        FacilityStatus::Disabled.apply(FacilityTransition::Disable),
        Err(DomainError::AlreadyInState { .. })
    ));
}

#[test]
fn test_undefined_transitions_are_rejected() {
    assert!(matches!(
        FacilityStatus::Pending.apply(FacilityTransition::Disable),
        Err(DomainError::InvalidTransition { .. })
    ));
    assert!(matches!(
        FacilityStatus::Rejected.apply(FacilityTransition::Approve),
        Err(DomainError::InvalidTransition { .. })
    ));
    assert!(matches!(
        FacilityStatus::Disabled.apply(FacilityTransition::Approve),
        Err(DomainError::InvalidTransition { .. })
    ));
}

#[test]
fn test_edit_resets_to_pending() {
    for status in [
        FacilityStatus::Approved,
        FacilityStatus::Rejected,
        FacilityStatus::Disabled,
    ] {
        assert_eq!(status.after_edit(), FacilityStatus::Pending);
    }
}

#[test]
fn test_details_are_trimmed_and_validated() {
    let validated: FacilityDetails = details().validated().unwrap();
    assert_eq!(validated.name, "Field 1");
    assert_eq!(validated.location, "North Park");

    let bad_hours: FacilityDetails = FacilityDetails {
        closing_time: time!(8:00),
        ..details()
    };
    assert!(matches!(
        bad_hours.validated(),
        Err(DomainError::InvalidOpeningHours { .. })
    ));

    let bad_price: FacilityDetails = FacilityDetails {
        price_per_hour: -1,
        ..details()
    };
    assert!(matches!(
        bad_price.validated(),
        Err(DomainError::InvalidPrice { cents: -1 })
    ));
}
