// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook_domain::{FacilityId, Reservation, ReservationId, ReservationStatus, TimeSlot};
use time::Date;

/// Outcome of a conflict check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCheck {
    pub conflict: bool,
    pub with_reservation_id: Option<ReservationId>,
}

impl ConflictCheck {
    /// No overlapping confirmed reservation.
    #[must_use]
    pub const fn clear() -> Self {
        Self {
            conflict: false,
            with_reservation_id: None,
        }
    }
}

impl From<Option<&Reservation>> for ConflictCheck {
    fn from(blocking: Option<&Reservation>) -> Self {
        blocking.map_or_else(Self::clear, |reservation| Self {
            conflict: true,
            with_reservation_id: Some(reservation.id.clone()),
        })
    }
}

/// Returns the first confirmed reservation on `field_id` and `date` whose
/// slot overlaps `slot`, skipping `exclude`.
///
/// `existing` is scanned in order, so the store's creation order decides
/// which blocker is reported when several overlap.
#[must_use]
pub fn find_conflict<'a>(
    existing: &'a [Reservation],
    field_id: &FacilityId,
    date: Date,
    slot: &TimeSlot,
    exclude: Option<&ReservationId>,
) -> Option<&'a Reservation> {
    existing.iter().find(|candidate| {
        candidate.status == ReservationStatus::Confirmed
            && &candidate.field_id == field_id
            && candidate.date == date
            && exclude != Some(&candidate.id)
            && candidate.slot.overlaps(slot)
    })
}
