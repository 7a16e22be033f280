// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook::{ConflictCheck, find_conflict};
use fieldbook_domain::{FacilityId, Reservation, ReservationId, TimeSlot};
use fieldbook_persistence::{PersistenceError, Store};
use time::Date;

/// Checks `slot` on `field_id` and `date` against the stored confirmed
/// reservations, ignoring `exclude`.
///
/// This is an advisory read. The conditional write re-runs the same check
/// inside its transaction.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn has_conflict(
    store: &Store,
    field_id: &FacilityId,
    date: Date,
    slot: &TimeSlot,
    exclude: Option<&ReservationId>,
) -> Result<ConflictCheck, PersistenceError> {
    let confirmed: Vec<Reservation> = store.list_confirmed_on(field_id, date).await?;
    Ok(ConflictCheck::from(find_conflict(
        &confirmed, field_id, date, slot, exclude,
    )))
}
