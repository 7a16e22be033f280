// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::policy::Denial;
use fieldbook_domain::{DomainError, ReservationId, UserId};

/// Errors that can occur while planning a state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// The actor is not allowed to perform the action.
    #[error("Forbidden: {0}")]
    Denied(#[from] Denial),
    /// The slot overlaps a confirmed reservation.
    #[error("Time slot overlaps confirmed reservation {reservation_id}")]
    ConflictingReservation {
        /// The blocking reservation.
        reservation_id: ReservationId,
        /// The client holding the blocking reservation.
        holder_id: UserId,
    },
    /// The facility still has confirmed reservations today or later.
    #[error("Facility has {count} confirmed upcoming reservation(s)")]
    HasFutureReservations {
        /// Number of blocking reservations.
        count: usize,
    },
}
