// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation status lifecycle.
//!
//! Ordinary transitions:
//!
//! ```text
//! pending --> confirmed --> completed
//!    |            |
//!    +--> cancelled <--+
//! ```
//!
//! `cancelled` and `completed` are terminal for ordinary transitions. An
//! administrative override may move a reservation between any two distinct
//! statuses.

use crate::error::DomainError;
use crate::ids::{FacilityId, ReservationId, UserId};
use crate::slot::{TimeSlot, iso_date};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Requested by a client, awaiting the owner.
    Pending,
    /// Accepted; occupies its slot.
    Confirmed,
    /// Withdrawn or refused.
    Cancelled,
    /// Played.
    Completed,
}

impl ReservationStatus {
    /// All statuses.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Human-readable label used in notifications and emails.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }

    /// Returns true if no ordinary transition leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Returns true if the ordinary lifecycle allows `self -> target`.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled | Self::Completed)
        )
    }

    /// Validates an ordinary transition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyInState` when `target` equals the current
    /// status, and `DomainError::InvalidTransition` when the lifecycle does
    /// not define the move.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if *self == target {
            return Err(DomainError::AlreadyInState {
                entity: "reservation",
                status: self.as_str(),
            });
        }
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                entity: "reservation",
                from: self.as_str(),
                to: target.as_str(),
            })
        }
    }

    /// Validates an administrative override. Any distinct status is allowed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyInState` when `target` equals the current
    /// status.
    pub fn validate_override(&self, target: Self) -> Result<(), DomainError> {
        if *self == target {
            return Err(DomainError::AlreadyInState {
                entity: "reservation",
                status: self.as_str(),
            });
        }
        Ok(())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidReservationStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client's request to occupy a facility for one slot on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub field_id: FacilityId,
    pub client_id: UserId,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(flatten)]
    pub slot: TimeSlot,
    /// Price in cents.
    pub total_price: i64,
    pub status: ReservationStatus,
    /// Reason given with the most recent administrative override.
    pub status_reason: Option<String>,
    /// Incremented on every write; used for conditional updates.
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Reservation {
    /// Returns true if this reservation currently holds its slot.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self.status, ReservationStatus::Confirmed)
    }
}

/// Price of a slot at an hourly rate, rounded down to the cent.
#[must_use]
pub fn compute_total_price(price_per_hour: i64, slot: &TimeSlot) -> i64 {
    price_per_hour.saturating_mul(slot.duration_minutes()) / 60
}
