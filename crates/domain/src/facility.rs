// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility status lifecycle.
//!
//! ```text
//! pending --approve--> approved --disable--> disabled
//!    |                    ^                     |
//!    +--reject--> rejected +------enable--------+
//! ```
//!
//! Any edit of a facility's details sends it back to `pending`.

use crate::error::DomainError;
use crate::ids::{FacilityId, UserId};
use crate::slot::time_of_day;
use crate::user::validate_display_name;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{OffsetDateTime, Time};

/// Review and availability state of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityStatus {
    /// Awaiting admin review.
    Pending,
    /// Listed and bookable.
    Approved,
    /// Refused by an admin.
    Rejected,
    /// Temporarily withdrawn by its owner or an admin.
    Disabled,
}

impl FacilityStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Disabled => "disabled",
        }
    }

    /// Human-readable label used in notifications.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Disabled => "Disabled",
        }
    }

    /// Validates a transition and returns the resulting status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyInState` if the facility already has the
    /// transition's target status, or `DomainError::InvalidTransition` if the
    /// transition is not defined from this status.
    pub fn apply(&self, transition: FacilityTransition) -> Result<Self, DomainError> {
        let target: Self = transition.target();
        if *self == target {
            return Err(DomainError::AlreadyInState {
                entity: "facility",
                status: self.as_str(),
            });
        }

        let valid: bool = matches!(
            (self, transition),
            (Self::Pending, FacilityTransition::Approve | FacilityTransition::Reject)
                | (Self::Approved, FacilityTransition::Disable)
                | (Self::Disabled, FacilityTransition::Enable)
        );

        if valid {
            Ok(target)
        } else {
            Err(DomainError::InvalidTransition {
                entity: "facility",
                from: self.as_str(),
                to: target.as_str(),
            })
        }
    }

    /// The status a facility takes after its details are edited.
    #[must_use]
    pub const fn after_edit(&self) -> Self {
        Self::Pending
    }
}

impl FromStr for FacilityStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "disabled" => Ok(Self::Disabled),
            _ => Err(DomainError::InvalidFacilityStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status changes a facility can undergo, other than edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacilityTransition {
    /// Admin accepts a pending facility.
    Approve,
    /// Admin refuses a pending facility.
    Reject,
    /// Owner or admin withdraws an approved facility.
    Disable,
    /// Owner or admin relists a disabled facility.
    Enable,
}

impl FacilityTransition {
    /// The status this transition leads to.
    #[must_use]
    pub const fn target(&self) -> FacilityStatus {
        match self {
            Self::Approve | Self::Enable => FacilityStatus::Approved,
            Self::Reject => FacilityStatus::Rejected,
            Self::Disable => FacilityStatus::Disabled,
        }
    }

    /// Action name recorded in audit events.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Approve => "ApproveFacility",
            Self::Reject => "RejectFacility",
            Self::Disable => "DisableFacility",
            Self::Enable => "EnableFacility",
        }
    }
}

/// Owner-editable description of a facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityDetails {
    pub name: String,
    pub location: String,
    /// Price in cents per hour.
    pub price_per_hour: i64,
    #[serde(with = "time_of_day")]
    pub opening_time: Time,
    #[serde(with = "time_of_day")]
    pub closing_time: Time,
}

impl FacilityDetails {
    /// Normalizes and validates the details.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the price is negative, or the
    /// closing time is not after the opening time.
    pub fn validated(self) -> Result<Self, DomainError> {
        let name: String = validate_display_name(&self.name)?;
        if self.price_per_hour < 0 {
            return Err(DomainError::InvalidPrice {
                cents: self.price_per_hour,
            });
        }
        if self.closing_time <= self.opening_time {
            return Err(DomainError::InvalidOpeningHours {
                opening: self.opening_time,
                closing: self.closing_time,
            });
        }
        Ok(Self {
            name,
            location: self.location.trim().to_string(),
            ..self
        })
    }
}

/// A bookable sports field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub owner_id: UserId,
    #[serde(flatten)]
    pub details: FacilityDetails,
    pub status: FacilityStatus,
    pub reviewed_by: Option<UserId>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    pub review_note: Option<String>,
    /// Incremented on every write; used for conditional updates.
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Facility {
    /// Returns true if `user_id` owns this facility.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Only approved facilities accept reservations.
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        matches!(self.status, FacilityStatus::Approved)
    }
}
