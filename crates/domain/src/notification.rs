// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::ids::{NotificationId, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReservationRequested,
    ReservationConfirmed,
    ReservationCancelled,
    ReservationStatusChanged,
    FacilityApproved,
    FacilityRejected,
}

impl NotificationKind {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReservationRequested => "reservation_requested",
            Self::ReservationConfirmed => "reservation_confirmed",
            Self::ReservationCancelled => "reservation_cancelled",
            Self::ReservationStatusChanged => "reservation_status_changed",
            Self::FacilityApproved => "facility_approved",
            Self::FacilityRejected => "facility_rejected",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reservation_requested" => Ok(Self::ReservationRequested),
            "reservation_confirmed" => Ok(Self::ReservationConfirmed),
            "reservation_cancelled" => Ok(Self::ReservationCancelled),
            "reservation_status_changed" => Ok(Self::ReservationStatusChanged),
            "facility_approved" => Ok(Self::FacilityApproved),
            "facility_rejected" => Ok(Self::FacilityRejected),
            _ => Err(DomainError::InvalidNotificationKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-app message for one user.
///
/// Notifications are derived from state changes and are never consulted
/// when deciding whether a change is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// The reservation or facility the notification refers to.
    pub related_id: Option<String>,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
