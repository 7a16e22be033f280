// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Time};

use crate::slot::format_time;

#[allow(clippy::trivially_copy_pass_by_ref)]
fn hm(time: &Time) -> String {
    format_time(*time)
}

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A time slot's end is not after its start.
    #[error("Invalid time slot: end {} must be after start {}", hm(.end), hm(.start))]
    InvalidTimeSlot {
        /// The requested start time.
        start: Time,
        /// The requested end time.
        end: Time,
    },
    /// A time slot falls outside the facility's opening hours.
    #[error(
        "Time slot {}-{} is outside opening hours {}-{}",
        hm(.start),
        hm(.end),
        hm(.opening),
        hm(.closing)
    )]
    OutsideOpeningHours {
        /// The requested start time.
        start: Time,
        /// The requested end time.
        end: Time,
        /// The facility opening time.
        opening: Time,
        /// The facility closing time.
        closing: Time,
    },
    /// Opening hours where closing is not after opening.
    #[error(
        "Invalid opening hours: closing {} must be after opening {}",
        hm(.closing),
        hm(.opening)
    )]
    InvalidOpeningHours {
        /// The opening time.
        opening: Time,
        /// The closing time.
        closing: Time,
    },
    /// A reservation was requested for a date that has already passed.
    #[error("Cannot reserve {date}: the date is before today ({today})")]
    DateInPast {
        /// The requested date.
        date: Date,
        /// The current date.
        today: Date,
    },
    /// A date string could not be parsed.
    #[error("Failed to parse date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },
    /// A time-of-day string could not be parsed.
    #[error("Failed to parse time '{value}': expected HH:MM")]
    InvalidTime {
        /// The rejected input.
        value: String,
    },
    /// Unknown role label.
    #[error("Invalid role: '{0}'")]
    InvalidRole(String),
    /// Unknown user status label.
    #[error("Invalid user status: '{0}'")]
    InvalidUserStatus(String),
    /// Unknown facility status label.
    #[error("Invalid facility status: '{0}'")]
    InvalidFacilityStatus(String),
    /// Unknown reservation status label.
    #[error("Invalid reservation status: '{0}'")]
    InvalidReservationStatus(String),
    /// Unknown notification kind label.
    #[error("Invalid notification kind: '{0}'")]
    InvalidNotificationKind(String),
    /// Email address is empty or malformed.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    /// A display or facility name is empty or too long.
    #[error("Invalid name: {0}")]
    InvalidName(String),
    /// A price is negative.
    #[error("Invalid price: {cents} cents")]
    InvalidPrice {
        /// The rejected price in cents.
        cents: i64,
    },
    /// An administrative override was requested without a reason.
    #[error("An override reason is required")]
    MissingOverrideReason,
    /// The requested status change is not defined by the lifecycle table.
    #[error("Cannot transition {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        /// The entity kind ("reservation" or "facility").
        entity: &'static str,
        /// The current status label.
        from: &'static str,
        /// The requested status label.
        to: &'static str,
    },
    /// The entity already has the requested status.
    #[error("The {entity} is already '{status}'")]
    AlreadyInState {
        /// The entity kind ("reservation", "facility" or "user").
        entity: &'static str,
        /// The current status label.
        status: &'static str,
    },
}
