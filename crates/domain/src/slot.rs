// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar dates, times of day and half-open time slots.
//!
//! Dates travel as `YYYY-MM-DD` and times of day as `HH:MM`, both in the
//! facility's local time. Seconds are never carried.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Time};

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the input is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        DomainError::InvalidDate {
            value: value.to_string(),
        }
    })
}

/// Parses an `HH:MM` time of day.
///
/// # Errors
///
/// Returns `DomainError::InvalidTime` if the input is not a valid time.
pub fn parse_time(value: &str) -> Result<Time, DomainError> {
    Time::parse(value.trim(), format_description!("[hour]:[minute]")).map_err(|_| {
        DomainError::InvalidTime {
            value: value.to_string(),
        }
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.to_string()
}

/// Formats a time of day as `HH:MM`.
#[must_use]
pub fn format_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Serde adapter for `YYYY-MM-DD` dates.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    /// Serializes a date as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    /// Deserializes a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Fails if the value is not a string in the expected format.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `HH:MM` times of day.
pub mod time_of_day {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Time;

    /// Serializes a time of day as `HH:MM`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(time: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    /// Deserializes an `HH:MM` time of day.
    ///
    /// # Errors
    ///
    /// Fails if the value is not a string in the expected format.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// A half-open interval `[start, end)` within one day.
///
/// Construction guarantees `end > start`; zero-length and inverted slots
/// never exist as values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(rename = "start_time", with = "time_of_day")]
    start: Time,
    #[serde(rename = "end_time", with = "time_of_day")]
    end: Time,
}

impl TimeSlot {
    /// Creates a slot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeSlot` if `end <= start`.
    pub fn new(start: Time, end: Time) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidTimeSlot { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a slot from two `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either time is malformed or the slot is empty or inverted.
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// Returns the inclusive start.
    #[must_use]
    pub const fn start(&self) -> Time {
        self.start
    }

    /// Returns the exclusive end.
    #[must_use]
    pub const fn end(&self) -> Time {
        self.end
    }

    /// Half-open overlap test. Back-to-back slots do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the slot in whole minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).whole_minutes()
    }

    /// Checks that the slot lies within `[opening, closing]`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutsideOpeningHours` otherwise.
    pub fn ensure_within(&self, opening: Time, closing: Time) -> Result<(), DomainError> {
        if self.start < opening || self.end > closing {
            return Err(DomainError::OutsideOpeningHours {
                start: self.start,
                end: self.end,
                opening,
                closing,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", format_time(self.start), format_time(self.end))
    }
}
