// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod facility;
mod ids;
mod notification;
mod reservation;
mod slot;
mod user;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use facility::{Facility, FacilityDetails, FacilityStatus, FacilityTransition};
pub use ids::{FacilityId, NotificationId, ReservationId, UserId};
pub use notification::{Notification, NotificationKind};
pub use reservation::{Reservation, ReservationStatus, compute_total_price};
pub use slot::{
    TimeSlot, format_date, format_time, iso_date, parse_date, parse_time, time_of_day,
};
pub use user::{Role, User, UserStatus, normalize_email, validate_display_name};
