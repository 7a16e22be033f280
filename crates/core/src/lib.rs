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

mod account;
mod conflict;
mod error;
mod facility;
mod notice;
mod policy;
mod reservation;

#[cfg(test)]
mod tests;

pub use account::{
    AccountOutcome, plan_bootstrap_admin, plan_create_user, plan_register, plan_set_role,
    plan_set_status,
};
pub use conflict::{ConflictCheck, find_conflict};
pub use error::CoreError;
pub use facility::{
    FacilityOutcome, facility_path, plan_create_facility,
    plan_edit_facility, plan_facility_transition, toggle_transition,
};
pub use notice::{EmailTemplate, Notice};
pub use policy::{Action, ActorContext, Denial, Policy, Resource};
pub use reservation::{
    ReservationCommand, ReservationOutcome, plan_create_reservation, plan_reservation_transition,
};
