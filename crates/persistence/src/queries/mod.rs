// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every function takes the connection explicitly so the same query can run
//! on its own or inside a write transaction.

pub mod audit;
pub mod facilities;
pub mod notifications;
pub mod reservations;
pub mod users;

use crate::error::PersistenceError;

/// Converts a SQL count into a `usize`.
pub(crate) fn count_to_usize(count: i64) -> Result<usize, PersistenceError> {
    usize::try_from(count)
        .map_err(|_| PersistenceError::QueryFailed(format!("Invalid row count {count}")))
}
