// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes.
//!
//! Each state change that carries an audit event writes the record and the
//! event in one `IMMEDIATE` transaction. Conditional writes re-check their
//! preconditions inside that transaction.

pub mod audit;
pub mod facilities;
pub mod notifications;
pub mod reservations;
pub mod users;
