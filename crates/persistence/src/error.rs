// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;

/// `SQLite` prefixes unique violations with this before the column list.
const UNIQUE_VIOLATION_PREFIX: &str = "UNIQUE constraint failed: ";

/// The unique key on account emails.
pub const USER_EMAIL_CONSTRAINT: &str = "users.email";

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Database connection failed.
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),
    /// Initialization error.
    #[error("Initialization error: {0}")]
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    #[error("Foreign key enforcement is not enabled")]
    ForeignKeyEnforcementNotEnabled,
    /// A stored value could not be decoded into a domain type.
    #[error("Corrupt {column} value '{value}'")]
    CorruptValue {
        /// The column holding the value.
        column: &'static str,
        /// The stored text.
        value: String,
    },
    /// The requested record was not found.
    #[error("{collection} '{id}' not found")]
    NotFound {
        /// The collection searched.
        collection: &'static str,
        /// The identifier searched for.
        id: String,
    },
    /// A uniqueness constraint was violated.
    #[error("Duplicate value for {constraint}")]
    Duplicate {
        /// The constrained columns as `table.column`, comma separated.
        constraint: String,
    },
    /// The record changed since the caller read it.
    #[error("{collection} '{id}' was modified concurrently (expected version {expected}, found {found})")]
    StaleVersion {
        /// The collection written.
        collection: &'static str,
        /// The record identifier.
        id: String,
        /// The version the caller read.
        expected: i64,
        /// The version currently stored.
        found: i64,
    },
    /// Another reservation was confirmed for an overlapping slot between the
    /// caller's check and this write.
    #[error("Reservation {blocking_id} was confirmed for an overlapping slot concurrently")]
    ConcurrentConflict {
        /// The reservation that now holds the slot.
        blocking_id: String,
    },
    /// The facility stopped accepting bookings before a confirmation was
    /// written.
    #[error("Facility {field_id} is not open for booking (status '{status}')")]
    FacilityNotBookable {
        /// The facility of the reservation.
        field_id: String,
        /// The facility's stored status.
        status: String,
    },
    /// Confirmed reservations dated today or later appeared before the write.
    #[error("Facility has {count} confirmed upcoming reservation(s)")]
    HasFutureReservations {
        /// Number of blocking reservations.
        count: usize,
    },
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let message: &str = info.message();
                Self::Duplicate {
                    constraint: message
                        .strip_prefix(UNIQUE_VIOLATION_PREFIX)
                        .unwrap_or(message)
                        .to_string(),
                }
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
