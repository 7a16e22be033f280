// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.
//!
//! Errors from the lower layers are translated explicitly so that domain,
//! core and storage types never leak through the API contract.

use crate::identity::IdentityError;
use crate::mail::MailError;
use crate::password_policy::PasswordPolicyError;
use fieldbook::CoreError;
use fieldbook_domain::DomainError;
use fieldbook_persistence::{PersistenceError, USER_EMAIL_CONSTRAINT};

/// API-level errors.
///
/// Variants are ordered from "who are you" to "try again later"; each maps
/// to one HTTP status in the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid or expired credentials.
    #[error("Authentication required: {reason}")]
    Unauthenticated {
        /// Why the caller could not be authenticated.
        reason: String,
    },
    /// The caller is authenticated but not allowed to do this.
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// The policy denial.
        reason: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The slot overlaps a confirmed reservation.
    #[error("Time slot conflicts with reservation {reservation_id} held by {holder_name}")]
    ConflictingReservation {
        /// The blocking reservation.
        reservation_id: String,
        /// The client holding it.
        holder_id: String,
        /// The client's display name.
        holder_name: String,
    },
    /// An overlapping reservation was confirmed between the check and the write.
    #[error("Reservation {reservation_id} was confirmed for an overlapping slot in the meantime")]
    ConcurrentConflict {
        /// The reservation that now holds the slot.
        reservation_id: String,
    },
    /// Upcoming confirmed reservations block disabling a facility.
    #[error("Facility has {count} confirmed upcoming reservation(s)")]
    HasFutureReservations {
        /// Number of blocking reservations.
        count: usize,
    },
    /// The entity already has the requested status.
    #[error("{message}")]
    AlreadyInState {
        /// A human-readable description.
        message: String,
    },
    /// The lifecycle does not allow the requested change.
    #[error("{message}")]
    InvalidTransition {
        /// A human-readable description.
        message: String,
    },
    /// The record changed since it was read.
    #[error("Concurrent modification: {message}")]
    ConcurrentModification {
        /// A human-readable description.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// The kind of resource.
        resource: String,
        /// The identifier that was looked up.
        id: String,
    },
    /// Storage or delivery failed; the request may be retried.
    #[error("Temporary failure: {message}")]
    Transient {
        /// A description of the failure.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable `snake_case` name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidInput { .. } => "invalid_input",
            Self::ConflictingReservation { .. } => "conflicting_reservation",
            Self::ConcurrentConflict { .. } => "concurrent_conflict",
            Self::HasFutureReservations { .. } => "has_future_reservations",
            Self::AlreadyInState { .. } => "already_in_state",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::NotFound { .. } => "not_found",
            Self::Transient { .. } => "transient",
        }
    }

    /// Builds a `NotFound` error.
    #[must_use]
    pub fn not_found(resource: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.into(),
        }
    }

    /// Builds an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::invalid_input("password", err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken
            | IdentityError::Expired
            | IdentityError::StaleClaim
            | IdentityError::InvalidCredentials => Self::Unauthenticated {
                reason: err.to_string(),
            },
            IdentityError::AccountDisabled => Self::Forbidden {
                reason: err.to_string(),
            },
            IdentityError::Hashing(message) => Self::Transient { message },
            IdentityError::Store(store_err) => translate_persistence_error(store_err),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        Self::Transient {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    let field: &str = match err {
        DomainError::AlreadyInState { .. } => return ApiError::AlreadyInState { message },
        DomainError::InvalidTransition { .. } => return ApiError::InvalidTransition { message },
        DomainError::InvalidTimeSlot { .. } | DomainError::OutsideOpeningHours { .. } => {
            "time_slot"
        }
        DomainError::InvalidOpeningHours { .. } => "opening_hours",
        DomainError::DateInPast { .. } | DomainError::InvalidDate { .. } => "date",
        DomainError::InvalidTime { .. } => "time",
        DomainError::InvalidRole(_) => "role",
        DomainError::InvalidUserStatus(_)
        | DomainError::InvalidFacilityStatus(_)
        | DomainError::InvalidReservationStatus(_) => "status",
        DomainError::InvalidNotificationKind(_) => "kind",
        DomainError::InvalidEmail(_) => "email",
        DomainError::InvalidName(_) => "name",
        DomainError::InvalidPrice { .. } => "price_per_hour",
        DomainError::MissingOverrideReason => "reason",
    };
    ApiError::invalid_input(field, message)
}

/// Translates a core error into an API error.
///
/// A conflicting reservation is reported with its holder's id in place of
/// the display name; handlers that can look the holder up replace it.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Denied(denial) => ApiError::Forbidden {
            reason: denial.to_string(),
        },
        CoreError::ConflictingReservation {
            reservation_id,
            holder_id,
        } => ApiError::ConflictingReservation {
            reservation_id: reservation_id.to_string(),
            holder_name: holder_id.to_string(),
            holder_id: holder_id.into_inner(),
        },
        CoreError::HasFutureReservations { count } => ApiError::HasFutureReservations { count },
    }
}

/// Translates a storage error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound { collection, id } => ApiError::NotFound {
            resource: collection.to_string(),
            id,
        },
        PersistenceError::Duplicate { constraint } if constraint == USER_EMAIL_CONSTRAINT => {
            ApiError::invalid_input("email", "An account with this email already exists")
        }
        PersistenceError::Duplicate { constraint } => ApiError::ConcurrentModification {
            message: format!("A record with the same {constraint} already exists"),
        },
        PersistenceError::StaleVersion { .. } => ApiError::ConcurrentModification {
            message: err.to_string(),
        },
        PersistenceError::ConcurrentConflict { blocking_id } => ApiError::ConcurrentConflict {
            reservation_id: blocking_id,
        },
        PersistenceError::HasFutureReservations { count } => {
            ApiError::HasFutureReservations { count }
        }
        PersistenceError::FacilityNotBookable { .. } => ApiError::ConcurrentModification {
            message: err.to_string(),
        },
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::CorruptValue { .. } => ApiError::Transient {
            message: err.to_string(),
        },
    }
}
