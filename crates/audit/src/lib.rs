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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use fieldbook_domain::{Role, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// The user who performed an action, with the role they held at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user.
    pub id: UserId,
    /// The role the user held when acting.
    pub role: Role,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// The specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`ConfirmReservation`", "`ApproveFacility`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub fn new(name: impl Into<String>, details: Option<String>) -> Self {
        Self {
            name: name.into(),
            details,
        }
    }
}

/// Kinds of entity whose changes are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Facility,
    Reservation,
}

impl EntityKind {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Facility => "facility",
            Self::Reservation => "reservation",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "facility" => Ok(Self::Facility),
            "reservation" => Ok(Self::Reservation),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity an audit event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    /// Creates a new `EntityRef`.
    #[must_use]
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// An immutable record of one state change.
///
/// Every successful mutation produces exactly one audit event, written in
/// the same transaction as the change itself. Audit events capture:
/// - Who performed the action (actor)
/// - What action was performed (action)
/// - Which entity changed (entity)
/// - The status before and after the change
/// - The reason supplied, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The action that was performed.
    pub action: Action,
    /// The entity that changed.
    pub entity: EntityRef,
    /// Status label before the change; `None` for creations.
    pub before: Option<String>,
    /// Status label after the change.
    pub after: Option<String>,
    /// Reason supplied by the actor (overrides, rejections).
    pub reason: Option<String>,
    /// When the change was decided.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// Once created, an audit event is immutable.
    #[must_use]
    pub const fn new(
        actor: Actor,
        action: Action,
        entity: EntityRef,
        before: Option<String>,
        after: Option<String>,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            actor,
            action,
            entity,
            before,
            after,
            reason: None,
            recorded_at,
        }
    }

    /// Attaches the actor's stated reason.
    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}
