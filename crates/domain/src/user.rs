// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

const MAX_NAME_LEN: usize = 120;

/// The single role held by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Reviews facilities, adjudicates reservations, manages accounts.
    Admin,
    /// Owns and operates facilities.
    Associate,
    /// Books facilities.
    Client,
}

impl Role {
    /// All roles, in privilege order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Associate, Self::Client];

    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Associate => "associate",
            Self::Client => "client",
        }
    }

    /// Human-readable label used in messages and emails.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Associate => "Associate",
            Self::Client => "Client",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "associate" => Ok(Self::Associate),
            "client" => Ok(Self::Client),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an account may act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// The account may perform any action its role allows.
    Active,
    /// The account may read but not mutate.
    Disabled,
}

impl UserStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }

    /// Returns the opposite status.
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Disabled,
            Self::Disabled => Self::Active,
        }
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "disabled" => Ok(Self::Disabled),
            _ => Err(DomainError::InvalidUserStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account.
///
/// Credentials are not part of the domain user; the store keeps the
/// password hash beside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Returns true if the account is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, UserStatus::Active)
    }
}

/// Normalizes an email address to lowercase and checks its basic shape.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the address is empty or lacks a
/// local part, an `@`, or a dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email: String = raw.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::InvalidEmail(format!("'{raw}' is missing '@'")));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(DomainError::InvalidEmail(format!("'{raw}' is malformed")));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(DomainError::InvalidEmail(format!(
            "'{raw}' has an invalid domain"
        )));
    }
    Ok(email)
}

/// Trims a display or facility name and checks it is usable.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the name is blank or too long.
pub fn validate_display_name(raw: &str) -> Result<String, DomainError> {
    let name: &str = raw.trim();
    if name.is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::InvalidName(format!(
            "Name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
