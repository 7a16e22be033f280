// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password policy validation for registration and admin-created accounts.

use thiserror::Error;

/// Password policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is too short.
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Password does not mix enough character classes.
    #[error(
        "Password must contain at least {required} of the following: uppercase letter, lowercase letter, digit, symbol (found {found})"
    )]
    InsufficientComplexity { required: usize, found: usize },

    /// Password equals the account's email or display name.
    #[error("Password must not match the {field}")]
    MatchesForbiddenField { field: &'static str },
}

/// Password policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum password length, in characters.
    pub min_length: usize,
    /// Minimum number of character classes required (out of 4).
    pub min_complexity: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            min_complexity: 2,
        }
    }
}

impl PasswordPolicy {
    /// Validates a password against the policy.
    ///
    /// The email and display name comparisons ignore case.
    ///
    /// # Errors
    ///
    /// Returns a `PasswordPolicyError` if the password does not meet policy requirements.
    pub fn validate(
        &self,
        password: &str,
        email: &str,
        display_name: &str,
    ) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        let complexity: usize = Self::calculate_complexity(password);
        if complexity < self.min_complexity {
            return Err(PasswordPolicyError::InsufficientComplexity {
                required: self.min_complexity,
                found: complexity,
            });
        }

        let password_lower: String = password.to_lowercase();
        if password_lower == email.trim().to_lowercase() {
            return Err(PasswordPolicyError::MatchesForbiddenField { field: "email" });
        }
        if password_lower == display_name.trim().to_lowercase() {
            return Err(PasswordPolicyError::MatchesForbiddenField {
                field: "display name",
            });
        }

        Ok(())
    }

    /// Counts the character classes present: uppercase, lowercase, digits
    /// and symbols. Non-ASCII letters count as symbols.
    fn calculate_complexity(password: &str) -> usize {
        let mut has_uppercase: bool = false;
        let mut has_lowercase: bool = false;
        let mut has_digit: bool = false;
        let mut has_symbol: bool = false;

        for c in password.chars() {
            if c.is_ascii_uppercase() {
                has_uppercase = true;
            } else if c.is_ascii_lowercase() {
                has_lowercase = true;
            } else if c.is_ascii_digit() {
                has_digit = true;
            } else if !c.is_whitespace() {
                has_symbol = true;
            }
        }

        [has_uppercase, has_lowercase, has_digit, has_symbol]
            .into_iter()
            .filter(|present| *present)
            .count()
    }
}
