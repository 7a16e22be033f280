// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary of the fieldbook booking platform.
//!
//! Every operation follows the same order:
//!
//! 1. the caller is authenticated and the current entities are read,
//! 2. the core plans the change (authorization, lifecycle, conflicts),
//! 3. the store applies it with a conditional write and its audit event,
//! 4. notices are dispatched on a best-effort basis.
//!
//! Handlers return DTOs from [`request_response`] or an [`ApiError`].

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

mod conflict;
mod error;
pub mod handlers;
mod identity;
mod mail;
mod notify;
mod password_policy;
pub mod request_response;

#[cfg(test)]
mod tests;

pub use conflict::has_conflict;
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use identity::{
    AuthenticatedSession, Clock, IdentityError, IdentityVerifier, SessionIdentity,
};
pub use mail::{
    AnyMailer, ConsoleMailer, Email, EmailContext, MailError, Mailer, SmtpConfig, SmtpMailer,
    render_email,
};
pub use notify::{DispatchReport, NOTIFICATION_WARNING, NotificationDispatcher};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};

use fieldbook::Policy;
use fieldbook_persistence::Store;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Runtime settings of the API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Lifetime of a login session.
    pub session_ttl: Duration,
    /// Offset of the facilities' local time, used to decide "today".
    pub utc_offset: UtcOffset,
    /// Base URL for links in notifications and email.
    pub app_base_url: String,
    /// bcrypt cost for new password hashes.
    pub password_hash_cost: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            utc_offset: UtcOffset::UTC,
            app_base_url: String::from("http://localhost:3000"),
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Everything a handler needs.
pub struct Services<M> {
    pub store: Store,
    pub policy: Policy,
    pub identity: SessionIdentity,
    pub dispatcher: NotificationDispatcher<M>,
    pub password_policy: PasswordPolicy,
    utc_offset: UtcOffset,
    clock: Clock,
}

impl<M: Mailer> Services<M> {
    /// Wires the services around one store.
    #[must_use]
    pub fn new(store: Store, policy: Policy, mailer: M, settings: &ServiceSettings) -> Self {
        Self {
            identity: SessionIdentity::new(
                store.clone(),
                settings.session_ttl,
                settings.password_hash_cost,
            ),
            dispatcher: NotificationDispatcher::new(store.clone(), mailer, &settings.app_base_url),
            password_policy: PasswordPolicy::default(),
            utc_offset: settings.utc_offset,
            clock: OffsetDateTime::now_utc,
            store,
            policy,
        }
    }

    /// Replaces the wall clock, for sessions and planning alike.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self.identity = self.identity.with_clock(clock);
        self
    }

    /// The current instant.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    /// Today's date in the facilities' local time.
    #[must_use]
    pub fn today(&self) -> Date {
        self.now().to_offset(self.utc_offset).date()
    }
}
