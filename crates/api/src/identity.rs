// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session-token identity.
//!
//! The stored user record is the source of truth for authorization. The
//! role recorded on a session when it was issued is only a cache: if it no
//! longer matches the user's role the session is revoked and the request is
//! refused with [`IdentityError::StaleClaim`].

use std::future::Future;

use fieldbook::ActorContext;
use fieldbook_domain::{User, normalize_email};
use fieldbook_persistence::{Credentials, PersistenceError, SessionData, Store};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Source of the current instant.
pub type Clock = fn() -> OffsetDateTime;

/// Errors raised while authenticating a caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid session token")]
    InvalidToken,
    #[error("Session expired")]
    Expired,
    #[error("Session role no longer matches the account; please sign in again")]
    StaleClaim,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is disabled")]
    AccountDisabled,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] PersistenceError),
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub token: String,
    /// The user record as read for this request.
    pub user: User,
    pub actor: ActorContext,
}

/// Turns a bearer token into an authenticated caller.
pub trait IdentityVerifier: Send + Sync {
    /// Verifies `token`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken`, `Expired` or `StaleClaim` if the token cannot
    /// be trusted, `AccountDisabled` if the account was disabled, or `Store`
    /// if the lookup fails.
    fn verify(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<AuthenticatedSession, IdentityError>> + Send;
}

/// Identity provider backed by the store's `sessions` collection.
#[derive(Clone)]
pub struct SessionIdentity {
    store: Store,
    session_ttl: Duration,
    hash_cost: u32,
    clock: Clock,
}

impl SessionIdentity {
    /// Creates a provider issuing sessions valid for `session_ttl`, hashing
    /// passwords with bcrypt at `hash_cost`.
    #[must_use]
    pub const fn new(store: Store, session_ttl: Duration, hash_cost: u32) -> Self {
        Self {
            store,
            session_ttl,
            hash_cost,
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Replaces the clock used to check session expiry.
    #[must_use]
    pub const fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Hashes a password for storage.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Hashing` if bcrypt fails.
    pub async fn hash_password(&self, password: &str) -> Result<String, IdentityError> {
        let password: String = password.to_string();
        let cost: u32 = self.hash_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| IdentityError::Hashing(format!("Hashing task failed: {e}")))?
            .map_err(|e| IdentityError::Hashing(e.to_string()))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, IdentityError> {
        let password: String = password.to_string();
        let hash: String = hash.to_string();
        let verified: Result<bool, bcrypt::BcryptError> =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
                .await
                .map_err(|e| IdentityError::Hashing(format!("Hashing task failed: {e}")))?;
        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be checked");
                Ok(false)
            }
        }
    }

    /// Checks credentials and issues a new session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown email or wrong password,
    /// `AccountDisabled` for a disabled account, or a storage error.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(SessionData, User), IdentityError> {
        let email: String = normalize_email(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let credentials: Credentials = self
            .store
            .get_credentials_by_email(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !self
            .verify_password(password, &credentials.password_hash)
            .await?
        {
            debug!(user_id = %credentials.user.id, "Login refused: wrong password");
            return Err(IdentityError::InvalidCredentials);
        }
        if !credentials.user.is_active() {
            info!(user_id = %credentials.user.id, "Login refused: account disabled");
            return Err(IdentityError::AccountDisabled);
        }

        let session: SessionData = SessionData {
            token: generate_token(),
            user_id: credentials.user.id.clone(),
            role_claim: credentials.user.role,
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.store.create_session(&session).await?;
        info!(user_id = %credentials.user.id, role = %credentials.user.role, "Session issued");

        Ok((session, credentials.user))
    }

    /// Revokes a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the delete fails.
    pub async fn logout(&self, token: &str) -> Result<(), IdentityError> {
        if self.store.delete_session(token).await? {
            debug!("Session revoked");
        }
        Ok(())
    }

    async fn revoke(&self, token: &str) {
        if let Err(e) = self.store.delete_session(token).await {
            warn!(error = %e, "Failed to revoke session");
        }
    }
}

impl IdentityVerifier for SessionIdentity {
    async fn verify(&self, token: &str) -> Result<AuthenticatedSession, IdentityError> {
        let session: SessionData = self
            .store
            .get_session(token)
            .await?
            .ok_or(IdentityError::InvalidToken)?;

        if (self.clock)() >= session.expires_at {
            self.revoke(token).await;
            return Err(IdentityError::Expired);
        }

        let Some(user) = self.store.get_user(&session.user_id).await? else {
            self.revoke(token).await;
            return Err(IdentityError::InvalidToken);
        };

        if !user.is_active() {
            info!(user_id = %user.id, "Session refused: account disabled");
            self.revoke(token).await;
            return Err(IdentityError::AccountDisabled);
        }

        if user.role != session.role_claim {
            warn!(
                user_id = %user.id,
                claimed = %session.role_claim,
                stored = %user.role,
                "Session role claim is stale"
            );
            self.revoke(token).await;
            return Err(IdentityError::StaleClaim);
        }

        Ok(AuthenticatedSession {
            token: session.token,
            actor: ActorContext::from_user(&user),
            user,
        })
    }
}

fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
