// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the fieldbook booking platform.
//!
//! [`Store`] is the document store: users, facilities, reservations,
//! notifications, sessions, favorites and the audit log, kept in `SQLite`
//! through Diesel. All access goes through one connection guarded by an
//! async mutex. Multi-step writes run in `IMMEDIATE` transactions and the
//! audit event of a change is written in the same transaction as the change.
//!
//! ## Conditional writes
//!
//! Status changes carry the version the caller read. If the stored version
//! differs the write is refused with `PersistenceError::StaleVersion`.
//! Confirming a reservation re-runs the overlap check inside the write
//! transaction; disabling a facility re-counts upcoming confirmed
//! reservations.
//!
//! ## Change feed
//!
//! Every committed write publishes a [`ChangeEvent`] for each touched record
//! before the connection lock is released. See [`feed`].
//!
//! ## Testing
//!
//! `Store::new_in_memory()` opens a fresh shared-cache in-memory database
//! per call, so tests never observe each other's data.

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

use diesel::SqliteConnection;
use fieldbook_audit::AuditEvent;
use fieldbook_domain::{
    Facility, FacilityId, FacilityStatus, Notification, NotificationId, Reservation,
    ReservationId, User, UserId,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
pub mod feed;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{Credentials, RecordedAuditEvent, SessionData};
pub use error::{PersistenceError, USER_EMAIL_CONSTRAINT};
pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, Collection, FeedError, Subscription};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Handle to the document store. Cloning shares the connection and feed.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<SqliteConnection>>,
    feed: ChangeFeed,
}

impl Store {
    /// Creates a store over a fresh in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self::from_connection(conn))
    }

    /// Creates a store over a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            feed: ChangeFeed::new(),
        }
    }

    /// The change feed of this store.
    #[must_use]
    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Subscribes to changes in `collection` that satisfy `predicate`.
    #[must_use]
    pub fn subscribe<F>(&self, collection: Collection, predicate: F) -> Subscription
    where
        F: Fn(&ChangeEvent) -> bool + Send + Sync + 'static,
    {
        self.feed.subscribe(collection, predicate)
    }

    fn publish_audit(&self, event_id: i64) {
        self.feed.publish(ChangeEvent::new(
            Collection::AuditEvents,
            event_id.to_string(),
            ChangeKind::Created,
        ));
    }

    // ========================================================================
    // Users & sessions
    // ========================================================================

    /// Stores a new user with its audit event.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Duplicate` if the email is already
    /// registered, or another error if the write fails.
    pub async fn create_user(
        &self,
        user: &User,
        password_hash: &str,
        event: &AuditEvent,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        let event_id: i64 = mutations::users::insert_user(&mut conn, user, password_hash, event)?;
        self.feed.publish(ChangeEvent::new(
            Collection::Users,
            user.id.as_str(),
            ChangeKind::Created,
        ));
        self.publish_audit(event_id);
        drop(conn);
        Ok(())
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::users::get_user(&mut conn, user_id)
    }

    /// Retrieves a user and password hash by normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credentials>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::users::get_credentials_by_email(&mut conn, email)
    }

    /// Counts stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_users(&self) -> Result<usize, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::users::count_users(&mut conn)
    }

    /// Writes a user's role and status, revoking all of their sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the write fails.
    pub async fn update_user_access(
        &self,
        user: &User,
        event: &AuditEvent,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        let event_id: i64 = mutations::users::update_user_access(&mut conn, user, event)?;
        self.feed.publish(ChangeEvent::new(
            Collection::Users,
            user.id.as_str(),
            ChangeKind::Updated,
        ));
        self.publish_audit(event_id);
        drop(conn);
        Ok(())
    }

    /// Stores a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create_session(&self, session: &SessionData) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        mutations::users::insert_session(&mut conn, session)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_session(&self, token: &str) -> Result<Option<SessionData>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::users::get_session(&mut conn, token)
    }

    /// Deletes a session. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn delete_session(&self, token: &str) -> Result<bool, PersistenceError> {
        let mut conn = self.conn.lock().await;
        mutations::users::delete_session(&mut conn, token)
    }

    // ========================================================================
    // Facilities & favorites
    // ========================================================================

    /// Stores a new facility with its audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create_facility(
        &self,
        facility: &Facility,
        event: &AuditEvent,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        let event_id: i64 = mutations::facilities::insert_facility(&mut conn, facility, event)?;
        self.feed.publish(ChangeEvent::new(
            Collection::Facilities,
            facility.id.as_str(),
            ChangeKind::Created,
        ));
        self.publish_audit(event_id);
        drop(conn);
        Ok(())
    }

    /// Retrieves a facility by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_facility(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Option<Facility>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::facilities::get_facility(&mut conn, facility_id)
    }

    /// Lists facilities with the given status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_facilities_by_status(
        &self,
        status: FacilityStatus,
    ) -> Result<Vec<Facility>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::facilities::list_facilities_by_status(&mut conn, status)
    }

    /// Lists the facilities owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_facilities_by_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<Facility>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::facilities::list_facilities_by_owner(&mut conn, owner_id)
    }

    /// Writes a facility if its stored version still equals
    /// `expected_version`. Disabling re-counts upcoming confirmed
    /// reservations inside the write transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::StaleVersion`,
    /// `PersistenceError::HasFutureReservations`, or another error if the
    /// write fails.
    pub async fn update_facility(
        &self,
        facility: &Facility,
        expected_version: i64,
        event: &AuditEvent,
        today: Date,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        let event_id: i64 = mutations::facilities::update_facility(
            &mut conn,
            facility,
            expected_version,
            event,
            today,
        )?;
        self.feed.publish(ChangeEvent::new(
            Collection::Facilities,
            facility.id.as_str(),
            ChangeKind::Updated,
        ));
        self.publish_audit(event_id);
        drop(conn);
        Ok(())
    }

    /// Adds a favorite. Returns `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn add_favorite(
        &self,
        user_id: &UserId,
        facility_id: &FacilityId,
        now: OffsetDateTime,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.conn.lock().await;
        let added: bool =
            mutations::facilities::add_favorite(&mut conn, user_id, facility_id, now)?;
        if added {
            self.feed.publish(ChangeEvent::new(
                Collection::Favorites,
                favorite_key(user_id, facility_id),
                ChangeKind::Created,
            ));
        }
        drop(conn);
        Ok(added)
    }

    /// Removes a favorite. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn remove_favorite(
        &self,
        user_id: &UserId,
        facility_id: &FacilityId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.conn.lock().await;
        let removed: bool = mutations::facilities::remove_favorite(&mut conn, user_id, facility_id)?;
        if removed {
            self.feed.publish(ChangeEvent::new(
                Collection::Favorites,
                favorite_key(user_id, facility_id),
                ChangeKind::Deleted,
            ));
        }
        drop(conn);
        Ok(removed)
    }

    /// Lists a user's favorite facilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<Facility>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::facilities::list_favorite_facilities(&mut conn, user_id)
    }

    // ========================================================================
    // Reservations
    // ========================================================================

    /// Stores a new reservation with its audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create_reservation(
        &self,
        reservation: &Reservation,
        event: &AuditEvent,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        let event_id: i64 =
            mutations::reservations::insert_reservation(&mut conn, reservation, event)?;
        self.feed.publish(ChangeEvent::new(
            Collection::Reservations,
            reservation.id.as_str(),
            ChangeKind::Created,
        ));
        self.publish_audit(event_id);
        drop(conn);
        Ok(())
    }

    /// Retrieves a reservation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::reservations::get_reservation(&mut conn, reservation_id)
    }

    /// Lists confirmed reservations on one facility and date, in creation
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_confirmed_on(
        &self,
        field_id: &FacilityId,
        date: Date,
    ) -> Result<Vec<Reservation>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::reservations::list_confirmed_on(&mut conn, field_id, date)
    }

    /// Lists a client's reservations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_reservations_by_client(
        &self,
        client_id: &UserId,
    ) -> Result<Vec<Reservation>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::reservations::list_reservations_by_client(&mut conn, client_id)
    }

    /// Lists every reservation on a facility.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_reservations_by_field(
        &self,
        field_id: &FacilityId,
    ) -> Result<Vec<Reservation>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::reservations::list_reservations_by_field(&mut conn, field_id)
    }

    /// Counts confirmed reservations on a facility dated `today` or later.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_future_confirmed(
        &self,
        field_id: &FacilityId,
        today: Date,
    ) -> Result<usize, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::reservations::count_future_confirmed(&mut conn, field_id, today)
    }

    /// Conditionally writes a reservation's status.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::StaleVersion`,
    /// `PersistenceError::ConcurrentConflict`,
    /// `PersistenceError::FacilityNotBookable` for a confirmation on a
    /// facility that is no longer approved, or another error if the write
    /// fails.
    pub async fn update_reservation(
        &self,
        reservation: &Reservation,
        expected_version: i64,
        event: &AuditEvent,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        let event_id: i64 = mutations::reservations::update_reservation(
            &mut conn,
            reservation,
            expected_version,
            event,
        )?;
        self.feed.publish(ChangeEvent::new(
            Collection::Reservations,
            reservation.id.as_str(),
            ChangeKind::Updated,
        ));
        self.publish_audit(event_id);
        drop(conn);
        Ok(())
    }

    // ========================================================================
    // Notifications & audit
    // ========================================================================

    /// Stores a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create_notification(
        &self,
        notification: &Notification,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.conn.lock().await;
        mutations::notifications::insert_notification(&mut conn, notification)?;
        self.feed.publish(ChangeEvent::new(
            Collection::Notifications,
            notification.id.as_str(),
            ChangeKind::Created,
        ));
        drop(conn);
        Ok(())
    }

    /// Retrieves a notification by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_notification(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::notifications::get_notification(&mut conn, notification_id)
    }

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_notifications(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::notifications::list_notifications(&mut conn, user_id)
    }

    /// Marks a notification as read. Returns whether it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn mark_notification_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.conn.lock().await;
        let found: bool =
            mutations::notifications::mark_notification_read(&mut conn, notification_id)?;
        if found {
            self.feed.publish(ChangeEvent::new(
                Collection::Notifications,
                notification_id.as_str(),
                ChangeKind::Updated,
            ));
        }
        drop(conn);
        Ok(found)
    }

    /// Lists the audit timeline of one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_audit_events(
        &self,
        entity_id: &str,
    ) -> Result<Vec<RecordedAuditEvent>, PersistenceError> {
        let mut conn = self.conn.lock().await;
        queries::audit::list_audit_events(&mut conn, entity_id)
    }
}

fn favorite_key(user_id: &UserId, facility_id: &FacilityId) -> String {
    format!("{user_id}:{facility_id}")
}
