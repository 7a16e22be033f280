// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Change feed.
//!
//! Every committed write publishes one [`ChangeEvent`] per touched record.
//! Events are published while the store's write lock is held, so for any
//! single record subscribers observe changes in write order.
//!
//! Events carry identity only. Subscribers re-read the record through the
//! store when they need its contents.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::broadcast;
use tracing::debug;

/// Maximum number of events buffered per subscriber.
/// Subscribers that fall further behind are told how many they missed.
pub const EVENT_BUFFER_SIZE: usize = 256;

/// Collections whose changes are published.
///
/// Sessions are never published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Facilities,
    Reservations,
    Notifications,
    Favorites,
    AuditEvents,
}

impl Collection {
    /// Returns the collection name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Facilities => "facilities",
            Self::Reservations => "reservations",
            Self::Notifications => "notifications",
            Self::Favorites => "favorites",
            Self::AuditEvents => "audit_events",
        }
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Self::Users),
            "facilities" => Ok(Self::Facilities),
            "reservations" => Ok(Self::Reservations),
            "notifications" => Ok(Self::Notifications),
            "favorites" => Ok(Self::Favorites),
            "audit_events" => Ok(Self::AuditEvents),
            other => Err(format!("unknown collection '{other}'")),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// One committed change to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub id: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Creates a new change event.
    #[must_use]
    pub fn new(collection: Collection, id: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            collection,
            id: id.into(),
            kind,
        }
    }
}

/// Errors returned by [`Subscription::recv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The subscriber fell behind and events were dropped.
    #[error("Subscriber lagged behind and missed {0} event(s)")]
    Lagged(u64),
    /// The store was dropped.
    #[error("Change feed closed")]
    Closed,
}

/// Broadcaster for change events.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Creates a new change feed.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: ChangeEvent) {
        match self.tx.send(event) {
            Ok(receivers) => debug!(receivers, "Published change event"),
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "No subscribers for change event");
            }
        }
    }

    /// Subscribes to changes in one collection that satisfy `predicate`.
    ///
    /// Only changes committed after this call are delivered.
    #[must_use]
    pub fn subscribe<F>(&self, collection: Collection, predicate: F) -> Subscription
    where
        F: Fn(&ChangeEvent) -> bool + Send + Sync + 'static,
    {
        Subscription {
            collection,
            predicate: Box::new(predicate),
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// A filtered view of the change feed.
pub struct Subscription {
    collection: Collection,
    predicate: Box<dyn Fn(&ChangeEvent) -> bool + Send + Sync>,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// The collection this subscription watches.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Waits for the next matching change.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Lagged` if events were dropped because this
    /// subscriber fell behind (the subscription stays usable), or
    /// `FeedError::Closed` once the store is gone.
    pub async fn recv(&mut self) -> Result<ChangeEvent, FeedError> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.collection == self.collection && (self.predicate)(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    return Err(FeedError::Lagged(missed));
                }
                Err(broadcast::error::RecvError::Closed) => return Err(FeedError::Closed),
            }
        }
    }

    /// Returns the next matching change that is already buffered, if any.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Lagged` or `FeedError::Closed` as [`Self::recv`].
    pub fn try_recv(&mut self) -> Result<Option<ChangeEvent>, FeedError> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if event.collection == self.collection && (self.predicate)(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    return Err(FeedError::Lagged(missed));
                }
                Err(broadcast::error::TryRecvError::Closed) => return Err(FeedError::Closed),
            }
        }
    }
}
