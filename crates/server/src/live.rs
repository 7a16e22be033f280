// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live change streaming over WebSocket.
//!
//! A client subscribes to one collection with `GET /live?collection=<name>`
//! and receives a [`LiveEvent::Change`] for every committed write it may
//! see. Events carry identity only and are never authoritative; clients
//! re-read records over HTTP. No commands are accepted over the socket.
//!
//! Visibility mirrors the HTTP reads:
//!
//! - notifications and favorites: the caller's own
//! - reservations: the client, the facility owner, or an admin
//! - facilities: approved ones, the owner's own, or any for an admin
//! - users and audit events: admins only
//!
//! The session is verified again before every event, so a role change, a
//! disabled account, or a logout closes the stream.

use axum::{
    extract::{
        Query, State as AxumState, WebSocketUpgrade,
        ws::{CloseFrame, Message, WebSocket, close_code},
    },
    response::Response,
};
use fieldbook_api::{ApiError, AuthenticatedSession, IdentityError, IdentityVerifier};
use fieldbook_domain::{FacilityId, NotificationId, ReservationId, Role};
use fieldbook_persistence::{
    ChangeEvent, ChangeKind, Collection, FeedError, PersistenceError, Store, Subscription,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, warn};

use crate::session::SessionUser;
use crate::{AppState, HttpError};

/// Query parameters of the live endpoint.
#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    pub collection: String,
}

/// Messages sent to live clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// Sent once after the upgrade.
    Connected {
        collection: Collection,
        /// Server time, RFC 3339.
        timestamp: String,
    },
    /// A visible record changed.
    Change {
        collection: Collection,
        id: String,
        kind: ChangeKind,
    },
    /// The client fell behind and missed events; it should re-read.
    Lagged { missed: u64 },
}

impl From<ChangeEvent> for LiveEvent {
    fn from(event: ChangeEvent) -> Self {
        Self::Change {
            collection: event.collection,
            id: event.id,
            kind: event.kind,
        }
    }
}

/// Decides whether `session` may see `event`.
///
/// Records that can no longer be read are not shown.
///
/// # Errors
///
/// Returns a storage error if the record lookup fails.
pub async fn is_visible(
    store: &Store,
    session: &AuthenticatedSession,
    event: &ChangeEvent,
) -> Result<bool, PersistenceError> {
    let actor = &session.actor;
    let is_admin: bool = actor.role == Role::Admin;

    match event.collection {
        Collection::Users | Collection::AuditEvents => Ok(is_admin),
        Collection::Favorites => Ok(event
            .id
            .strip_prefix(actor.user_id.as_str())
            .is_some_and(|rest| rest.starts_with(':'))),
        Collection::Notifications => Ok(store
            .get_notification(&NotificationId::new(event.id.as_str()))
            .await?
            .is_some_and(|n| n.user_id == actor.user_id)),
        Collection::Facilities => Ok(store
            .get_facility(&FacilityId::new(event.id.as_str()))
            .await?
            .is_some_and(|f| is_admin || f.is_bookable() || f.is_owned_by(&actor.user_id))),
        Collection::Reservations => {
            let Some(reservation) = store
                .get_reservation(&ReservationId::new(event.id.as_str()))
                .await?
            else {
                return Ok(false);
            };
            if is_admin || reservation.client_id == actor.user_id {
                return Ok(true);
            }
            Ok(store
                .get_facility(&reservation.field_id)
                .await?
                .is_some_and(|f| f.is_owned_by(&actor.user_id)))
        }
    }
}

/// What happens to one change event for one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Send(LiveEvent),
    Skip,
    /// The subscriber's session is no longer valid.
    Close(String),
}

/// Re-verifies the subscriber's session, then checks `event` against the
/// fresh role and status.
///
/// Storage failures drop the event without closing the stream.
pub async fn screen_event<V: IdentityVerifier>(
    identity: &V,
    store: &Store,
    token: &str,
    event: ChangeEvent,
) -> Delivery {
    let session: AuthenticatedSession = match identity.verify(token).await {
        Ok(session) => session,
        Err(IdentityError::Store(e)) => {
            warn!(error = %e, id = %event.id, "Session lookup failed; event dropped");
            return Delivery::Skip;
        }
        Err(e) => return Delivery::Close(e.to_string()),
    };

    match is_visible(store, &session, &event).await {
        Ok(true) => Delivery::Send(LiveEvent::from(event)),
        Ok(false) => Delivery::Skip,
        Err(e) => {
            warn!(error = %e, id = %event.id, "Visibility check failed; event dropped");
            Delivery::Skip
        }
    }
}

/// Upgrades to a WebSocket streaming one collection's changes.
///
/// # Errors
///
/// Rejects with 400 for an unknown collection and 401 without a valid
/// session.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Query(query): Query<LiveQuery>,
) -> Result<Response, HttpError> {
    let collection: Collection = query
        .collection
        .parse::<Collection>()
        .map_err(|message| HttpError::from(ApiError::invalid_input("collection", message)))?;

    let store: &Store = &state.store;
    let user_id: String = session.actor.user_id.to_string();
    let subscription: Subscription = match collection {
        Collection::Favorites => {
            let prefix: String = format!("{user_id}:");
            store.subscribe(collection, move |event| event.id.starts_with(&prefix))
        }
        _ => store.subscribe(collection, |_| true),
    };

    info!(user_id = %user_id, collection = %collection, "Live stream requested");
    let token: String = session.token;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, token, subscription)))
}

async fn send_event(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &LiveEvent,
) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!(?e, "Failed to serialize live event");
            true
        }
    }
}

async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    token: String,
    mut subscription: Subscription,
) {
    let collection: Collection = subscription.collection();
    let (mut sender, mut receiver) = socket.split();

    let connected: LiveEvent = LiveEvent::Connected {
        collection,
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
    };
    if !send_event(&mut sender, &connected).await {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            let outgoing: LiveEvent = match subscription.recv().await {
                Ok(event) => match screen_event(&state.identity, &state.store, &token, event).await
                {
                    Delivery::Send(outgoing) => outgoing,
                    Delivery::Skip => continue,
                    Delivery::Close(reason) => {
                        info!(reason = %reason, "Closing live stream: session no longer valid");
                        let frame: CloseFrame = CloseFrame {
                            code: close_code::POLICY,
                            reason: reason.into(),
                        };
                        if let Err(e) = sender.send(Message::Close(Some(frame))).await {
                            debug!(?e, "Failed to send close frame");
                        }
                        break;
                    }
                },
                Err(FeedError::Lagged(missed)) => {
                    warn!(missed, "Live client lagged behind");
                    LiveEvent::Lagged { missed }
                }
                Err(FeedError::Closed) => break,
            };
            if !send_event(&mut sender, &outgoing).await {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!(collection = %collection, "Client disconnected from live stream");
}
