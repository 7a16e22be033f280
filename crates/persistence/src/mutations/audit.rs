// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use fieldbook_audit::AuditEvent;
use tracing::debug;

use crate::data_models::format_timestamp;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event.
///
/// Callers run this inside the transaction that writes the audited change.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let recorded_at: String = format_timestamp(event.recorded_at)?;

    let event_id: i64 = diesel::insert_into(audit_events::table)
        .values((
            audit_events::entity_kind.eq(event.entity.kind.as_str()),
            audit_events::entity_id.eq(&event.entity.id),
            audit_events::actor_id.eq(event.actor.id.as_str()),
            audit_events::actor_role.eq(event.actor.role.as_str()),
            audit_events::action_name.eq(&event.action.name),
            audit_events::action_details.eq(event.action.details.as_deref()),
            audit_events::before_status.eq(event.before.as_deref()),
            audit_events::after_status.eq(event.after.as_deref()),
            audit_events::reason.eq(event.reason.as_deref()),
            audit_events::recorded_at.eq(&recorded_at),
        ))
        .returning(audit_events::event_id)
        .get_result(conn)?;

    debug!(
        event_id,
        action = %event.action.name,
        entity_id = %event.entity.id,
        "Persisted audit event"
    );
    Ok(event_id)
}
