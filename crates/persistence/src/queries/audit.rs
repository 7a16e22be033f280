// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{AuditEventRow, RecordedAuditEvent};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Lists the audit timeline of one entity, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_audit_events(
    conn: &mut SqliteConnection,
    entity_id: &str,
) -> Result<Vec<RecordedAuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::entity_id.eq(entity_id))
        .select(AuditEventRow::as_select())
        .order(audit_events::event_id.asc())
        .load(conn)?;

    rows.into_iter().map(AuditEventRow::into_recorded).collect()
}
