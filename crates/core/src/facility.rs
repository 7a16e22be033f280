// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility state machine: creation, edits, review and availability toggles.

use crate::error::CoreError;
use crate::notice::Notice;
use crate::policy::{Action as PolicyAction, ActorContext, Policy, Resource};
use fieldbook_audit::{Action, AuditEvent, EntityKind, EntityRef};
use fieldbook_domain::{
    Facility, FacilityDetails, FacilityId, FacilityStatus, FacilityTransition, NotificationKind,
};
use time::OffsetDateTime;

/// The result of a planned facility change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityOutcome {
    pub facility: Facility,
    pub audit_event: AuditEvent,
    pub notices: Vec<Notice>,
}

/// Path of a facility's page, relative to the application base URL.
#[must_use]
pub fn facility_path(id: &FacilityId) -> String {
    format!("/facilities/{id}")
}

/// The transition a toggle request stands for, given the current status.
#[must_use]
pub const fn toggle_transition(status: FacilityStatus) -> FacilityTransition {
    match status {
        FacilityStatus::Disabled => FacilityTransition::Enable,
        FacilityStatus::Pending | FacilityStatus::Approved | FacilityStatus::Rejected => {
            FacilityTransition::Disable
        }
    }
}

/// Plans a new facility, created `pending` for review.
///
/// # Errors
///
/// Returns an error if the actor is not an active associate or the details
/// are invalid.
pub fn plan_create_facility(
    policy: &Policy,
    actor: &ActorContext,
    details: FacilityDetails,
    now: OffsetDateTime,
) -> Result<FacilityOutcome, CoreError> {
    policy.authorize(actor, PolicyAction::CreateFacility, Resource::System)?;
    let details: FacilityDetails = details.validated()?;

    let facility: Facility = Facility {
        id: FacilityId::generate(),
        owner_id: actor.user_id.clone(),
        details,
        status: FacilityStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
        review_note: None,
        version: 1,
        created_at: now,
        updated_at: now,
    };

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new("CreateFacility", Some(facility.details.name.clone())),
        EntityRef::new(EntityKind::Facility, facility.id.as_str()),
        None,
        Some(facility.status.as_str().to_string()),
        now,
    );

    Ok(FacilityOutcome {
        facility,
        audit_event,
        notices: Vec::new(),
    })
}

/// Plans an edit of a facility's details. Any edit returns the facility to
/// `pending` for a fresh review.
///
/// # Errors
///
/// Returns an error if the actor is neither the owner nor an admin, or the
/// new details are invalid.
pub fn plan_edit_facility(
    policy: &Policy,
    actor: &ActorContext,
    facility: &Facility,
    details: FacilityDetails,
    now: OffsetDateTime,
) -> Result<FacilityOutcome, CoreError> {
    policy.authorize(actor, PolicyAction::EditFacility, Resource::Facility(facility))?;
    let details: FacilityDetails = details.validated()?;

    let mut updated: Facility = facility.clone();
    updated.details = details;
    updated.status = facility.status.after_edit();
    updated.version += 1;
    updated.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new("EditFacility", Some(updated.details.name.clone())),
        EntityRef::new(EntityKind::Facility, facility.id.as_str()),
        Some(facility.status.as_str().to_string()),
        Some(updated.status.as_str().to_string()),
        now,
    );

    Ok(FacilityOutcome {
        facility: updated,
        audit_event,
        notices: Vec::new(),
    })
}

/// Plans a review or availability transition.
///
/// Approve and reject require an admin who does not own the facility and
/// record the reviewer. Disable and enable require the owner or an admin;
/// disabling is refused while `future_confirmed` is non-zero.
///
/// # Arguments
///
/// * `future_confirmed` - Confirmed reservations on this facility dated today
///   or later
/// * `note` - Optional reviewer note, recorded with approve and reject
///
/// # Errors
///
/// Returns an error if the actor is not allowed, the facility already has
/// the target status, the transition is undefined from the current status,
/// or upcoming confirmed reservations block disabling.
pub fn plan_facility_transition(
    policy: &Policy,
    actor: &ActorContext,
    facility: &Facility,
    transition: FacilityTransition,
    future_confirmed: usize,
    note: Option<String>,
    now: OffsetDateTime,
) -> Result<FacilityOutcome, CoreError> {
    let is_review: bool = matches!(
        transition,
        FacilityTransition::Approve | FacilityTransition::Reject
    );
    let policy_action: PolicyAction = if is_review {
        PolicyAction::ReviewFacility
    } else {
        PolicyAction::ToggleFacility
    };
    policy.authorize(actor, policy_action, Resource::Facility(facility))?;

    let target: FacilityStatus = facility.status.apply(transition)?;

    if transition == FacilityTransition::Disable && future_confirmed > 0 {
        return Err(CoreError::HasFutureReservations {
            count: future_confirmed,
        });
    }

    let note: Option<String> = note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let mut updated: Facility = facility.clone();
    updated.status = target;
    updated.version += 1;
    updated.updated_at = now;

    let mut notices: Vec<Notice> = Vec::new();
    if is_review {
        updated.reviewed_by = Some(actor.user_id.clone());
        updated.reviewed_at = Some(now);
        updated.review_note.clone_from(&note);
        notices.push(review_notice(&updated, note.as_deref()));
    }

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new(transition.action_name(), None),
        EntityRef::new(EntityKind::Facility, facility.id.as_str()),
        Some(facility.status.as_str().to_string()),
        Some(target.as_str().to_string()),
        now,
    )
    .with_reason(note);

    Ok(FacilityOutcome {
        facility: updated,
        audit_event,
        notices,
    })
}

fn review_notice(facility: &Facility, note: Option<&str>) -> Notice {
    let name: &str = &facility.details.name;
    let (kind, title, mut message) = if facility.status == FacilityStatus::Approved {
        (
            NotificationKind::FacilityApproved,
            "Facility approved",
            format!("Your facility \"{name}\" has been approved and is now listed."),
        )
    } else {
        (
            NotificationKind::FacilityRejected,
            "Facility rejected",
            format!("Your facility \"{name}\" has been rejected."),
        )
    };
    if let Some(note) = note {
        message.push_str(" Note: ");
        message.push_str(note);
    }

    Notice::new(
        facility.owner_id.clone(),
        kind,
        title,
        message,
        Some(facility.id.to_string()),
    )
    .with_link(facility_path(&facility.id))
}
