// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation state machine.
//!
//! Planning functions take the current entities, decide whether the change
//! is allowed, and return the updated reservation together with its audit
//! event and the notices to deliver. Nothing is written here; the caller
//! persists the outcome with a conditional write.

use crate::conflict::find_conflict;
use crate::error::CoreError;
use crate::notice::{EmailTemplate, Notice};
use crate::policy::{Action as PolicyAction, ActorContext, Denial, Policy, Resource};
use fieldbook_audit::{Action, AuditEvent, EntityKind, EntityRef};
use fieldbook_domain::{
    DomainError, Facility, NotificationKind, Reservation, ReservationId, ReservationStatus,
    TimeSlot, compute_total_price, format_date, format_time,
};
use time::{Date, OffsetDateTime};

/// The result of a planned reservation change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationOutcome {
    /// The reservation as it should be stored.
    pub reservation: Reservation,
    /// The audit event recording the change.
    pub audit_event: AuditEvent,
    /// Notices to deliver once the change is committed.
    pub notices: Vec<Notice>,
}

/// A requested status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationCommand {
    Confirm,
    Cancel,
    Complete,
    /// Administrative override to any other status, with a mandatory reason.
    Override {
        target: ReservationStatus,
        reason: String,
    },
}

impl ReservationCommand {
    /// The status this command leads to.
    #[must_use]
    pub const fn target(&self) -> ReservationStatus {
        match self {
            Self::Confirm => ReservationStatus::Confirmed,
            Self::Cancel => ReservationStatus::Cancelled,
            Self::Complete => ReservationStatus::Completed,
            Self::Override { target, .. } => *target,
        }
    }

    /// Action name recorded in audit events.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Confirm => "ConfirmReservation",
            Self::Cancel => "CancelReservation",
            Self::Complete => "CompleteReservation",
            Self::Override { .. } => "OverrideReservation",
        }
    }

    const fn policy_action(&self) -> PolicyAction {
        match self {
            Self::Override { .. } => PolicyAction::OverrideReservation,
            Self::Confirm | Self::Cancel | Self::Complete => PolicyAction::TransitionReservation,
        }
    }
}

/// Plans a new pending reservation by a client.
///
/// # Arguments
///
/// * `today` - The current date in the facility's local time
/// * `now` - The current instant, recorded as creation time
///
/// # Errors
///
/// Returns an error if the actor may not book this facility, the date is in
/// the past, or the slot falls outside the facility's opening hours.
pub fn plan_create_reservation(
    policy: &Policy,
    actor: &ActorContext,
    facility: &Facility,
    date: Date,
    slot: TimeSlot,
    today: Date,
    now: OffsetDateTime,
) -> Result<ReservationOutcome, CoreError> {
    policy.authorize(
        actor,
        PolicyAction::CreateReservation,
        Resource::Facility(facility),
    )?;

    if date < today {
        return Err(DomainError::DateInPast { date, today }.into());
    }
    slot.ensure_within(facility.details.opening_time, facility.details.closing_time)?;

    let reservation: Reservation = Reservation {
        id: ReservationId::generate(),
        field_id: facility.id.clone(),
        client_id: actor.user_id.clone(),
        date,
        slot,
        total_price: compute_total_price(facility.details.price_per_hour, &slot),
        status: ReservationStatus::Pending,
        status_reason: None,
        version: 1,
        created_at: now,
        updated_at: now,
    };

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new(
            "CreateReservation",
            Some(format!(
                "{} on {} at {}",
                facility.details.name,
                format_date(date),
                slot
            )),
        ),
        EntityRef::new(EntityKind::Reservation, reservation.id.as_str()),
        None,
        Some(reservation.status.as_str().to_string()),
        now,
    );

    let notice: Notice = Notice::new(
        facility.owner_id.clone(),
        NotificationKind::ReservationRequested,
        "New reservation request",
        format!(
            "A reservation for {} on {} from {} to {} is awaiting your confirmation.",
            facility.details.name,
            format_date(date),
            format_time(slot.start()),
            format_time(slot.end()),
        ),
        Some(reservation.id.to_string()),
    );

    Ok(ReservationOutcome {
        reservation,
        audit_event,
        notices: vec![notice],
    })
}

/// Plans a status change of an existing reservation.
///
/// Checks run in a fixed order: authorization, override reason, current
/// status, lifecycle table, then for any move into `confirmed` the
/// facility's bookability and the conflict check. An override cannot
/// confirm on a facility that is not approved either.
///
/// # Arguments
///
/// * `confirmed_same_day` - Confirmed reservations on the same facility and
///   date, in creation order
///
/// # Errors
///
/// Returns an error if the actor is not allowed, the override reason is
/// missing, the reservation already has the target status, the ordinary
/// lifecycle does not allow the move, the facility is not bookable, or
/// confirming would overlap another confirmed reservation.
pub fn plan_reservation_transition(
    policy: &Policy,
    actor: &ActorContext,
    facility: &Facility,
    reservation: &Reservation,
    command: &ReservationCommand,
    confirmed_same_day: &[Reservation],
    now: OffsetDateTime,
) -> Result<ReservationOutcome, CoreError> {
    policy.authorize(
        actor,
        command.policy_action(),
        Resource::Reservation {
            reservation,
            facility,
        },
    )?;

    let previous: ReservationStatus = reservation.status;
    let target: ReservationStatus = command.target();

    let reason: Option<String> = match command {
        ReservationCommand::Override { reason, .. } => {
            let reason: &str = reason.trim();
            if reason.is_empty() {
                return Err(DomainError::MissingOverrideReason.into());
            }
            previous.validate_override(target)?;
            Some(reason.to_string())
        }
        ReservationCommand::Confirm | ReservationCommand::Cancel | ReservationCommand::Complete => {
            previous.validate_transition(target)?;
            None
        }
    };

    if target == ReservationStatus::Confirmed && !facility.is_bookable() {
        return Err(Denial::FacilityNotBookable {
            status: facility.status,
        }
        .into());
    }

    let blocking: Option<&Reservation> = if target == ReservationStatus::Confirmed {
        find_conflict(
            confirmed_same_day,
            &reservation.field_id,
            reservation.date,
            &reservation.slot,
            Some(&reservation.id),
        )
    } else {
        None
    };
    if let Some(blocking) = blocking {
        return Err(CoreError::ConflictingReservation {
            reservation_id: blocking.id.clone(),
            holder_id: blocking.client_id.clone(),
        });
    }

    let mut updated: Reservation = reservation.clone();
    updated.status = target;
    if reason.is_some() {
        updated.status_reason.clone_from(&reason);
    }
    updated.version += 1;
    updated.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new(command.action_name(), None),
        EntityRef::new(EntityKind::Reservation, reservation.id.as_str()),
        Some(previous.as_str().to_string()),
        Some(target.as_str().to_string()),
        now,
    )
    .with_reason(reason.clone());

    let notices: Vec<Notice> = transition_notice(facility, &updated, previous, reason)
        .into_iter()
        .collect();

    Ok(ReservationOutcome {
        reservation: updated,
        audit_event,
        notices,
    })
}

fn transition_notice(
    facility: &Facility,
    reservation: &Reservation,
    previous: ReservationStatus,
    override_reason: Option<String>,
) -> Option<Notice> {
    let when: String = format!(
        "{} on {} from {} to {}",
        facility.details.name,
        format_date(reservation.date),
        format_time(reservation.slot.start()),
        format_time(reservation.slot.end()),
    );
    let related_id: Option<String> = Some(reservation.id.to_string());

    let mut notice: Notice = match reservation.status {
        ReservationStatus::Confirmed => Notice::new(
            reservation.client_id.clone(),
            NotificationKind::ReservationConfirmed,
            "Reservation confirmed",
            format!("Your reservation at {when} has been confirmed."),
            related_id,
        )
        .with_email(EmailTemplate::Ticket),
        ReservationStatus::Cancelled => Notice::new(
            reservation.client_id.clone(),
            NotificationKind::ReservationCancelled,
            "Reservation cancelled",
            format!("Your reservation at {when} has been cancelled."),
            related_id,
        )
        .with_email(EmailTemplate::Cancellation),
        ReservationStatus::Pending | ReservationStatus::Completed => {
            override_reason.as_ref()?;
            Notice::new(
                reservation.client_id.clone(),
                NotificationKind::ReservationStatusChanged,
                "Reservation status changed",
                format!(
                    "Your reservation at {when} changed from {} to {}.",
                    previous.label(),
                    reservation.status.label()
                ),
                related_id,
            )
        }
    };

    if let Some(reason) = override_reason {
        notice = notice.with_email(EmailTemplate::StatusChange {
            previous,
            current: reservation.status,
            reason,
        });
    }

    Some(notice)
}
