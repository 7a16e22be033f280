// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook::{
    Action, EmailTemplate, Notice, ReservationCommand, ReservationOutcome, Resource,
    facility_path, plan_create_reservation, plan_reservation_transition,
};
use fieldbook_domain::{
    Facility, FacilityId, Reservation, ReservationId, ReservationStatus, TimeSlot, User,
    format_date, format_time,
};
use time::Date;
use tracing::info;

use super::{
    authorize, load_facility, load_reservation, load_user, parse_date_field, parse_slot,
    plan_error,
};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::identity::AuthenticatedSession;
use crate::mail::{Email, EmailContext, Mailer, render_email};
use crate::request_response::{
    CreateReservationRequest, OverrideRequest, ReservationListResponse, ReservationResponse,
    SuccessResponse,
};
use crate::{DispatchReport, Services};

fn with_facility_link(notices: Vec<Notice>, facility: &Facility) -> Vec<Notice> {
    notices
        .into_iter()
        .map(|notice| {
            if notice.link_path.is_some() {
                notice
            } else {
                notice.with_link(facility_path(&facility.id))
            }
        })
        .collect()
}

/// Requests a reservation. Clients only; the facility owner is notified.
///
/// # Errors
///
/// Returns `Forbidden` for other roles or a facility that is not approved,
/// `InvalidInput` for a past date or a slot outside opening hours, or
/// `NotFound` for an unknown facility.
pub async fn create_reservation<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    request: CreateReservationRequest,
) -> Result<ReservationResponse, ApiError> {
    let facility: Facility =
        load_facility(&services.store, &FacilityId::new(request.field_id.as_str())).await?;
    let date: Date = parse_date_field(&request.date)?;
    let slot: TimeSlot = parse_slot(&request.start_time, &request.end_time)?;

    let now = services.now();
    let outcome: ReservationOutcome = match plan_create_reservation(
        &services.policy,
        &session.actor,
        &facility,
        date,
        slot,
        services.today(),
        now,
    ) {
        Ok(outcome) => outcome,
        Err(e) => return Err(plan_error(&services.store, e).await),
    };

    services
        .store
        .create_reservation(&outcome.reservation, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        reservation_id = %outcome.reservation.id,
        facility_id = %facility.id,
        client_id = %session.actor.user_id,
        "Reservation requested"
    );

    let notices: Vec<Notice> = with_facility_link(outcome.notices, &facility);
    let report: DispatchReport = services.dispatcher.dispatch(&notices, now).await;
    Ok(ReservationResponse {
        success: true,
        message: format!("Reservation requested at {}", facility.details.name),
        reservation: outcome.reservation,
        notification_warning: report.warning(),
    })
}

/// Lists the caller's reservations.
///
/// # Errors
///
/// Returns `Transient` if the store cannot be read.
pub async fn my_reservations<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
) -> Result<ReservationListResponse, ApiError> {
    let reservations: Vec<Reservation> = services
        .store
        .list_reservations_by_client(&session.actor.user_id)
        .await
        .map_err(translate_persistence_error)?;
    Ok(ReservationListResponse { reservations })
}

async fn apply_transition<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    reservation_id: &str,
    command: ReservationCommand,
) -> Result<ReservationResponse, ApiError> {
    let reservation: Reservation =
        load_reservation(&services.store, &ReservationId::new(reservation_id)).await?;
    let facility: Facility = load_facility(&services.store, &reservation.field_id).await?;

    let confirmed_same_day: Vec<Reservation> = if command.target() == ReservationStatus::Confirmed
    {
        services
            .store
            .list_confirmed_on(&reservation.field_id, reservation.date)
            .await
            .map_err(translate_persistence_error)?
    } else {
        Vec::new()
    };

    let now = services.now();
    let outcome: ReservationOutcome = match plan_reservation_transition(
        &services.policy,
        &session.actor,
        &facility,
        &reservation,
        &command,
        &confirmed_same_day,
        now,
    ) {
        Ok(outcome) => outcome,
        Err(e) => return Err(plan_error(&services.store, e).await),
    };

    services
        .store
        .update_reservation(&outcome.reservation, reservation.version, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        reservation_id = %reservation.id,
        actor_id = %session.actor.user_id,
        action = command.action_name(),
        from = %reservation.status,
        to = %outcome.reservation.status,
        "Reservation status changed"
    );

    let notices: Vec<Notice> = with_facility_link(outcome.notices, &facility);
    let report: DispatchReport = services.dispatcher.dispatch(&notices, now).await;
    Ok(ReservationResponse {
        success: true,
        message: format!(
            "Reservation is now {}",
            outcome.reservation.status.label()
        ),
        reservation: outcome.reservation,
        notification_warning: report.warning(),
    })
}

/// Confirms a pending reservation and emails the client a ticket.
///
/// # Errors
///
/// Returns `ConflictingReservation` if the slot overlaps a confirmed
/// reservation, `ConcurrentConflict` if one was confirmed meanwhile,
/// `Forbidden` for callers other than the facility owner or an admin or
/// when the facility is not approved, or a lifecycle error if the
/// reservation is not pending.
pub async fn confirm_reservation<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    reservation_id: &str,
) -> Result<ReservationResponse, ApiError> {
    apply_transition(services, session, reservation_id, ReservationCommand::Confirm).await
}

/// Cancels a pending or confirmed reservation.
///
/// # Errors
///
/// As [`confirm_reservation`], without the conflict errors.
pub async fn cancel_reservation<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    reservation_id: &str,
) -> Result<ReservationResponse, ApiError> {
    apply_transition(services, session, reservation_id, ReservationCommand::Cancel).await
}

/// Marks a confirmed reservation as completed.
///
/// # Errors
///
/// As [`cancel_reservation`].
pub async fn complete_reservation<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    reservation_id: &str,
) -> Result<ReservationResponse, ApiError> {
    apply_transition(services, session, reservation_id, ReservationCommand::Complete).await
}

/// Forces a reservation into any other status, with a reason.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown status or a blank reason,
/// `AlreadyInState` if the status is unchanged, and the conflict errors of
/// [`confirm_reservation`] when overriding to confirmed.
pub async fn override_reservation<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    reservation_id: &str,
    request: OverrideRequest,
) -> Result<ReservationResponse, ApiError> {
    let target: ReservationStatus = request
        .status
        .parse::<ReservationStatus>()
        .map_err(translate_domain_error)?;
    apply_transition(
        services,
        session,
        reservation_id,
        ReservationCommand::Override {
            target,
            reason: request.reason,
        },
    )
    .await
}

/// Emails the booking ticket of a confirmed reservation to its client.
///
/// # Errors
///
/// Returns `Forbidden` for callers other than the client, the facility
/// owner or an admin, `InvalidInput` if the reservation is not confirmed, or
/// `Transient` if the mail cannot be sent.
pub async fn send_ticket_email<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    reservation_id: &str,
) -> Result<SuccessResponse, ApiError> {
    let reservation: Reservation =
        load_reservation(&services.store, &ReservationId::new(reservation_id)).await?;
    let facility: Facility = load_facility(&services.store, &reservation.field_id).await?;
    authorize(
        services,
        session,
        Action::SendTicketEmail,
        Resource::Reservation {
            reservation: &reservation,
            facility: &facility,
        },
    )?;

    if !reservation.is_confirmed() {
        return Err(ApiError::invalid_input(
            "reservation",
            format!(
                "Tickets are only available for confirmed reservations; this one is {}",
                reservation.status.label()
            ),
        ));
    }

    let client: User = load_user(&services.store, &reservation.client_id).await?;
    let summary: String = format!(
        "{} on {} from {} to {}",
        facility.details.name,
        format_date(reservation.date),
        format_time(reservation.slot.start()),
        format_time(reservation.slot.end()),
    );
    let link: String = services.dispatcher.link(&facility_path(&facility.id));
    let email: Email = render_email(
        &EmailTemplate::Ticket,
        &EmailContext {
            recipient: &client,
            summary: &summary,
            reference: Some(reservation.id.as_str()),
            link: Some(&link),
        },
    );

    services.dispatcher.send_email(&email).await?;
    info!(
        reservation_id = %reservation.id,
        actor_id = %session.actor.user_id,
        "Ticket email sent"
    );
    Ok(SuccessResponse::ok(format!("Ticket sent to {}", client.email)))
}
