// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook::{
    Action, ConflictCheck, FacilityOutcome, Resource, plan_create_facility,
    plan_edit_facility, plan_facility_transition, toggle_transition,
};
use fieldbook_domain::{
    Facility, FacilityDetails, FacilityId, FacilityStatus, FacilityTransition, Reservation,
    TimeSlot, parse_time,
};
use time::Date;
use tracing::info;

use super::{authorize, load_facility, parse_date_field, parse_slot};
use crate::conflict::has_conflict;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::identity::AuthenticatedSession;
use crate::mail::Mailer;
use crate::request_response::{
    AvailabilityQuery, AvailabilityResponse, ConflictResponse, FacilityListResponse,
    FacilityRequest, FacilityResponse, FavoriteResponse, ReservationListResponse, ReviewRequest,
};
use crate::{DispatchReport, Services};

fn details_from(request: &FacilityRequest) -> Result<FacilityDetails, ApiError> {
    Ok(FacilityDetails {
        name: request.name.clone(),
        location: request.location.clone(),
        price_per_hour: request.price_per_hour,
        opening_time: parse_time(&request.opening_time).map_err(translate_domain_error)?,
        closing_time: parse_time(&request.closing_time).map_err(translate_domain_error)?,
    })
}

/// Loads a facility the caller may see.
///
/// Anonymous callers only see approved facilities; anything else is
/// reported as missing.
async fn visible_facility<M: Mailer>(
    services: &Services<M>,
    caller: Option<&AuthenticatedSession>,
    facility_id: &str,
) -> Result<Facility, ApiError> {
    let facility: Facility = load_facility(&services.store, &FacilityId::new(facility_id)).await?;
    match caller {
        None if facility.is_bookable() => Ok(facility),
        None => Err(ApiError::not_found("facility", facility_id)),
        Some(session) => {
            authorize(
                services,
                session,
                Action::ViewFacility,
                Resource::Facility(&facility),
            )?;
            Ok(facility)
        }
    }
}

/// Lists approved facilities by name.
///
/// # Errors
///
/// Returns `Transient` if the store cannot be read.
pub async fn list_approved_facilities<M: Mailer>(
    services: &Services<M>,
) -> Result<FacilityListResponse, ApiError> {
    let facilities: Vec<Facility> = services
        .store
        .list_facilities_by_status(FacilityStatus::Approved)
        .await
        .map_err(translate_persistence_error)?;
    Ok(FacilityListResponse { facilities })
}

/// Lists the caller's own facilities in any status.
///
/// # Errors
///
/// Returns `Transient` if the store cannot be read.
pub async fn list_my_facilities<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
) -> Result<FacilityListResponse, ApiError> {
    let facilities: Vec<Facility> = services
        .store
        .list_facilities_by_owner(&session.actor.user_id)
        .await
        .map_err(translate_persistence_error)?;
    Ok(FacilityListResponse { facilities })
}

/// Lists facilities awaiting review. Admin only.
///
/// # Errors
///
/// Returns `Forbidden` for non-admins.
pub async fn review_queue<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
) -> Result<FacilityListResponse, ApiError> {
    authorize(services, session, Action::ViewReviewQueue, Resource::System)?;
    let facilities: Vec<Facility> = services
        .store
        .list_facilities_by_status(FacilityStatus::Pending)
        .await
        .map_err(translate_persistence_error)?;
    Ok(FacilityListResponse { facilities })
}

/// Returns one facility.
///
/// # Errors
///
/// Returns `NotFound` for unknown facilities and for non-approved ones
/// requested anonymously, or `Forbidden` for non-approved facilities the
/// caller neither owns nor administers.
pub async fn facility_detail<M: Mailer>(
    services: &Services<M>,
    caller: Option<&AuthenticatedSession>,
    facility_id: &str,
) -> Result<Facility, ApiError> {
    visible_facility(services, caller, facility_id).await
}

/// Creates a facility for review. Associates only.
///
/// # Errors
///
/// Returns `Forbidden` for other roles or `InvalidInput` for bad details.
pub async fn create_facility<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    request: FacilityRequest,
) -> Result<FacilityResponse, ApiError> {
    let details: FacilityDetails = details_from(&request)?;
    let outcome: FacilityOutcome =
        plan_create_facility(&services.policy, &session.actor, details, services.now())
            .map_err(translate_core_error)?;

    services
        .store
        .create_facility(&outcome.facility, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        facility_id = %outcome.facility.id,
        owner_id = %session.actor.user_id,
        "Facility submitted for review"
    );

    Ok(FacilityResponse {
        success: true,
        message: format!("{} submitted for review", outcome.facility.details.name),
        facility: outcome.facility,
        notification_warning: None,
    })
}

/// Replaces a facility's details and returns it to review.
///
/// # Errors
///
/// Returns `ConcurrentModification` if `request.version` is given and
/// stale, `Forbidden` for callers other than the owner or an admin, or
/// `InvalidInput` for bad details.
pub async fn edit_facility<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility_id: &str,
    request: FacilityRequest,
) -> Result<FacilityResponse, ApiError> {
    let facility: Facility = load_facility(&services.store, &FacilityId::new(facility_id)).await?;
    if let Some(version) = request.version.filter(|v| *v != facility.version) {
        return Err(ApiError::ConcurrentModification {
            message: format!(
                "facility '{facility_id}' is at version {}, not {version}",
                facility.version
            ),
        });
    }

    let details: FacilityDetails = details_from(&request)?;
    let outcome: FacilityOutcome = plan_edit_facility(
        &services.policy,
        &session.actor,
        &facility,
        details,
        services.now(),
    )
    .map_err(translate_core_error)?;

    services
        .store
        .update_facility(
            &outcome.facility,
            facility.version,
            &outcome.audit_event,
            services.today(),
        )
        .await
        .map_err(translate_persistence_error)?;
    info!(
        facility_id = %facility.id,
        from = %facility.status,
        to = %outcome.facility.status,
        "Facility edited"
    );

    Ok(FacilityResponse {
        success: true,
        message: format!("{} updated", outcome.facility.details.name),
        facility: outcome.facility,
        notification_warning: None,
    })
}

async fn apply_transition<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility: Facility,
    transition: FacilityTransition,
    note: Option<String>,
) -> Result<FacilityResponse, ApiError> {
    let today: Date = services.today();
    let future_confirmed: usize = if transition == FacilityTransition::Disable {
        authorize(
            services,
            session,
            Action::ToggleFacility,
            Resource::Facility(&facility),
        )?;
        services
            .store
            .count_future_confirmed(&facility.id, today)
            .await
            .map_err(translate_persistence_error)?
    } else {
        0
    };

    let now = services.now();
    let outcome: FacilityOutcome = plan_facility_transition(
        &services.policy,
        &session.actor,
        &facility,
        transition,
        future_confirmed,
        note,
        now,
    )
    .map_err(translate_core_error)?;

    services
        .store
        .update_facility(&outcome.facility, facility.version, &outcome.audit_event, today)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        facility_id = %facility.id,
        actor_id = %session.actor.user_id,
        from = %facility.status,
        to = %outcome.facility.status,
        "Facility status changed"
    );

    let report: DispatchReport = services.dispatcher.dispatch(&outcome.notices, now).await;
    Ok(FacilityResponse {
        success: true,
        message: format!(
            "{} is now {}",
            outcome.facility.details.name,
            outcome.facility.status.label()
        ),
        facility: outcome.facility,
        notification_warning: report.warning(),
    })
}

/// Approves a pending facility and notifies its owner. Admin only.
///
/// # Errors
///
/// Returns `Forbidden` for non-admins and for an admin's own facility,
/// `AlreadyInState` or `InvalidTransition` if the facility is not pending.
pub async fn approve_facility<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility_id: &str,
    request: ReviewRequest,
) -> Result<FacilityResponse, ApiError> {
    let facility: Facility = load_facility(&services.store, &FacilityId::new(facility_id)).await?;
    apply_transition(
        services,
        session,
        facility,
        FacilityTransition::Approve,
        request.note,
    )
    .await
}

/// Rejects a pending facility and notifies its owner. Admin only.
///
/// # Errors
///
/// As [`approve_facility`].
pub async fn reject_facility<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility_id: &str,
    request: ReviewRequest,
) -> Result<FacilityResponse, ApiError> {
    let facility: Facility = load_facility(&services.store, &FacilityId::new(facility_id)).await?;
    apply_transition(
        services,
        session,
        facility,
        FacilityTransition::Reject,
        request.note,
    )
    .await
}

/// Disables an approved facility or re-enables a disabled one.
///
/// # Errors
///
/// Returns `HasFutureReservations` while confirmed reservations dated today
/// or later exist, `Forbidden` for callers other than the owner or an admin,
/// or `InvalidTransition` for facilities that were never approved.
pub async fn toggle_facility_status<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility_id: &str,
) -> Result<FacilityResponse, ApiError> {
    let facility: Facility = load_facility(&services.store, &FacilityId::new(facility_id)).await?;
    let transition: FacilityTransition = toggle_transition(facility.status);
    apply_transition(services, session, facility, transition, None).await
}

/// Lists every reservation on a facility. Owner or admin only.
///
/// # Errors
///
/// Returns `Forbidden` for other callers.
pub async fn facility_reservations<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility_id: &str,
) -> Result<ReservationListResponse, ApiError> {
    let facility: Facility = load_facility(&services.store, &FacilityId::new(facility_id)).await?;
    authorize(
        services,
        session,
        Action::ViewFacilityReservations,
        Resource::Facility(&facility),
    )?;
    let reservations: Vec<Reservation> = services
        .store
        .list_reservations_by_field(&facility.id)
        .await
        .map_err(translate_persistence_error)?;
    Ok(ReservationListResponse { reservations })
}

/// Lists the confirmed slots of a facility on one date and, when a slot is
/// given, whether it is free.
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed date or slot, or only one slot
/// bound, and the visibility errors of [`facility_detail`].
pub async fn availability<M: Mailer>(
    services: &Services<M>,
    caller: Option<&AuthenticatedSession>,
    facility_id: &str,
    query: AvailabilityQuery,
) -> Result<AvailabilityResponse, ApiError> {
    let facility: Facility = visible_facility(services, caller, facility_id).await?;
    let date: Date = parse_date_field(&query.date)?;

    let booked: Vec<TimeSlot> = services
        .store
        .list_confirmed_on(&facility.id, date)
        .await
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|r| r.slot)
        .collect();

    let check: Option<ConflictResponse> = match (&query.start_time, &query.end_time) {
        (None, None) => None,
        (Some(start), Some(end)) => {
            let slot: TimeSlot = parse_slot(start, end)?;
            let result: ConflictCheck = has_conflict(&services.store, &facility.id, date, &slot, None)
                .await
                .map_err(translate_persistence_error)?;
            Some(ConflictResponse {
                conflict: result.conflict,
                with_reservation_id: result.with_reservation_id.map(|id| id.into_inner()),
            })
        }
        _ => {
            return Err(ApiError::invalid_input(
                "time_slot",
                "start_time and end_time must be given together",
            ));
        }
    };

    Ok(AvailabilityResponse {
        field_id: facility.id.into_inner(),
        date,
        booked,
        check,
    })
}

/// Marks an approved facility as a favorite. Clients only.
///
/// # Errors
///
/// Returns `Forbidden` for other roles or non-approved facilities.
pub async fn add_favorite<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility_id: &str,
) -> Result<FavoriteResponse, ApiError> {
    let facility: Facility = load_facility(&services.store, &FacilityId::new(facility_id)).await?;
    authorize(
        services,
        session,
        Action::FavoriteFacility,
        Resource::Facility(&facility),
    )?;

    let added: bool = services
        .store
        .add_favorite(&session.actor.user_id, &facility.id, services.now())
        .await
        .map_err(translate_persistence_error)?;

    Ok(FavoriteResponse {
        success: true,
        message: if added {
            format!("{} added to favorites", facility.details.name)
        } else {
            format!("{} is already a favorite", facility.details.name)
        },
        facility_id: facility.id.into_inner(),
        favorite: true,
    })
}

/// Removes a favorite. Removing one that does not exist succeeds.
///
/// # Errors
///
/// Returns `Transient` if the store cannot be written.
pub async fn remove_favorite<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    facility_id: &str,
) -> Result<FavoriteResponse, ApiError> {
    let removed: bool = services
        .store
        .remove_favorite(&session.actor.user_id, &FacilityId::new(facility_id))
        .await
        .map_err(translate_persistence_error)?;

    Ok(FavoriteResponse {
        success: true,
        message: String::from(if removed {
            "Removed from favorites"
        } else {
            "Not a favorite"
        }),
        facility_id: facility_id.to_string(),
        favorite: false,
    })
}

/// Lists the caller's favorite facilities.
///
/// # Errors
///
/// Returns `Transient` if the store cannot be read.
pub async fn list_favorites<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
) -> Result<FacilityListResponse, ApiError> {
    let facilities: Vec<Facility> = services
        .store
        .list_favorites(&session.actor.user_id)
        .await
        .map_err(translate_persistence_error)?;
    Ok(FacilityListResponse { facilities })
}
