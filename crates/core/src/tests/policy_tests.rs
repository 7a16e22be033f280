// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    actor, admin, client, disabled_actor, facility, other_associate, owner, policy, reservation,
    slot, super_admin, user,
};
use crate::{Action, ActorContext, Denial, Resource};
use fieldbook_domain::{
    Facility, FacilityStatus, Reservation, ReservationStatus, Role, User, UserStatus,
};

fn resource_for<'a>(
    action: Action,
    facility: &'a Facility,
    reservation: &'a Reservation,
    target: &'a User,
) -> Resource<'a> {
    match action {
        Action::CreateFacility
        | Action::CreateUser
        | Action::ViewReviewQueue
        | Action::ViewAuditLog => Resource::System,
        Action::EditFacility
        | Action::ReviewFacility
        | Action::ToggleFacility
        | Action::ViewFacility
        | Action::ViewFacilityReservations
        | Action::FavoriteFacility
        | Action::CreateReservation => Resource::Facility(facility),
        Action::TransitionReservation | Action::OverrideReservation | Action::SendTicketEmail => {
            Resource::Reservation {
                reservation,
                facility,
            }
        }
        Action::ChangeRole | Action::ChangeStatus => Resource::User(target),
    }
}

#[test]
fn test_every_role_action_pair_has_a_deterministic_decision() {
    let field: Facility = facility(FacilityStatus::Approved);
    let booking: Reservation = reservation(
        "r-1",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Pending,
    );
    let target: User = user("someone", Role::Client);

    for role in Role::ALL {
        for status in [UserStatus::Active, UserStatus::Disabled] {
            let who: ActorContext = ActorContext::new(
                fieldbook_domain::UserId::new("owner-1"),
                role,
                status,
            );
            for action in Action::ALL {
                let resource: Resource<'_> = resource_for(action, &field, &booking, &target);
                let first: Result<(), Denial> = policy().authorize(&who, action, resource);
                let second: Result<(), Denial> = policy().authorize(&who, action, resource);
                assert_eq!(first, second, "{role} {status} {}", action.name());

                if status == UserStatus::Disabled && action.is_mutating() {
                    assert_eq!(first, Err(Denial::AccountDisabled));
                }
            }
        }
    }
}

#[test]
fn test_disabled_actor_may_still_read() {
    let field: Facility = facility(FacilityStatus::Approved);
    let disabled: ActorContext = disabled_actor("client-1", Role::Client);

    assert!(
        policy()
            .authorize(&disabled, Action::ViewFacility, Resource::Facility(&field))
            .is_ok()
    );
    assert_eq!(
        policy().authorize(
            &disabled,
            Action::CreateReservation,
            Resource::Facility(&field)
        ),
        Err(Denial::AccountDisabled)
    );
}

#[test]
fn test_only_associates_create_facilities() {
    assert!(
        policy()
            .authorize(&owner(), Action::CreateFacility, Resource::System)
            .is_ok()
    );
    for who in [admin(), client()] {
        assert!(matches!(
            policy().authorize(&who, Action::CreateFacility, Resource::System),
            Err(Denial::InsufficientRole { .. })
        ));
    }
}

#[test]
fn test_facility_mutation_requires_owner_or_admin() {
    let field: Facility = facility(FacilityStatus::Approved);

    for action in [Action::EditFacility, Action::ToggleFacility] {
        assert!(
            policy()
                .authorize(&owner(), action, Resource::Facility(&field))
                .is_ok()
        );
        assert!(
            policy()
                .authorize(&admin(), action, Resource::Facility(&field))
                .is_ok()
        );
        assert!(matches!(
            policy().authorize(&other_associate(), action, Resource::Facility(&field)),
            Err(Denial::NotOwner { .. })
        ));
        assert!(matches!(
            policy().authorize(&client(), action, Resource::Facility(&field)),
            Err(Denial::InsufficientRole { .. })
        ));
    }
}

#[test]
fn test_review_is_admin_only_and_never_of_own_facility() {
    let field: Facility = facility(FacilityStatus::Pending);

    assert!(
        policy()
            .authorize(&admin(), Action::ReviewFacility, Resource::Facility(&field))
            .is_ok()
    );
    assert!(matches!(
        policy().authorize(&owner(), Action::ReviewFacility, Resource::Facility(&field)),
        Err(Denial::InsufficientRole { .. })
    ));

    let promoted_owner: ActorContext = actor("owner-1", Role::Admin);
    assert!(matches!(
        policy().authorize(
            &promoted_owner,
            Action::ReviewFacility,
            Resource::Facility(&field)
        ),
        Err(Denial::SelfProtection { .. })
    ));
}

#[test]
fn test_clients_book_only_approved_facilities() {
    let approved: Facility = facility(FacilityStatus::Approved);
    assert!(
        policy()
            .authorize(
                &client(),
                Action::CreateReservation,
                Resource::Facility(&approved)
            )
            .is_ok()
    );

    for status in [
        FacilityStatus::Pending,
        FacilityStatus::Rejected,
        FacilityStatus::Disabled,
    ] {
        let field: Facility = facility(status);
        assert_eq!(
            policy().authorize(&client(), Action::CreateReservation, Resource::Facility(&field)),
            Err(Denial::FacilityNotBookable { status })
        );
    }

    assert!(matches!(
        policy().authorize(
            &owner(),
            Action::CreateReservation,
            Resource::Facility(&approved)
        ),
        Err(Denial::InsufficientRole { .. })
    ));
}

#[test]
fn test_clients_never_transition_reservations() {
    let field: Facility = facility(FacilityStatus::Approved);
    let booking: Reservation = reservation(
        "r-1",
        "client-1",
        slot("10:00", "11:00"),
        ReservationStatus::Pending,
    );
    let resource: Resource<'_> = Resource::Reservation {
        reservation: &booking,
        facility: &field,
    };

    for action in [Action::TransitionReservation, Action::OverrideReservation] {
        assert!(matches!(
            policy().authorize(&client(), action, resource),
            Err(Denial::InsufficientRole { .. })
        ));
        assert!(policy().authorize(&owner(), action, resource).is_ok());
        assert!(policy().authorize(&admin(), action, resource).is_ok());
        assert!(matches!(
            policy().authorize(&other_associate(), action, resource),
            Err(Denial::NotOwner { .. })
        ));
    }

    assert!(
        policy()
            .authorize(&client(), Action::SendTicketEmail, resource)
            .is_ok()
    );
    assert!(matches!(
        policy().authorize(
            &actor("client-2", Role::Client),
            Action::SendTicketEmail,
            resource
        ),
        Err(Denial::NotOwner { .. })
    ));
}

#[test]
fn test_non_approved_facility_is_visible_only_to_owner_and_admins() {
    let field: Facility = facility(FacilityStatus::Pending);

    assert!(
        policy()
            .authorize(&owner(), Action::ViewFacility, Resource::Facility(&field))
            .is_ok()
    );
    assert!(
        policy()
            .authorize(&admin(), Action::ViewFacility, Resource::Facility(&field))
            .is_ok()
    );
    assert!(
        policy()
            .authorize(&client(), Action::ViewFacility, Resource::Facility(&field))
            .is_err()
    );
}

#[test]
fn test_role_and_status_changes_protect_self_and_other_admins() {
    let target_client: User = user("client-9", Role::Client);
    let target_admin: User = user("admin-2", Role::Admin);
    let me: User = user("admin-1", Role::Admin);

    for action in [Action::ChangeRole, Action::ChangeStatus] {
        assert!(
            policy()
                .authorize(&admin(), action, Resource::User(&target_client))
                .is_ok()
        );
        assert_eq!(
            policy().authorize(&admin(), action, Resource::User(&target_admin)),
            Err(Denial::SuperAdminRequired)
        );
        assert!(
            policy()
                .authorize(&super_admin(), action, Resource::User(&target_admin))
                .is_ok()
        );
        assert!(matches!(
            policy().authorize(&admin(), action, Resource::User(&me)),
            Err(Denial::SelfProtection { .. })
        ));
        assert!(matches!(
            policy().authorize(&owner(), action, Resource::User(&target_client)),
            Err(Denial::InsufficientRole { .. })
        ));
    }
}

#[test]
fn test_wrong_resource_is_denied() {
    assert!(matches!(
        policy().authorize(&admin(), Action::ChangeRole, Resource::System),
        Err(Denial::WrongResource { .. })
    ));
}
