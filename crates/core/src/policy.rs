// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role-based authorization.
//!
//! Every mutating operation passes through [`Policy::authorize`] before any
//! state is read for validation or written. The policy is a pure function of
//! its inputs: the same actor, action and resource always produce the same
//! decision.

use fieldbook_audit::Actor;
use fieldbook_domain::{
    Facility, FacilityStatus, Reservation, Role, User, UserId, UserStatus,
};

/// The authenticated caller, as read from the store for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub user_id: UserId,
    pub role: Role,
    pub status: UserStatus,
}

impl ActorContext {
    /// Creates a new actor context.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role, status: UserStatus) -> Self {
        Self {
            user_id,
            role,
            status,
        }
    }

    /// Builds the context from a stored user record.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self::new(user.id.clone(), user.role, user.status)
    }

    /// Returns the audit attribution for this actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.role)
    }

    const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateFacility,
    EditFacility,
    ReviewFacility,
    ToggleFacility,
    ViewFacility,
    ViewFacilityReservations,
    ViewReviewQueue,
    FavoriteFacility,
    CreateReservation,
    TransitionReservation,
    OverrideReservation,
    SendTicketEmail,
    CreateUser,
    ChangeRole,
    ChangeStatus,
    ViewAuditLog,
}

impl Action {
    /// Every action, for exhaustive checks.
    pub const ALL: [Self; 16] = [
        Self::CreateFacility,
        Self::EditFacility,
        Self::ReviewFacility,
        Self::ToggleFacility,
        Self::ViewFacility,
        Self::ViewFacilityReservations,
        Self::ViewReviewQueue,
        Self::FavoriteFacility,
        Self::CreateReservation,
        Self::TransitionReservation,
        Self::OverrideReservation,
        Self::SendTicketEmail,
        Self::CreateUser,
        Self::ChangeRole,
        Self::ChangeStatus,
        Self::ViewAuditLog,
    ];

    /// Returns the action name used in denials and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateFacility => "create_facility",
            Self::EditFacility => "edit_facility",
            Self::ReviewFacility => "review_facility",
            Self::ToggleFacility => "toggle_facility",
            Self::ViewFacility => "view_facility",
            Self::ViewFacilityReservations => "view_facility_reservations",
            Self::ViewReviewQueue => "view_review_queue",
            Self::FavoriteFacility => "favorite_facility",
            Self::CreateReservation => "create_reservation",
            Self::TransitionReservation => "transition_reservation",
            Self::OverrideReservation => "override_reservation",
            Self::SendTicketEmail => "send_ticket_email",
            Self::CreateUser => "create_user",
            Self::ChangeRole => "change_role",
            Self::ChangeStatus => "change_status",
            Self::ViewAuditLog => "view_audit_log",
        }
    }

    /// Returns true if the action changes stored state.
    ///
    /// Disabled accounts are refused every mutating action.
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::ViewFacility
                | Self::ViewFacilityReservations
                | Self::ViewReviewQueue
                | Self::ViewAuditLog
        )
    }
}

/// What an action is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// Actions with no particular target (creation, queues).
    System,
    Facility(&'a Facility),
    Reservation {
        reservation: &'a Reservation,
        facility: &'a Facility,
    },
    User(&'a User),
}

/// Reasons an action is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("Account is disabled")]
    AccountDisabled,
    #[error("'{action}' requires one of the roles: {}", role_list(.required))]
    InsufficientRole {
        action: &'static str,
        required: &'static [Role],
    },
    #[error("Only the owner ({owner_id}) or an administrator may perform this action")]
    NotOwner { owner_id: UserId },
    #[error("'{action}' cannot be applied to your own account or facility")]
    SelfProtection { action: &'static str },
    #[error("Only the super administrator may change another administrator")]
    SuperAdminRequired,
    #[error("Facility is not available for booking (status '{status}')")]
    FacilityNotBookable { status: FacilityStatus },
    #[error("'{action}' does not apply to this resource")]
    WrongResource { action: &'static str },
}

fn role_list(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<&str>>()
        .join(", ")
}

const ADMIN: &[Role] = &[Role::Admin];
const ASSOCIATE: &[Role] = &[Role::Associate];
const CLIENT: &[Role] = &[Role::Client];
const OWNER_ROLES: &[Role] = &[Role::Admin, Role::Associate];
const ANY_ROLE: &[Role] = &[Role::Admin, Role::Associate, Role::Client];

/// The authorization matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    super_admin: Option<UserId>,
}

impl Policy {
    /// Creates a policy with an optional designated super administrator.
    #[must_use]
    pub const fn new(super_admin: Option<UserId>) -> Self {
        Self { super_admin }
    }

    /// Returns the designated super administrator, if any.
    #[must_use]
    pub const fn super_admin(&self) -> Option<&UserId> {
        self.super_admin.as_ref()
    }

    fn is_super_admin(&self, user_id: &UserId) -> bool {
        self.super_admin.as_ref() == Some(user_id)
    }

    /// Decides whether `actor` may perform `action` on `resource`.
    ///
    /// # Errors
    ///
    /// Returns the [`Denial`] explaining the refusal.
    pub fn authorize(
        &self,
        actor: &ActorContext,
        action: Action,
        resource: Resource<'_>,
    ) -> Result<(), Denial> {
        if action.is_mutating() && actor.status == UserStatus::Disabled {
            return Err(Denial::AccountDisabled);
        }

        match action {
            Action::CreateFacility => require_role(actor, action, ASSOCIATE),
            Action::CreateUser | Action::ViewReviewQueue | Action::ViewAuditLog => {
                require_role(actor, action, ADMIN)
            }
            Action::EditFacility | Action::ToggleFacility | Action::ViewFacilityReservations => {
                require_role(actor, action, OWNER_ROLES)?;
                let facility: &Facility = facility_of(action, resource)?;
                require_owner_or_admin(actor, facility)
            }
            Action::ViewFacility => {
                let facility: &Facility = facility_of(action, resource)?;
                if facility.is_bookable() {
                    return Ok(());
                }
                require_owner_or_admin(actor, facility)
            }
            Action::ReviewFacility => {
                require_role(actor, action, ADMIN)?;
                let facility: &Facility = facility_of(action, resource)?;
                if facility.is_owned_by(&actor.user_id) {
                    return Err(Denial::SelfProtection {
                        action: action.name(),
                    });
                }
                Ok(())
            }
            Action::FavoriteFacility | Action::CreateReservation => {
                require_role(actor, action, CLIENT)?;
                let facility: &Facility = facility_of(action, resource)?;
                if !facility.is_bookable() {
                    return Err(Denial::FacilityNotBookable {
                        status: facility.status,
                    });
                }
                Ok(())
            }
            Action::TransitionReservation | Action::OverrideReservation => {
                require_role(actor, action, OWNER_ROLES)?;
                let Resource::Reservation { facility, .. } = resource else {
                    return Err(Denial::WrongResource {
                        action: action.name(),
                    });
                };
                require_owner_or_admin(actor, facility)
            }
            Action::SendTicketEmail => {
                require_role(actor, action, ANY_ROLE)?;
                let Resource::Reservation {
                    reservation,
                    facility,
                } = resource
                else {
                    return Err(Denial::WrongResource {
                        action: action.name(),
                    });
                };
                if reservation.client_id == actor.user_id {
                    return Ok(());
                }
                require_owner_or_admin(actor, facility)
            }
            Action::ChangeRole | Action::ChangeStatus => {
                require_role(actor, action, ADMIN)?;
                let Resource::User(target) = resource else {
                    return Err(Denial::WrongResource {
                        action: action.name(),
                    });
                };
                if target.id == actor.user_id {
                    return Err(Denial::SelfProtection {
                        action: action.name(),
                    });
                }
                if target.role == Role::Admin && !self.is_super_admin(&actor.user_id) {
                    return Err(Denial::SuperAdminRequired);
                }
                Ok(())
            }
        }
    }
}

fn require_role(
    actor: &ActorContext,
    action: Action,
    required: &'static [Role],
) -> Result<(), Denial> {
    if required.contains(&actor.role) {
        Ok(())
    } else {
        Err(Denial::InsufficientRole {
            action: action.name(),
            required,
        })
    }
}

fn require_owner_or_admin(actor: &ActorContext, facility: &Facility) -> Result<(), Denial> {
    if actor.is_admin() || facility.is_owned_by(&actor.user_id) {
        Ok(())
    } else {
        Err(Denial::NotOwner {
            owner_id: facility.owner_id.clone(),
        })
    }
}

fn facility_of<'a>(action: Action, resource: Resource<'a>) -> Result<&'a Facility, Denial> {
    match resource {
        Resource::Facility(facility) | Resource::Reservation { facility, .. } => Ok(facility),
        Resource::System | Resource::User(_) => Err(Denial::WrongResource {
            action: action.name(),
        }),
    }
}
