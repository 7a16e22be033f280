// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account administration.

use crate::error::CoreError;
use crate::policy::{Action as PolicyAction, ActorContext, Policy, Resource};
use fieldbook_audit::{Action, Actor, AuditEvent, EntityKind, EntityRef};
use fieldbook_domain::{
    DomainError, Role, User, UserId, UserStatus, normalize_email, validate_display_name,
};
use time::OffsetDateTime;

/// The result of a planned account change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOutcome {
    pub user: User,
    pub audit_event: AuditEvent,
}

fn new_user(
    email: &str,
    display_name: &str,
    role: Role,
    now: OffsetDateTime,
) -> Result<User, CoreError> {
    Ok(User {
        id: UserId::generate(),
        email: normalize_email(email)?,
        display_name: validate_display_name(display_name)?,
        role,
        status: UserStatus::Active,
        created_at: now,
        updated_at: now,
    })
}

/// Plans a self-registration. Only `client` and `associate` may be chosen.
///
/// # Errors
///
/// Returns an error if the role is `admin` or the email or name is invalid.
pub fn plan_register(
    email: &str,
    display_name: &str,
    role: Role,
    now: OffsetDateTime,
) -> Result<AccountOutcome, CoreError> {
    if role == Role::Admin {
        return Err(DomainError::InvalidRole(String::from(
            "administrator accounts cannot be self-registered",
        ))
        .into());
    }
    let user: User = new_user(email, display_name, role, now)?;

    let audit_event: AuditEvent = AuditEvent::new(
        Actor::new(user.id.clone(), role),
        Action::new("RegisterUser", Some(user.email.clone())),
        EntityRef::new(EntityKind::User, user.id.as_str()),
        None,
        Some(user.status.as_str().to_string()),
        now,
    );

    Ok(AccountOutcome { user, audit_event })
}

/// Plans the first administrator of an empty installation.
///
/// The caller is responsible for checking that no users exist yet.
///
/// # Errors
///
/// Returns an error if the email or name is invalid.
pub fn plan_bootstrap_admin(
    email: &str,
    display_name: &str,
    now: OffsetDateTime,
) -> Result<AccountOutcome, CoreError> {
    let user: User = new_user(email, display_name, Role::Admin, now)?;

    let audit_event: AuditEvent = AuditEvent::new(
        Actor::new(user.id.clone(), Role::Admin),
        Action::new("BootstrapAdmin", Some(user.email.clone())),
        EntityRef::new(EntityKind::User, user.id.as_str()),
        None,
        Some(user.status.as_str().to_string()),
        now,
    );

    Ok(AccountOutcome { user, audit_event })
}

/// Plans an account created by an admin, with any role.
///
/// # Errors
///
/// Returns an error if the actor is not an active admin or the email or
/// name is invalid.
pub fn plan_create_user(
    policy: &Policy,
    actor: &ActorContext,
    email: &str,
    display_name: &str,
    role: Role,
    now: OffsetDateTime,
) -> Result<AccountOutcome, CoreError> {
    policy.authorize(actor, PolicyAction::CreateUser, Resource::System)?;
    let user: User = new_user(email, display_name, role, now)?;

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new(
            "CreateUser",
            Some(format!("{} as {}", user.email, role.as_str())),
        ),
        EntityRef::new(EntityKind::User, user.id.as_str()),
        None,
        Some(user.status.as_str().to_string()),
        now,
    );

    Ok(AccountOutcome { user, audit_event })
}

/// Plans a role change.
///
/// # Errors
///
/// Returns an error if the actor may not change this user's role or the
/// user already holds `role`.
pub fn plan_set_role(
    policy: &Policy,
    actor: &ActorContext,
    target: &User,
    role: Role,
    now: OffsetDateTime,
) -> Result<AccountOutcome, CoreError> {
    policy.authorize(actor, PolicyAction::ChangeRole, Resource::User(target))?;
    if target.role == role {
        return Err(DomainError::AlreadyInState {
            entity: "user",
            status: role.as_str(),
        }
        .into());
    }

    let mut user: User = target.clone();
    user.role = role;
    user.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new("ChangeRole", None),
        EntityRef::new(EntityKind::User, target.id.as_str()),
        Some(target.role.as_str().to_string()),
        Some(role.as_str().to_string()),
        now,
    );

    Ok(AccountOutcome { user, audit_event })
}

/// Plans an account status change.
///
/// # Errors
///
/// Returns an error if the actor may not change this user's status or the
/// user already has `status`.
pub fn plan_set_status(
    policy: &Policy,
    actor: &ActorContext,
    target: &User,
    status: UserStatus,
    now: OffsetDateTime,
) -> Result<AccountOutcome, CoreError> {
    policy.authorize(actor, PolicyAction::ChangeStatus, Resource::User(target))?;
    if target.status == status {
        return Err(DomainError::AlreadyInState {
            entity: "user",
            status: status.as_str(),
        }
        .into());
    }

    let mut user: User = target.clone();
    user.status = status;
    user.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        Action::new("ChangeStatus", None),
        EntityRef::new(EntityKind::User, target.id.as_str()),
        Some(target.status.as_str().to_string()),
        Some(status.as_str().to_string()),
        now,
    );

    Ok(AccountOutcome { user, audit_event })
}
