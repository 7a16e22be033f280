// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{admin, client, now, policy, super_admin, user};
use crate::{
    AccountOutcome, CoreError, Denial, plan_bootstrap_admin, plan_create_user, plan_register,
    plan_set_role, plan_set_status,
};
use fieldbook_domain::{DomainError, Role, User, UserStatus};

#[test]
fn test_self_registration_allows_client_and_associate_only() {
    let outcome: AccountOutcome =
        plan_register(" Ana@Example.com ", "Ana", Role::Associate, now()).unwrap();
    assert_eq!(outcome.user.email, "ana@example.com");
    assert_eq!(outcome.user.role, Role::Associate);
    assert_eq!(outcome.user.status, UserStatus::Active);
    assert_eq!(outcome.audit_event.actor.id, outcome.user.id);

    assert!(matches!(
        plan_register("root@example.com", "Root", Role::Admin, now()),
        Err(CoreError::DomainViolation(DomainError::InvalidRole(_)))
    ));
}

#[test]
fn test_bootstrap_admin_is_self_attributed() {
    let outcome: AccountOutcome =
        plan_bootstrap_admin("Owner@Example.com", "Site Owner", now()).unwrap();
    assert_eq!(outcome.user.role, Role::Admin);
    assert_eq!(outcome.user.email, "owner@example.com");
    assert_eq!(outcome.audit_event.actor.id, outcome.user.id);
    assert_eq!(outcome.audit_event.action.name, "BootstrapAdmin");
}

#[test]
fn test_only_admins_create_users_with_any_role() {
    let outcome: AccountOutcome = plan_create_user(
        &policy(),
        &admin(),
        "helper@example.com",
        "Helper",
        Role::Admin,
        now(),
    )
    .unwrap();
    assert_eq!(outcome.user.role, Role::Admin);

    assert!(matches!(
        plan_create_user(
            &policy(),
            &client(),
            "x@example.com",
            "X",
            Role::Client,
            now()
        ),
        Err(CoreError::Denied(Denial::InsufficientRole { .. }))
    ));
}

#[test]
fn test_role_change_and_repeat() {
    let target: User = user("client-9", Role::Client);
    let outcome: AccountOutcome =
        plan_set_role(&policy(), &admin(), &target, Role::Associate, now()).unwrap();
    assert_eq!(outcome.user.role, Role::Associate);
    assert_eq!(outcome.audit_event.before.as_deref(), Some("client"));
    assert_eq!(outcome.audit_event.after.as_deref(), Some("associate"));

    assert!(matches!(
        plan_set_role(&policy(), &admin(), &target, Role::Client, now()),
        Err(CoreError::DomainViolation(DomainError::AlreadyInState { .. }))
    ));
}

#[test]
fn test_admin_cannot_disable_self_or_other_admin_without_super_admin() {
    let me: User = user("admin-1", Role::Admin);
    assert!(matches!(
        plan_set_status(&policy(), &admin(), &me, UserStatus::Disabled, now()),
        Err(CoreError::Denied(Denial::SelfProtection { .. }))
    ));

    let other_admin: User = user("admin-2", Role::Admin);
    assert_eq!(
        plan_set_status(
            &policy(),
            &admin(),
            &other_admin,
            UserStatus::Disabled,
            now()
        ),
        Err(CoreError::Denied(Denial::SuperAdminRequired))
    );

    let outcome: AccountOutcome = plan_set_status(
        &policy(),
        &super_admin(),
        &other_admin,
        UserStatus::Disabled,
        now(),
    )
    .unwrap();
    assert_eq!(outcome.user.status, UserStatus::Disabled);
}
