// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook::{
    AccountOutcome, plan_bootstrap_admin, plan_create_user, plan_register, plan_set_role,
    plan_set_status,
};
use fieldbook_domain::{Role, User, UserId, UserStatus};
use fieldbook_persistence::SessionData;
use tracing::info;

use super::{load_user, parse_role};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::identity::AuthenticatedSession;
use crate::mail::Mailer;
use crate::request_response::{
    CreateUserRequest, LoginRequest, LoginResponse, RegisterRequest, SetRoleRequest,
    SetStatusRequest, SuccessResponse, UserResponse,
};
use crate::Services;

const BOOTSTRAP_DISPLAY_NAME: &str = "Administrator";

/// Registers a client or associate account.
///
/// # Errors
///
/// Returns `InvalidInput` for an admin role, a malformed email or name, a
/// password that fails the policy, or an email that is already registered.
pub async fn register<M: Mailer>(
    services: &Services<M>,
    request: RegisterRequest,
) -> Result<UserResponse, ApiError> {
    let role: Role = parse_role(&request.role)?;
    let outcome: AccountOutcome =
        plan_register(&request.email, &request.display_name, role, services.now())
            .map_err(translate_core_error)?;
    services.password_policy.validate(
        &request.password,
        &outcome.user.email,
        &outcome.user.display_name,
    )?;

    let password_hash: String = services.identity.hash_password(&request.password).await?;
    services
        .store
        .create_user(&outcome.user, &password_hash, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(user_id = %outcome.user.id, role = %role, "User registered");

    Ok(UserResponse {
        success: true,
        message: format!("Registered {}", outcome.user.email),
        user: outcome.user,
    })
}

/// Issues a session token.
///
/// # Errors
///
/// Returns `Unauthenticated` for wrong credentials or `Forbidden` for a
/// disabled account.
pub async fn login<M: Mailer>(
    services: &Services<M>,
    request: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session, user): (SessionData, User) = services
        .identity
        .login(&request.email, &request.password, services.now())
        .await?;

    Ok(LoginResponse {
        success: true,
        message: format!("Signed in as {}", user.display_name),
        token: session.token,
        expires_at: session.expires_at,
        user,
    })
}

/// Revokes the caller's session.
///
/// # Errors
///
/// Returns `Transient` if the session cannot be deleted.
pub async fn logout<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
) -> Result<SuccessResponse, ApiError> {
    services.identity.logout(&session.token).await?;
    Ok(SuccessResponse::ok("Signed out"))
}

/// Returns the caller's account.
#[must_use]
pub fn whoami(session: &AuthenticatedSession) -> UserResponse {
    UserResponse {
        success: true,
        message: format!("Signed in as {}", session.user.display_name),
        user: session.user.clone(),
    }
}

/// Creates an account with any role. Admin only.
///
/// # Errors
///
/// Returns `Forbidden` unless the caller is an active admin, or
/// `InvalidInput` as [`register`].
pub async fn create_user<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    request: CreateUserRequest,
) -> Result<UserResponse, ApiError> {
    let role: Role = parse_role(&request.role)?;
    let outcome: AccountOutcome = plan_create_user(
        &services.policy,
        &session.actor,
        &request.email,
        &request.display_name,
        role,
        services.now(),
    )
    .map_err(translate_core_error)?;
    services.password_policy.validate(
        &request.password,
        &outcome.user.email,
        &outcome.user.display_name,
    )?;

    let password_hash: String = services.identity.hash_password(&request.password).await?;
    services
        .store
        .create_user(&outcome.user, &password_hash, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        actor_id = %session.actor.user_id,
        user_id = %outcome.user.id,
        role = %role,
        "User created"
    );

    Ok(UserResponse {
        success: true,
        message: format!("Created {} as {}", outcome.user.email, role.label()),
        user: outcome.user,
    })
}

/// Changes a user's role and revokes their sessions.
///
/// # Errors
///
/// Returns `Forbidden` for a self-change or an admin target without
/// super-admin rights, `AlreadyInState` if the role is unchanged, or
/// `NotFound` for an unknown user.
pub async fn set_role<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    user_id: &str,
    request: SetRoleRequest,
) -> Result<UserResponse, ApiError> {
    let role: Role = parse_role(&request.role)?;
    let target: User = load_user(&services.store, &UserId::new(user_id)).await?;
    let outcome: AccountOutcome = plan_set_role(
        &services.policy,
        &session.actor,
        &target,
        role,
        services.now(),
    )
    .map_err(translate_core_error)?;

    services
        .store
        .update_user_access(&outcome.user, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        actor_id = %session.actor.user_id,
        user_id = %target.id,
        from = %target.role,
        to = %role,
        "Role changed"
    );

    Ok(UserResponse {
        success: true,
        message: format!("{} is now {}", outcome.user.display_name, role.label()),
        user: outcome.user,
    })
}

/// Sets a user's account status and revokes their sessions.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown status, `Forbidden` for the
/// caller's own account or an admin target without super-admin rights,
/// `AlreadyInState` if the status is unchanged, or `NotFound` for an
/// unknown user.
pub async fn set_status<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    user_id: &str,
    request: SetStatusRequest,
) -> Result<UserResponse, ApiError> {
    let status: UserStatus = request
        .status
        .parse::<UserStatus>()
        .map_err(translate_domain_error)?;
    let target: User = load_user(&services.store, &UserId::new(user_id)).await?;
    change_status(services, session, &target, status).await
}

/// Flips a user between active and disabled, revoking their sessions.
///
/// # Errors
///
/// Returns `Forbidden` for the caller's own account or an admin target
/// without super-admin rights, or `NotFound` for an unknown user.
pub async fn toggle_user_status<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    user_id: &str,
) -> Result<UserResponse, ApiError> {
    let target: User = load_user(&services.store, &UserId::new(user_id)).await?;
    change_status(services, session, &target, target.status.toggled()).await
}

async fn change_status<M: Mailer>(
    services: &Services<M>,
    session: &AuthenticatedSession,
    target: &User,
    status: UserStatus,
) -> Result<UserResponse, ApiError> {
    let outcome: AccountOutcome = plan_set_status(
        &services.policy,
        &session.actor,
        target,
        status,
        services.now(),
    )
    .map_err(translate_core_error)?;

    services
        .store
        .update_user_access(&outcome.user, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        actor_id = %session.actor.user_id,
        user_id = %target.id,
        status = %outcome.user.status,
        "Account status changed"
    );

    Ok(UserResponse {
        success: true,
        message: format!(
            "{} is now {}",
            outcome.user.display_name, outcome.user.status
        ),
        user: outcome.user,
    })
}

/// Creates the first administrator when the store has no users.
///
/// Returns `None` if any user already exists.
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed email or weak password.
pub async fn bootstrap_admin<M: Mailer>(
    services: &Services<M>,
    email: &str,
    password: &str,
) -> Result<Option<User>, ApiError> {
    let existing: usize = services
        .store
        .count_users()
        .await
        .map_err(translate_persistence_error)?;
    if existing > 0 {
        return Ok(None);
    }

    let outcome: AccountOutcome =
        plan_bootstrap_admin(email, BOOTSTRAP_DISPLAY_NAME, services.now())
            .map_err(translate_core_error)?;
    services
        .password_policy
        .validate(password, &outcome.user.email, BOOTSTRAP_DISPLAY_NAME)?;

    let password_hash: String = services.identity.hash_password(password).await?;
    services
        .store
        .create_user(&outcome.user, &password_hash, &outcome.audit_event)
        .await
        .map_err(translate_persistence_error)?;
    info!(
        user_id = %outcome.user.id,
        email = %outcome.user.email,
        "Bootstrap administrator created; pass this id as --super-admin-id"
    );

    Ok(Some(outcome.user))
}
