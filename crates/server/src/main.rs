// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use fieldbook::Policy;
use fieldbook_api::handlers;
use fieldbook_api::request_response::{
    AuditLogResponse, AvailabilityQuery, AvailabilityResponse, CreateReservationRequest,
    CreateUserRequest, FacilityListResponse, FacilityRequest, FacilityResponse, FavoriteResponse,
    LoginRequest, LoginResponse, NotificationListResponse, OverrideRequest, RegisterRequest,
    ReservationListResponse, ReservationResponse, ReviewRequest, SetRoleRequest, SetStatusRequest,
    SuccessResponse, UserResponse,
};
use fieldbook_api::{
    AnyMailer, ApiError, ConsoleMailer, MailError, ServiceSettings, Services, SmtpConfig,
    SmtpMailer,
};
use fieldbook_domain::{Facility, UserId};
use fieldbook_persistence::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, UtcOffset};
use tracing::{error, info, warn};

use crate::live::live_events_handler;
use crate::session::{OptionalSession, SessionUser};

/// fieldbook server - HTTP API for the sports-field booking platform
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "FIELDBOOK_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, env = "FIELDBOOK_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, env = "FIELDBOOK_PORT", default_value_t = 3000)]
    port: u16,

    /// User id of the super-admin, the only admin who may change other admins
    #[arg(long, env = "FIELDBOOK_SUPER_ADMIN_ID")]
    super_admin_id: Option<String>,

    /// Lifetime of a login session, in hours
    #[arg(long, env = "FIELDBOOK_SESSION_TTL_HOURS", default_value_t = 24)]
    session_ttl_hours: u32,

    /// Base URL used for links in notifications and email
    #[arg(
        long,
        env = "FIELDBOOK_APP_BASE_URL",
        default_value = "http://localhost:3000"
    )]
    app_base_url: String,

    /// Offset of the facilities' local time from UTC, in minutes
    #[arg(
        long,
        env = "FIELDBOOK_UTC_OFFSET_MINUTES",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    utc_offset_minutes: i32,

    /// SMTP relay host. Without it email is written to the log.
    #[arg(long, env = "FIELDBOOK_SMTP_SERVER")]
    smtp_server: Option<String>,

    /// SMTP relay port
    #[arg(long, env = "FIELDBOOK_SMTP_PORT", default_value_t = 465)]
    smtp_port: u16,

    /// SMTP username
    #[arg(long, env = "FIELDBOOK_SMTP_USERNAME")]
    smtp_username: Option<String>,

    /// SMTP password
    #[arg(long, env = "FIELDBOOK_SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// Sender of outgoing email
    #[arg(
        long,
        env = "FIELDBOOK_MAIL_FROM",
        default_value = "Fieldbook <no-reply@fieldbook.example>"
    )]
    mail_from: String,

    /// Email of the administrator created when the database has no users
    #[arg(long, env = "FIELDBOOK_BOOTSTRAP_ADMIN_EMAIL", requires = "bootstrap_admin_password")]
    bootstrap_admin_email: Option<String>,

    /// Password of the bootstrap administrator
    #[arg(
        long,
        env = "FIELDBOOK_BOOTSTRAP_ADMIN_PASSWORD",
        hide_env_values = true,
        requires = "bootstrap_admin_email"
    )]
    bootstrap_admin_password: Option<String>,
}

/// Application state shared across handlers.
type AppState = Arc<Services<AnyMailer>>;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error message.
    error: String,
    /// Stable `snake_case` error kind.
    kind: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.message,
            kind: self.kind.to_string(),
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ConflictingReservation { .. }
            | ApiError::ConcurrentConflict { .. }
            | ApiError::HasFutureReservations { .. }
            | ApiError::AlreadyInState { .. }
            | ApiError::InvalidTransition { .. }
            | ApiError::ConcurrentModification { .. } => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Transient { .. } => {
                error!(error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

type HttpResult<T> = Result<Json<T>, HttpError>;

// ============================================================================
// Accounts
// ============================================================================

async fn handle_register(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<RegisterRequest>,
) -> HttpResult<UserResponse> {
    Ok(Json(handlers::register(&state, req).await?))
}

async fn handle_login(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<LoginResponse> {
    Ok(Json(handlers::login(&state, req).await?))
}

async fn handle_logout(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
) -> HttpResult<SuccessResponse> {
    Ok(Json(handlers::logout(&state, &session).await?))
}

#[allow(clippy::unused_async)]
async fn handle_whoami(SessionUser(session): SessionUser) -> Json<UserResponse> {
    Json(handlers::whoami(&session))
}

async fn handle_create_user(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Json(req): Json<CreateUserRequest>,
) -> HttpResult<UserResponse> {
    Ok(Json(handlers::create_user(&state, &session, req).await?))
}

async fn handle_set_role(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(user_id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> HttpResult<UserResponse> {
    Ok(Json(
        handlers::set_role(&state, &session, &user_id, req).await?,
    ))
}

async fn handle_set_status(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(user_id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> HttpResult<UserResponse> {
    Ok(Json(
        handlers::set_status(&state, &session, &user_id, req).await?,
    ))
}

async fn handle_toggle_user_status(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(user_id): Path<String>,
) -> HttpResult<UserResponse> {
    Ok(Json(
        handlers::toggle_user_status(&state, &session, &user_id).await?,
    ))
}

async fn handle_audit_log(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(entity_id): Path<String>,
) -> HttpResult<AuditLogResponse> {
    Ok(Json(
        handlers::audit_log(&state, &session, &entity_id).await?,
    ))
}

// ============================================================================
// Facilities
// ============================================================================

async fn handle_list_facilities(
    AxumState(state): AxumState<AppState>,
) -> HttpResult<FacilityListResponse> {
    Ok(Json(handlers::list_approved_facilities(&state).await?))
}

async fn handle_create_facility(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Json(req): Json<FacilityRequest>,
) -> HttpResult<FacilityResponse> {
    Ok(Json(handlers::create_facility(&state, &session, req).await?))
}

async fn handle_my_facilities(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
) -> HttpResult<FacilityListResponse> {
    Ok(Json(handlers::list_my_facilities(&state, &session).await?))
}

async fn handle_review_queue(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
) -> HttpResult<FacilityListResponse> {
    Ok(Json(handlers::review_queue(&state, &session).await?))
}

async fn handle_facility_detail(
    AxumState(state): AxumState<AppState>,
    OptionalSession(session): OptionalSession,
    Path(facility_id): Path<String>,
) -> HttpResult<Facility> {
    Ok(Json(
        handlers::facility_detail(&state, session.as_ref(), &facility_id).await?,
    ))
}

async fn handle_edit_facility(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(facility_id): Path<String>,
    Json(req): Json<FacilityRequest>,
) -> HttpResult<FacilityResponse> {
    Ok(Json(
        handlers::edit_facility(&state, &session, &facility_id, req).await?,
    ))
}

async fn handle_approve_facility(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(facility_id): Path<String>,
    req: Option<Json<ReviewRequest>>,
) -> HttpResult<FacilityResponse> {
    let req: ReviewRequest = req.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(
        handlers::approve_facility(&state, &session, &facility_id, req).await?,
    ))
}

async fn handle_reject_facility(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(facility_id): Path<String>,
    req: Option<Json<ReviewRequest>>,
) -> HttpResult<FacilityResponse> {
    let req: ReviewRequest = req.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(
        handlers::reject_facility(&state, &session, &facility_id, req).await?,
    ))
}

async fn handle_toggle_facility_status(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(facility_id): Path<String>,
) -> HttpResult<FacilityResponse> {
    Ok(Json(
        handlers::toggle_facility_status(&state, &session, &facility_id).await?,
    ))
}

async fn handle_facility_reservations(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(facility_id): Path<String>,
) -> HttpResult<ReservationListResponse> {
    Ok(Json(
        handlers::facility_reservations(&state, &session, &facility_id).await?,
    ))
}

async fn handle_availability(
    AxumState(state): AxumState<AppState>,
    OptionalSession(session): OptionalSession,
    Path(facility_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> HttpResult<AvailabilityResponse> {
    Ok(Json(
        handlers::availability(&state, session.as_ref(), &facility_id, query).await?,
    ))
}

async fn handle_add_favorite(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(facility_id): Path<String>,
) -> HttpResult<FavoriteResponse> {
    Ok(Json(
        handlers::add_favorite(&state, &session, &facility_id).await?,
    ))
}

async fn handle_remove_favorite(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(facility_id): Path<String>,
) -> HttpResult<FavoriteResponse> {
    Ok(Json(
        handlers::remove_favorite(&state, &session, &facility_id).await?,
    ))
}

async fn handle_list_favorites(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
) -> HttpResult<FacilityListResponse> {
    Ok(Json(handlers::list_favorites(&state, &session).await?))
}

// ============================================================================
// Reservations
// ============================================================================

async fn handle_create_reservation(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Json(req): Json<CreateReservationRequest>,
) -> HttpResult<ReservationResponse> {
    Ok(Json(
        handlers::create_reservation(&state, &session, req).await?,
    ))
}

async fn handle_my_reservations(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
) -> HttpResult<ReservationListResponse> {
    Ok(Json(handlers::my_reservations(&state, &session).await?))
}

async fn handle_confirm_reservation(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(reservation_id): Path<String>,
) -> HttpResult<ReservationResponse> {
    Ok(Json(
        handlers::confirm_reservation(&state, &session, &reservation_id).await?,
    ))
}

async fn handle_cancel_reservation(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(reservation_id): Path<String>,
) -> HttpResult<ReservationResponse> {
    Ok(Json(
        handlers::cancel_reservation(&state, &session, &reservation_id).await?,
    ))
}

async fn handle_complete_reservation(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(reservation_id): Path<String>,
) -> HttpResult<ReservationResponse> {
    Ok(Json(
        handlers::complete_reservation(&state, &session, &reservation_id).await?,
    ))
}

async fn handle_override_reservation(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(reservation_id): Path<String>,
    Json(req): Json<OverrideRequest>,
) -> HttpResult<ReservationResponse> {
    Ok(Json(
        handlers::override_reservation(&state, &session, &reservation_id, req).await?,
    ))
}

async fn handle_ticket_email(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(reservation_id): Path<String>,
) -> HttpResult<SuccessResponse> {
    Ok(Json(
        handlers::send_ticket_email(&state, &session, &reservation_id).await?,
    ))
}

// ============================================================================
// Notifications
// ============================================================================

async fn handle_list_notifications(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
) -> HttpResult<NotificationListResponse> {
    Ok(Json(handlers::list_notifications(&state, &session).await?))
}

async fn handle_mark_notification_read(
    AxumState(state): AxumState<AppState>,
    SessionUser(session): SessionUser,
    Path(notification_id): Path<String>,
) -> HttpResult<SuccessResponse> {
    Ok(Json(
        handlers::mark_notification_read(&state, &session, &notification_id).await?,
    ))
}

#[allow(clippy::unused_async)]
async fn handle_not_found() -> HttpError {
    HttpError {
        status: StatusCode::NOT_FOUND,
        kind: "not_found",
        message: String::from("No such route"),
    }
}

#[allow(clippy::unused_async)]
async fn handle_method_not_allowed() -> HttpError {
    HttpError {
        status: StatusCode::METHOD_NOT_ALLOWED,
        kind: "method_not_allowed",
        message: String::from("Method not allowed on this route"),
    }
}

/// Builds the application router.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/me", get(handle_whoami))
        .route("/admin/users", post(handle_create_user))
        .route("/admin/users/{id}/role", post(handle_set_role))
        .route("/admin/users/{id}/status", post(handle_set_status))
        .route(
            "/admin/users/{id}/toggle-status",
            post(handle_toggle_user_status),
        )
        .route("/admin/facilities/pending", get(handle_review_queue))
        .route(
            "/admin/facilities/{id}/approve",
            post(handle_approve_facility),
        )
        .route("/admin/facilities/{id}/reject", post(handle_reject_facility))
        .route("/admin/audit/{entity_id}", get(handle_audit_log))
        .route(
            "/facilities",
            get(handle_list_facilities).post(handle_create_facility),
        )
        .route("/facilities/mine", get(handle_my_facilities))
        .route(
            "/facilities/{id}",
            get(handle_facility_detail).put(handle_edit_facility),
        )
        .route(
            "/facilities/{id}/toggle-status",
            post(handle_toggle_facility_status),
        )
        .route(
            "/facilities/{id}/reservations",
            get(handle_facility_reservations),
        )
        .route("/facilities/{id}/availability", get(handle_availability))
        .route(
            "/facilities/{id}/favorite",
            post(handle_add_favorite).delete(handle_remove_favorite),
        )
        .route("/favorites", get(handle_list_favorites))
        .route("/reservations", post(handle_create_reservation))
        .route("/reservations/mine", get(handle_my_reservations))
        .route(
            "/reservations/{id}/confirm",
            post(handle_confirm_reservation),
        )
        .route("/reservations/{id}/cancel", post(handle_cancel_reservation))
        .route(
            "/reservations/{id}/complete",
            post(handle_complete_reservation),
        )
        .route(
            "/reservations/{id}/override",
            post(handle_override_reservation),
        )
        .route("/reservations/{id}/ticket-email", post(handle_ticket_email))
        .route("/notifications", get(handle_list_notifications))
        .route(
            "/notifications/{id}/read",
            post(handle_mark_notification_read),
        )
        .route("/live", get(live_events_handler))
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_method_not_allowed)
        .with_state(state)
}

fn build_mailer(args: &Args) -> Result<AnyMailer, MailError> {
    let Some(server) = &args.smtp_server else {
        warn!("No SMTP server configured; email will be written to the log");
        return Ok(AnyMailer::Console(ConsoleMailer));
    };
    let config: SmtpConfig = SmtpConfig {
        server: server.clone(),
        port: args.smtp_port,
        username: args.smtp_username.clone(),
        password: args.smtp_password.clone(),
        from: args.mail_from.clone(),
    };
    info!(server = %config.server, port = config.port, "Using SMTP relay");
    Ok(AnyMailer::Smtp(SmtpMailer::new(&config)?))
}

fn build_settings(args: &Args) -> Result<ServiceSettings, Box<dyn std::error::Error>> {
    let offset_seconds: i32 = args
        .utc_offset_minutes
        .checked_mul(60)
        .ok_or("UTC offset out of range")?;
    Ok(ServiceSettings {
        session_ttl: Duration::hours(i64::from(args.session_ttl_hours)),
        utc_offset: UtcOffset::from_whole_seconds(offset_seconds)?,
        app_base_url: args.app_base_url.clone(),
        ..ServiceSettings::default()
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing fieldbook server");

    let store: Store = if let Some(db_path) = &args.database {
        info!(path = %db_path, "Using file-based database");
        Store::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Store::new_in_memory()?
    };

    let settings: ServiceSettings = build_settings(&args)?;
    let policy: Policy = Policy::new(args.super_admin_id.clone().map(UserId::new));
    if args.super_admin_id.is_none() {
        warn!("No super-admin configured; admins cannot change other admins");
    }
    let services: Services<AnyMailer> =
        Services::new(store, policy, build_mailer(&args)?, &settings);

    if let (Some(email), Some(password)) =
        (&args.bootstrap_admin_email, &args.bootstrap_admin_password)
    {
        match handlers::bootstrap_admin(&services, email, password).await? {
            Some(admin) => info!(user_id = %admin.id, "Bootstrap administrator ready"),
            None => info!("Users already exist; bootstrap skipped"),
        }
    }

    let app: Router = build_router(Arc::new(services));

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
