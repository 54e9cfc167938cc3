//! Appointment booking and lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::appointment::{Appointment, CreateAppointment},
};

use super::AuthenticatedUser;

/// Book an appointment for the authenticated customer
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 403, description = "Customer blocked by no-show policy"),
        (status = 409, description = "Slot taken or concurrent booking conflict"),
        (status = 422, description = "Barber unavailable or time in the past")
    )
)]
pub async fn create_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = state
        .services
        .booking
        .create_appointment(claims.user_id, &request, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Get an appointment
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    let appointment = state.services.booking.get_appointment(id).await?;
    Ok(Json(appointment))
}

/// List the authenticated customer's appointments
#[utoipa::path(
    get,
    path = "/customers/me/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Customer's appointments", body = Vec<Appointment>)
    )
)]
pub async fn my_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = state.services.booking.list_for_customer(claims.user_id).await?;
    Ok(Json(appointments))
}

/// Query parameters for a barber's agenda
#[derive(Debug, Deserialize, IntoParams)]
pub struct AgendaQuery {
    /// Range start (RFC 3339); defaults to now
    pub from: Option<DateTime<Utc>>,
    /// Range end (RFC 3339); defaults to seven days after `from`
    pub to: Option<DateTime<Utc>>,
}

/// List a barber's appointments (staff view)
#[utoipa::path(
    get,
    path = "/barbers/{id}/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Barber ID"), AgendaQuery),
    responses(
        (status = 200, description = "Barber's appointments", body = Vec<Appointment>),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn barber_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(barber_id): Path<Uuid>,
    Query(query): Query<AgendaQuery>,
) -> AppResult<Json<Vec<Appointment>>> {
    claims.require_staff()?;

    let from = query.from.unwrap_or_else(Utc::now);
    let to = query.to.unwrap_or(from + Duration::days(7));
    let appointments = state.services.booking.list_for_barber(barber_id, from, to).await?;
    Ok(Json(appointments))
}

/// Cancel request
#[derive(Deserialize, ToSchema, Default)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Cancel an appointment
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Appointment cancelled", body = Appointment),
        (status = 409, description = "Appointment already in a terminal state"),
        (status = 422, description = "Cancellation window has passed"),
        (status = 502, description = "Refund failed at the payment gateway")
    )
)]
pub async fn cancel_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelRequest>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .lifecycle
        .cancel_appointment(id, &claims, request.reason, Utc::now())
        .await?;
    Ok(Json(appointment))
}

/// Mark an appointment completed
#[utoipa::path(
    post,
    path = "/appointments/{id}/complete",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment completed", body = Appointment),
        (status = 403, description = "Staff role required"),
        (status = 409, description = "Appointment already in a terminal state")
    )
)]
pub async fn complete_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .lifecycle
        .complete_appointment(id, &claims)
        .await?;
    Ok(Json(appointment))
}

/// Mark an appointment as a no-show
#[utoipa::path(
    post,
    path = "/appointments/{id}/no-show",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment marked as no-show", body = Appointment),
        (status = 403, description = "Staff role required"),
        (status = 422, description = "Start time has not passed yet")
    )
)]
pub async fn mark_no_show(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .lifecycle
        .mark_no_show(id, &claims, Utc::now())
        .await?;
    Ok(Json(appointment))
}
