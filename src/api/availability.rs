//! Availability rule and slot listing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::availability::{AvailabilityRule, CreateAvailabilityRule},
    services::availability::DaySlots,
};

use super::AuthenticatedUser;

/// List a barber's availability rules
#[utoipa::path(
    get,
    path = "/barbers/{id}/availability",
    tag = "availability",
    params(("id" = Uuid, Path, description = "Barber ID")),
    responses(
        (status = 200, description = "Availability rules", body = Vec<AvailabilityRule>),
        (status = 404, description = "Barber not found")
    )
)]
pub async fn list_rules(
    State(state): State<crate::AppState>,
    Path(barber_id): Path<Uuid>,
) -> AppResult<Json<Vec<AvailabilityRule>>> {
    let rules = state.services.catalog.list_rules(barber_id).await?;
    Ok(Json(rules))
}

/// Create an availability rule for a barber
#[utoipa::path(
    post,
    path = "/barbers/{id}/availability",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Barber ID")),
    request_body = CreateAvailabilityRule,
    responses(
        (status = 201, description = "Rule created", body = AvailabilityRule),
        (status = 403, description = "Not the shop owner"),
        (status = 404, description = "Barber not found")
    )
)]
pub async fn create_rule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<CreateAvailabilityRule>,
) -> AppResult<(StatusCode, Json<AvailabilityRule>)> {
    let barber = state.services.catalog.get_barber(barber_id).await?;
    claims.require_shop_owner(barber.shop_id)?;

    let rule = state.services.catalog.create_rule(barber_id, &request).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// Delete an availability rule
#[utoipa::path(
    delete,
    path = "/barbers/{barber_id}/availability/{id}",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(
        ("barber_id" = Uuid, Path, description = "Barber ID"),
        ("id" = Uuid, Path, description = "Rule ID")
    ),
    responses(
        (status = 204, description = "Rule deleted"),
        (status = 404, description = "Barber or rule not found")
    )
)]
pub async fn delete_rule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((barber_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let barber = state.services.catalog.get_barber(barber_id).await?;
    claims.require_shop_owner(barber.shop_id)?;

    state.services.catalog.delete_rule(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for slot listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct SlotsQuery {
    /// Range start (YYYY-MM-DD), inclusive
    pub start_date: String,
    /// Range end (YYYY-MM-DD), inclusive
    pub end_date: String,
    /// Service whose duration defines the slot length
    pub service_id: Uuid,
}

/// Bookable start times for a barber over a date range
#[utoipa::path(
    get,
    path = "/barbers/{id}/slots",
    tag = "availability",
    params(
        ("id" = Uuid, Path, description = "Barber ID"),
        SlotsQuery
    ),
    responses(
        (status = 200, description = "Per-day bookable slots", body = Vec<DaySlots>),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Barber or service not found")
    )
)]
pub async fn get_slots(
    State(state): State<crate::AppState>,
    Path(barber_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<Vec<DaySlots>>> {
    let start_date = parse_date(&query.start_date, "start_date")?;
    let end_date = parse_date(&query.end_date, "end_date")?;

    let days = state
        .services
        .availability
        .compute_bookable_slots(barber_id, start_date, end_date, query.service_id, Utc::now())
        .await?;
    Ok(Json(days))
}

fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (use YYYY-MM-DD)", field)))
}
