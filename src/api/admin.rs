//! Administrative endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::no_show::NoShowFlag,
    services::lifecycle::SweepReport,
};

use super::AuthenticatedUser;

/// Get a customer's no-show flag
#[utoipa::path(
    get,
    path = "/admin/customers/{id}/no-show",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "No-show flag, null when never flagged", body = Option<NoShowFlag>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn get_no_show_flag(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Option<NoShowFlag>>> {
    claims.require_admin()?;
    let flag = state.services.lifecycle.get_no_show_flag(customer_id).await?;
    Ok(Json(flag))
}

/// Run the no-show sweep
#[utoipa::path(
    post,
    path = "/admin/no-show-sweep",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep finished", body = SweepReport),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn run_no_show_sweep(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SweepReport>> {
    claims.require_admin()?;
    let report = state.services.lifecycle.run_no_show_sweep(Utc::now()).await?;
    Ok(Json(report))
}

/// Reset a customer's no-show counter
#[utoipa::path(
    post,
    path = "/admin/customers/{id}/no-show-reset",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Counter reset"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn reset_no_show_flag(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.lifecycle.reset_no_show_flag(customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
