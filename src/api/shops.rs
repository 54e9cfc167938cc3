//! Shop, barber and service catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        barber::{Barber, CreateBarber, UpdateBarber},
        service::{CreateService, Service},
        shop::{CreateShop, Shop},
    },
};

use super::AuthenticatedUser;

/// List all shops
#[utoipa::path(
    get,
    path = "/shops",
    tag = "shops",
    responses(
        (status = 200, description = "All shops", body = Vec<Shop>)
    )
)]
pub async fn list_shops(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Shop>>> {
    let shops = state.services.catalog.list_shops().await?;
    Ok(Json(shops))
}

/// Get a shop
#[utoipa::path(
    get,
    path = "/shops/{id}",
    tag = "shops",
    params(("id" = Uuid, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Shop", body = Shop),
        (status = 400, description = "Shop not found")
    )
)]
pub async fn get_shop(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Shop>> {
    let shop = state.services.catalog.get_shop(id).await?;
    Ok(Json(shop))
}

/// Create a shop owned by the authenticated user
#[utoipa::path(
    post,
    path = "/shops",
    tag = "shops",
    security(("bearer_auth" = [])),
    request_body = CreateShop,
    responses(
        (status = 201, description = "Shop created", body = Shop),
        (status = 403, description = "Not allowed")
    )
)]
pub async fn create_shop(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateShop>,
) -> AppResult<(StatusCode, Json<Shop>)> {
    claims.require_staff()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let shop = state.services.catalog.create_shop(claims.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(shop)))
}

/// List barbers at a shop
#[utoipa::path(
    get,
    path = "/shops/{id}/barbers",
    tag = "barbers",
    params(("id" = Uuid, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Barbers at the shop", body = Vec<Barber>)
    )
)]
pub async fn list_barbers(
    State(state): State<crate::AppState>,
    Path(shop_id): Path<Uuid>,
) -> AppResult<Json<Vec<Barber>>> {
    let barbers = state.services.catalog.list_barbers(shop_id).await?;
    Ok(Json(barbers))
}

/// Add a barber to a shop
#[utoipa::path(
    post,
    path = "/shops/{id}/barbers",
    tag = "barbers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop ID")),
    request_body = CreateBarber,
    responses(
        (status = 201, description = "Barber created", body = Barber),
        (status = 403, description = "Not the shop owner")
    )
)]
pub async fn create_barber(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(shop_id): Path<Uuid>,
    Json(request): Json<CreateBarber>,
) -> AppResult<(StatusCode, Json<Barber>)> {
    claims.require_shop_owner(shop_id)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let barber = state.services.catalog.create_barber(shop_id, &request).await?;
    Ok((StatusCode::CREATED, Json(barber)))
}

/// Update a barber (rename, activate/deactivate)
#[utoipa::path(
    put,
    path = "/barbers/{id}",
    tag = "barbers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Barber ID")),
    request_body = UpdateBarber,
    responses(
        (status = 200, description = "Barber updated", body = Barber),
        (status = 403, description = "Not the shop owner"),
        (status = 404, description = "Barber not found")
    )
)]
pub async fn update_barber(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBarber>,
) -> AppResult<Json<Barber>> {
    let barber = state.services.catalog.get_barber(id).await?;
    claims.require_shop_owner(barber.shop_id)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let barber = state.services.catalog.update_barber(id, &request).await?;
    Ok(Json(barber))
}

/// List active services at a shop
#[utoipa::path(
    get,
    path = "/shops/{id}/services",
    tag = "services",
    params(("id" = Uuid, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Services offered by the shop", body = Vec<Service>)
    )
)]
pub async fn list_services(
    State(state): State<crate::AppState>,
    Path(shop_id): Path<Uuid>,
) -> AppResult<Json<Vec<Service>>> {
    let services = state.services.catalog.list_services(shop_id).await?;
    Ok(Json(services))
}

/// Add a service to a shop
#[utoipa::path(
    post,
    path = "/shops/{id}/services",
    tag = "services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop ID")),
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 403, description = "Not the shop owner")
    )
)]
pub async fn create_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(shop_id): Path<Uuid>,
    Json(request): Json<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    claims.require_shop_owner(shop_id)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = state.services.catalog.create_service(shop_id, &request).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Deactivate a service
#[utoipa::path(
    delete,
    path = "/shops/{shop_id}/services/{id}",
    tag = "services",
    security(("bearer_auth" = [])),
    params(
        ("shop_id" = Uuid, Path, description = "Shop ID"),
        ("id" = Uuid, Path, description = "Service ID")
    ),
    responses(
        (status = 204, description = "Service deactivated"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn delete_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((shop_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    claims.require_shop_owner(shop_id)?;
    state.services.catalog.deactivate_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
