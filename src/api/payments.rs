//! Payment endpoints: deposit intents and the gateway webhook

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::payment::PaymentIntentResponse};

use super::AuthenticatedUser;

/// Create the deposit payment intent for an appointment
#[utoipa::path(
    post,
    path = "/appointments/{id}/payment-intent",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 201, description = "Payment intent created", body = PaymentIntentResponse),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "A payment already exists for this appointment"),
        (status = 502, description = "Payment gateway error")
    )
)]
pub async fn create_payment_intent(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<PaymentIntentResponse>)> {
    let intent = state.services.payments.create_intent(id, &claims).await?;
    Ok((StatusCode::CREATED, Json(intent)))
}

/// Gateway webhook event envelope
#[derive(Deserialize, ToSchema)]
pub struct WebhookEvent {
    /// Event type, e.g. `payment_intent.succeeded`
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Deserialize, ToSchema)]
pub struct WebhookData {
    pub object: WebhookObject,
}

#[derive(Deserialize, ToSchema)]
pub struct WebhookObject {
    /// Payment-intent reference id
    pub id: String,
}

/// Payment gateway callback
///
/// Only `payment_intent.succeeded` matters here; every other event type is
/// acknowledged and dropped so the gateway stops retrying.
#[utoipa::path(
    post,
    path = "/payments/webhook",
    tag = "payments",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Event processed")
    )
)]
pub async fn webhook(
    State(state): State<crate::AppState>,
    Json(event): Json<WebhookEvent>,
) -> AppResult<StatusCode> {
    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            state
                .services
                .lifecycle
                .confirm_payment(&event.data.object.id)
                .await?;
        }
        other => {
            tracing::debug!(event_type = other, "ignoring webhook event");
        }
    }
    Ok(StatusCode::OK)
}
