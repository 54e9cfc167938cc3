//! Payment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPayment,
    Paid,
    Refunded,
    Failed,
}

/// A deposit payment attached to an appointment
///
/// At most one payment exists per appointment (unique index on
/// `appointment_id`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub status: PaymentStatus,
    pub amount_cents: i64,
    /// Gateway payment-intent reference
    pub provider_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response returned when a payment intent is created
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentIntentResponse {
    pub payment_id: Uuid,
    pub amount_cents: i64,
    /// Client secret the frontend hands to the gateway SDK
    pub client_secret: String,
}
