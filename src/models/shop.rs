//! Shop model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A barber shop, owning barbers and the services they offer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Shop {
    pub id: Uuid,
    /// Shop display name
    pub name: String,
    /// Owner user ID
    pub owner_id: Uuid,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create shop request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShop {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub address: Option<String>,
}
