//! Barber model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A barber working at a shop
///
/// Deactivating a barber removes them from future bookability immediately but
/// leaves existing appointments untouched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Barber {
    pub id: Uuid,
    /// Owning shop ID
    pub shop_id: Uuid,
    /// Linked login account, if the barber can sign in
    pub user_id: Option<Uuid>,
    /// Barber display name
    pub display_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Create barber request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBarber {
    #[validate(length(min = 1, max = 120))]
    pub display_name: String,
    pub user_id: Option<Uuid>,
}

/// Update barber request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBarber {
    #[validate(length(min = 1, max = 120))]
    pub display_name: Option<String>,
    pub active: Option<bool>,
}
