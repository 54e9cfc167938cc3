//! No-show flag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-customer no-show counter
///
/// Incremented by the no-show sweep and by explicit staff action; only an
/// admin reset ever lowers it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NoShowFlag {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub count: i32,
    pub last_flagged_at: Option<DateTime<Utc>>,
}
