//! No-show flags repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::no_show::NoShowFlag};

#[derive(Clone)]
pub struct NoShowRepository {
    pool: Pool<Postgres>,
}

impl NoShowRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a customer's no-show flag, if one exists
    pub async fn get_for_customer(&self, customer_id: Uuid) -> AppResult<Option<NoShowFlag>> {
        let flag =
            sqlx::query_as::<_, NoShowFlag>("SELECT * FROM no_show_flags WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(flag)
    }

    /// Reset a customer's counter to zero and clear the flag timestamp
    ///
    /// Admin action; the only way a blocked customer becomes bookable again.
    pub async fn reset(&self, customer_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE no_show_flags SET count = 0, last_flagged_at = NULL WHERE customer_id = $1",
        )
        .bind(customer_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
