//! Services (offerings) repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::service::{CreateService, Service},
};

#[derive(Clone)]
pub struct ServicesRepository {
    pool: Pool<Postgres>,
}

impl ServicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get service by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Service> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ServiceNotFound)
    }

    /// List active services at a shop
    pub async fn list_by_shop(&self, shop_id: Uuid) -> AppResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE shop_id = $1 AND active = true ORDER BY name",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    /// Create a service at a shop
    pub async fn create(&self, shop_id: Uuid, data: &CreateService) -> AppResult<Service> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (id, shop_id, barber_id, name, duration_minutes, price_cents, active)
            VALUES ($1, $2, $3, $4, $5, $6, true)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(shop_id)
        .bind(data.barber_id)
        .bind(&data.name)
        .bind(data.duration_minutes)
        .bind(data.price_cents)
        .fetch_one(&self.pool)
        .await?;
        Ok(service)
    }

    /// Deactivate a service
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE services SET active = false WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ServiceNotFound);
        }
        Ok(())
    }
}
