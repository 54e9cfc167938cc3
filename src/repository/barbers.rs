//! Barbers repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::barber::{Barber, CreateBarber, UpdateBarber},
};

#[derive(Clone)]
pub struct BarbersRepository {
    pool: Pool<Postgres>,
}

impl BarbersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get barber by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Barber> {
        sqlx::query_as::<_, Barber>("SELECT * FROM barbers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::BarberNotFound)
    }

    /// Barber profile linked to a login account, if any
    pub async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<Barber>> {
        let barber = sqlx::query_as::<_, Barber>("SELECT * FROM barbers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(barber)
    }

    /// List barbers at a shop
    pub async fn list_by_shop(&self, shop_id: Uuid) -> AppResult<Vec<Barber>> {
        let barbers = sqlx::query_as::<_, Barber>(
            "SELECT * FROM barbers WHERE shop_id = $1 ORDER BY display_name",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(barbers)
    }

    /// Create a barber at a shop
    pub async fn create(&self, shop_id: Uuid, data: &CreateBarber) -> AppResult<Barber> {
        let barber = sqlx::query_as::<_, Barber>(
            r#"
            INSERT INTO barbers (id, shop_id, user_id, display_name, active)
            VALUES ($1, $2, $3, $4, true)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(shop_id)
        .bind(data.user_id)
        .bind(&data.display_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(barber)
    }

    /// Update a barber (name, active flag)
    ///
    /// Deactivation only affects future bookability; existing appointments
    /// are left untouched.
    pub async fn update(&self, id: Uuid, data: &UpdateBarber) -> AppResult<Barber> {
        let barber = sqlx::query_as::<_, Barber>(
            r#"
            UPDATE barbers
            SET display_name = COALESCE($2, display_name),
                active = COALESCE($3, active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.display_name)
        .bind(data.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::BarberNotFound)?;
        Ok(barber)
    }
}
