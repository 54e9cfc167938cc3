//! Shops repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::shop::{CreateShop, Shop},
};

#[derive(Clone)]
pub struct ShopsRepository {
    pool: Pool<Postgres>,
}

impl ShopsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get shop by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Shop> {
        sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Shop {} not found", id)))
    }

    /// Shop owned by the given user, if any
    pub async fn get_id_by_owner(&self, owner_id: Uuid) -> AppResult<Option<Uuid>> {
        let id = sqlx::query_scalar("SELECT id FROM shops WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    /// List all shops
    pub async fn list(&self) -> AppResult<Vec<Shop>> {
        let shops = sqlx::query_as::<_, Shop>("SELECT * FROM shops ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(shops)
    }

    /// Create a shop
    pub async fn create(&self, owner_id: Uuid, data: &CreateShop) -> AppResult<Shop> {
        let shop = sqlx::query_as::<_, Shop>(
            r#"
            INSERT INTO shops (id, name, owner_id, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(owner_id)
        .bind(&data.address)
        .fetch_one(&self.pool)
        .await?;
        Ok(shop)
    }
}
