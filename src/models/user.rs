//! User accounts and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Barber,
    Owner,
    Admin,
}

/// A user account (customer, barber, shop owner or admin)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Register request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 120))]
    pub display_name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// JWT claims attached to every authenticated request
///
/// The core trusts these for identity only; ownership checks are re-done
/// against the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    /// Shop the principal owns or works at, when applicable
    pub shop_id: Option<Uuid>,
    /// Barber profile linked to this account, when applicable
    pub barber_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    // Authorization checks

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin role required".to_string()))
        }
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        match self.role {
            Role::Barber | Role::Owner | Role::Admin => Ok(()),
            Role::Customer => Err(AppError::Authorization(
                "Staff role required".to_string(),
            )),
        }
    }

    /// Owner of the given shop, or admin
    pub fn require_shop_owner(&self, shop_id: Uuid) -> Result<(), AppError> {
        if self.role == Role::Admin || (self.role == Role::Owner && self.shop_id == Some(shop_id)) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Not the owner of this shop".to_string(),
            ))
        }
    }
}
