//! Authentication and account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, returning a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let claims = self.claims_for(&user).await?;
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Register a new customer account
    pub async fn register(&self, data: &CreateUser) -> AppResult<User> {
        let hash = self.hash_password(&data.password)?;
        self.repository
            .users
            .create(&data.email, &data.display_name, &hash, Role::Customer)
            .await
    }

    /// Get a user profile by ID
    pub async fn get_user(&self, id: uuid::Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Build claims for a user, resolving the shop/barber the account is tied to
    async fn claims_for(&self, user: &User) -> AppResult<UserClaims> {
        let (shop_id, barber_id) = match user.role {
            Role::Owner => (self.repository.shops.get_id_by_owner(user.id).await?, None),
            Role::Barber => {
                let barber = self.repository.barbers.get_by_user(user.id).await?;
                (barber.as_ref().map(|b| b.shop_id), barber.map(|b| b.id))
            }
            Role::Customer | Role::Admin => (None, None),
        };

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        Ok(UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            shop_id,
            barber_id,
            exp,
            iat: now,
        })
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
