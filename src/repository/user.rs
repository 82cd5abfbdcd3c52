//! User repository (`user_info` table)

use crate::domain::{AuthProvider, CreateUserInput, User};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, input: &CreateUserInput) -> Result<User>;
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_provider_id(
        &self,
        provider: &AuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>>;
}

pub struct UserRepositoryImpl {
    pool: MySqlPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn map_conflict_if_duplicate(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &error {
        if db_err.is_unique_violation() {
            return AppError::Conflict("User already exists".to_string());
        }
    }
    AppError::Database(error)
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_info (provider, provider_id, email, password, nickname,
                                   profile_image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&input.provider)
        .bind(&input.provider_id)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.nickname)
        .bind(&input.profile_image_url)
        .execute(&self.pool)
        .await
        .map_err(map_conflict_if_duplicate)?;

        let user_id = result.last_insert_id() as i64;
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create user")))
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, provider, provider_id, email, password, nickname,
                   profile_image_url, created_at, updated_at
            FROM user_info
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, provider, provider_id, email, password, nickname,
                   profile_image_url, created_at, updated_at
            FROM user_info
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_provider_id(
        &self,
        provider: &AuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, provider, provider_id, email, password, nickname,
                   profile_image_url, created_at, updated_at
            FROM user_info
            WHERE provider = ? AND provider_id = ?
            "#,
        )
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
