//! User lookups and the startup admin seed.

use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::db::{Role, User, UserStatus};

#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Stamp the last-login timestamp after a successful login.
    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_login = now(), updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Create the seed admin account when no user with the given email
    /// exists yet. Returns true when a user was created.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let existing = self.find_by_email(email).await?;
        if existing.is_some() {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, role, status, email_verified)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind("admin")
        .bind(email)
        .bind(password_hash)
        .bind("Platform Administrator")
        .bind(Role::Admin)
        .bind(UserStatus::Active)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }
}
