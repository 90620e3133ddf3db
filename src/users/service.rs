//! User profile service - account-facing operations after login

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::email::{self, EmailService, PURPOSE_EMAIL_CHANGE};
use crate::models::{UpdateProfileRequest, User, WalletResponse};

/// Profile and wallet operations for the signed-in user
pub struct UserService {
    db_pool: PgPool,
    email_service: EmailService,
    email_code_ttl_seconds: i64,
}

impl UserService {
    pub fn new(db_pool: PgPool, email_service: EmailService, email_code_ttl_seconds: i64) -> Self {
        Self {
            db_pool,
            email_service,
            email_code_ttl_seconds,
        }
    }

    /// Load the caller's profile
    pub async fn get_profile(&self, user_id: Uuid) -> Result<User> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load user")?
            .ok_or_else(|| anyhow!("User not found"))
    }

    /// Update username and/or avatar
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<User> {
        let user: User = sqlx::query_as(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                avatar_url = COALESCE($2, avatar_url),
                updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(request.username)
        .bind(request.avatar_url)
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to update profile")?;

        Ok(user)
    }

    /// Change password after re-verifying the current one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.get_profile(user_id).await?;

        let matches = verify_password(current_password, &user.password_hash)
            .map_err(|e| anyhow!(e.to_string()))?;
        if !matches {
            return Err(anyhow!("Current password is incorrect"));
        }

        let new_hash = hash_password(new_password).map_err(|e| anyhow!(e.to_string()))?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to update password")?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Send a verification code to the prospective new address
    pub async fn send_email_change_code(&self, user_id: Uuid, new_email: &str) -> Result<i64> {
        let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(new_email)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to check email availability")?;

        if let Some((existing_id,)) = taken {
            if existing_id != user_id {
                return Err(anyhow!("Email already registered"));
            }
        }

        email::issue_code(
            &self.db_pool,
            &self.email_service,
            new_email,
            PURPOSE_EMAIL_CHANGE,
            self.email_code_ttl_seconds,
        )
        .await
    }

    /// Apply the email change once the code checks out
    pub async fn verify_email_change(
        &self,
        user_id: Uuid,
        new_email: &str,
        code: &str,
    ) -> Result<User> {
        email::verify_code(&self.db_pool, new_email, PURPOSE_EMAIL_CHANGE, code)
            .await
            .map_err(|e| anyhow!(e.to_string()))?;

        let user: User = sqlx::query_as(
            "UPDATE users SET email = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(new_email)
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to update email")?;

        tracing::info!(user_id = %user_id, "Email address changed");
        Ok(user)
    }

    /// Wallet summary (balance in the marketplace currency)
    pub async fn get_wallet(&self, user_id: Uuid) -> Result<WalletResponse> {
        let (balance,): (Decimal,) = sqlx::query_as("SELECT balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.db_pool)
            .await
            .context("Failed to load balance")?;

        Ok(WalletResponse {
            balance,
            currency: "USD".to_string(),
        })
    }
}
