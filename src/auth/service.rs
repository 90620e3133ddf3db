//! Authentication service
//!
//! Core business logic for account registration, login, and token lifecycle.
//! Every issued token pair is backed by a revocable session row; refresh
//! rotates the stored token hash.

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::email::{self, CodeError, EmailService, PURPOSE_REGISTRATION};
use crate::models::{AuthSession, AuthTokensResponse, RegisterRequest, User, UserRole, UserStatus};

use super::jwt::{generate_access_token, generate_refresh_token, verify_token, JwtError};
use super::password::{hash_password, verify_password, PasswordError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is banned")]
    AccountBanned,

    #[error("Admin access required")]
    NotAdmin,

    #[error("User not found")]
    UserNotFound,

    #[error("Session not found or revoked")]
    SessionNotFound,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0}")]
    CodeError(#[from] CodeError),

    #[error("Email error: {0}")]
    EmailError(String),

    #[error("Password error: {0}")]
    PasswordError(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::DatabaseError(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::TokenError(e.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::PasswordError(e.to_string())
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
    email_service: EmailService,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_days: i64,
    email_code_ttl_seconds: i64,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        db_pool: PgPool,
        email_service: EmailService,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
        email_code_ttl_seconds: i64,
    ) -> Self {
        Self {
            db_pool,
            email_service,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
            email_code_ttl_seconds,
        }
    }

    /// Signing secret, exposed for the token extractor
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Send a registration verification code
    pub async fn send_registration_code(&self, email: &str) -> Result<i64, AuthError> {
        if self.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        email::issue_code(
            &self.db_pool,
            &self.email_service,
            email,
            PURPOSE_REGISTRATION,
            self.email_code_ttl_seconds,
        )
        .await
        .map_err(|e| AuthError::EmailError(e.to_string()))
    }

    /// Complete registration with an emailed code
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        if self.find_user_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        email::verify_code(
            &self.db_pool,
            &request.email,
            PURPOSE_REGISTRATION,
            &request.code,
        )
        .await?;

        let password_hash = hash_password(&request.password)?;

        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, password_hash, username, role, status, level, balance)
            VALUES ($1, $2, $3, $4, 'user', 'active', 1, 0)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.email)
        .bind(&password_hash)
        .bind(&request.username)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Password login; returns a token pair backed by a new session
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<AuthTokensResponse, AuthError> {
        let user = self
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if user.status == UserStatus::Banned {
            return Err(AuthError::AccountBanned);
        }

        self.issue_tokens(&user, ip_address, user_agent).await
    }

    /// Admin login; identical to login but rejects non-admin accounts
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<AuthTokensResponse, AuthError> {
        let user = self
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.role != UserRole::Admin {
            return Err(AuthError::NotAdmin);
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if user.status == UserStatus::Banned {
            return Err(AuthError::AccountBanned);
        }

        self.issue_tokens(&user, ip_address, user_agent).await
    }

    /// Issue a new access/refresh pair with a backing session row
    pub async fn issue_tokens(
        &self,
        user: &User,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<AuthTokensResponse, AuthError> {
        let jti = Uuid::new_v4().to_string();

        let access_token =
            generate_access_token(user, &jti, &self.jwt_secret, self.access_token_ttl_seconds)?;
        let refresh_token =
            generate_refresh_token(user, &jti, &self.jwt_secret, self.refresh_token_ttl_days)?;

        let expires_at = Utc::now() + Duration::days(self.refresh_token_ttl_days);

        sqlx::query(
            r#"
            INSERT INTO auth_sessions (id, user_id, jti, refresh_token_hash, ip_address, user_agent, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&jti)
        .bind(hash_token(&refresh_token))
        .bind(ip_address)
        .bind(user_agent)
        .bind(expires_at)
        .execute(&self.db_pool)
        .await?;

        Ok(AuthTokensResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
            user: user.clone().into(),
        })
    }

    /// Exchange a refresh token for a new token pair (rotating the session)
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthTokensResponse, AuthError> {
        let claims = verify_token(refresh_token, &self.jwt_secret)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if claims.token_type != "refresh" {
            return Err(AuthError::InvalidRefreshToken);
        }

        let session: AuthSession = sqlx::query_as(
            r#"
            SELECT id, user_id, jti, refresh_token_hash, ip_address, user_agent,
                   expires_at, revoked, revoked_at, created_at
            FROM auth_sessions
            WHERE jti = $1
            "#,
        )
        .bind(&claims.jti)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::SessionNotFound)?;

        if session.revoked || session.expires_at < Utc::now() {
            return Err(AuthError::SessionNotFound);
        }

        if session.refresh_token_hash != hash_token(refresh_token) {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self.get_user_by_id(session.user_id).await?;
        if user.status == UserStatus::Banned {
            return Err(AuthError::AccountBanned);
        }

        // Rotate: new jti and refresh hash on the same session row
        let new_jti = Uuid::new_v4().to_string();
        let access_token =
            generate_access_token(&user, &new_jti, &self.jwt_secret, self.access_token_ttl_seconds)?;
        let new_refresh_token =
            generate_refresh_token(&user, &new_jti, &self.jwt_secret, self.refresh_token_ttl_days)?;
        let expires_at = Utc::now() + Duration::days(self.refresh_token_ttl_days);

        sqlx::query(
            r#"
            UPDATE auth_sessions
            SET jti = $1, refresh_token_hash = $2, expires_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&new_jti)
        .bind(hash_token(&new_refresh_token))
        .bind(expires_at)
        .bind(session.id)
        .execute(&self.db_pool)
        .await?;

        Ok(AuthTokensResponse {
            access_token,
            refresh_token: new_refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
            user: user.into(),
        })
    }

    /// Check a session is live (used by the token extractor)
    pub async fn verify_session(&self, jti: &str) -> Result<(), AuthError> {
        let live: Option<(bool,)> = sqlx::query_as(
            "SELECT revoked FROM auth_sessions WHERE jti = $1 AND expires_at > NOW()",
        )
        .bind(jti)
        .fetch_optional(&self.db_pool)
        .await?;

        match live {
            Some((false,)) => Ok(()),
            _ => Err(AuthError::SessionNotFound),
        }
    }

    /// Revoke a single session by jti
    pub async fn revoke_session(&self, jti: &str) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE auth_sessions SET revoked = TRUE, revoked_at = NOW() WHERE jti = $1",
        )
        .bind(jti)
        .execute(&self.db_pool)
        .await?;
        Ok(())
    }

    /// Revoke every live session for a user; returns the count
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let result = sqlx::query(
            "UPDATE auth_sessions SET revoked = TRUE, revoked_at = NOW() WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.db_pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Load a user by id
    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User, AuthError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db_pool)
            .await?)
    }
}

/// SHA-256 hash of a token, base64-encoded for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_deterministic() {
        let a = hash_token("some-refresh-token");
        let b = hash_token("some-refresh-token");
        assert_eq!(a, b);
        assert_ne!(a, hash_token("other-token"));
        // SHA-256 output is 32 bytes -> 44 base64 chars
        assert_eq!(a.len(), 44);
    }
}
