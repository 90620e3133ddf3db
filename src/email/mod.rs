//! Outbound email and verification codes
//!
//! Sends 6-digit codes over SMTP and tracks their lifecycle in the
//! `email_codes` table. Codes are single-use, expire after a configurable
//! TTL, and are invalidated after too many failed attempts.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::EmailCode;

/// Maximum failed verification attempts before a code is burned
const MAX_CODE_ATTEMPTS: i32 = 5;

/// Purpose tag for registration codes
pub const PURPOSE_REGISTRATION: &str = "registration";
/// Purpose tag for email-change codes
pub const PURPOSE_EMAIL_CHANGE: &str = "email_change";

/// SMTP-backed email sender
#[derive(Clone)]
pub struct EmailService {
    transport: Option<SmtpTransport>,
    from: String,
}

impl EmailService {
    /// Build from SMTP settings; with no host configured, codes are logged
    /// instead of sent (development mode).
    pub fn new(
        host: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
        from: &str,
    ) -> Result<Self> {
        let transport = match host {
            Some(host) => {
                let mut builder =
                    SmtpTransport::relay(host).context("Failed to configure SMTP relay")?;
                if let (Some(user), Some(pass)) = (username, password) {
                    builder =
                        builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
                }
                Some(builder.build())
            }
            None => None,
        };

        Ok(Self {
            transport,
            from: from.to_string(),
        })
    }

    /// Send a plain-text email
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let Some(transport) = self.transport.clone() else {
            tracing::info!(to = %to, subject = %subject, body = %body, "SMTP not configured, logging email");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.parse().context("Invalid from address")?)
            .to(to.parse().context("Invalid recipient address")?)
            .subject(subject)
            .body(body.to_string())
            .context("Failed to build email")?;

        // SmtpTransport is blocking; keep it off the async executor
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("Email send task failed")?
            .context("SMTP send failed")?;

        Ok(())
    }
}

/// Generate a 6-digit verification code
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

/// Issue a verification code for an email/purpose pair and send it.
///
/// Any previously issued unused codes for the same pair are invalidated so
/// only the latest code can succeed.
pub async fn issue_code(
    pool: &PgPool,
    email_service: &EmailService,
    email: &str,
    purpose: &str,
    ttl_seconds: i64,
) -> Result<i64> {
    let code = generate_code();
    let expires_at = Utc::now() + Duration::seconds(ttl_seconds);

    sqlx::query("UPDATE email_codes SET used = TRUE WHERE email = $1 AND purpose = $2 AND used = FALSE")
        .bind(email)
        .bind(purpose)
        .execute(pool)
        .await
        .context("Failed to invalidate previous codes")?;

    sqlx::query(
        r#"
        INSERT INTO email_codes (id, email, code, purpose, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(&code)
    .bind(purpose)
    .bind(expires_at)
    .execute(pool)
    .await
    .context("Failed to store verification code")?;

    let subject = match purpose {
        PURPOSE_EMAIL_CHANGE => "Confirm your new email address",
        _ => "Your verification code",
    };
    let body = format!(
        "Your verification code is {}. It expires in {} minutes.",
        code,
        ttl_seconds / 60
    );
    email_service.send(email, subject, &body).await?;

    Ok(ttl_seconds)
}

/// Errors surfaced by code verification
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("No verification code found, request a new one")]
    NotFound,

    #[error("Verification code expired")]
    Expired,

    #[error("Incorrect verification code")]
    Mismatch,

    #[error("Too many failed attempts, request a new code")]
    TooManyAttempts,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Verify and consume a code for an email/purpose pair
pub async fn verify_code(
    pool: &PgPool,
    email: &str,
    purpose: &str,
    code: &str,
) -> Result<(), CodeError> {
    let record: Option<EmailCode> = sqlx::query_as(
        r#"
        SELECT id, email, code, purpose, expires_at, used, attempts, created_at
        FROM email_codes
        WHERE email = $1 AND purpose = $2 AND used = FALSE
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(email)
    .bind(purpose)
    .fetch_optional(pool)
    .await
    .context("Failed to load verification code")?;

    let record = record.ok_or(CodeError::NotFound)?;

    if record.expires_at < Utc::now() {
        return Err(CodeError::Expired);
    }

    if record.attempts >= MAX_CODE_ATTEMPTS {
        return Err(CodeError::TooManyAttempts);
    }

    if record.code != code {
        sqlx::query("UPDATE email_codes SET attempts = attempts + 1 WHERE id = $1")
            .bind(record.id)
            .execute(pool)
            .await
            .context("Failed to record failed attempt")?;

        if record.attempts + 1 >= MAX_CODE_ATTEMPTS {
            return Err(CodeError::TooManyAttempts);
        }
        return Err(CodeError::Mismatch);
    }

    sqlx::query("UPDATE email_codes SET used = TRUE WHERE id = $1")
        .bind(record.id)
        .execute(pool)
        .await
        .context("Failed to consume verification code")?;

    Ok(())
}

/// Delete expired codes (called from the background sweeper)
pub async fn purge_expired_codes(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM email_codes WHERE expires_at < NOW() - INTERVAL '1 day'")
        .execute(pool)
        .await
        .context("Failed to purge expired codes")?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_email_service_without_transport() {
        let service = EmailService::new(None, None, None, "no-reply@example.com").unwrap();
        assert!(service.transport.is_none());
    }
}
