//! Payment provider webhook handlers
//!
//! Both endpoints are unauthenticated but signature-verified with the shared
//! webhook secret (HMAC-SHA256 over the raw body, hex-encoded, optionally
//! prefixed with "sha256="). Notifications only trigger a provider-side
//! re-check; the explorer/API remains the source of truth.

use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::ApiError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Verify an HMAC-SHA256 webhook signature
fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    let provided = signature.strip_prefix("sha256=").unwrap_or(signature);
    expected.eq_ignore_ascii_case(provided)
}

fn require_signature(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), ApiError> {
    let Some(secret) = state.config.webhook_secret.as_deref() else {
        // Without a configured secret, webhooks are refused outright
        return Err(ApiError::ServiceUnavailable(
            "Webhook secret not configured".to_string(),
        ));
    };

    let signature = headers
        .get("x-webhook-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing webhook signature".to_string()))?;

    if !verify_signature(secret, body, signature) {
        return Err(ApiError::Unauthorized("Invalid webhook signature".to_string()));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct PaypalEvent {
    event_type: String,
    #[serde(default)]
    resource: Option<PaypalEventResource>,
}

#[derive(Debug, Deserialize)]
struct PaypalEventResource {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    supplementary_data: Option<PaypalSupplementaryData>,
}

#[derive(Debug, Deserialize)]
struct PaypalSupplementaryData {
    #[serde(default)]
    related_ids: Option<PaypalRelatedIds>,
}

#[derive(Debug, Deserialize)]
struct PaypalRelatedIds {
    #[serde(default)]
    order_id: Option<String>,
}

/// POST /api/webhooks/paypal - PayPal event notification
pub async fn paypal_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_signature(&state, &headers, &body)?;

    let event: PaypalEvent = serde_json::from_slice(&body)?;

    // The checkout order id is our payment reference; captures carry it in
    // supplementary data
    let payment_ref = event
        .resource
        .as_ref()
        .and_then(|r| {
            r.supplementary_data
                .as_ref()
                .and_then(|s| s.related_ids.as_ref())
                .and_then(|ids| ids.order_id.clone())
                .or_else(|| r.id.clone())
        })
        .ok_or_else(|| ApiError::BadRequest("Event carries no order reference".to_string()))?;

    tracing::info!(event_type = %event.event_type, payment_ref = %payment_ref, "PayPal webhook received");

    match event.event_type.as_str() {
        "PAYMENT.CAPTURE.COMPLETED" | "CHECKOUT.ORDER.APPROVED" => {
            state.payment_service.verify(&payment_ref).await?;
        }
        "PAYMENT.CAPTURE.DENIED" => {
            state.payment_service.fail_payment(&payment_ref).await?;
        }
        other => {
            tracing::debug!(event_type = %other, "Unhandled PayPal webhook event");
        }
    }

    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
struct ChainNotification {
    txid: String,
    to: String,
    #[allow(dead_code)]
    #[serde(default)]
    confirmations: i64,
}

/// POST /api/webhooks/blockchain - Chain watcher notification
pub async fn blockchain_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_signature(&state, &headers, &body)?;

    let notification: ChainNotification = serde_json::from_slice(&body)?;

    tracing::info!(
        txid = %notification.txid,
        to = %notification.to,
        "Blockchain webhook received"
    );

    // The receiving address is the payment reference for on-chain orders;
    // verification re-checks the explorer rather than trusting the caller
    state.payment_service.verify(&notification.to).await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_roundtrip() {
        let secret = "webhook-secret";
        let body = br#"{"event_type":"PAYMENT.CAPTURE.COMPLETED"}"#;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(verify_signature(secret, body, &signature));
        assert!(verify_signature(
            secret,
            body,
            &format!("sha256={}", signature)
        ));
        assert!(!verify_signature(secret, body, "sha256=deadbeef"));
        assert!(!verify_signature("other-secret", body, &signature));
    }

    #[test]
    fn test_paypal_event_parsing() {
        let body = r#"{
            "event_type": "PAYMENT.CAPTURE.COMPLETED",
            "resource": {
                "id": "CAPTURE123",
                "supplementary_data": {"related_ids": {"order_id": "ORDER456"}}
            }
        }"#;
        let event: PaypalEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.event_type, "PAYMENT.CAPTURE.COMPLETED");
        let order_id = event
            .resource
            .unwrap()
            .supplementary_data
            .unwrap()
            .related_ids
            .unwrap()
            .order_id
            .unwrap();
        assert_eq!(order_id, "ORDER456");
    }
}
