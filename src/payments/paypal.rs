//! PayPal checkout client
//!
//! Talks to the PayPal Orders v2 API: client-credentials token, order
//! creation with an approval link, and status lookup for verification.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PaypalSettings, TransactionStatus};

use super::provider::{PaymentCheck, PaymentInitiation, PaymentProvider};

const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
const LIVE_BASE_URL: &str = "https://api-m.paypal.com";

/// PayPal API client, built per request from the current settings
pub struct PaypalClient {
    http: Client,
    client_id: String,
    client_secret: String,
    base_url: String,
    return_url: String,
    cancel_url: String,
    brand_name: String,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct CreateOrderBody {
    intent: String,
    purchase_units: Vec<PurchaseUnit>,
    application_context: ApplicationContext,
}

#[derive(Serialize)]
struct PurchaseUnit {
    amount: Amount,
    description: String,
}

#[derive(Serialize)]
struct Amount {
    currency_code: String,
    value: String,
}

#[derive(Serialize)]
struct ApplicationContext {
    return_url: String,
    cancel_url: String,
    brand_name: String,
    user_action: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnitResponse>,
}

#[derive(Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Deserialize, Default)]
struct PurchaseUnitResponse {
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Deserialize)]
struct Capture {
    id: String,
}

impl PaypalClient {
    /// Build a client from settings and the decrypted secret
    pub fn new(http: Client, settings: &PaypalSettings, client_secret: String) -> Self {
        let base_url = if settings.sandbox {
            SANDBOX_BASE_URL.to_string()
        } else {
            LIVE_BASE_URL.to_string()
        };

        Self {
            http,
            client_id: settings.client_id.clone(),
            client_secret,
            base_url,
            return_url: settings.return_url.clone(),
            cancel_url: settings.cancel_url.clone(),
            brand_name: settings.brand_name.clone(),
        }
    }

    async fn access_token(&self) -> Result<String> {
        let auth = general_purpose::STANDARD
            .encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .header("Authorization", format!("Basic {}", auth))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .context("PayPal token request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("PayPal token request returned {}", response.status()));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .context("PayPal token response parse failed")?;

        Ok(token.access_token)
    }

    fn map_status(status: &str) -> TransactionStatus {
        match status {
            "COMPLETED" => TransactionStatus::Completed,
            "APPROVED" => TransactionStatus::Processing,
            "CREATED" | "SAVED" | "PAYER_ACTION_REQUIRED" => TransactionStatus::Pending,
            "VOIDED" => TransactionStatus::Cancelled,
            _ => TransactionStatus::Pending,
        }
    }
}

#[async_trait]
impl PaymentProvider for PaypalClient {
    async fn create_payment(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
        return_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> Result<PaymentInitiation> {
        let token = self.access_token().await?;

        let body = CreateOrderBody {
            intent: "CAPTURE".to_string(),
            purchase_units: vec![PurchaseUnit {
                amount: Amount {
                    currency_code: currency.to_string(),
                    value: amount.to_string(),
                },
                description: format!("Order {}", order_id),
            }],
            application_context: ApplicationContext {
                return_url: return_url.unwrap_or(&self.return_url).to_string(),
                cancel_url: cancel_url.unwrap_or(&self.cancel_url).to_string(),
                brand_name: self.brand_name.clone(),
                user_action: "PAY_NOW".to_string(),
            },
        };

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .json(&body)
            .send()
            .await
            .context("PayPal order creation failed")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "PayPal order creation returned {}",
                response.status()
            ));
        }

        let order: OrderResponse = response
            .json()
            .await
            .context("PayPal order response parse failed")?;

        let payment_url = order
            .links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.clone());

        Ok(PaymentInitiation {
            provider_ref: order.id,
            payment_url,
            pay_to_address: None,
            qr_code: None,
            status: Self::map_status(&order.status),
        })
    }

    async fn check_payment(&self, provider_ref: &str, _amount: Decimal) -> Result<PaymentCheck> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(format!(
                "{}/v2/checkout/orders/{}",
                self.base_url, provider_ref
            ))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .context("PayPal order lookup failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("PayPal order lookup returned {}", response.status()));
        }

        let order: OrderResponse = response
            .json()
            .await
            .context("PayPal order response parse failed")?;

        let capture_id = order
            .purchase_units
            .iter()
            .filter_map(|u| u.payments.as_ref())
            .flat_map(|p| p.captures.iter())
            .next()
            .map(|c| c.id.clone());

        Ok(PaymentCheck {
            status: Self::map_status(&order.status),
            external_ref: capture_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PaypalClient::map_status("COMPLETED"),
            TransactionStatus::Completed
        );
        assert_eq!(
            PaypalClient::map_status("APPROVED"),
            TransactionStatus::Processing
        );
        assert_eq!(
            PaypalClient::map_status("CREATED"),
            TransactionStatus::Pending
        );
        assert_eq!(
            PaypalClient::map_status("VOIDED"),
            TransactionStatus::Cancelled
        );
        assert_eq!(
            PaypalClient::map_status("something-else"),
            TransactionStatus::Pending
        );
    }
}
