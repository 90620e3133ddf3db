//! Payment provider abstraction
//!
//! A provider knows how to start a payment for an order and how to check
//! whether it has landed. Balance payments are settled inline by the payment
//! service and never go through this trait.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::TransactionStatus;

/// Result of starting a payment with a provider
#[derive(Debug, Clone)]
pub struct PaymentInitiation {
    /// Provider-side reference (PayPal order id, receiving address)
    pub provider_ref: String,
    /// Redirect target for provider-hosted checkout
    pub payment_url: Option<String>,
    /// Receiving address for on-chain payments
    pub pay_to_address: Option<String>,
    /// SVG QR data URL for on-chain payments
    pub qr_code: Option<String>,
    pub status: TransactionStatus,
}

/// Result of checking a payment with a provider
#[derive(Debug, Clone)]
pub struct PaymentCheck {
    pub status: TransactionStatus,
    /// Final provider-side transaction id once known (capture id, tx hash)
    pub external_ref: Option<String>,
}

/// Provider-side payment operations
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Start a payment for an order
    async fn create_payment(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
        return_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> anyhow::Result<PaymentInitiation>;

    /// Check whether a previously started payment has completed
    async fn check_payment(
        &self,
        provider_ref: &str,
        amount: Decimal,
    ) -> anyhow::Result<PaymentCheck>;
}
