//! Payment, settlement, and payout models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::OrderStatus;

/// A payment-provider-level record of funds movement tied to an order
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub payment_method: String,
    pub provider: String,
    /// Identifier assigned by the provider (PayPal order id, chain tx hash,
    /// or an internally generated reference for balance payments)
    pub provider_ref: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub gateway_response: Option<serde_json::Value>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction status as reported by the provider
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

/// A payment rail offered at checkout
#[derive(Debug, Serialize)]
pub struct PaymentMethodInfo {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub enabled: bool,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub fee_rate: Option<Decimal>,
    pub description: Option<String>,
}

/// Seller payout destination (PayPal email or USDT address)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct PayoutAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_method: String,
    pub account_address: String,
    pub account_name: Option<String>,
    pub is_default: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Commission rule applied at settlement
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct CommissionRule {
    pub id: Uuid,
    pub name: String,
    pub kind: CommissionKind,
    pub rate: Decimal,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a commission rule computes its cut
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "commission_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommissionKind {
    Percentage,
    Fixed,
}

/// Commission charged against one settled order
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct CommissionRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub seller_id: Uuid,
    pub rule_id: Uuid,
    pub order_amount: Decimal,
    pub commission_amount: Decimal,
    pub commission_rate: Decimal,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Start payment on a pending order
#[derive(Debug, Deserialize)]
pub struct PayOrderRequest {
    pub payment_method: String,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
}

/// Result of starting a payment
#[derive(Debug, Serialize)]
pub struct PayOrderResponse {
    pub payment_ref: String,
    pub status: TransactionStatus,
    /// Redirect target for provider-hosted checkout (PayPal)
    pub payment_url: Option<String>,
    /// Receiving address for on-chain payments
    pub pay_to_address: Option<String>,
    /// SVG QR data URL for on-chain payments
    pub qr_code: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Result of verifying a payment
#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: TransactionStatus,
    pub order_id: Uuid,
    pub order_status: OrderStatus,
}

/// QR payload for a pending on-chain order
#[derive(Debug, Serialize)]
pub struct PaymentQrResponse {
    pub order_id: Uuid,
    pub pay_to_address: String,
    pub amount: Decimal,
    pub qr_code: String,
    pub expires_at: DateTime<Utc>,
}

/// Register a payout account
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePayoutAccountRequest {
    #[validate(length(min = 1, max = 32))]
    pub payment_method: String,
    #[validate(length(min = 3, max = 128))]
    pub account_address: String,
    #[validate(length(max = 64))]
    pub account_name: Option<String>,
}

/// Transaction history entry rendered for clients
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub payment_method: String,
    pub provider: String,
    pub provider_ref: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentTransaction> for TransactionResponse {
    fn from(t: PaymentTransaction) -> Self {
        Self {
            id: t.id,
            order_id: t.order_id,
            payment_method: t.payment_method,
            provider: t.provider,
            provider_ref: t.provider_ref,
            amount: t.amount,
            currency: t.currency,
            status: t.status,
            completed_at: t.completed_at,
            created_at: t.created_at,
        }
    }
}
