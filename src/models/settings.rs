//! Marketplace configuration models
//!
//! Admin-edited payment provider credentials and the public site
//! configuration the portal loads before login. Provider secrets are stored
//! encrypted; the decrypted value never appears in API responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

/// PayPal gateway configuration
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct PaypalSettings {
    pub id: i32,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret_encrypted: String,
    pub sandbox: bool,
    pub webhook_id: Option<String>,
    pub return_url: String,
    pub cancel_url: String,
    pub brand_name: String,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub fee_rate: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-network USDT configuration
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ChainSettings {
    pub id: i32,
    pub network: String,
    pub network_name: String,
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_key_encrypted: Option<String>,
    pub usdt_contract: String,
    pub receiving_addresses: Vec<String>,
    pub min_confirmations: i32,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub fee_rate: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Checkout method catalog entry
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct PaymentMethodEntry {
    pub id: i32,
    pub method_id: String,
    pub method_name: String,
    pub icon_url: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key/value site configuration row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct SiteSetting {
    pub id: i32,
    pub config_key: String,
    pub config_value: String,
    pub public: bool,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog category
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub sort_order: i32,
}

/// Catalog tag
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Admin update of the PayPal gateway
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaypalSettingsRequest {
    #[validate(length(min = 1))]
    pub client_id: String,
    /// Plaintext secret; encrypted before storage. Omit to keep the current one.
    pub client_secret: Option<String>,
    pub sandbox: bool,
    pub webhook_id: Option<String>,
    #[validate(url)]
    pub return_url: String,
    #[validate(url)]
    pub cancel_url: String,
    #[validate(length(min = 1, max = 64))]
    pub brand_name: String,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub fee_rate: Decimal,
    pub active: bool,
}

/// Admin update of one blockchain network
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChainSettingsRequest {
    #[validate(length(min = 1, max = 64))]
    pub network_name: String,
    #[validate(url)]
    pub api_url: String,
    /// Plaintext API key; encrypted before storage. Omit to keep the current one.
    pub api_key: Option<String>,
    #[validate(length(min = 1))]
    pub usdt_contract: String,
    #[validate(length(min = 1))]
    pub receiving_addresses: Vec<String>,
    #[validate(range(min = 1, max = 64))]
    pub min_confirmations: i32,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub fee_rate: Decimal,
    pub active: bool,
}

/// Admin update of a checkout method entry
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaymentMethodRequest {
    #[validate(length(min = 1, max = 64))]
    pub method_name: String,
    pub icon_url: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

/// Admin update of a site setting
#[derive(Debug, Deserialize)]
pub struct UpdateSiteSettingsRequest {
    pub settings: Vec<SiteSettingUpdate>,
}

#[derive(Debug, Deserialize)]
pub struct SiteSettingUpdate {
    pub config_key: String,
    pub config_value: String,
}

/// Public configuration blob served to the portal
#[derive(Debug, Serialize)]
pub struct PublicConfigResponse {
    pub settings: serde_json::Map<String, serde_json::Value>,
}
