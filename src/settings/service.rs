//! Marketplace configuration service
//!
//! Reads and writes the admin-edited payment configuration and the public
//! site configuration. Provider secrets are encrypted before they reach the
//! database and only decrypted for provider clients, never for API output.

use anyhow::{anyhow, Context, Result};
use sqlx::PgPool;

use crate::models::{
    Category, ChainSettings, PaymentMethodEntry, PaypalSettings, PublicConfigResponse, SiteSetting,
    Tag, UpdateChainSettingsRequest, UpdatePaymentMethodRequest, UpdatePaypalSettingsRequest,
    UpdateSiteSettingsRequest,
};

use super::crypto::CredentialCipher;

/// Configuration service
pub struct SettingsService {
    db_pool: PgPool,
    cipher: CredentialCipher,
}

impl SettingsService {
    pub fn new(db_pool: PgPool, cipher: CredentialCipher) -> Self {
        Self { db_pool, cipher }
    }

    // ------------------------------------------------------------------
    // PayPal
    // ------------------------------------------------------------------

    /// Load the PayPal gateway configuration, if any
    pub async fn paypal(&self) -> Result<Option<PaypalSettings>> {
        sqlx::query_as("SELECT * FROM paypal_settings ORDER BY id LIMIT 1")
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load PayPal settings")
    }

    /// Decrypted PayPal client secret for the provider client
    pub fn paypal_client_secret(&self, settings: &PaypalSettings) -> Result<String> {
        self.cipher
            .decrypt(&settings.client_secret_encrypted)
            .map_err(|e| anyhow!("Failed to decrypt PayPal secret: {}", e))
    }

    /// Admin update of the PayPal gateway (upsert)
    pub async fn update_paypal(
        &self,
        request: UpdatePaypalSettingsRequest,
    ) -> Result<PaypalSettings> {
        let secret_encrypted = match request.client_secret {
            Some(secret) => self
                .cipher
                .encrypt(&secret)
                .map_err(|e| anyhow!("Failed to encrypt PayPal secret: {}", e))?,
            None => self
                .paypal()
                .await?
                .map(|s| s.client_secret_encrypted)
                .ok_or_else(|| anyhow!("client_secret is required on first configuration"))?,
        };

        let settings: PaypalSettings = sqlx::query_as(
            r#"
            INSERT INTO paypal_settings (
                id, client_id, client_secret_encrypted, sandbox, webhook_id,
                return_url, cancel_url, brand_name, min_amount, max_amount, fee_rate, active
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                client_id = EXCLUDED.client_id,
                client_secret_encrypted = EXCLUDED.client_secret_encrypted,
                sandbox = EXCLUDED.sandbox,
                webhook_id = EXCLUDED.webhook_id,
                return_url = EXCLUDED.return_url,
                cancel_url = EXCLUDED.cancel_url,
                brand_name = EXCLUDED.brand_name,
                min_amount = EXCLUDED.min_amount,
                max_amount = EXCLUDED.max_amount,
                fee_rate = EXCLUDED.fee_rate,
                active = EXCLUDED.active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&request.client_id)
        .bind(&secret_encrypted)
        .bind(request.sandbox)
        .bind(&request.webhook_id)
        .bind(&request.return_url)
        .bind(&request.cancel_url)
        .bind(&request.brand_name)
        .bind(request.min_amount)
        .bind(request.max_amount)
        .bind(request.fee_rate)
        .bind(request.active)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to update PayPal settings")?;

        tracing::info!("PayPal settings updated");
        Ok(settings)
    }

    // ------------------------------------------------------------------
    // Blockchain networks
    // ------------------------------------------------------------------

    /// Load one network's USDT configuration
    pub async fn chain(&self, network: &str) -> Result<Option<ChainSettings>> {
        sqlx::query_as("SELECT * FROM chain_settings WHERE network = $1")
            .bind(network)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load chain settings")
    }

    /// All configured networks
    pub async fn chains(&self) -> Result<Vec<ChainSettings>> {
        sqlx::query_as("SELECT * FROM chain_settings ORDER BY network")
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list chain settings")
    }

    /// Decrypted explorer API key for the provider client
    pub fn chain_api_key(&self, settings: &ChainSettings) -> Result<Option<String>> {
        settings
            .api_key_encrypted
            .as_deref()
            .map(|enc| {
                self.cipher
                    .decrypt(enc)
                    .map_err(|e| anyhow!("Failed to decrypt chain API key: {}", e))
            })
            .transpose()
    }

    /// Admin update of one network (upsert)
    pub async fn update_chain(
        &self,
        network: &str,
        request: UpdateChainSettingsRequest,
    ) -> Result<ChainSettings> {
        if !matches!(network, "tron" | "ethereum") {
            return Err(anyhow!("Unsupported network: {}", network));
        }

        let api_key_encrypted = match request.api_key {
            Some(key) => Some(
                self.cipher
                    .encrypt(&key)
                    .map_err(|e| anyhow!("Failed to encrypt chain API key: {}", e))?,
            ),
            None => self
                .chain(network)
                .await?
                .and_then(|s| s.api_key_encrypted),
        };

        let settings: ChainSettings = sqlx::query_as(
            r#"
            INSERT INTO chain_settings (
                network, network_name, api_url, api_key_encrypted, usdt_contract,
                receiving_addresses, min_confirmations, min_amount, max_amount, fee_rate, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (network) DO UPDATE SET
                network_name = EXCLUDED.network_name,
                api_url = EXCLUDED.api_url,
                api_key_encrypted = EXCLUDED.api_key_encrypted,
                usdt_contract = EXCLUDED.usdt_contract,
                receiving_addresses = EXCLUDED.receiving_addresses,
                min_confirmations = EXCLUDED.min_confirmations,
                min_amount = EXCLUDED.min_amount,
                max_amount = EXCLUDED.max_amount,
                fee_rate = EXCLUDED.fee_rate,
                active = EXCLUDED.active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(network)
        .bind(&request.network_name)
        .bind(&request.api_url)
        .bind(&api_key_encrypted)
        .bind(&request.usdt_contract)
        .bind(&request.receiving_addresses)
        .bind(request.min_confirmations)
        .bind(request.min_amount)
        .bind(request.max_amount)
        .bind(request.fee_rate)
        .bind(request.active)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to update chain settings")?;

        tracing::info!(network = %network, "Chain settings updated");
        Ok(settings)
    }

    // ------------------------------------------------------------------
    // Payment method catalog
    // ------------------------------------------------------------------

    /// All catalog entries, active or not (admin view)
    pub async fn payment_methods(&self) -> Result<Vec<PaymentMethodEntry>> {
        sqlx::query_as("SELECT * FROM payment_methods ORDER BY sort_order, method_id")
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list payment methods")
    }

    /// Active catalog entries in display order
    pub async fn active_payment_methods(&self) -> Result<Vec<PaymentMethodEntry>> {
        sqlx::query_as(
            "SELECT * FROM payment_methods WHERE active = TRUE ORDER BY sort_order, method_id",
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to list active payment methods")
    }

    /// Admin update of one catalog entry
    pub async fn update_payment_method(
        &self,
        method_id: &str,
        request: UpdatePaymentMethodRequest,
    ) -> Result<PaymentMethodEntry> {
        let entry: Option<PaymentMethodEntry> = sqlx::query_as(
            r#"
            UPDATE payment_methods
            SET method_name = $1, icon_url = $2, description = $3,
                sort_order = $4, active = $5, updated_at = NOW()
            WHERE method_id = $6
            RETURNING *
            "#,
        )
        .bind(&request.method_name)
        .bind(&request.icon_url)
        .bind(&request.description)
        .bind(request.sort_order)
        .bind(request.active)
        .bind(method_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to update payment method")?;

        entry.ok_or_else(|| anyhow!("Unknown payment method: {}", method_id))
    }

    // ------------------------------------------------------------------
    // Site configuration
    // ------------------------------------------------------------------

    /// All site settings (admin view)
    pub async fn site_settings(&self) -> Result<Vec<SiteSetting>> {
        sqlx::query_as("SELECT * FROM site_settings ORDER BY config_key")
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list site settings")
    }

    /// Batch update of site settings
    pub async fn update_site_settings(&self, request: UpdateSiteSettingsRequest) -> Result<()> {
        for update in request.settings {
            sqlx::query(
                r#"
                UPDATE site_settings
                SET config_value = $1, updated_at = NOW()
                WHERE config_key = $2
                "#,
            )
            .bind(&update.config_value)
            .bind(&update.config_key)
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("Failed to update setting {}", update.config_key))?;
        }
        Ok(())
    }

    /// Public configuration blob for the portal
    pub async fn public_config(&self) -> Result<PublicConfigResponse> {
        let rows: Vec<SiteSetting> =
            sqlx::query_as("SELECT * FROM site_settings WHERE public = TRUE ORDER BY config_key")
                .fetch_all(&self.db_pool)
                .await
                .context("Failed to load public settings")?;

        let mut settings = serde_json::Map::new();
        for row in rows {
            settings.insert(
                row.config_key,
                serde_json::Value::String(row.config_value),
            );
        }

        Ok(PublicConfigResponse { settings })
    }

    /// Category catalog
    pub async fn categories(&self) -> Result<Vec<Category>> {
        sqlx::query_as("SELECT * FROM categories ORDER BY sort_order, name")
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list categories")
    }

    /// Tag catalog
    pub async fn tags(&self) -> Result<Vec<Tag>> {
        sqlx::query_as("SELECT * FROM tags ORDER BY name")
            .fetch_all(&self.db_pool)
            .await
            .context("Failed to list tags")
    }
}
