//! USDT payment client for TRON and Ethereum
//!
//! Assigns a receiving address per order, renders a payment-URI QR code, and
//! verifies transfers through the network's explorer API against a
//! minimum-confirmation threshold.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use qrcode::render::svg;
use qrcode::QrCode;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{ChainSettings, TransactionStatus};

use super::provider::{PaymentCheck, PaymentInitiation, PaymentProvider};

/// USDT token decimals on both supported networks
const USDT_DECIMALS: u32 = 6;

/// Explorer-backed USDT client for one network
pub struct ChainClient {
    http: Client,
    network: String,
    api_url: String,
    api_key: Option<String>,
    usdt_contract: String,
    receiving_addresses: Vec<String>,
    min_confirmations: i64,
}

#[derive(Deserialize)]
struct TronTransferPage {
    success: bool,
    #[serde(default)]
    data: Vec<TronTransfer>,
}

#[derive(Deserialize)]
struct TronTransfer {
    #[serde(alias = "transaction_id")]
    txid: String,
    from: String,
    to: String,
    value: String,
    #[serde(default)]
    confirmations: i64,
}

#[derive(Deserialize)]
struct EthTransferPage {
    status: String,
    #[serde(default)]
    result: Vec<EthTransfer>,
}

#[derive(Deserialize)]
struct EthTransfer {
    hash: String,
    from: String,
    to: String,
    value: String,
    confirmations: String,
}

impl ChainClient {
    /// Build a client from settings and the decrypted API key
    pub fn new(http: Client, settings: &ChainSettings, api_key: Option<String>) -> Result<Self> {
        if settings.receiving_addresses.is_empty() {
            return Err(anyhow!(
                "No receiving addresses configured for {}",
                settings.network
            ));
        }

        Ok(Self {
            http,
            network: settings.network.clone(),
            api_url: settings.api_url.clone(),
            api_key,
            usdt_contract: settings.usdt_contract.clone(),
            receiving_addresses: settings.receiving_addresses.clone(),
            min_confirmations: settings.min_confirmations as i64,
        })
    }

    /// Pick the receiving address for an order.
    ///
    /// Derived from the order id so repeated payment attempts for the same
    /// order always land on the same address.
    fn address_for(&self, order_id: Uuid) -> &str {
        let index = (order_id.as_u128() % self.receiving_addresses.len() as u128) as usize;
        &self.receiving_addresses[index]
    }

    /// Payment URI embedded in the QR code
    fn payment_uri(&self, address: &str, amount: Decimal) -> Result<String> {
        match self.network.as_str() {
            "tron" => Ok(format!("tron:{}?amount={}", address, amount)),
            "ethereum" => Ok(format!("ethereum:{}@1?value={}", address, amount)),
            other => Err(anyhow!("Unsupported network: {}", other)),
        }
    }

    /// Render an SVG QR code as a data URL
    fn qr_data_url(uri: &str) -> Result<String> {
        let code = QrCode::new(uri).context("Failed to build QR code")?;
        let rendered = code
            .render::<svg::Color>()
            .min_dimensions(200, 200)
            .build();
        Ok(format!(
            "data:image/svg+xml;base64,{}",
            general_purpose::STANDARD.encode(rendered.as_bytes())
        ))
    }

    async fn find_tron_transfer(&self, address: &str, amount: Decimal) -> Result<Option<String>> {
        let url = format!(
            "{}/v1/accounts/{}/transactions/trc20?contract_address={}&limit=20",
            self.api_url, address, self.usdt_contract
        );

        let mut request = self.http.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("TRON-PRO-API-KEY", key);
        }

        let page: TronTransferPage = request
            .send()
            .await
            .context("TRON explorer request failed")?
            .json()
            .await
            .context("TRON explorer response parse failed")?;

        if !page.success {
            return Ok(None);
        }

        for tx in page.data {
            let tx_amount = Decimal::from_str_exact(&tx.value)
                .unwrap_or(Decimal::ZERO)
                / Decimal::from(10u64.pow(USDT_DECIMALS));

            if tx.to.eq_ignore_ascii_case(address)
                && tx_amount == amount
                && tx.confirmations >= self.min_confirmations
            {
                tracing::debug!(txid = %tx.txid, from = %tx.from, "Matched TRON transfer");
                return Ok(Some(tx.txid));
            }
        }

        Ok(None)
    }

    async fn find_eth_transfer(&self, address: &str, amount: Decimal) -> Result<Option<String>> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let url = format!(
            "{}?module=account&action=tokentx&contractaddress={}&address={}&page=1&offset=20&sort=desc&apikey={}",
            self.api_url, self.usdt_contract, address, api_key
        );

        let page: EthTransferPage = self
            .http
            .get(&url)
            .send()
            .await
            .context("Ethereum explorer request failed")?
            .json()
            .await
            .context("Ethereum explorer response parse failed")?;

        if page.status != "1" {
            return Ok(None);
        }

        for tx in page.result {
            let tx_amount = Decimal::from_str_exact(&tx.value)
                .unwrap_or(Decimal::ZERO)
                / Decimal::from(10u64.pow(USDT_DECIMALS));

            let confirmations = tx.confirmations.parse::<i64>().unwrap_or(0);

            if tx.to.eq_ignore_ascii_case(address)
                && tx_amount == amount
                && confirmations >= self.min_confirmations
            {
                tracing::debug!(txid = %tx.hash, from = %tx.from, "Matched Ethereum transfer");
                return Ok(Some(tx.hash));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl PaymentProvider for ChainClient {
    async fn create_payment(
        &self,
        order_id: Uuid,
        amount: Decimal,
        _currency: &str,
        _return_url: Option<&str>,
        _cancel_url: Option<&str>,
    ) -> Result<PaymentInitiation> {
        let address = self.address_for(order_id).to_string();
        let uri = self.payment_uri(&address, amount)?;
        let qr_code = Self::qr_data_url(&uri)?;

        Ok(PaymentInitiation {
            provider_ref: address.clone(),
            payment_url: None,
            pay_to_address: Some(address),
            qr_code: Some(qr_code),
            status: TransactionStatus::Pending,
        })
    }

    async fn check_payment(&self, provider_ref: &str, amount: Decimal) -> Result<PaymentCheck> {
        let found = match self.network.as_str() {
            "tron" => self.find_tron_transfer(provider_ref, amount).await?,
            "ethereum" => self.find_eth_transfer(provider_ref, amount).await?,
            other => return Err(anyhow!("Unsupported network: {}", other)),
        };

        Ok(match found {
            Some(txid) => PaymentCheck {
                status: TransactionStatus::Completed,
                external_ref: Some(txid),
            },
            None => PaymentCheck {
                status: TransactionStatus::Pending,
                external_ref: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_settings(addresses: Vec<String>) -> ChainSettings {
        ChainSettings {
            id: 1,
            network: "tron".to_string(),
            network_name: "TRON".to_string(),
            api_url: "https://api.trongrid.io".to_string(),
            api_key_encrypted: None,
            usdt_contract: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".to_string(),
            receiving_addresses: addresses,
            min_confirmations: 19,
            min_amount: Decimal::ONE,
            max_amount: Decimal::from(10_000),
            fee_rate: Decimal::ZERO,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rejects_empty_address_pool() {
        let settings = test_settings(vec![]);
        assert!(ChainClient::new(Client::new(), &settings, None).is_err());
    }

    #[test]
    fn test_address_assignment_is_stable() {
        let settings = test_settings(vec!["TAddrA".to_string(), "TAddrB".to_string()]);
        let client = ChainClient::new(Client::new(), &settings, None).unwrap();

        let order_id = Uuid::new_v4();
        let first = client.address_for(order_id).to_string();
        let second = client.address_for(order_id).to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn test_payment_uri_formats() {
        let settings = test_settings(vec!["TAddrA".to_string()]);
        let client = ChainClient::new(Client::new(), &settings, None).unwrap();

        let uri = client.payment_uri("TAddrA", Decimal::new(995, 2)).unwrap();
        assert_eq!(uri, "tron:TAddrA?amount=9.95");
    }

    #[test]
    fn test_qr_data_url_shape() {
        let url = ChainClient::qr_data_url("tron:TAddrA?amount=1").unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }
}
