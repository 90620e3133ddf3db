//! Payment service - checkout rails, verification, and settlement
//!
//! Three rails: account balance (settled inline), PayPal (provider-hosted
//! checkout), and USDT on TRON/Ethereum (address + QR, explorer-verified).
//! Completion settles proceeds: platform resources to the system account,
//! user resources to the seller's balance minus commission.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    CreatePayoutAccountRequest, Order, OrderStatus, Paginated, PayOrderRequest, PayOrderResponse,
    PaymentMethodInfo, PaymentQrResponse, PaymentTransaction, PayoutAccount, ResourceProvider,
    TransactionResponse, TransactionStatus, VerifyPaymentResponse,
};
use crate::orders::{OrderError, OrderService};
use crate::settings::SettingsService;

use super::chain::ChainClient;
use super::commission::CommissionService;
use super::paypal::PaypalClient;
use super::provider::{PaymentCheck, PaymentProvider};

/// Method ids accepted at checkout
pub const METHOD_BALANCE: &str = "balance";
pub const METHOD_PAYPAL: &str = "paypal";
pub const METHOD_USDT_TRON: &str = "usdt_tron";
pub const METHOD_USDT_ETH: &str = "usdt_eth";

/// Errors that need distinct HTTP mappings at the handler layer
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment not found")]
    NotFound,

    #[error("Payment method not available: {0}")]
    MethodUnavailable(String),

    #[error("Amount outside the limits of this payment method")]
    AmountOutOfRange,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Payment service
pub struct PaymentService {
    db_pool: PgPool,
    http: Client,
    settings: Arc<SettingsService>,
    orders: Arc<OrderService>,
    commission: CommissionService,
}

impl PaymentService {
    pub fn new(
        db_pool: PgPool,
        settings: Arc<SettingsService>,
        orders: Arc<OrderService>,
    ) -> Self {
        let commission = CommissionService::new(db_pool.clone());
        Self {
            db_pool,
            http: Client::new(),
            settings,
            orders,
            commission,
        }
    }

    // ------------------------------------------------------------------
    // Checkout methods
    // ------------------------------------------------------------------

    /// Payment methods offered at checkout, with per-method limits pulled
    /// from the provider configuration. Methods whose provider is not
    /// configured are omitted.
    pub async fn methods(&self) -> Result<Vec<PaymentMethodInfo>> {
        let entries = self.settings.active_payment_methods().await?;
        let mut methods = Vec::new();

        for entry in entries {
            let limits = match entry.method_id.as_str() {
                METHOD_BALANCE => Some((None, None, None)),
                METHOD_PAYPAL => self.settings.paypal().await?.filter(|c| c.active).map(|c| {
                    (
                        Some(c.min_amount),
                        Some(c.max_amount),
                        Some(c.fee_rate),
                    )
                }),
                METHOD_USDT_TRON => self
                    .settings
                    .chain("tron")
                    .await?
                    .filter(|c| c.active)
                    .map(|c| (Some(c.min_amount), Some(c.max_amount), Some(c.fee_rate))),
                METHOD_USDT_ETH => self
                    .settings
                    .chain("ethereum")
                    .await?
                    .filter(|c| c.active)
                    .map(|c| (Some(c.min_amount), Some(c.max_amount), Some(c.fee_rate))),
                _ => None,
            };

            let Some((min_amount, max_amount, fee_rate)) = limits else {
                continue;
            };

            methods.push(PaymentMethodInfo {
                id: entry.method_id,
                name: entry.method_name,
                icon: entry.icon_url,
                enabled: entry.active,
                min_amount,
                max_amount,
                fee_rate,
                description: entry.description,
            });
        }

        Ok(methods)
    }

    // ------------------------------------------------------------------
    // Paying an order
    // ------------------------------------------------------------------

    /// Start payment on a pending order
    pub async fn pay(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        request: PayOrderRequest,
    ) -> Result<PayOrderResponse, PaymentError> {
        let order = self.orders.get(order_id, Some(user_id)).await?;
        self.orders.ensure_payable(&order).await?;

        self.check_amount_limits(&request.payment_method, order.amount)
            .await?;

        match request.payment_method.as_str() {
            METHOD_BALANCE => self.pay_with_balance(&order).await,
            METHOD_PAYPAL => {
                let client = self.paypal_client().await?;
                self.pay_with_provider(&order, &client, &request).await
            }
            METHOD_USDT_TRON => {
                let client = self.chain_client("tron").await?;
                self.pay_with_provider(&order, &client, &request).await
            }
            METHOD_USDT_ETH => {
                let client = self.chain_client("ethereum").await?;
                self.pay_with_provider(&order, &client, &request).await
            }
            other => Err(PaymentError::MethodUnavailable(other.to_string())),
        }
    }

    /// Balance checkout: atomic debit, then immediate settlement
    async fn pay_with_balance(&self, order: &Order) -> Result<PayOrderResponse, PaymentError> {
        let provider_ref = format!("bal_{}", Uuid::new_v4().simple());

        let mut tx = self
            .db_pool
            .begin()
            .await
            .context("Failed to open transaction")?;

        // Debit only if the balance covers the order; zero rows means it didn't
        let debit = sqlx::query(
            "UPDATE users SET balance = balance - $1, updated_at = NOW() WHERE id = $2 AND balance >= $1",
        )
        .bind(order.amount)
        .bind(order.user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to debit balance")?;

        if debit.rows_affected() == 0 {
            return Err(PaymentError::InsufficientBalance);
        }

        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, order_id, user_id, payment_method, provider, provider_ref,
                amount, currency, status, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'USD', 'completed', NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(order.user_id)
        .bind(METHOD_BALANCE)
        .bind(METHOD_BALANCE)
        .bind(&provider_ref)
        .bind(order.amount)
        .execute(&mut *tx)
        .await
        .context("Failed to record balance transaction")?;

        tx.commit().await.context("Failed to commit debit")?;

        self.orders
            .attach_payment(order.id, METHOD_BALANCE, &provider_ref)
            .await?;
        let order = self.orders.transition(order.id, OrderStatus::Paid).await?;
        self.settle(&order).await?;
        self.orders
            .transition(order.id, OrderStatus::Completed)
            .await?;

        Ok(PayOrderResponse {
            payment_ref: provider_ref,
            status: TransactionStatus::Completed,
            payment_url: None,
            pay_to_address: None,
            qr_code: None,
            expires_at: order.expires_at,
        })
    }

    /// Provider checkout: create the payment, record the pending transaction
    async fn pay_with_provider(
        &self,
        order: &Order,
        provider: &dyn PaymentProvider,
        request: &PayOrderRequest,
    ) -> Result<PayOrderResponse, PaymentError> {
        let initiation = provider
            .create_payment(
                order.id,
                order.amount,
                "USD",
                request.return_url.as_deref(),
                request.cancel_url.as_deref(),
            )
            .await?;

        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, order_id, user_id, payment_method, provider, provider_ref,
                amount, currency, status
            )
            VALUES ($1, $2, $3, $4, $4, $5, $6, 'USD', $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(order.user_id)
        .bind(&request.payment_method)
        .bind(&initiation.provider_ref)
        .bind(order.amount)
        .bind(initiation.status)
        .execute(&self.db_pool)
        .await
        .context("Failed to record transaction")?;

        self.orders
            .attach_payment(order.id, &request.payment_method, &initiation.provider_ref)
            .await?;

        Ok(PayOrderResponse {
            payment_ref: initiation.provider_ref,
            status: initiation.status,
            payment_url: initiation.payment_url,
            pay_to_address: initiation.pay_to_address,
            qr_code: initiation.qr_code,
            expires_at: order.expires_at,
        })
    }

    // ------------------------------------------------------------------
    // Verification and completion
    // ------------------------------------------------------------------

    /// Check a payment with its provider and complete the order when it has
    /// landed. Safe to call repeatedly; completed transactions short-circuit.
    pub async fn verify(&self, payment_ref: &str) -> Result<VerifyPaymentResponse, PaymentError> {
        let transaction = self
            .transaction_by_ref(payment_ref)
            .await?
            .ok_or(PaymentError::NotFound)?;

        if transaction.status == TransactionStatus::Completed {
            let order = self.orders.get(transaction.order_id, None).await?;
            return Ok(VerifyPaymentResponse {
                status: TransactionStatus::Completed,
                order_id: order.id,
                order_status: order.status,
            });
        }

        let check = match transaction.payment_method.as_str() {
            METHOD_PAYPAL => {
                let client = self.paypal_client().await?;
                client
                    .check_payment(&transaction.provider_ref, transaction.amount)
                    .await?
            }
            METHOD_USDT_TRON => {
                let client = self.chain_client("tron").await?;
                client
                    .check_payment(&transaction.provider_ref, transaction.amount)
                    .await?
            }
            METHOD_USDT_ETH => {
                let client = self.chain_client("ethereum").await?;
                client
                    .check_payment(&transaction.provider_ref, transaction.amount)
                    .await?
            }
            other => return Err(PaymentError::MethodUnavailable(other.to_string())),
        };

        let order = match check.status {
            TransactionStatus::Completed => self.complete_payment(&transaction, &check).await?,
            status => {
                if status != transaction.status {
                    self.update_transaction_status(transaction.id, status, None)
                        .await?;
                }
                self.orders.get(transaction.order_id, None).await?
            }
        };

        Ok(VerifyPaymentResponse {
            status: check.status,
            order_id: order.id,
            order_status: order.status,
        })
    }

    /// Complete a landed payment: transaction, order transitions, settlement
    async fn complete_payment(
        &self,
        transaction: &PaymentTransaction,
        check: &PaymentCheck,
    ) -> Result<Order, PaymentError> {
        let order = self.orders.get(transaction.order_id, None).await?;

        // Settlement must run exactly once; a completed order means another
        // caller (poll vs webhook) already did it. An order in any other
        // terminal state (expired-then-cancelled, refunded) must not settle
        // even if the funds eventually land.
        let order = match order.status {
            OrderStatus::Completed => return Ok(order),
            OrderStatus::Pending => self.orders.transition(order.id, OrderStatus::Paid).await?,
            OrderStatus::Paid => order,
            other => {
                tracing::warn!(
                    order_id = %order.id,
                    status = ?other,
                    "Payment landed on a non-payable order"
                );
                return Err(PaymentError::Order(OrderError::InvalidTransition(
                    format!("{:?}", other).to_lowercase(),
                    "completed".to_string(),
                )));
            }
        };

        self.update_transaction_status(
            transaction.id,
            TransactionStatus::Completed,
            check.external_ref.as_deref(),
        )
        .await?;

        self.settle(&order).await?;
        let order = self
            .orders
            .transition(order.id, OrderStatus::Completed)
            .await?;

        tracing::info!(order_id = %order.id, "Payment completed");
        Ok(order)
    }

    /// Route the proceeds of a paid order
    async fn settle(&self, order: &Order) -> Result<()> {
        let resource: Option<(Uuid, ResourceProvider)> =
            sqlx::query_as("SELECT owner_id, provider FROM resources WHERE id = $1")
                .bind(order.resource_id)
                .fetch_optional(&self.db_pool)
                .await
                .context("Failed to load resource for settlement")?;

        let Some((owner_id, provider)) = resource else {
            // Resource deleted between purchase and settlement: proceeds stay
            // with the platform
            self.log_receipt(order.id, "system", "platform", order.amount, "orphaned order")
                .await?;
            return Ok(());
        };

        match provider {
            ResourceProvider::Platform => {
                self.log_receipt(
                    order.id,
                    "system",
                    "platform",
                    order.amount,
                    "platform resource sale",
                )
                .await?;
            }
            ResourceProvider::User => {
                let record = self
                    .commission
                    .charge(order.id, owner_id, order.amount)
                    .await?;

                let commission_amount = record
                    .as_ref()
                    .map(|r| r.commission_amount)
                    .unwrap_or(Decimal::ZERO);
                let seller_amount = order.amount - commission_amount;

                if seller_amount > Decimal::ZERO {
                    sqlx::query(
                        "UPDATE users SET balance = balance + $1, updated_at = NOW() WHERE id = $2",
                    )
                    .bind(seller_amount)
                    .bind(owner_id)
                    .execute(&self.db_pool)
                    .await
                    .context("Failed to credit seller")?;

                    self.log_receipt(
                        order.id,
                        "seller",
                        &owner_id.to_string(),
                        seller_amount,
                        "sale proceeds after commission",
                    )
                    .await?;
                }

                if commission_amount > Decimal::ZERO {
                    self.log_receipt(
                        order.id,
                        "commission",
                        "platform",
                        commission_amount,
                        "commission on user resource sale",
                    )
                    .await?;
                }

                if let Some(record) = record {
                    self.commission.mark_paid(record.id).await?;
                }
            }
        }

        Ok(())
    }

    /// Mark a payment as failed (denied by the provider) and fail the order
    pub async fn fail_payment(&self, payment_ref: &str) -> Result<(), PaymentError> {
        let transaction = self
            .transaction_by_ref(payment_ref)
            .await?
            .ok_or(PaymentError::NotFound)?;

        if transaction.status == TransactionStatus::Completed {
            // A landed payment cannot be failed after the fact
            return Ok(());
        }

        self.update_transaction_status(transaction.id, TransactionStatus::Failed, None)
            .await?;

        let order = self.orders.get(transaction.order_id, None).await?;
        if order.status == OrderStatus::Pending {
            self.orders.transition(order.id, OrderStatus::Failed).await?;
        }

        tracing::warn!(payment_ref = %payment_ref, "Payment failed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Refunds
    // ------------------------------------------------------------------

    /// Admin refund: reverse settlement and credit the buyer's balance
    pub async fn refund(&self, order_id: Uuid) -> Result<Order, PaymentError> {
        let order = self.orders.get(order_id, None).await?;

        if !matches!(order.status, OrderStatus::Paid | OrderStatus::Completed) {
            return Err(PaymentError::Order(OrderError::InvalidTransition(
                format!("{:?}", order.status).to_lowercase(),
                "refunded".to_string(),
            )));
        }

        // Claw back the seller's share if this sale was settled to a user
        let resource: Option<(Uuid, ResourceProvider)> =
            sqlx::query_as("SELECT owner_id, provider FROM resources WHERE id = $1")
                .bind(order.resource_id)
                .fetch_optional(&self.db_pool)
                .await
                .context("Failed to load resource for refund")?;

        if let Some((owner_id, ResourceProvider::User)) = resource {
            let seller_share: Option<(Decimal,)> = sqlx::query_as(
                r#"
                SELECT amount FROM receipt_logs
                WHERE order_id = $1 AND recipient = 'seller'
                ORDER BY created_at DESC
                LIMIT 1
                "#,
            )
            .bind(order.id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to load settlement receipt")?;

            if let Some((share,)) = seller_share {
                sqlx::query(
                    "UPDATE users SET balance = balance - $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(share)
                .bind(owner_id)
                .execute(&self.db_pool)
                .await
                .context("Failed to claw back seller share")?;
            }

            self.commission.cancel_for_order(order.id).await?;
        }

        // Refund the buyer to their balance
        sqlx::query("UPDATE users SET balance = balance + $1, updated_at = NOW() WHERE id = $2")
            .bind(order.amount)
            .bind(order.user_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to credit buyer refund")?;

        sqlx::query(
            "UPDATE payment_transactions SET status = 'refunded', updated_at = NOW() WHERE order_id = $1",
        )
        .bind(order.id)
        .execute(&self.db_pool)
        .await
        .context("Failed to mark transaction refunded")?;

        self.log_receipt(
            order.id,
            "buyer",
            &order.user_id.to_string(),
            order.amount,
            "refund to balance",
        )
        .await?;

        let order = self
            .orders
            .transition(order.id, OrderStatus::Refunded)
            .await?;

        tracing::info!(order_id = %order.id, "Order refunded");
        Ok(order)
    }

    // ------------------------------------------------------------------
    // QR re-issue for pending on-chain orders
    // ------------------------------------------------------------------

    /// Rebuild the QR payload for a pending USDT order
    pub async fn qr_for_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<PaymentQrResponse, PaymentError> {
        let order = self.orders.get(order_id, Some(user_id)).await?;
        self.orders.ensure_payable(&order).await?;

        let method = order.payment_method.as_deref().unwrap_or_default();
        let network = match method {
            METHOD_USDT_TRON => "tron",
            METHOD_USDT_ETH => "ethereum",
            _ => {
                return Err(PaymentError::MethodUnavailable(
                    "QR codes are only available for USDT orders".to_string(),
                ))
            }
        };

        let address = order
            .payment_ref
            .clone()
            .ok_or_else(|| anyhow!("Order has no assigned receiving address"))?;

        let client = self.chain_client(network).await?;
        let initiation = client
            .create_payment(order.id, order.amount, "USD", None, None)
            .await?;

        // Address derivation is stable per order, so the rebuilt QR matches
        // the one issued at checkout
        debug_assert_eq!(initiation.provider_ref, address);

        Ok(PaymentQrResponse {
            order_id: order.id,
            pay_to_address: address,
            amount: order.amount,
            qr_code: initiation.qr_code.unwrap_or_default(),
            expires_at: order.expires_at,
        })
    }

    // ------------------------------------------------------------------
    // Transaction history
    // ------------------------------------------------------------------

    /// One user's transactions, newest first
    pub async fn transactions_for_user(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Paginated<TransactionResponse>> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let rows: Vec<PaymentTransaction> = sqlx::query_as(
            r#"
            SELECT * FROM payment_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to list transactions")?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM payment_transactions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.db_pool)
                .await
                .context("Failed to count transactions")?;

        let items = rows.into_iter().map(TransactionResponse::from).collect();
        Ok(Paginated::new(items, total, page, page_size))
    }

    // ------------------------------------------------------------------
    // Payout accounts
    // ------------------------------------------------------------------

    /// Register a payout account; the first account per method becomes the
    /// default
    pub async fn create_payout_account(
        &self,
        user_id: Uuid,
        request: CreatePayoutAccountRequest,
    ) -> Result<PayoutAccount> {
        let (existing,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM payout_accounts WHERE user_id = $1 AND payment_method = $2 AND active = TRUE",
        )
        .bind(user_id)
        .bind(&request.payment_method)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to count payout accounts")?;

        let account: PayoutAccount = sqlx::query_as(
            r#"
            INSERT INTO payout_accounts (
                id, user_id, payment_method, account_address, account_name, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&request.payment_method)
        .bind(&request.account_address)
        .bind(&request.account_name)
        .bind(existing == 0)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to create payout account")?;

        Ok(account)
    }

    /// Active payout accounts for a user
    pub async fn payout_accounts(&self, user_id: Uuid) -> Result<Vec<PayoutAccount>> {
        sqlx::query_as(
            r#"
            SELECT * FROM payout_accounts
            WHERE user_id = $1 AND active = TRUE
            ORDER BY payment_method, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to list payout accounts")
    }

    /// Make one account the default for its method
    pub async fn set_default_payout_account(
        &self,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<PayoutAccount, PaymentError> {
        let account: PayoutAccount = sqlx::query_as(
            "SELECT * FROM payout_accounts WHERE id = $1 AND user_id = $2 AND active = TRUE",
        )
        .bind(account_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to load payout account")?
        .ok_or(PaymentError::NotFound)?;

        let mut tx = self
            .db_pool
            .begin()
            .await
            .context("Failed to open transaction")?;

        sqlx::query(
            "UPDATE payout_accounts SET is_default = FALSE WHERE user_id = $1 AND payment_method = $2",
        )
        .bind(user_id)
        .bind(&account.payment_method)
        .execute(&mut *tx)
        .await
        .context("Failed to clear previous default")?;

        let account: PayoutAccount = sqlx::query_as(
            "UPDATE payout_accounts SET is_default = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to set default")?;

        tx.commit().await.context("Failed to commit default change")?;
        Ok(account)
    }

    /// Deactivate a payout account
    pub async fn delete_payout_account(
        &self,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<(), PaymentError> {
        let result = sqlx::query(
            "UPDATE payout_accounts SET active = FALSE, is_default = FALSE, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(account_id)
        .bind(user_id)
        .execute(&self.db_pool)
        .await
        .context("Failed to deactivate payout account")?;

        if result.rows_affected() == 0 {
            return Err(PaymentError::NotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn check_amount_limits(
        &self,
        method: &str,
        amount: Decimal,
    ) -> Result<(), PaymentError> {
        let limits = match method {
            METHOD_PAYPAL => self
                .settings
                .paypal()
                .await?
                .map(|c| (c.min_amount, c.max_amount)),
            METHOD_USDT_TRON => self
                .settings
                .chain("tron")
                .await?
                .map(|c| (c.min_amount, c.max_amount)),
            METHOD_USDT_ETH => self
                .settings
                .chain("ethereum")
                .await?
                .map(|c| (c.min_amount, c.max_amount)),
            _ => None,
        };

        if let Some((min, max)) = limits {
            if amount < min || amount > max {
                return Err(PaymentError::AmountOutOfRange);
            }
        }
        Ok(())
    }

    async fn paypal_client(&self) -> Result<PaypalClient, PaymentError> {
        let settings = self
            .settings
            .paypal()
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| PaymentError::MethodUnavailable(METHOD_PAYPAL.to_string()))?;

        let secret = self.settings.paypal_client_secret(&settings)?;
        Ok(PaypalClient::new(self.http.clone(), &settings, secret))
    }

    async fn chain_client(&self, network: &str) -> Result<ChainClient, PaymentError> {
        let settings = self
            .settings
            .chain(network)
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| PaymentError::MethodUnavailable(format!("usdt_{}", network)))?;

        let api_key = self.settings.chain_api_key(&settings)?;
        Ok(ChainClient::new(self.http.clone(), &settings, api_key)?)
    }

    /// Transaction lookup by provider reference
    pub async fn transaction_by_ref(
        &self,
        provider_ref: &str,
    ) -> Result<Option<PaymentTransaction>> {
        sqlx::query_as(
            r#"
            SELECT * FROM payment_transactions
            WHERE provider_ref = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(provider_ref)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to load transaction")
    }

    async fn update_transaction_status(
        &self,
        transaction_id: Uuid,
        status: TransactionStatus,
        external_ref: Option<&str>,
    ) -> Result<()> {
        let gateway_response =
            external_ref.map(|r| serde_json::json!({ "external_ref": r }));
        let completed = matches!(status, TransactionStatus::Completed);

        sqlx::query(
            r#"
            UPDATE payment_transactions
            SET status = $1,
                gateway_response = COALESCE($2, gateway_response),
                completed_at = CASE WHEN $3 THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(status)
        .bind(gateway_response)
        .bind(completed)
        .bind(transaction_id)
        .execute(&self.db_pool)
        .await
        .context("Failed to update transaction status")?;

        Ok(())
    }

    /// Append a settlement audit row
    async fn log_receipt(
        &self,
        order_id: Uuid,
        recipient: &str,
        account: &str,
        amount: Decimal,
        detail: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO receipt_logs (id, order_id, recipient, account, amount, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(recipient)
        .bind(account)
        .bind(amount)
        .bind(detail)
        .execute(&self.db_pool)
        .await
        .context("Failed to log receipt")?;
        Ok(())
    }
}
