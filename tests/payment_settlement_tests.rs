//! Balance payment and settlement tests against a real database

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use std::sync::Arc;
    use uuid::Uuid;

    use tradepost_server::models::{CreateOrderRequest, OrderStatus, PayOrderRequest};
    use tradepost_server::orders::OrderService;
    use tradepost_server::payments::{PaymentError, PaymentService, METHOD_BALANCE};
    use tradepost_server::settings::{CredentialCipher, SettingsService};

    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/tradepost_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    fn build_services(pool: &PgPool) -> (Arc<OrderService>, PaymentService) {
        let orders = Arc::new(OrderService::new(pool.clone(), 30));
        let settings = Arc::new(SettingsService::new(
            pool.clone(),
            CredentialCipher::new("test-credential-key"),
        ));
        let payments = PaymentService::new(pool.clone(), settings, orders.clone());
        (orders, payments)
    }

    async fn create_user_with_balance(pool: &PgPool, balance: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, username, balance)
            VALUES ($1, $2, '$2b$12$test', 'pay-tester', $3)
            "#,
        )
        .bind(id)
        .bind(format!("pay-{}@test.local", id.simple()))
        .bind(balance)
        .execute(pool)
        .await
        .expect("Failed to insert test user");
        id
    }

    async fn create_platform_resource(pool: &PgPool, owner: Uuid, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO resources (
                id, owner_id, title, description, file_name, storage_name,
                file_size, price, status, provider
            )
            VALUES ($1, $2, 'Paid resource', 'desc', 'file.zip', $3, 42, $4, 'approved', 'platform')
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(format!("{}.zip", Uuid::new_v4()))
        .bind(price)
        .execute(pool)
        .await
        .expect("Failed to insert test resource");
        id
    }

    async fn balance_of(pool: &PgPool, user: Uuid) -> Decimal {
        let (balance,): (Decimal,) = sqlx::query_as("SELECT balance FROM users WHERE id = $1")
            .bind(user)
            .fetch_one(pool)
            .await
            .unwrap();
        balance
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_balance_payment_completes_order() {
        let pool = setup_test_db().await;
        let (orders, payments) = build_services(&pool);

        let platform_admin = create_user_with_balance(&pool, Decimal::ZERO).await;
        let buyer = create_user_with_balance(&pool, Decimal::from(100)).await;
        let resource = create_platform_resource(&pool, platform_admin, Decimal::from(30)).await;

        let order = orders
            .create(
                buyer,
                CreateOrderRequest {
                    resource_id: resource,
                    payment_method: Some(METHOD_BALANCE.to_string()),
                },
            )
            .await
            .unwrap();

        let response = payments
            .pay(
                order.id,
                buyer,
                PayOrderRequest {
                    payment_method: METHOD_BALANCE.to_string(),
                    return_url: None,
                    cancel_url: None,
                },
            )
            .await
            .expect("Balance payment should succeed");

        assert!(response.payment_ref.starts_with("bal_"));

        let reloaded = orders.get(order.id, None).await.unwrap();
        assert_eq!(reloaded.status, OrderStatus::Completed);
        assert_eq!(balance_of(&pool, buyer).await, Decimal::from(70));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_insufficient_balance_leaves_order_payable() {
        let pool = setup_test_db().await;
        let (orders, payments) = build_services(&pool);

        let platform_admin = create_user_with_balance(&pool, Decimal::ZERO).await;
        let buyer = create_user_with_balance(&pool, Decimal::from(5)).await;
        let resource = create_platform_resource(&pool, platform_admin, Decimal::from(30)).await;

        let order = orders
            .create(
                buyer,
                CreateOrderRequest {
                    resource_id: resource,
                    payment_method: Some(METHOD_BALANCE.to_string()),
                },
            )
            .await
            .unwrap();

        let result = payments
            .pay(
                order.id,
                buyer,
                PayOrderRequest {
                    payment_method: METHOD_BALANCE.to_string(),
                    return_url: None,
                    cancel_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(PaymentError::InsufficientBalance)));

        // Nothing was debited and the order can still be paid another way
        assert_eq!(balance_of(&pool, buyer).await, Decimal::from(5));
        let reloaded = orders.get(order.id, None).await.unwrap();
        assert_eq!(reloaded.status, OrderStatus::Pending);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_refund_restores_buyer_balance() {
        let pool = setup_test_db().await;
        let (orders, payments) = build_services(&pool);

        let platform_admin = create_user_with_balance(&pool, Decimal::ZERO).await;
        let buyer = create_user_with_balance(&pool, Decimal::from(50)).await;
        let resource = create_platform_resource(&pool, platform_admin, Decimal::from(20)).await;

        let order = orders
            .create(
                buyer,
                CreateOrderRequest {
                    resource_id: resource,
                    payment_method: Some(METHOD_BALANCE.to_string()),
                },
            )
            .await
            .unwrap();

        payments
            .pay(
                order.id,
                buyer,
                PayOrderRequest {
                    payment_method: METHOD_BALANCE.to_string(),
                    return_url: None,
                    cancel_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(balance_of(&pool, buyer).await, Decimal::from(30));

        let refunded = payments.refund(order.id).await.unwrap();
        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert_eq!(balance_of(&pool, buyer).await, Decimal::from(50));

        // A refunded order cannot be refunded again
        assert!(payments.refund(order.id).await.is_err());
    }
}
