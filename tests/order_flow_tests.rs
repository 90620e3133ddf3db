//! Order lifecycle tests against a real database

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use uuid::Uuid;

    use tradepost_server::models::{CreateOrderRequest, OrderListQuery, OrderStatus};
    use tradepost_server::orders::{OrderError, OrderService};

    /// Helper to create a test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/tradepost_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    /// Insert a user and return its id
    async fn create_test_user(pool: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, username)
            VALUES ($1, $2, '$2b$12$test', 'order-tester')
            "#,
        )
        .bind(id)
        .bind(format!("order-{}@test.local", id.simple()))
        .execute(pool)
        .await
        .expect("Failed to insert test user");
        id
    }

    /// Insert an approved resource and return its id
    async fn create_test_resource(pool: &PgPool, owner_id: Uuid, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO resources (
                id, owner_id, title, description, file_name, storage_name,
                file_size, price, status, provider
            )
            VALUES ($1, $2, 'Test resource', 'desc', 'file.zip', $3, 42, $4, 'approved', 'platform')
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(format!("{}.zip", Uuid::new_v4()))
        .bind(price)
        .execute(pool)
        .await
        .expect("Failed to insert test resource");
        id
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_order_creation_snapshots_price() {
        let pool = setup_test_db().await;
        let service = OrderService::new(pool.clone(), 30);

        let seller = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let resource = create_test_resource(&pool, seller, Decimal::new(995, 2)).await;

        let order = service
            .create(
                buyer,
                CreateOrderRequest {
                    resource_id: resource,
                    payment_method: None,
                },
            )
            .await
            .expect("Order creation should succeed");

        assert_eq!(order.amount, Decimal::new(995, 2));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.resource_title, "Test resource");
        assert!(order.expires_at > chrono::Utc::now());
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_duplicate_pending_order_rejected() {
        let pool = setup_test_db().await;
        let service = OrderService::new(pool.clone(), 30);

        let seller = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let resource = create_test_resource(&pool, seller, Decimal::from(5)).await;

        let request = || CreateOrderRequest {
            resource_id: resource,
            payment_method: None,
        };

        service
            .create(buyer, request())
            .await
            .expect("First order should succeed");

        let second = service.create(buyer, request()).await;
        assert!(matches!(second, Err(OrderError::DuplicatePending)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_cancel_and_list() {
        let pool = setup_test_db().await;
        let service = OrderService::new(pool.clone(), 30);

        let seller = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let resource = create_test_resource(&pool, seller, Decimal::from(5)).await;

        let order = service
            .create(
                buyer,
                CreateOrderRequest {
                    resource_id: resource,
                    payment_method: None,
                },
            )
            .await
            .unwrap();

        service
            .cancel(order.id, buyer)
            .await
            .expect("Cancel of a pending order should succeed");

        // Cancelling twice must fail the transition guard
        let again = service.cancel(order.id, buyer).await;
        assert!(matches!(again, Err(OrderError::InvalidTransition(_, _))));

        let page = service
            .list_for_user(
                buyer,
                &OrderListQuery {
                    status: Some(OrderStatus::Cancelled),
                    start_date: None,
                    end_date: None,
                    page: None,
                    page_size: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, order.id);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_foreign_order_is_hidden() {
        let pool = setup_test_db().await;
        let service = OrderService::new(pool.clone(), 30);

        let seller = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let stranger = create_test_user(&pool).await;
        let resource = create_test_resource(&pool, seller, Decimal::from(5)).await;

        let order = service
            .create(
                buyer,
                CreateOrderRequest {
                    resource_id: resource,
                    payment_method: None,
                },
            )
            .await
            .unwrap();

        let result = service.get(order.id, Some(stranger)).await;
        assert!(matches!(result, Err(OrderError::Forbidden)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_expired_orders_are_swept() {
        let pool = setup_test_db().await;
        // TTL of zero minutes: the order is born expired
        let service = OrderService::new(pool.clone(), 0);

        let seller = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let resource = create_test_resource(&pool, seller, Decimal::from(5)).await;

        let order = service
            .create(
                buyer,
                CreateOrderRequest {
                    resource_id: resource,
                    payment_method: None,
                },
            )
            .await
            .unwrap();

        let swept = service.cancel_expired().await.unwrap();
        assert!(swept >= 1);

        let reloaded = service.get(order.id, None).await.unwrap();
        assert_eq!(reloaded.status, OrderStatus::Cancelled);
    }
}
