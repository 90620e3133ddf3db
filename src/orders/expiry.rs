//! Background sweeper for expired pending orders
//!
//! Expiry is enforced server-side: even if a client never polls again, a
//! pending order past its deadline gets cancelled here. Runs forever; spawned
//! from main.

use std::sync::Arc;
use std::time::Duration;

use super::OrderService;
use crate::email;

/// Sweep interval
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Periodically cancel expired pending orders and purge stale email codes
pub async fn expiry_sweeper(order_service: Arc<OrderService>, pool: sqlx::PgPool) {
    let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

    loop {
        interval.tick().await;

        match order_service.cancel_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::info!(count = n, "Cancelled expired orders"),
            Err(e) => tracing::error!(error = %e, "Expired order sweep failed"),
        }

        if let Err(e) = email::purge_expired_codes(&pool).await {
            tracing::error!(error = %e, "Email code purge failed");
        }
    }
}
