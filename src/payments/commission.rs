//! Commission computation for user-listed resources
//!
//! At settlement the best-matching active rule is applied: percentage rules
//! take a cut of the order amount, fixed rules a flat fee. The computed
//! commission is recorded per order and marked paid once settled.

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CommissionKind, CommissionRecord, CommissionRule};

/// Commission service
pub struct CommissionService {
    db_pool: PgPool,
}

impl CommissionService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Find the applicable rule for an order amount (newest active rule whose
    /// amount bounds match), if any
    pub async fn applicable_rule(&self, order_amount: Decimal) -> Result<Option<CommissionRule>> {
        sqlx::query_as(
            r#"
            SELECT * FROM commission_rules
            WHERE active = TRUE
              AND (min_amount IS NULL OR $1 >= min_amount)
              AND (max_amount IS NULL OR $1 <= max_amount)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(order_amount)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to load commission rule")
    }

    /// Compute the commission a rule takes from an order amount.
    ///
    /// The result is clamped to the order amount so a fixed fee can never
    /// exceed what the order brought in.
    pub fn compute(rule: &CommissionRule, order_amount: Decimal) -> Decimal {
        let raw = match rule.kind {
            CommissionKind::Percentage => order_amount * rule.rate / Decimal::from(100),
            CommissionKind::Fixed => rule.rate,
        };
        raw.clamp(Decimal::ZERO, order_amount)
    }

    /// Compute and record the commission for an order; returns None when no
    /// rule applies
    pub async fn charge(
        &self,
        order_id: Uuid,
        seller_id: Uuid,
        order_amount: Decimal,
    ) -> Result<Option<CommissionRecord>> {
        let Some(rule) = self.applicable_rule(order_amount).await? else {
            return Ok(None);
        };

        let commission_amount = Self::compute(&rule, order_amount);

        let record: CommissionRecord = sqlx::query_as(
            r#"
            INSERT INTO commission_records (
                id, order_id, seller_id, rule_id, order_amount,
                commission_amount, commission_rate, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(seller_id)
        .bind(rule.id)
        .bind(order_amount)
        .bind(commission_amount)
        .bind(rule.rate)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to record commission")?;

        tracing::info!(
            order_id = %order_id,
            amount = %commission_amount,
            "Commission charged"
        );
        Ok(Some(record))
    }

    /// Mark a commission record as paid
    pub async fn mark_paid(&self, commission_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE commission_records SET status = 'paid', paid_at = NOW() WHERE id = $1",
        )
        .bind(commission_id)
        .execute(&self.db_pool)
        .await
        .context("Failed to mark commission paid")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Commission record not found"));
        }
        Ok(())
    }

    /// Cancel the commission for a refunded order
    pub async fn cancel_for_order(&self, order_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE commission_records SET status = 'cancelled' WHERE order_id = $1")
            .bind(order_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to cancel commission")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(kind: CommissionKind, rate: Decimal) -> CommissionRule {
        CommissionRule {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            kind,
            rate,
            min_amount: None,
            max_amount: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_commission() {
        let r = rule(CommissionKind::Percentage, Decimal::from(10));
        assert_eq!(
            CommissionService::compute(&r, Decimal::from(50)),
            Decimal::from(5)
        );
    }

    #[test]
    fn test_fixed_commission() {
        let r = rule(CommissionKind::Fixed, Decimal::new(250, 2));
        assert_eq!(
            CommissionService::compute(&r, Decimal::from(50)),
            Decimal::new(250, 2)
        );
    }

    #[test]
    fn test_fixed_commission_clamped_to_order_amount() {
        let r = rule(CommissionKind::Fixed, Decimal::from(10));
        assert_eq!(
            CommissionService::compute(&r, Decimal::from(3)),
            Decimal::from(3)
        );
    }

    #[test]
    fn test_zero_order_amount() {
        let r = rule(CommissionKind::Percentage, Decimal::from(10));
        assert_eq!(
            CommissionService::compute(&r, Decimal::ZERO),
            Decimal::ZERO
        );
    }
}
