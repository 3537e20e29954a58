// src/db/subscription_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::subscription::{PlanId, Subscription},
};

#[derive(Clone, Default)]
pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find<'e, E>(&self, executor: E, user_id: &str) -> Result<Option<Subscription>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subscription = sqlx::query_as::<_, Subscription>(
            "SELECT plan, status, start_date, end_date, payment_id
             FROM subscriptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(subscription)
    }

    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        subscription: &Subscription,
    ) -> Result<Subscription, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, plan, status, start_date, end_date, payment_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id)
            DO UPDATE SET
                plan = EXCLUDED.plan,
                status = EXCLUDED.status,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                payment_id = EXCLUDED.payment_id,
                updated_at = NOW()
            RETURNING plan, status, start_date, end_date, payment_id
            "#,
        )
        .bind(user_id)
        .bind(subscription.plan)
        .bind(subscription.status)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(&subscription.payment_id)
        .fetch_one(executor)
        .await?;

        Ok(saved)
    }

    /// Registra o pagamento no livro-razão. `false` = já tinha sido aplicado.
    pub async fn record_payment<'e, E>(
        &self,
        executor: E,
        payment_id: &str,
        user_id: &str,
        plan: PlanId,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "INSERT INTO subscription_payments (payment_id, user_id, plan)
             VALUES ($1, $2, $3)
             ON CONFLICT (payment_id) DO NOTHING",
        )
        .bind(payment_id)
        .bind(user_id)
        .bind(plan)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
