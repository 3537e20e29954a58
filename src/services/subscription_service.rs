// src/services/subscription_service.rs

use chrono::Utc;
use sqlx::{Acquire, Postgres};

use crate::{
    common::error::AppError,
    db::{ProfileRepository, SubscriptionRepository},
    models::subscription::{PlanId, Subscription},
};

/// Resultado de uma ativação: repetir o mesmo pagamento não reaplica nada.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    Activated(Subscription),
    AlreadyProcessed,
}

#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: SubscriptionRepository,
    profile_repo: ProfileRepository,
}

impl SubscriptionService {
    pub fn new(subscription_repo: SubscriptionRepository, profile_repo: ProfileRepository) -> Self {
        Self {
            subscription_repo,
            profile_repo,
        }
    }

    pub async fn get_subscription<'e, A>(&self, db: A, user_id: &str) -> Result<Subscription, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = db.acquire().await?;

        let profile = self
            .profile_repo
            .find_by_id(&mut *conn, user_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let subscription = self
            .subscription_repo
            .find(&mut *conn, user_id)
            .await?
            .unwrap_or_else(|| Subscription::initial(profile.created_at));

        Ok(subscription)
    }

    /// Ativa o plano pago. Idempotente por id de pagamento (livro-razão na mesma transação).
    pub async fn activate<'e, A>(
        &self,
        db: A,
        user_id: &str,
        plan: PlanId,
        payment_id: &str,
    ) -> Result<ActivationOutcome, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        if !plan.is_purchasable() {
            return Err(AppError::InvalidPlan);
        }

        let mut tx = db.begin().await?;

        if !self.profile_repo.exists(&mut *tx, user_id).await? {
            return Err(AppError::ProfileNotFound);
        }

        let first_time = self
            .subscription_repo
            .record_payment(&mut *tx, payment_id, user_id, plan)
            .await?;

        if !first_time {
            tx.rollback().await?;
            tracing::info!("🔁 Pagamento {} já aplicado, nada a fazer", payment_id);
            return Ok(ActivationOutcome::AlreadyProcessed);
        }

        let subscription = self
            .subscription_repo
            .upsert(
                &mut *tx,
                user_id,
                &Subscription::activated(plan, payment_id, Utc::now()),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "✅ Assinatura ativada: usuário={} plano={} pagamento={}",
            user_id,
            plan.as_str(),
            payment_id
        );
        Ok(ActivationOutcome::Activated(subscription))
    }

    /// Volta para o plano gratuito (ativo), sem data de término.
    pub async fn cancel<'e, A>(&self, db: A, user_id: &str) -> Result<Subscription, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = db.begin().await?;

        if !self.profile_repo.exists(&mut *tx, user_id).await? {
            return Err(AppError::ProfileNotFound);
        }

        let subscription = self
            .subscription_repo
            .upsert(&mut *tx, user_id, &Subscription::cancelled(Utc::now()))
            .await?;

        tx.commit().await?;

        tracing::info!("❎ Assinatura cancelada: {}", user_id);
        Ok(subscription)
    }
}
