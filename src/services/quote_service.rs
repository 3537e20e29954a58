// src/services/quote_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, QuoteRepository, SettingsRepository, SubscriptionRepository},
    models::{
        quote::{
            CreateQuotePayload, PriceEstimate, QuoteStatus, SavedQuote, UpdateQuotePayload,
            UserEstimateRequest,
        },
        settings::PricingSettings,
        subscription::Subscription,
    },
    services::pricing,
};

#[derive(Clone)]
pub struct QuoteService {
    quote_repo: QuoteRepository,
    profile_repo: ProfileRepository,
    settings_repo: SettingsRepository,
    subscription_repo: SubscriptionRepository,
}

impl QuoteService {
    pub fn new(
        quote_repo: QuoteRepository,
        profile_repo: ProfileRepository,
        settings_repo: SettingsRepository,
        subscription_repo: SubscriptionRepository,
    ) -> Self {
        Self {
            quote_repo,
            profile_repo,
            settings_repo,
            subscription_repo,
        }
    }

    // =========================================================================
    //  ESTIMATIVA
    // =========================================================================

    /// Usa o valor/hora salvo e as configurações mescladas do usuário.
    pub async fn estimate_for_user<'e, A>(
        &self,
        db: A,
        user_id: &str,
        request: &UserEstimateRequest,
    ) -> Result<PriceEstimate, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = db.acquire().await?;

        let profile = self
            .profile_repo
            .find_by_id(&mut *conn, user_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let hourly_rate = profile.hourly_rate.ok_or(AppError::HourlyRateNotSet)?;

        let overrides = self.settings_repo.get_overrides(&mut *conn, user_id).await?;
        let settings = PricingSettings::default().with_overrides(&overrides);

        pricing::estimate(hourly_rate, &request.time_factors, &request.modifiers, settings)
    }

    // =========================================================================
    //  ORÇAMENTOS SALVOS
    // =========================================================================

    /// Salva um orçamento confirmado, respeitando o limite mensal do plano.
    pub async fn create_quote<'e, A>(
        &self,
        db: A,
        user_id: &str,
        payload: CreateQuotePayload,
    ) -> Result<SavedQuote, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = db.begin().await?;

        // A trava serializa criações concorrentes do mesmo usuário (contagem do limite)
        let profile = self
            .profile_repo
            .lock_by_id(&mut *tx, user_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let subscription = self
            .subscription_repo
            .find(&mut *tx, user_id)
            .await?
            .unwrap_or_else(|| Subscription::initial(profile.created_at));

        if let Some(limit) = subscription.monthly_quote_limit() {
            let created = self
                .quote_repo
                .count_created_this_month(&mut *tx, user_id)
                .await?;
            if created >= limit {
                tracing::warn!("🚫 Limite mensal atingido para {}: {}/{}", user_id, created, limit);
                return Err(AppError::QuoteLimitReached { limit });
            }
        }

        let now = Utc::now();
        let quote = SavedQuote {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            client_name: payload.client_name.trim().to_string(),
            project_type: payload.project_type.trim().to_string(),
            description: payload.description,
            delivery_date: payload.delivery_date,
            time_factors: payload.time_factors,
            total_hours: payload.time_factors.total_hours()?,
            final_price: payload.final_price,
            complexity: payload.modifiers.complexity,
            urgency: payload.modifiers.urgency,
            commercial_use: payload.modifiers.commercial_use,
            revisions: payload.modifiers.revisions,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let saved = self.quote_repo.insert(&mut *tx, &quote).await?;
        tx.commit().await?;

        Ok(saved)
    }

    pub async fn list_quotes<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        status: Option<QuoteStatus>,
    ) -> Result<Vec<SavedQuote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.quote_repo.list(executor, user_id, status).await
    }

    pub async fn update_quote<'e, A>(
        &self,
        db: A,
        user_id: &str,
        quote_id: Uuid,
        payload: UpdateQuotePayload,
    ) -> Result<SavedQuote, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = db.begin().await?;

        let mut quote = self
            .quote_repo
            .find(&mut *tx, user_id, quote_id)
            .await?
            .ok_or(AppError::QuoteNotFound)?;

        payload.apply_to(&mut quote)?;

        let updated = self
            .quote_repo
            .update(&mut *tx, &quote)
            .await?
            .ok_or(AppError::QuoteNotFound)?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn complete_quote<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        quote_id: Uuid,
    ) -> Result<SavedQuote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.quote_repo
            .mark_completed(executor, user_id, quote_id)
            .await?
            .ok_or(AppError::QuoteNotFound)
    }

    pub async fn delete_quote<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        quote_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.quote_repo.delete(executor, user_id, quote_id).await? {
            Ok(())
        } else {
            Err(AppError::QuoteNotFound)
        }
    }
}
