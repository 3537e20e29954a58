// src/services/profile_service.rs

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{ProfileRepository, SettingsRepository, SubscriptionRepository},
    models::{
        calculator::{CalculatorInputs, HourlyRateBreakdown},
        profile::{CreateProfilePayload, UserProfile, MAX_HOURLY_RATE},
        settings::{PricingSettings, UpdateSettingsRequest},
        subscription::Subscription,
    },
    services::pricing,
};

#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    settings_repo: SettingsRepository,
    subscription_repo: SubscriptionRepository,
}

impl ProfileService {
    pub fn new(
        profile_repo: ProfileRepository,
        settings_repo: SettingsRepository,
        subscription_repo: SubscriptionRepository,
    ) -> Self {
        Self {
            profile_repo,
            settings_repo,
            subscription_repo,
        }
    }

    // =========================================================================
    //  PERFIL
    // =========================================================================

    /// Cria o perfil com a calculadora inicial e a assinatura gratuita inativa.
    pub async fn create_profile<'e, A>(
        &self,
        db: A,
        payload: &CreateProfilePayload,
    ) -> Result<UserProfile, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = db.begin().await?;

        let user_id = payload.user_id.trim();
        let record = self
            .profile_repo
            .create(&mut *tx, user_id, payload.email.trim(), &CalculatorInputs::initial())
            .await?;

        let subscription = self
            .subscription_repo
            .upsert(&mut *tx, user_id, &Subscription::initial(Utc::now()))
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Perfil criado: {}", user_id);
        Ok(UserProfile::assemble(record, PricingSettings::default(), subscription))
    }

    pub async fn get_profile<'e, A>(&self, db: A, user_id: &str) -> Result<UserProfile, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = db.acquire().await?;

        let record = self
            .profile_repo
            .find_by_id(&mut *conn, user_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let overrides = self.settings_repo.get_overrides(&mut *conn, user_id).await?;

        // Perfis sem linha de assinatura contam como o estado inicial
        let subscription = self
            .subscription_repo
            .find(&mut *conn, user_id)
            .await?
            .unwrap_or_else(|| Subscription::initial(record.created_at));

        let settings = PricingSettings::default().with_overrides(&overrides);
        Ok(UserProfile::assemble(record, settings, subscription))
    }

    /// Salva as entradas da calculadora e o valor/hora derivado.
    /// O valor/hora devolvido é o gravado (4 casas decimais).
    pub async fn save_calculator<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        inputs: &CalculatorInputs,
    ) -> Result<HourlyRateBreakdown, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut breakdown = pricing::hourly_rate_breakdown(inputs)?;
        breakdown.hourly_rate = storable_hourly_rate(&breakdown)?;

        self.profile_repo
            .save_calculator(executor, user_id, inputs, breakdown.hourly_rate)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        Ok(breakdown)
    }

    // =========================================================================
    //  CONFIGURAÇÕES DE PRECIFICAÇÃO
    // =========================================================================

    /// Padrões já mesclados com os ajustes do usuário.
    pub async fn effective_settings<'e, A>(
        &self,
        db: A,
        user_id: &str,
    ) -> Result<PricingSettings, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = db.acquire().await?;
        self.ensure_profile(&mut *conn, user_id).await?;

        let overrides = self.settings_repo.get_overrides(&mut *conn, user_id).await?;
        Ok(PricingSettings::default().with_overrides(&overrides))
    }

    /// Atualização parcial: campos omitidos mantêm o valor atual.
    pub async fn update_settings<'e, A>(
        &self,
        db: A,
        user_id: &str,
        payload: UpdateSettingsRequest,
    ) -> Result<PricingSettings, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = db.begin().await?;
        self.ensure_profile(&mut *tx, user_id).await?;

        let current = self.settings_repo.get_overrides(&mut *tx, user_id).await?;
        let merged = current.merged_with(&payload.into_overrides());
        let saved = self
            .settings_repo
            .upsert_overrides(&mut *tx, user_id, &merged)
            .await?;

        tx.commit().await?;

        Ok(PricingSettings::default().with_overrides(&saved))
    }

    pub async fn reset_settings<'e, A>(
        &self,
        db: A,
        user_id: &str,
    ) -> Result<PricingSettings, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = db.acquire().await?;
        self.ensure_profile(&mut *conn, user_id).await?;

        self.settings_repo.delete_overrides(&mut *conn, user_id).await?;
        Ok(PricingSettings::default())
    }

    async fn ensure_profile<'e, E>(&self, executor: E, user_id: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.profile_repo.exists(executor, user_id).await? {
            Ok(())
        } else {
            Err(AppError::ProfileNotFound)
        }
    }
}

/// Arredonda como o Postgres (meio para longe do zero) e recusa o que não cabe na coluna.
pub fn storable_hourly_rate(breakdown: &HourlyRateBreakdown) -> Result<Decimal, AppError> {
    let rate = breakdown
        .hourly_rate
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    if rate > MAX_HOURLY_RATE {
        return Err(AppError::AmountTooLarge);
    }
    Ok(rate)
}
