use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::settings::SettingsOverrides};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_overrides<'e, E>(
        &self,
        executor: E,
        user_id: &str,
    ) -> Result<SettingsOverrides, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Sem linha salva = nenhum ajuste, vale tudo padrão.
        let overrides = sqlx::query_as::<_, SettingsOverrides>(
            "SELECT * FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(overrides.unwrap_or_default())
    }

    pub async fn upsert_overrides<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        input: &SettingsOverrides,
    ) -> Result<SettingsOverrides, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let overrides = sqlx::query_as::<_, SettingsOverrides>(
            r#"
            INSERT INTO user_settings (
                user_id, complexity_baixa, complexity_media, complexity_alta,
                commercial_local, commercial_regional, commercial_nacional,
                urgency_multiplier, price_range_percentage
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id)
            DO UPDATE SET
                complexity_baixa = EXCLUDED.complexity_baixa,
                complexity_media = EXCLUDED.complexity_media,
                complexity_alta = EXCLUDED.complexity_alta,
                commercial_local = EXCLUDED.commercial_local,
                commercial_regional = EXCLUDED.commercial_regional,
                commercial_nacional = EXCLUDED.commercial_nacional,
                urgency_multiplier = EXCLUDED.urgency_multiplier,
                price_range_percentage = EXCLUDED.price_range_percentage,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.complexity_baixa)
        .bind(input.complexity_media)
        .bind(input.complexity_alta)
        .bind(input.commercial_local)
        .bind(input.commercial_regional)
        .bind(input.commercial_nacional)
        .bind(input.urgency_multiplier)
        .bind(input.price_range_percentage)
        .fetch_one(executor)
        .await?;

        Ok(overrides)
    }

    pub async fn delete_overrides<'e, E>(&self, executor: E, user_id: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
