// src/db/quote_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::quote::{QuoteStatus, SavedQuote},
};

const QUOTE_COLUMNS: &str = "id, user_id, client_name, project_type, description, delivery_date, \
     research_hours, creation_hours, meeting_hours, total_hours, final_price, \
     complexity, urgency, commercial_use, revisions, completed, completed_at, \
     created_at, updated_at";

#[derive(Clone, Default)]
pub struct QuoteRepository;

impl QuoteRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, quote: &SavedQuote) -> Result<SavedQuote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO quotes (
                id, user_id, client_name, project_type, description, delivery_date,
                research_hours, creation_hours, meeting_hours, total_hours, final_price,
                complexity, urgency, commercial_use, revisions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        let saved = sqlx::query_as::<_, SavedQuote>(&sql)
            .bind(quote.id)
            .bind(&quote.user_id)
            .bind(&quote.client_name)
            .bind(&quote.project_type)
            .bind(&quote.description)
            .bind(quote.delivery_date)
            .bind(quote.time_factors.research)
            .bind(quote.time_factors.creation)
            .bind(quote.time_factors.meetings)
            .bind(quote.total_hours)
            .bind(quote.final_price)
            .bind(quote.complexity)
            .bind(quote.urgency)
            .bind(quote.commercial_use)
            .bind(quote.revisions)
            .fetch_one(executor)
            .await?;

        Ok(saved)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        quote_id: Uuid,
    ) -> Result<Option<SavedQuote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1 AND user_id = $2");
        let quote = sqlx::query_as::<_, SavedQuote>(&sql)
            .bind(quote_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        status: Option<QuoteStatus>,
    ) -> Result<Vec<SavedQuote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // NULL = sem filtro de situação
        let completed = status.map(|s| s == QuoteStatus::Completed);
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes
             WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR completed = $2)
             ORDER BY created_at DESC"
        );

        let quotes = sqlx::query_as::<_, SavedQuote>(&sql)
            .bind(user_id)
            .bind(completed)
            .fetch_all(executor)
            .await?;

        Ok(quotes)
    }

    /// Orçamentos criados no mês corrente (para o limite do plano gratuito).
    pub async fn count_created_this_month<'e, E>(
        &self,
        executor: E,
        user_id: &str,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quotes
             WHERE user_id = $1 AND created_at >= date_trunc('month', NOW())",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Regrava todos os campos editáveis do orçamento.
    pub async fn update<'e, E>(&self, executor: E, quote: &SavedQuote) -> Result<Option<SavedQuote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE quotes SET
                client_name = $3, project_type = $4, description = $5, delivery_date = $6,
                research_hours = $7, creation_hours = $8, meeting_hours = $9,
                total_hours = $10, final_price = $11, complexity = $12, urgency = $13,
                commercial_use = $14, revisions = $15, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, SavedQuote>(&sql)
            .bind(quote.id)
            .bind(&quote.user_id)
            .bind(&quote.client_name)
            .bind(&quote.project_type)
            .bind(&quote.description)
            .bind(quote.delivery_date)
            .bind(quote.time_factors.research)
            .bind(quote.time_factors.creation)
            .bind(quote.time_factors.meetings)
            .bind(quote.total_hours)
            .bind(quote.final_price)
            .bind(quote.complexity)
            .bind(quote.urgency)
            .bind(quote.commercial_use)
            .bind(quote.revisions)
            .fetch_optional(executor)
            .await?;

        Ok(updated)
    }

    /// Marca como concluído; um orçamento já concluído mantém a data original.
    pub async fn mark_completed<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        quote_id: Uuid,
    ) -> Result<Option<SavedQuote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE quotes SET
                completed = TRUE,
                completed_at = COALESCE(completed_at, NOW()),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        let quote = sqlx::query_as::<_, SavedQuote>(&sql)
            .bind(quote_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: &str, quote_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1 AND user_id = $2")
            .bind(quote_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
