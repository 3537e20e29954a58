// src/db/profile_repo.rs

use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{calculator::CalculatorInputs, profile::ProfileRecord},
};

// Repositório dos perfis (tabela 'user_profiles')
#[derive(Clone, Default)]
pub struct ProfileRepository;

impl ProfileRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        user_id: &str,
    ) -> Result<Option<ProfileRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, email, hourly_rate, calculator_data, created_at, updated_at
             FROM user_profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Mesmo que `find_by_id`, mas trava a linha até o fim da transação.
    pub async fn lock_by_id<'e, E>(
        &self,
        executor: E,
        user_id: &str,
    ) -> Result<Option<ProfileRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, email, hourly_rate, calculator_data, created_at, updated_at
             FROM user_profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    pub async fn exists<'e, E>(&self, executor: E, user_id: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_profiles WHERE id = $1)")
                .bind(user_id)
                .fetch_one(executor)
                .await?;

        Ok(exists)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        email: &str,
        calculator_data: &CalculatorInputs,
    ) -> Result<ProfileRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ProfileRecord>(
            r#"
            INSERT INTO user_profiles (id, email, calculator_data)
            VALUES ($1, $2, $3)
            RETURNING id, email, hourly_rate, calculator_data, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(Json(calculator_data))
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Violação de chave primária = perfil já existe
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ProfileAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    /// Grava as entradas da calculadora e o valor/hora derivado numa única escrita.
    pub async fn save_calculator<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        calculator_data: &CalculatorInputs,
        hourly_rate: Decimal,
    ) -> Result<Option<ProfileRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            UPDATE user_profiles
            SET calculator_data = $2, hourly_rate = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, hourly_rate, calculator_data, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(calculator_data))
        .bind(hourly_rate)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }
}
