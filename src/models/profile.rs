// src/models/profile.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{
    calculator::CalculatorInputs, settings::PricingSettings, subscription::Subscription,
};

/// Maior valor/hora que NUMERIC(14, 4) guarda: 9.999.999.999,9999.
pub const MAX_HOURLY_RATE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4);

// Linha da tabela user_profiles
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRecord {
    pub id: String,
    pub email: String,
    pub hourly_rate: Option<Decimal>,
    pub calculator_data: Json<CalculatorInputs>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// O "documento" do usuário, já com configurações mescladas e assinatura.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = "x8Yq2fVb1uZc")]
    pub id: String,
    #[schema(example = "designer@exemplo.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Nulo até a calculadora ser salva pela primeira vez.
    #[schema(value_type = Option<f64>, example = 25.0)]
    pub hourly_rate: Option<Decimal>,
    pub calculator_data: CalculatorInputs,
    pub settings: PricingSettings,
    pub subscription: Subscription,
}

impl UserProfile {
    pub fn assemble(
        record: ProfileRecord,
        settings: PricingSettings,
        subscription: Subscription,
    ) -> Self {
        Self {
            id: record.id,
            email: record.email,
            created_at: record.created_at,
            hourly_rate: record.hourly_rate,
            calculator_data: record.calculator_data.0,
            settings,
            subscription,
        }
    }
}

fn user_id_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message("O ID do usuário é obrigatório.".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfilePayload {
    #[validate(
        length(max = 128, message = "O ID do usuário é muito longo."),
        custom(function = "user_id_present")
    )]
    #[schema(example = "x8Yq2fVb1uZc")]
    pub user_id: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "designer@exemplo.com")]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(user_id: &str, email: &str) -> CreateProfilePayload {
        CreateProfilePayload {
            user_id: user_id.into(),
            email: email.into(),
        }
    }

    #[test]
    fn blank_user_id_is_rejected() {
        let errors = payload("   ", "a@b.com").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("user_id"));
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload("uid-1", "designer@exemplo.com").validate().is_ok());
        assert!(payload("uid-1", "sem-arroba").validate().is_err());
    }
}
