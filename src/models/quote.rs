// src/models/quote.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{error::AppError, lenient};
use crate::models::settings::UpdateSettingsRequest;

/// Teto por etapa; três etapas somadas cabem em NUMERIC(10, 2).
pub const MAX_PHASE_HOURS: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Maior valor que NUMERIC(14, 2) guarda: 999.999.999.999,99.
pub const MAX_FINAL_PRICE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "complexity_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Baixa,
    #[default]
    Media,
    Alta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "commercial_use", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommercialUse {
    #[default]
    Local,
    Regional,
    Nacional,
}

/// Situação derivada de um orçamento salvo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Active,
    Completed,
}

// --- Structs ---

/// Horas estimadas por etapa do projeto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeFactors {
    #[sqlx(rename = "research_hours")]
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[validate(custom(function = "phase_hours"))]
    #[schema(value_type = f64, example = 2.0)]
    pub research: Decimal,

    #[sqlx(rename = "creation_hours")]
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[validate(custom(function = "phase_hours"))]
    #[schema(value_type = f64, example = 6.0)]
    pub creation: Decimal,

    #[sqlx(rename = "meeting_hours")]
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[validate(custom(function = "phase_hours"))]
    #[schema(value_type = f64, example = 2.0)]
    pub meetings: Decimal,
}

impl TimeFactors {
    pub fn total_hours(&self) -> Result<Decimal, AppError> {
        self.research
            .checked_add(self.creation)
            .and_then(|sum| sum.checked_add(self.meetings))
            .ok_or(AppError::AmountTooLarge)
    }
}

// Casas decimais sem zeros à direita ("1.50" conta como 1)
fn decimal_places(value: &Decimal) -> u32 {
    value.normalize().scale()
}

fn phase_hours(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= MAX_PHASE_HOURS && decimal_places(value) <= 2 {
        Ok(())
    } else {
        Err(ValidationError::new("range")
            .with_message("As horas devem ficar entre 0 e 10000, com até 2 casas decimais.".into()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceModifiers {
    #[serde(default)]
    pub complexity: Complexity,

    #[serde(default)]
    pub urgency: bool,

    #[serde(default)]
    pub commercial_use: CommercialUse,

    #[serde(default, deserialize_with = "lenient::revisions")]
    #[schema(example = 2)]
    pub revisions: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    #[schema(value_type = f64, example = 975.0)]
    pub min: Decimal,
    #[schema(value_type = f64, example = 1267.5)]
    pub max: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuote {
    pub id: Uuid,

    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: String,

    #[schema(example = "Padaria do Zé")]
    pub client_name: String,

    #[schema(example = "criacao-logo")]
    pub project_type: String,

    #[schema(example = "Logo + manual de marca")]
    pub description: String,

    #[schema(value_type = Option<String>, format = Date, example = "2025-03-10")]
    pub delivery_date: Option<NaiveDate>,

    #[sqlx(flatten)]
    pub time_factors: TimeFactors,

    #[schema(value_type = f64, example = 10.0)]
    pub total_hours: Decimal,

    #[schema(value_type = f64, example = 1100.0)]
    pub final_price: Decimal,

    pub complexity: Complexity,
    pub urgency: bool,
    pub commercial_use: CommercialUse,

    #[schema(example = 2)]
    pub revisions: i32,

    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedQuote {
    pub fn status(&self) -> QuoteStatus {
        if self.completed {
            QuoteStatus::Completed
        } else {
            QuoteStatus::Active
        }
    }
}

// =============================================================================
//  PAYLOADS
// =============================================================================

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("required".into()));
    }
    Ok(())
}

fn final_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive")
            .with_message("O valor final deve ser maior que zero.".into()));
    }
    if *value > MAX_FINAL_PRICE || decimal_places(value) > 2 {
        return Err(ValidationError::new("range")
            .with_message("O valor final deve ser menor que 1 trilhão, com até 2 casas decimais.".into()));
    }
    Ok(())
}

/// Estimativa sem estado: o cliente informa o próprio valor/hora.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 25.0)]
    pub hourly_rate: Decimal,

    #[serde(default)]
    pub time_factors: TimeFactors,

    #[serde(flatten)]
    pub modifiers: PriceModifiers,

    /// Ajustes opcionais sobre os multiplicadores padrão.
    #[serde(default)]
    pub settings: Option<UpdateSettingsRequest>,
}

/// Estimativa usando o valor/hora e as configurações salvas do usuário.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEstimateRequest {
    #[serde(default)]
    pub time_factors: TimeFactors,

    #[serde(flatten)]
    pub modifiers: PriceModifiers,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    #[schema(value_type = f64, example = 10.0)]
    pub total_hours: Decimal,
    #[schema(value_type = f64, example = 25.0)]
    pub hourly_rate: Decimal,
    #[schema(value_type = f64, example = 975.0)]
    pub price_min: Decimal,
    #[schema(value_type = f64, example = 1267.5)]
    pub price_max: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotePayload {
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    #[schema(example = "Padaria do Zé")]
    pub client_name: String,

    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    #[schema(example = "criacao-logo")]
    pub project_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-10")]
    pub delivery_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(nested)]
    pub time_factors: TimeFactors,

    #[serde(flatten)]
    pub modifiers: PriceModifiers,

    /// Valor confirmado pelo usuário (pode sair da faixa sugerida).
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[validate(custom(function = "final_price"))]
    #[schema(value_type = f64, example = 1100.0)]
    pub final_price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuotePayload {
    #[validate(custom(function = "non_blank"))]
    pub client_name: Option<String>,

    #[validate(custom(function = "non_blank"))]
    pub project_type: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,

    #[validate(nested)]
    pub time_factors: Option<TimeFactors>,

    pub complexity: Option<Complexity>,
    pub urgency: Option<bool>,
    pub commercial_use: Option<CommercialUse>,

    #[serde(default, deserialize_with = "lenient::optional_revisions")]
    pub revisions: Option<i32>,

    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "self::final_price"))]
    #[schema(value_type = Option<f64>)]
    pub final_price: Option<Decimal>,
}

impl UpdateQuotePayload {
    /// Aplica a atualização parcial sobre o orçamento salvo.
    pub fn apply_to(self, quote: &mut SavedQuote) -> Result<(), AppError> {
        if let Some(v) = self.client_name {
            quote.client_name = v.trim().to_string();
        }
        if let Some(v) = self.project_type {
            quote.project_type = v.trim().to_string();
        }
        if let Some(v) = self.description {
            quote.description = v;
        }
        if self.delivery_date.is_some() {
            quote.delivery_date = self.delivery_date;
        }
        if let Some(tf) = self.time_factors {
            quote.total_hours = tf.total_hours()?;
            quote.time_factors = tf;
        }
        if let Some(v) = self.complexity {
            quote.complexity = v;
        }
        if let Some(v) = self.urgency {
            quote.urgency = v;
        }
        if let Some(v) = self.commercial_use {
            quote.commercial_use = v;
        }
        if let Some(v) = self.revisions {
            quote.revisions = v;
        }
        if let Some(v) = self.final_price {
            quote.final_price = v;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteListQuery {
    pub status: Option<QuoteStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_quote() -> SavedQuote {
        let now = Utc::now();
        SavedQuote {
            id: Uuid::new_v4(),
            user_id: "uid-1".into(),
            client_name: "Cliente".into(),
            project_type: "web-design".into(),
            description: String::new(),
            delivery_date: None,
            time_factors: TimeFactors {
                research: Decimal::from(1),
                creation: Decimal::from(2),
                meetings: Decimal::from(1),
            },
            total_hours: Decimal::from(4),
            final_price: Decimal::from(400),
            complexity: Complexity::Media,
            urgency: false,
            commercial_use: CommercialUse::Local,
            revisions: 2,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_payload_reads_flattened_modifiers() {
        let payload: CreateQuotePayload = serde_json::from_value(json!({
            "clientName": "Padaria do Zé",
            "projectType": "criacao-logo",
            "deliveryDate": "",
            "timeFactors": { "research": 2, "creation": "6", "meetings": 2 },
            "complexity": "alta",
            "urgency": true,
            "commercialUse": "regional",
            "revisions": 3,
            "finalPrice": 1500
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.time_factors.total_hours().unwrap(), Decimal::from(10));
        assert_eq!(payload.modifiers.complexity, Complexity::Alta);
        assert_eq!(payload.modifiers.commercial_use, CommercialUse::Regional);
        assert!(payload.modifiers.urgency);
        assert_eq!(payload.delivery_date, None);
    }

    #[test]
    fn create_payload_requires_client_project_and_positive_price() {
        let payload: CreateQuotePayload = serde_json::from_value(json!({
            "clientName": "   ",
            "finalPrice": 0
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("client_name"));
        assert!(fields.contains_key("project_type"));
        assert!(fields.contains_key("final_price"));
    }

    #[test]
    fn update_recomputes_total_hours_only_when_time_changes() {
        let mut quote = sample_quote();
        UpdateQuotePayload {
            final_price: Some(Decimal::from(500)),
            ..Default::default()
        }
        .apply_to(&mut quote)
        .unwrap();
        assert_eq!(quote.total_hours, Decimal::from(4));
        assert_eq!(quote.final_price, Decimal::from(500));

        UpdateQuotePayload {
            time_factors: Some(TimeFactors {
                research: Decimal::from(3),
                creation: Decimal::from(3),
                meetings: Decimal::ZERO,
            }),
            ..Default::default()
        }
        .apply_to(&mut quote)
        .unwrap();
        assert_eq!(quote.total_hours, Decimal::from(6));
    }

    #[test]
    fn status_follows_completion_flag() {
        let mut quote = sample_quote();
        assert_eq!(quote.status(), QuoteStatus::Active);
        quote.completed = true;
        assert_eq!(quote.status(), QuoteStatus::Completed);
    }

    #[test]
    fn complexity_orders_from_low_to_high() {
        assert!(Complexity::Baixa < Complexity::Media);
        assert!(Complexity::Media < Complexity::Alta);
        assert!(CommercialUse::Local < CommercialUse::Regional);
        assert!(CommercialUse::Regional < CommercialUse::Nacional);
    }

    #[test]
    fn max_final_price_matches_the_column() {
        assert_eq!(MAX_FINAL_PRICE.to_string(), "999999999999.99");
        assert_eq!(MAX_PHASE_HOURS, Decimal::from(10_000));
    }

    #[test]
    fn hours_beyond_the_column_limits_are_rejected() {
        let payload: CreateQuotePayload = serde_json::from_value(json!({
            "clientName": "Cliente",
            "projectType": "web-design",
            "timeFactors": { "research": "0.125", "creation": 100000000 },
            "finalPrice": 500
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let nested = match errors.errors().get("time_factors") {
            Some(validator::ValidationErrorsKind::Struct(inner)) => inner.field_errors(),
            other => panic!("esperava erros aninhados, veio {other:?}"),
        };
        assert!(nested.contains_key("research"));
        assert!(nested.contains_key("creation"));
        assert!(!nested.contains_key("meetings"));
    }

    #[test]
    fn two_decimal_hours_sum_exactly() {
        let payload: CreateQuotePayload = serde_json::from_value(json!({
            "clientName": "Cliente",
            "projectType": "web-design",
            "timeFactors": { "research": "0.13", "creation": "0.12", "meetings": "1.50" },
            "finalPrice": "199.90"
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.time_factors.total_hours().unwrap().to_string(), "1.75");
    }

    #[test]
    fn final_price_must_fit_in_cents() {
        for bad in [json!("10.005"), json!("1000000000000"), json!(-3)] {
            let payload = UpdateQuotePayload {
                final_price: lenient::decimal_from_value(&bad),
                ..Default::default()
            };
            assert!(payload.validate().is_err(), "{bad}");
        }

        let ok = UpdateQuotePayload {
            final_price: Some(MAX_FINAL_PRICE),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }
}
