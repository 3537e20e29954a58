// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;
use crate::models::quote::{CommercialUse, Complexity};

// =============================================================================
//  CONFIGURAÇÃO EFETIVA (padrões + ajustes do usuário)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityMultipliers {
    #[schema(example = "1.5")]
    pub baixa: Decimal,
    #[schema(example = "2.0")]
    pub media: Decimal,
    #[schema(example = "2.5")]
    pub alta: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommercialUseMultipliers {
    #[schema(example = "1.0")]
    pub local: Decimal,
    #[schema(example = "1.2")]
    pub regional: Decimal,
    #[schema(example = "1.5")]
    pub nacional: Decimal,
}

/// Multiplicadores usados pelo precificador. Sempre passado por valor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingSettings {
    pub complexity_multipliers: ComplexityMultipliers,
    pub commercial_use_multipliers: CommercialUseMultipliers,
    #[schema(example = "1.3")]
    pub urgency_multiplier: Decimal,
    #[schema(example = "30")]
    pub price_range_percentage: Decimal,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            complexity_multipliers: ComplexityMultipliers {
                baixa: Decimal::new(15, 1),
                media: Decimal::new(20, 1),
                alta: Decimal::new(25, 1),
            },
            commercial_use_multipliers: CommercialUseMultipliers {
                local: Decimal::new(10, 1),
                regional: Decimal::new(12, 1),
                nacional: Decimal::new(15, 1),
            },
            urgency_multiplier: Decimal::new(13, 1),
            price_range_percentage: Decimal::from(30),
        }
    }
}

impl PricingSettings {
    pub fn complexity(&self, level: Complexity) -> Decimal {
        match level {
            Complexity::Baixa => self.complexity_multipliers.baixa,
            Complexity::Media => self.complexity_multipliers.media,
            Complexity::Alta => self.complexity_multipliers.alta,
        }
    }

    pub fn commercial_use(&self, scope: CommercialUse) -> Decimal {
        match scope {
            CommercialUse::Local => self.commercial_use_multipliers.local,
            CommercialUse::Regional => self.commercial_use_multipliers.regional,
            CommercialUse::Nacional => self.commercial_use_multipliers.nacional,
        }
    }

    /// Aplica os ajustes salvos sobre esta configuração.
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Self {
        let c = &mut self.complexity_multipliers;
        c.baixa = overrides.complexity_baixa.unwrap_or(c.baixa);
        c.media = overrides.complexity_media.unwrap_or(c.media);
        c.alta = overrides.complexity_alta.unwrap_or(c.alta);

        let u = &mut self.commercial_use_multipliers;
        u.local = overrides.commercial_local.unwrap_or(u.local);
        u.regional = overrides.commercial_regional.unwrap_or(u.regional);
        u.nacional = overrides.commercial_nacional.unwrap_or(u.nacional);

        self.urgency_multiplier = overrides.urgency_multiplier.unwrap_or(self.urgency_multiplier);
        self.price_range_percentage = overrides
            .price_range_percentage
            .unwrap_or(self.price_range_percentage);
        self
    }
}

// =============================================================================
//  AJUSTES PERSISTIDOS (tabela user_settings, colunas nulas = padrão)
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct SettingsOverrides {
    pub complexity_baixa: Option<Decimal>,
    pub complexity_media: Option<Decimal>,
    pub complexity_alta: Option<Decimal>,
    pub commercial_local: Option<Decimal>,
    pub commercial_regional: Option<Decimal>,
    pub commercial_nacional: Option<Decimal>,
    pub urgency_multiplier: Option<Decimal>,
    pub price_range_percentage: Option<Decimal>,
    #[sqlx(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SettingsOverrides {
    /// Campos presentes em `newer` substituem os atuais.
    pub fn merged_with(&self, newer: &SettingsOverrides) -> SettingsOverrides {
        SettingsOverrides {
            complexity_baixa: newer.complexity_baixa.or(self.complexity_baixa),
            complexity_media: newer.complexity_media.or(self.complexity_media),
            complexity_alta: newer.complexity_alta.or(self.complexity_alta),
            commercial_local: newer.commercial_local.or(self.commercial_local),
            commercial_regional: newer.commercial_regional.or(self.commercial_regional),
            commercial_nacional: newer.commercial_nacional.or(self.commercial_nacional),
            urgency_multiplier: newer.urgency_multiplier.or(self.urgency_multiplier),
            price_range_percentage: newer.price_range_percentage.or(self.price_range_percentage),
            updated_at: self.updated_at,
        }
    }
}

// =============================================================================
//  PAYLOAD DE ATUALIZAÇÃO (mesmo formato do objeto de configurações)
// =============================================================================

// As colunas são NUMERIC(8, 4): até 4 casas decimais
const MAX_SETTING_SCALE: u32 = 4;

fn fits_column(value: &Decimal) -> bool {
    *value <= Decimal::ONE_THOUSAND && value.normalize().scale() <= MAX_SETTING_SCALE
}

fn positive_multiplier(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive")
            .with_message("O multiplicador deve ser maior que zero.".into()));
    }
    if !fits_column(value) {
        return Err(ValidationError::new("range")
            .with_message("O multiplicador deve ser no máximo 1000, com até 4 casas decimais.".into()));
    }
    Ok(())
}

fn percentage_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO && fits_column(value) {
        Ok(())
    } else {
        Err(ValidationError::new("range")
            .with_message("A margem da faixa de preço deve estar entre 0 e 1000%, com até 4 casas decimais.".into()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityOverrides {
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "positive_multiplier"))]
    #[schema(value_type = Option<f64>, example = 1.5)]
    pub baixa: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "positive_multiplier"))]
    #[schema(value_type = Option<f64>, example = 2.0)]
    pub media: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "positive_multiplier"))]
    #[schema(value_type = Option<f64>, example = 2.5)]
    pub alta: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommercialUseOverrides {
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "positive_multiplier"))]
    #[schema(value_type = Option<f64>, example = 1.0)]
    pub local: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "positive_multiplier"))]
    #[schema(value_type = Option<f64>, example = 1.2)]
    pub regional: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "positive_multiplier"))]
    #[schema(value_type = Option<f64>, example = 1.5)]
    pub nacional: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    #[validate(nested)]
    pub complexity_multipliers: Option<ComplexityOverrides>,

    #[serde(default)]
    #[validate(nested)]
    pub commercial_use_multipliers: Option<CommercialUseOverrides>,

    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "positive_multiplier"))]
    #[schema(value_type = Option<f64>, example = 1.3)]
    pub urgency_multiplier: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    #[validate(custom(function = "percentage_in_range"))]
    #[schema(value_type = Option<f64>, example = 30)]
    pub price_range_percentage: Option<Decimal>,
}

impl UpdateSettingsRequest {
    pub fn into_overrides(self) -> SettingsOverrides {
        let complexity = self.complexity_multipliers.unwrap_or_default();
        let commercial = self.commercial_use_multipliers.unwrap_or_default();
        SettingsOverrides {
            complexity_baixa: complexity.baixa,
            complexity_media: complexity.media,
            complexity_alta: complexity.alta,
            commercial_local: commercial.local,
            commercial_regional: commercial.regional,
            commercial_nacional: commercial.nacional,
            urgency_multiplier: self.urgency_multiplier,
            price_range_percentage: self.price_range_percentage,
            updated_at: None,
        }
    }
}
