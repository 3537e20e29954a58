// src/models/calculator.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::lenient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    #[serde(default)]
    #[schema(example = "Aluguel")]
    pub description: String,

    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 1000.0)]
    pub value: Decimal,
}

/// Entradas da calculadora de valor/hora. Números inválidos viram zero,
/// horas/dia ficam em [0, 24] e dias/mês em [0, 31].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInputs {
    #[serde(default)]
    pub fixed_costs: Vec<CostItem>,

    #[serde(default)]
    pub variable_costs: Vec<CostItem>,

    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 3000.0)]
    pub salary1: Decimal,

    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 0.0)]
    pub salary2: Decimal,

    #[serde(default, deserialize_with = "lenient::hours_per_day")]
    #[schema(example = 8, minimum = 0, maximum = 24)]
    pub hours_per_day: i32,

    #[serde(default, deserialize_with = "lenient::days_per_month")]
    #[schema(example = 20, minimum = 0, maximum = 31)]
    pub days_per_month: i32,
}

impl CalculatorInputs {
    /// Estado inicial de um perfil novo: sem custos, 8h/dia, 20 dias/mês.
    pub fn initial() -> Self {
        Self {
            fixed_costs: Vec::new(),
            variable_costs: Vec::new(),
            salary1: Decimal::ZERO,
            salary2: Decimal::ZERO,
            hours_per_day: 8,
            days_per_month: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRateBreakdown {
    #[schema(value_type = f64, example = 1000.0)]
    pub total_fixed_costs: Decimal,
    #[schema(value_type = f64, example = 0.0)]
    pub total_variable_costs: Decimal,
    #[schema(value_type = f64, example = 3000.0)]
    pub salary_target: Decimal,
    #[schema(value_type = f64, example = 4000.0)]
    pub monthly_total: Decimal,
    #[schema(example = 160)]
    pub monthly_hours: i32,
    #[schema(value_type = f64, example = 25.0)]
    pub hourly_rate: Decimal,
}
