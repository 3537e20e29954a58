// src/services/pricing.rs

//! Cálculo do valor/hora e da faixa de preço de um orçamento.
//!
//! Tudo aqui é puro: nenhuma função lê estado global. As configurações de
//! multiplicadores chegam por valor, já mescladas com os ajustes do usuário.
//! Toda a aritmética é verificada: estouro do Decimal vira `AmountTooLarge` (400).

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        calculator::{CalculatorInputs, CostItem, HourlyRateBreakdown},
        quote::{PriceEstimate, PriceModifiers, PriceRange, TimeFactors},
        settings::PricingSettings,
    },
};

fn add(a: Decimal, b: Decimal) -> Result<Decimal, AppError> {
    a.checked_add(b).ok_or(AppError::AmountTooLarge)
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, AppError> {
    a.checked_mul(b).ok_or(AppError::AmountTooLarge)
}

pub fn sum_costs(costs: &[CostItem]) -> Result<Decimal, AppError> {
    costs
        .iter()
        .try_fold(Decimal::ZERO, |acc, c| add(acc, c.value.max(Decimal::ZERO)))
}

/// Média dos dois salários quando ambos existem, senão o que existir, senão zero.
pub fn salary_target(salary1: Decimal, salary2: Decimal) -> Result<Decimal, AppError> {
    let s1 = salary1.max(Decimal::ZERO);
    let s2 = salary2.max(Decimal::ZERO);
    Ok(match (s1 > Decimal::ZERO, s2 > Decimal::ZERO) {
        (true, true) => add(s1, s2)? / Decimal::TWO,
        (true, false) => s1,
        (false, true) => s2,
        (false, false) => Decimal::ZERO,
    })
}

pub fn monthly_hours(inputs: &CalculatorInputs) -> i32 {
    inputs.hours_per_day.clamp(0, 24) * inputs.days_per_month.clamp(0, 31)
}

pub fn hourly_rate_breakdown(inputs: &CalculatorInputs) -> Result<HourlyRateBreakdown, AppError> {
    let total_fixed_costs = sum_costs(&inputs.fixed_costs)?;
    let total_variable_costs = sum_costs(&inputs.variable_costs)?;
    let salary_target = salary_target(inputs.salary1, inputs.salary2)?;
    let monthly_total = add(add(total_fixed_costs, total_variable_costs)?, salary_target)?;
    let monthly_hours = monthly_hours(inputs);

    let hourly_rate = if monthly_hours > 0 {
        monthly_total / Decimal::from(monthly_hours)
    } else {
        Decimal::ZERO
    };

    Ok(HourlyRateBreakdown {
        total_fixed_costs,
        total_variable_costs,
        salary_target,
        monthly_total,
        monthly_hours,
        hourly_rate,
    })
}

/// (Σfixos + Σvariáveis + salário) / (horas/dia × dias/mês), ou 0.
pub fn hourly_rate(inputs: &CalculatorInputs) -> Result<Decimal, AppError> {
    Ok(hourly_rate_breakdown(inputs)?.hourly_rate)
}

/// Faixa [mínimo, mínimo × (1 + margem/100)] para as horas e modificadores dados.
pub fn price_range(
    total_hours: Decimal,
    hourly_rate: Decimal,
    modifiers: &PriceModifiers,
    settings: PricingSettings,
) -> Result<PriceRange, AppError> {
    if total_hours <= Decimal::ZERO || hourly_rate <= Decimal::ZERO {
        return Ok(PriceRange {
            min: Decimal::ZERO,
            max: Decimal::ZERO,
        });
    }

    let mut base = mul(total_hours, hourly_rate)?;
    base = mul(base, settings.complexity(modifiers.complexity))?;
    base = mul(base, settings.commercial_use(modifiers.commercial_use))?;
    if modifiers.urgency {
        base = mul(base, settings.urgency_multiplier)?;
    }

    let spread = add(Decimal::ONE, settings.price_range_percentage / Decimal::ONE_HUNDRED)?;

    Ok(PriceRange {
        min: base,
        max: mul(base, spread)?,
    })
}

/// Horas totais + faixa de preço, no formato devolvido pela API.
pub fn estimate(
    hourly_rate: Decimal,
    time_factors: &TimeFactors,
    modifiers: &PriceModifiers,
    settings: PricingSettings,
) -> Result<PriceEstimate, AppError> {
    let total_hours = time_factors.total_hours()?;
    let range = price_range(total_hours, hourly_rate, modifiers, settings)?;

    Ok(PriceEstimate {
        total_hours,
        hourly_rate,
        price_min: range.min,
        price_max: range.max,
    })
}
