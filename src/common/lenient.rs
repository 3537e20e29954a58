// src/common/lenient.rs

// Desserializadores tolerantes para os números digitados pelo usuário.
// Entrada numérica malformada (texto inválido, null, negativo) vira zero
// em vez de derrubar a requisição inteira com 422.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Converte um valor JSON qualquer em Decimal, ou None se não for numérico.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // "1500,50" (vírgula decimal, padrão pt-BR)
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Decimal ≥ 0; qualquer outra coisa vira 0.
pub fn non_negative(value: &Value) -> Decimal {
    decimal_from_value(value)
        .filter(|d| *d >= Decimal::ZERO)
        .unwrap_or(Decimal::ZERO)
}

/// Inteiro truncado e limitado ao intervalo [0, max].
pub fn bounded_int(value: &Value, max: i32) -> i32 {
    let Some(d) = decimal_from_value(value) else {
        return 0;
    };
    let truncated = d.trunc();
    if truncated <= Decimal::ZERO {
        0
    } else if truncated >= Decimal::from(max) {
        max
    } else {
        truncated.to_i32().unwrap_or(0)
    }
}

pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(non_negative(&value))
}

pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

pub fn hours_per_day<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(bounded_int(&value, 24))
}

pub fn days_per_month<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(bounded_int(&value, 31))
}

pub fn revisions<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(bounded_int(&value, 1_000))
}

pub fn optional_revisions<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(bounded_int(&other, 1_000)),
    })
}

/// O formulário envia "" quando a data de entrega fica em branco.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => {
            let s = s.trim();
            // Aceita tanto "2025-03-10" quanto um ISO completo "2025-03-10T00:00:00Z"
            NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()
        }
        _ => None,
    })
}

/// IDs do Mercado Pago chegam ora como número, ora como string.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_from_value(&value))
}

pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
