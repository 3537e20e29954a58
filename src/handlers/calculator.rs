// src/handlers/calculator.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::calculator::{CalculatorInputs, HourlyRateBreakdown},
    services::pricing,
};

// POST /api/calculator/hourly-rate
#[utoipa::path(
    post,
    path = "/api/calculator/hourly-rate",
    tag = "Calculadora",
    request_body = CalculatorInputs,
    responses(
        (status = 200, description = "Valor/hora calculado", body = HourlyRateBreakdown),
        (status = 400, description = "Valores grandes demais para o cálculo")
    )
)]
pub async fn calculate_hourly_rate(
    locale: Locale,
    Json(inputs): Json<CalculatorInputs>,
) -> Result<impl IntoResponse, ApiError> {
    // Entradas malformadas já chegam aqui como zero; só o estouro numérico falha
    let breakdown = pricing::hourly_rate_breakdown(&inputs).map_err(|e| e.to_api_error(&locale))?;
    Ok((StatusCode::OK, Json(breakdown)))
}

// PUT /api/users/{userId}/calculator
#[utoipa::path(
    put,
    path = "/api/users/{userId}/calculator",
    tag = "Calculadora",
    request_body = CalculatorInputs,
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Calculadora salva e valor/hora atualizado", body = HourlyRateBreakdown),
        (status = 400, description = "Valor/hora grande demais para ser salvo"),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn save_calculator(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
    Json(inputs): Json<CalculatorInputs>,
) -> Result<impl IntoResponse, ApiError> {
    let breakdown = app_state
        .profile_service
        .save_calculator(&app_state.db_pool, &user_id, &inputs)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!("🧮 Valor/hora de {} atualizado: {}", user_id, breakdown.hourly_rate);

    Ok((StatusCode::OK, Json(breakdown)))
}
