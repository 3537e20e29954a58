// src/handlers/quotes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        quote::{
            CreateQuotePayload, EstimateRequest, PriceEstimate, QuoteListQuery, SavedQuote,
            UpdateQuotePayload, UserEstimateRequest,
        },
        settings::PricingSettings,
    },
    services::pricing,
};

// =============================================================================
//  ESTIMATIVAS
// =============================================================================

// POST /api/quotes/estimate
#[utoipa::path(
    post,
    path = "/api/quotes/estimate",
    tag = "Orçamentos",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Faixa de preço sugerida", body = PriceEstimate),
        (status = 400, description = "Ajustes inválidos ou valores grandes demais")
    )
)]
pub async fn estimate(
    locale: Locale,
    Json(payload): Json<EstimateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut settings = PricingSettings::default();

    if let Some(overrides) = payload.settings {
        overrides
            .validate()
            .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
        settings = settings.with_overrides(&overrides.into_overrides());
    }

    let estimate = pricing::estimate(
        payload.hourly_rate,
        &payload.time_factors,
        &payload.modifiers,
        settings,
    )
    .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(estimate)))
}

// POST /api/users/{userId}/quotes/estimate
#[utoipa::path(
    post,
    path = "/api/users/{userId}/quotes/estimate",
    tag = "Orçamentos",
    request_body = UserEstimateRequest,
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Faixa de preço com o valor/hora salvo", body = PriceEstimate),
        (status = 400, description = "Valor/hora ainda não calculado"),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn estimate_for_user(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
    Json(payload): Json<UserEstimateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let estimate = app_state
        .quote_service
        .estimate_for_user(&app_state.db_pool, &user_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(estimate)))
}

// =============================================================================
//  ORÇAMENTOS SALVOS
// =============================================================================

// POST /api/users/{userId}/quotes
#[utoipa::path(
    post,
    path = "/api/users/{userId}/quotes",
    tag = "Orçamentos",
    request_body = CreateQuotePayload,
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 201, description = "Orçamento salvo", body = SavedQuote),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Limite mensal do plano gratuito atingido"),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
    Json(payload): Json<CreateQuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let quote = app_state
        .quote_service
        .create_quote(&app_state.db_pool, &user_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(quote)))
}

// GET /api/users/{userId}/quotes
#[utoipa::path(
    get,
    path = "/api/users/{userId}/quotes",
    tag = "Orçamentos",
    params(
        ("userId" = String, Path, description = "UID do usuário"),
        QuoteListQuery
    ),
    responses(
        (status = 200, description = "Orçamentos, do mais recente ao mais antigo", body = Vec<SavedQuote>)
    )
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quotes = app_state
        .quote_service
        .list_quotes(&app_state.db_pool, &user_id, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quotes)))
}

// PATCH /api/users/{userId}/quotes/{quoteId}
#[utoipa::path(
    patch,
    path = "/api/users/{userId}/quotes/{quoteId}",
    tag = "Orçamentos",
    request_body = UpdateQuotePayload,
    params(
        ("userId" = String, Path, description = "UID do usuário"),
        ("quoteId" = Uuid, Path, description = "ID do orçamento")
    ),
    responses(
        (status = 200, description = "Orçamento atualizado", body = SavedQuote),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((user_id, quote_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateQuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let quote = app_state
        .quote_service
        .update_quote(&app_state.db_pool, &user_id, quote_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quote)))
}

// POST /api/users/{userId}/quotes/{quoteId}/complete
#[utoipa::path(
    post,
    path = "/api/users/{userId}/quotes/{quoteId}/complete",
    tag = "Orçamentos",
    params(
        ("userId" = String, Path, description = "UID do usuário"),
        ("quoteId" = Uuid, Path, description = "ID do orçamento")
    ),
    responses(
        (status = 200, description = "Orçamento concluído", body = SavedQuote),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn complete_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((user_id, quote_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .complete_quote(&app_state.db_pool, &user_id, quote_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quote)))
}

// DELETE /api/users/{userId}/quotes/{quoteId}
#[utoipa::path(
    delete,
    path = "/api/users/{userId}/quotes/{quoteId}",
    tag = "Orçamentos",
    params(
        ("userId" = String, Path, description = "UID do usuário"),
        ("quoteId" = Uuid, Path, description = "ID do orçamento")
    ),
    responses(
        (status = 204, description = "Orçamento removido"),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((user_id, quote_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .quote_service
        .delete_quote(&app_state.db_pool, &user_id, quote_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
