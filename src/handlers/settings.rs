// src/handlers/settings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::settings::{PricingSettings, UpdateSettingsRequest},
};

// GET /api/users/{userId}/settings
#[utoipa::path(
    get,
    path = "/api/users/{userId}/settings",
    tag = "Configurações",
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Configurações efetivas", body = PricingSettings),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .profile_service
        .effective_settings(&app_state.db_pool, &user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/users/{userId}/settings
#[utoipa::path(
    put,
    path = "/api/users/{userId}/settings",
    tag = "Configurações",
    request_body = UpdateSettingsRequest,
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Configurações atualizadas", body = PricingSettings),
        (status = 400, description = "Multiplicador ou margem inválidos"),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let updated = app_state
        .profile_service
        .update_settings(&app_state.db_pool, &user_id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(updated)))
}

// DELETE /api/users/{userId}/settings
#[utoipa::path(
    delete,
    path = "/api/users/{userId}/settings",
    tag = "Configurações",
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Configurações restauradas para o padrão", body = PricingSettings),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn reset_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .profile_service
        .reset_settings(&app_state.db_pool, &user_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(settings)))
}
