// src/handlers/profile.rs

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
    models::profile::{CreateProfilePayload, UserProfile},
};

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Usuários",
    request_body = CreateProfilePayload,
    responses(
        (status = 201, description = "Perfil criado", body = UserProfile),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Perfil já existe")
    )
)]
pub async fn create_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let profile = app_state
        .profile_service
        .create_profile(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// GET /api/users/{userId}
#[utoipa::path(
    get,
    path = "/api/users/{userId}",
    tag = "Usuários",
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Perfil com configurações e assinatura", body = UserProfile),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .get_profile(&app_state.db_pool, &user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(profile)))
}
