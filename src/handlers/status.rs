// src/handlers/status.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::config::AppState;

// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "Status",
    responses((status = 200, description = "Servidor online"))
)]
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "message": "Backend CálculoCerto rodando!",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Status",
    responses(
        (status = 200, description = "Banco e gateway configurados"),
        (status = 503, description = "Banco de dados indisponível")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    let database = sqlx::query("SELECT 1")
        .execute(&app_state.db_pool)
        .await
        .is_ok();

    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({
            "status": label,
            "database": database,
            "webhookSecretConfigured": app_state.config.webhook_secret.is_some(),
        })),
    )
}
