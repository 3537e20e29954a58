// src/handlers/payments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        payment::{ActivateSubscriptionQuery, CreatePreferencePayload, PaymentSnapshot, PreferenceResponse},
        subscription::{Plan, PlanId, Subscription},
    },
    services::subscription_service::ActivationOutcome,
};

// =============================================================================
//  PLANOS E CHECKOUT
// =============================================================================

// GET /api/plans
#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "Pagamentos",
    responses((status = 200, description = "Catálogo de planos", body = Vec<Plan>))
)]
pub async fn list_plans() -> impl IntoResponse {
    (StatusCode::OK, Json(Plan::catalog()))
}

// POST /api/create-preference
#[utoipa::path(
    post,
    path = "/api/create-preference",
    tag = "Pagamentos",
    request_body = CreatePreferencePayload,
    responses(
        (status = 200, description = "Preferência criada no Mercado Pago", body = PreferenceResponse),
        (status = 400, description = "Dados incompletos ou plano inválido"),
        (status = 500, description = "Falha no Mercado Pago (com details)")
    )
)]
pub async fn create_preference(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreatePreferencePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let preference = app_state
        .payment_service
        .create_preference(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(preference)))
}

// GET /api/payment/{id}
#[utoipa::path(
    get,
    path = "/api/payment/{id}",
    tag = "Pagamentos",
    params(("id" = String, Path, description = "ID do pagamento no Mercado Pago")),
    responses(
        (status = 200, description = "Situação do pagamento", body = PaymentSnapshot),
        (status = 500, description = "Falha no Mercado Pago (com details)")
    )
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = app_state
        .payment_service
        .payment_snapshot(&payment_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(snapshot)))
}

// =============================================================================
//  ASSINATURA
// =============================================================================

// GET /api/activate-subscription?userId=&planId=&paymentId=
#[utoipa::path(
    get,
    path = "/api/activate-subscription",
    tag = "Assinatura",
    params(ActivateSubscriptionQuery),
    responses(
        (status = 200, description = "Assinatura ativada (ou pagamento já aplicado)"),
        (status = 400, description = "Dados incompletos ou plano inválido"),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn activate_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ActivateSubscriptionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let (Some(user_id), Some(plan_id), Some(payment_id)) = (
        present(query.user_id),
        present(query.plan_id),
        present(query.payment_id),
    ) else {
        return Err(AppError::MissingActivationFields.to_api_error(&locale));
    };

    let plan = PlanId::parse(&plan_id)
        .ok_or(AppError::InvalidPlan)
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!("🛠️ Ativação manual: usuário={} plano={} pagamento={}", user_id, plan_id, payment_id);

    let outcome = app_state
        .subscription_service
        .activate(&app_state.db_pool, &user_id, plan, &payment_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let body = match outcome {
        ActivationOutcome::Activated(subscription) => json!({
            "success": true,
            "message": "Assinatura ativada com sucesso",
            "subscription": subscription,
        }),
        ActivationOutcome::AlreadyProcessed => json!({
            "success": true,
            "message": "Pagamento já processado anteriormente",
        }),
    };

    Ok((StatusCode::OK, Json(body)))
}

// GET /api/users/{userId}/subscription
#[utoipa::path(
    get,
    path = "/api/users/{userId}/subscription",
    tag = "Assinatura",
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Assinatura atual", body = Subscription),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn get_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = app_state
        .subscription_service
        .get_subscription(&app_state.db_pool, &user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(subscription)))
}

// POST /api/users/{userId}/subscription/cancel
#[utoipa::path(
    post,
    path = "/api/users/{userId}/subscription/cancel",
    tag = "Assinatura",
    params(("userId" = String, Path, description = "UID do usuário")),
    responses(
        (status = 200, description = "Assinatura cancelada (volta ao plano gratuito)", body = Subscription),
        (status = 404, description = "Perfil não encontrado")
    )
)]
pub async fn cancel_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = app_state
        .subscription_service
        .cancel(&app_state.db_pool, &user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(subscription)))
}
