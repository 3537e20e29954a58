// Precisa de DATABASE_URL apontando para um Postgres descartável.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use sqlx::PgPool;

use calculo_certo::{
    common::error::AppError,
    config::AppState,
    handlers::{payments::cancel_subscription, profile::create_profile},
    middleware::i18n::Locale,
    models::{
        payment::VendorPayment,
        profile::CreateProfilePayload,
        subscription::{PlanId, Subscription, SubscriptionStatus},
    },
    services::{subscription_service::ActivationOutcome, webhook_worker::PaymentNotification},
};

mod support;

use support::{body_json, build_state_with_pool, FakeGateway};

async fn new_user(state: &AppState, user_id: &str) {
    let response = create_profile(
        State(state.clone()),
        Locale::default(),
        Json(CreateProfilePayload {
            user_id: user_id.into(),
            email: format!("{user_id}@exemplo.com"),
        }),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn ledger_rows(pool: &PgPool, payment_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM subscription_payments WHERE payment_id = $1")
        .bind(payment_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn subscription(state: &AppState, user_id: &str) -> Subscription {
    state
        .subscription_service
        .get_subscription(&state.db_pool, user_id)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn same_payment_is_applied_only_once(pool: PgPool) {
    let (state, _rx) = build_state_with_pool(pool, Arc::new(FakeGateway::default()));
    new_user(&state, "uid-1").await;
    let service = &state.subscription_service;

    let first = service
        .activate(&state.db_pool, "uid-1", PlanId::Pro, "pay-1")
        .await
        .unwrap();
    let ActivationOutcome::Activated(activated) = first else {
        panic!("primeira ativação deveria aplicar o plano");
    };
    assert_eq!(activated.plan, PlanId::Pro);
    assert_eq!(activated.status, SubscriptionStatus::Active);

    // reenvio com outro plano no metadata não muda nada
    let second = service
        .activate(&state.db_pool, "uid-1", PlanId::Agency, "pay-1")
        .await
        .unwrap();
    assert_eq!(second, ActivationOutcome::AlreadyProcessed);

    assert_eq!(ledger_rows(&state.db_pool, "pay-1").await, 1);
    let current = subscription(&state, "uid-1").await;
    assert_eq!(current, activated);
}

#[sqlx::test(migrations = "./migrations")]
async fn activation_for_unknown_profile_leaves_no_ledger_row(pool: PgPool) {
    let (state, _rx) = build_state_with_pool(pool, Arc::new(FakeGateway::default()));

    let result = state
        .subscription_service
        .activate(&state.db_pool, "uid-fantasma", PlanId::Pro, "pay-9")
        .await;
    assert!(matches!(result, Err(AppError::ProfileNotFound)));
    assert_eq!(ledger_rows(&state.db_pool, "pay-9").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn redelivered_webhook_activates_once(pool: PgPool) {
    let payment: VendorPayment = serde_json::from_value(json!({
        "id": 777,
        "status": "approved",
        "metadata": { "user_id": "uid-1", "plan_id": "agency" }
    }))
    .unwrap();
    let (state, _rx) = build_state_with_pool(pool, Arc::new(FakeGateway::with_payment(payment)));
    new_user(&state, "uid-1").await;

    let worker = state.webhook_worker();
    for request_id in ["req-1", "req-2"] {
        worker
            .process(PaymentNotification {
                payment_id: "777".into(),
                request_id: Some(request_id.into()),
            })
            .await;
    }

    assert_eq!(ledger_rows(&state.db_pool, "777").await, 1);
    let current = subscription(&state, "uid-1").await;
    assert_eq!(current.plan, PlanId::Agency);
    assert_eq!(current.status, SubscriptionStatus::Active);
    assert_eq!(current.payment_id.as_deref(), Some("777"));
    assert!(current.end_date.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn cancel_returns_to_active_free_plan(pool: PgPool) {
    let (state, _rx) = build_state_with_pool(pool, Arc::new(FakeGateway::default()));
    new_user(&state, "uid-1").await;
    state
        .subscription_service
        .activate(&state.db_pool, "uid-1", PlanId::Pro, "pay-1")
        .await
        .unwrap();

    let response = cancel_subscription(State(state.clone()), Locale::default(), Path("uid-1".into()))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["plan"], "free");
    assert_eq!(body["status"], "active");
    assert!(body["endDate"].is_null());

    let current = subscription(&state, "uid-1").await;
    assert_eq!(current.plan, PlanId::Free);
    assert_eq!(current.monthly_quote_limit(), Some(10));
}

#[sqlx::test(migrations = "./migrations")]
async fn new_profile_starts_on_inactive_free_plan(pool: PgPool) {
    let (state, _rx) = build_state_with_pool(pool, Arc::new(FakeGateway::default()));
    new_user(&state, "uid-1").await;

    let current = subscription(&state, "uid-1").await;
    assert_eq!(current.plan, PlanId::Free);
    assert_eq!(current.status, SubscriptionStatus::Inactive);
    assert!(current.payment_id.is_none());
}
