#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::to_bytes, response::Response};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::mpsc;

use calculo_certo::{
    config::{AppState, Config},
    models::payment::{PreferenceCreated, PreferenceRequest, VendorPayment},
    services::{
        payment_gateway::{GatewayError, PaymentGateway},
        webhook_worker::PaymentNotification,
    },
};

/// Gateway falso: registra as preferências recebidas e devolve respostas fixas.
#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    pub payment: Option<VendorPayment>,
    pub preferences: Mutex<Vec<PreferenceRequest>>,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_payment(payment: VendorPayment) -> Self {
        Self {
            payment: Some(payment),
            ..Default::default()
        }
    }

    pub fn last_preference(&self) -> Option<PreferenceRequest> {
        self.preferences.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceCreated, GatewayError> {
        if self.fail {
            return Err(GatewayError::Api {
                status: 401,
                body: "invalid access token".into(),
            });
        }
        self.preferences.lock().unwrap().push(request.clone());
        Ok(PreferenceCreated {
            id: "pref-123".into(),
            init_point: Some("https://www.mercadopago.com.br/checkout/v1/redirect?pref_id=pref-123".into()),
            sandbox_init_point: Some("https://sandbox.mercadopago.com.br/checkout/v1/redirect?pref_id=pref-123".into()),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<VendorPayment, GatewayError> {
        if self.fail {
            return Err(GatewayError::Api {
                status: 404,
                body: format!("payment {payment_id} not found"),
            });
        }
        self.payment
            .clone()
            .ok_or_else(|| GatewayError::InvalidResponse("sem pagamento".into()))
    }
}

pub fn test_config(webhook_secret: Option<&str>) -> Config {
    Config {
        database_url: "postgres://localhost/calculo_certo_test".into(),
        access_token: "TEST-token".into(),
        webhook_secret: webhook_secret.map(str::to_string),
        api_base_url: "http://mercadopago.invalid".into(),
        frontend_url: "http://front.test".into(),
        backend_url: "http://api.test".into(),
        port: 3001,
        payment_timeout: Duration::from_secs(5),
        webhook_max_attempts: 3,
    }
}

/// Estado com pool preguiçoso: nada conecta ao banco até uma query rodar.
pub fn build_state(
    webhook_secret: Option<&str>,
    gateway: Arc<FakeGateway>,
) -> (AppState, mpsc::Receiver<PaymentNotification>) {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/calculo_certo_test")
        .expect("lazy pool");
    AppState::build(test_config(webhook_secret), pool, gateway)
}

/// Estado sobre um banco de verdade (o pool criado pelo `#[sqlx::test]`).
pub fn build_state_with_pool(
    pool: PgPool,
    gateway: Arc<FakeGateway>,
) -> (AppState, mpsc::Receiver<PaymentNotification>) {
    AppState::build(test_config(None), pool, gateway)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
