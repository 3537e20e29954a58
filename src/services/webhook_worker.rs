// src/services/webhook_worker.rs
//
// Segunda fase do webhook: roda depois do 200 ao Mercado Pago.
// Busca o pagamento (com novas tentativas) e ativa a assinatura se aprovado.

use std::{sync::Arc, time::Duration};

use sqlx::PgPool;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    models::{payment::VendorPayment, subscription::PlanId},
    services::{
        payment_gateway::PaymentGateway,
        subscription_service::{ActivationOutcome, SubscriptionService},
    },
};

/// Capacidade da fila entre o handler e o worker.
pub const QUEUE_CAPACITY: usize = 256;

/// Notificação já verificada, aguardando processamento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    pub payment_id: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationDecision {
    Activate {
        user_id: String,
        plan: PlanId,
        payment_id: String,
    },
    Ignore(String),
}

impl ActivationDecision {
    /// Só pagamentos aprovados com `user_id` e um plano pago no metadata ativam algo.
    pub fn from_payment(payment: &VendorPayment, notified_id: &str) -> Self {
        if !payment.is_approved() {
            return Self::Ignore(format!(
                "status {}",
                payment.status.as_deref().unwrap_or("desconhecido")
            ));
        }

        let Some(user_id) = payment.metadata_user_id() else {
            return Self::Ignore("metadata sem user_id".into());
        };

        let plan = match payment.metadata_plan_id().as_deref().and_then(PlanId::parse) {
            Some(plan) if plan.is_purchasable() => plan,
            _ => return Self::Ignore("metadata sem plano pago válido".into()),
        };

        Self::Activate {
            user_id,
            plan,
            payment_id: payment.id.clone().unwrap_or_else(|| notified_id.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct WebhookWorker {
    gateway: Arc<dyn PaymentGateway>,
    subscription_service: SubscriptionService,
    db_pool: PgPool,
    max_attempts: u32,
    backoff: Duration,
}

impl WebhookWorker {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        subscription_service: SubscriptionService,
        db_pool: PgPool,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            gateway,
            subscription_service,
            db_pool,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn spawn(self, mut rx: mpsc::Receiver<PaymentNotification>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("📬 Worker de webhooks iniciado");
            while let Some(notification) = rx.recv().await {
                self.process(notification).await;
            }
            tracing::info!("📪 Fila de webhooks fechada, worker encerrado");
        })
    }

    /// Busca o pagamento com espera linear entre tentativas. Só erros transitórios
    /// são repetidos. `None` = desistiu.
    pub async fn fetch_with_retry(&self, payment_id: &str) -> Option<VendorPayment> {
        for attempt in 1..=self.max_attempts {
            match self.gateway.get_payment(payment_id).await {
                Ok(payment) => return Some(payment),
                Err(e) if !e.is_transient() => {
                    tracing::error!(
                        "❌ Pagamento {} descartado sem nova tentativa: {}",
                        payment_id,
                        e
                    );
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Falha ao buscar pagamento {} (tentativa {}/{}): {}",
                        payment_id,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
            }
        }

        tracing::error!(
            "❌ Pagamento {} descartado após {} tentativas; aguardando reenvio do Mercado Pago",
            payment_id,
            self.max_attempts
        );
        None
    }

    pub async fn process(&self, notification: PaymentNotification) {
        let payment_id = notification.payment_id.as_str();
        tracing::info!(
            "🔔 Processando pagamento {} (request-id: {})",
            payment_id,
            notification.request_id.as_deref().unwrap_or("-")
        );

        let Some(payment) = self.fetch_with_retry(payment_id).await else {
            return;
        };

        match ActivationDecision::from_payment(&payment, payment_id) {
            ActivationDecision::Ignore(reason) => {
                tracing::info!("ℹ️ Pagamento {} ignorado: {}", payment_id, reason);
            }
            ActivationDecision::Activate {
                user_id,
                plan,
                payment_id,
            } => {
                match self
                    .subscription_service
                    .activate(&self.db_pool, &user_id, plan, &payment_id)
                    .await
                {
                    Ok(ActivationOutcome::Activated(_)) | Ok(ActivationOutcome::AlreadyProcessed) => {}
                    Err(e) => tracing::error!(
                        "❌ Erro ao ativar assinatura do usuário {} (pagamento {}): {}",
                        user_id,
                        payment_id,
                        e
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{ProfileRepository, SubscriptionRepository},
        models::payment::{PreferenceCreated, PreferenceRequest},
        services::payment_gateway::GatewayError,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn payment(status: &str, metadata: serde_json::Value) -> VendorPayment {
        serde_json::from_value(json!({
            "id": 555,
            "status": status,
            "metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn approved_payment_with_paid_plan_activates() {
        let p = payment("approved", json!({"user_id": "uid-1", "plan_id": "agency"}));
        assert_eq!(
            ActivationDecision::from_payment(&p, "555"),
            ActivationDecision::Activate {
                user_id: "uid-1".into(),
                plan: PlanId::Agency,
                payment_id: "555".into(),
            }
        );
    }

    #[test]
    fn anything_else_is_ignored() {
        let cases = [
            payment("pending", json!({"user_id": "uid-1", "plan_id": "pro"})),
            payment("rejected", json!({"user_id": "uid-1", "plan_id": "pro"})),
            payment("approved", json!({"plan_id": "pro"})),
            payment("approved", json!({"user_id": "uid-1", "plan_id": "free"})),
            payment("approved", json!({"user_id": "uid-1", "plan_id": "gold"})),
            payment("approved", json!(null)),
        ];
        for p in cases {
            assert!(matches!(
                ActivationDecision::from_payment(&p, "555"),
                ActivationDecision::Ignore(_)
            ));
        }
    }

    struct FlakyGateway {
        failures_before_success: u32,
        failure: fn() -> GatewayError,
        calls: AtomicU32,
    }

    fn unavailable() -> GatewayError {
        GatewayError::Api {
            status: 503,
            body: "indisponível".into(),
        }
    }

    impl FlakyGateway {
        fn new(failures_before_success: u32, failure: fn() -> GatewayError) -> Self {
            Self {
                failures_before_success,
                failure,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for FlakyGateway {
        async fn create_preference(
            &self,
            _request: &PreferenceRequest,
        ) -> Result<PreferenceCreated, GatewayError> {
            Err(GatewayError::InvalidResponse("não usado".into()))
        }

        async fn get_payment(&self, _payment_id: &str) -> Result<VendorPayment, GatewayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call > self.failures_before_success {
                Ok(payment("pending", json!({})))
            } else {
                Err((self.failure)())
            }
        }
    }

    fn worker(gateway: Arc<FlakyGateway>, max_attempts: u32) -> WebhookWorker {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/calculo_certo_test")
            .unwrap();
        let subscriptions = SubscriptionService::new(
            SubscriptionRepository::new(),
            ProfileRepository::new(),
        );
        WebhookWorker::new(gateway, subscriptions, pool, max_attempts, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_retries_until_success() {
        let gateway = Arc::new(FlakyGateway::new(2, unavailable));
        let w = worker(gateway.clone(), 3);

        assert!(w.fetch_with_retry("555").await.is_some());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_gives_up_after_max_attempts() {
        let gateway = Arc::new(FlakyGateway::new(u32::MAX, unavailable));
        let w = worker(gateway.clone(), 3);

        let started = tokio::time::Instant::now();
        assert!(w.fetch_with_retry("555").await.is_none());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
        // espera linear: 1s + 2s
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_payment_response_is_not_retried() {
        let gateway = Arc::new(FlakyGateway::new(u32::MAX, || {
            GatewayError::InvalidResponse("campo status ausente".into())
        }));
        let w = worker(gateway.clone(), 5);

        let started = tokio::time::Instant::now();
        assert!(w.fetch_with_retry("555").await.is_none());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_from_the_api_are_not_retried() {
        let gateway = Arc::new(FlakyGateway::new(u32::MAX, || GatewayError::Api {
            status: 404,
            body: "payment not found".into(),
        }));
        let w = worker(gateway.clone(), 5);

        assert!(w.fetch_with_retry("555").await.is_none());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_approved_payment_is_processed_without_database() {
        let gateway = Arc::new(FlakyGateway::new(0, unavailable));
        let w = worker(gateway.clone(), 3);

        w.process(PaymentNotification {
            payment_id: "555".into(),
            request_id: Some("req-1".into()),
        })
        .await;
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }
}
