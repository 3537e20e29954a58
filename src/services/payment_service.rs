// src/services/payment_service.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::error::AppError,
    models::{
        payment::{
            BackUrls, CreatePreferencePayload, PaymentSnapshot, PreferenceItem,
            PreferenceMetadata, PreferencePayer, PreferenceRequest, PreferenceResponse,
        },
        subscription::{Plan, PlanId},
    },
    services::payment_gateway::PaymentGateway,
};

pub const STATEMENT_DESCRIPTOR: &str = "CALCULOCERTO";

#[derive(Clone)]
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    frontend_url: String,
    backend_url: String,
}

impl PaymentService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, frontend_url: &str, backend_url: &str) -> Self {
        Self {
            gateway,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            backend_url: backend_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_preference(
        &self,
        payload: &CreatePreferencePayload,
    ) -> Result<PreferenceResponse, AppError> {
        let (plan_id, user_id, user_email) = match (
            non_empty(payload.plan_id.as_deref()),
            non_empty(payload.user_id.as_deref()),
            non_empty(payload.user_email.as_deref()),
        ) {
            (Some(p), Some(u), Some(e)) => (p, u, e),
            _ => return Err(AppError::MissingPreferenceFields),
        };

        let plan = PlanId::parse(plan_id)
            .filter(PlanId::is_purchasable)
            .map(Plan::get)
            .ok_or(AppError::InvalidPlan)?;

        let request = build_preference(
            &plan,
            user_id,
            user_email,
            &self.frontend_url,
            &self.backend_url,
            Utc::now().timestamp_millis(),
        );

        tracing::info!("📝 Criando preferência: plano={} usuário={}", plan.id.as_str(), user_id);

        let created = self
            .gateway
            .create_preference(&request)
            .await
            .map_err(AppError::PreferenceCreationFailed)?;

        tracing::info!("✅ Preferência criada: {}", created.id);

        Ok(PreferenceResponse {
            preference_id: created.id,
            init_point: created.init_point,
            sandbox_init_point: created.sandbox_init_point,
        })
    }

    pub async fn payment_snapshot(&self, payment_id: &str) -> Result<PaymentSnapshot, AppError> {
        let payment = self
            .gateway
            .get_payment(payment_id)
            .await
            .map_err(AppError::PaymentLookupFailed)?;

        Ok(payment.into_snapshot(payment_id))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Monta o corpo da preferência de checkout para um plano pago.
pub fn build_preference(
    plan: &Plan,
    user_id: &str,
    user_email: &str,
    frontend_url: &str,
    backend_url: &str,
    timestamp_millis: i64,
) -> PreferenceRequest {
    let plan_id = plan.id.as_str();

    PreferenceRequest {
        items: vec![PreferenceItem {
            id: plan_id.to_string(),
            title: plan.title.clone(),
            description: plan.description.clone(),
            quantity: 1,
            currency_id: plan.currency.clone(),
            unit_price: plan.price,
        }],
        payer: PreferencePayer {
            email: user_email.to_string(),
        },
        back_urls: BackUrls {
            success: format!("{frontend_url}/payment/success"),
            failure: format!("{frontend_url}/payment/failure"),
            pending: format!("{frontend_url}/payment/pending"),
        },
        auto_return: "approved".to_string(),
        notification_url: format!("{backend_url}/webhook"),
        metadata: PreferenceMetadata {
            user_id: user_id.to_string(),
            plan_id: plan_id.to_string(),
        },
        statement_descriptor: STATEMENT_DESCRIPTOR.to_string(),
        external_reference: format!("{user_id}_{plan_id}_{timestamp_millis}"),
    }
}
