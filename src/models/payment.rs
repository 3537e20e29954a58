// src/models/payment.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::common::lenient;

// =============================================================================
//  CONTRATO COM O FRONTEND
// =============================================================================

// Campos opcionais: a ausência vira 400 "Dados incompletos", não 422.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferencePayload {
    #[schema(example = "pro")]
    pub plan_id: Option<String>,
    #[schema(example = "x8Yq2fVb1uZc")]
    pub user_id: Option<String>,
    #[schema(example = "designer@exemplo.com")]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceResponse {
    #[schema(example = "123456789-abc")]
    pub preference_id: String,
    pub init_point: Option<String>,
    pub sandbox_init_point: Option<String>,
}

/// Retrato do pagamento devolvido por GET /api/payment/{id}.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSnapshot {
    #[schema(example = "1234567890")]
    pub id: String,
    #[schema(example = "approved")]
    pub status: Option<String>,
    #[schema(example = "accredited")]
    pub status_detail: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Value,
    #[schema(value_type = Option<f64>, example = 29.0)]
    pub transaction_amount: Option<Decimal>,
    pub date_approved: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ActivateSubscriptionQuery {
    pub user_id: Option<String>,
    pub plan_id: Option<String>,
    pub payment_id: Option<String>,
}

// =============================================================================
//  CONTRATO COM O MERCADO PAGO
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub currency_id: String,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferencePayer {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceMetadata {
    pub user_id: String,
    pub plan_id: String,
}

/// Corpo de POST /checkout/preferences.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub payer: PreferencePayer,
    pub back_urls: BackUrls,
    pub auto_return: String,
    pub notification_url: String,
    pub metadata: PreferenceMetadata,
    pub statement_descriptor: String,
    pub external_reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceCreated {
    pub id: String,
    pub init_point: Option<String>,
    pub sandbox_init_point: Option<String>,
}

/// Recurso de pagamento (GET /v1/payments/{id}), só os campos que usamos.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorPayment {
    #[serde(default, deserialize_with = "lenient::optional_id")]
    pub id: Option<String>,
    pub status: Option<String>,
    pub status_detail: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub transaction_amount: Option<Decimal>,
    pub date_approved: Option<String>,
}

impl VendorPayment {
    pub fn is_approved(&self) -> bool {
        self.status.as_deref() == Some("approved")
    }

    fn metadata_str(&self, key: &str) -> Option<String> {
        self.metadata.get(key).and_then(lenient::id_from_value)
    }

    pub fn metadata_user_id(&self) -> Option<String> {
        self.metadata_str("user_id")
    }

    pub fn metadata_plan_id(&self) -> Option<String> {
        self.metadata_str("plan_id")
    }

    pub fn into_snapshot(self, requested_id: &str) -> PaymentSnapshot {
        PaymentSnapshot {
            id: self.id.unwrap_or_else(|| requested_id.to_string()),
            status: self.status,
            status_detail: self.status_detail,
            metadata: self.metadata,
            transaction_amount: self.transaction_amount,
            date_approved: self.date_approved,
        }
    }
}

// =============================================================================
//  NOTIFICAÇÃO DO WEBHOOK
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default, deserialize_with = "lenient::optional_id")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookNotification {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub action: Option<String>,
    #[serde(default)]
    pub data: WebhookData,
}

impl WebhookNotification {
    pub fn is_payment(&self) -> bool {
        self.kind.as_deref() == Some("payment")
    }
}
