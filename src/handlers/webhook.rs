// src/handlers/webhook.rs

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    config::AppState,
    models::payment::WebhookNotification,
    services::{webhook_signature, webhook_worker::PaymentNotification},
};

pub const SIGNATURE_HEADER: &str = "x-signature";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// POST /webhook
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "Pagamentos",
    request_body(content = String, description = "Notificação do Mercado Pago ({type, data: {id}})"),
    params(
        ("x-signature" = Option<String>, Header, description = "ts=<unix>,v1=<hmac hex>"),
        ("x-request-id" = Option<String>, Header, description = "ID da requisição do Mercado Pago")
    ),
    responses(
        (status = 200, description = "Notificação recebida"),
        (status = 401, description = "Invalid signature")
    )
)]
pub async fn receive_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Corpo ilegível vira notificação vazia: não há o que processar, mas respondemos 200
    let notification: WebhookNotification = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::warn!("⚠️ Corpo do webhook ilegível: {}", e);
        WebhookNotification::default()
    });

    tracing::info!(
        "📥 Webhook recebido: type={:?} action={:?} id={:?}",
        notification.kind,
        notification.action,
        notification.data.id
    );

    let request_id = header_str(&headers, REQUEST_ID_HEADER);

    match app_state.config.webhook_secret.as_deref() {
        Some(secret) => {
            let verified = webhook_signature::verify(
                secret,
                notification.data.id.as_deref().unwrap_or_default(),
                request_id.unwrap_or_default(),
                header_str(&headers, SIGNATURE_HEADER),
            );
            if let Err(e) = verified {
                tracing::error!("❌ Webhook signature inválida");
                return e.into_response();
            }
        }
        None => tracing::warn!("⚠️ MERCADO_PAGO_WEBHOOK_SECRET ausente: assinatura não verificada"),
    }

    if let (true, Some(payment_id)) = (notification.is_payment(), notification.data.id) {
        let job = PaymentNotification {
            payment_id,
            request_id: request_id.map(str::to_string),
        };
        match app_state.notifications.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                tracing::error!("❌ Fila de webhooks cheia, pagamento {} descartado", job.payment_id)
            }
            Err(TrySendError::Closed(job)) => {
                tracing::error!("❌ Worker de webhooks parado, pagamento {} descartado", job.payment_id)
            }
        }
    }

    // O Mercado Pago espera a resposta em poucos segundos; o resto fica com o worker
    StatusCode::OK.into_response()
}

