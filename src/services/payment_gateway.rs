// src/services/payment_gateway.rs
//
// Cliente mínimo da API REST do Mercado Pago (https://api.mercadopago.com)
// Autorização: Bearer <ACCESS_TOKEN>

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::payment::{PreferenceCreated, PreferenceRequest, VendorPayment};

pub const DEFAULT_API_BASE: &str = "https://api.mercadopago.com";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("erro http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("erro da API do Mercado Pago status={status} body={body}")]
    Api { status: u16, body: String },

    #[error("resposta inválida: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Falhas de rede, 429 e 5xx podem passar sozinhas; o resto se repetiria igual.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) => false,
        }
    }
}

/// Tudo o que o backend precisa do provedor de pagamentos.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceCreated, GatewayError>;

    async fn get_payment(&self, payment_id: &str) -> Result<VendorPayment, GatewayError>;
}

#[derive(Clone)]
pub struct MercadoPagoClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MercadoPagoClient {
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceCreated, GatewayError> {
        let url = format!("{}/checkout/preferences", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn get_payment(&self, payment_id: &str) -> Result<VendorPayment, GatewayError> {
        // O id vem da URL/webhook; só dígitos e letras chegam à API
        if payment_id.is_empty() || !payment_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GatewayError::InvalidResponse(format!(
                "id de pagamento inválido: {payment_id}"
            )));
        }

        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
