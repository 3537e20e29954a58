// src/services/webhook_signature.rs

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Conteúdo do cabeçalho `x-signature`: `ts=<unix>,v1=<hex>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub ts: String,
    pub v1: String,
}

impl SignatureHeader {
    /// As partes podem vir em qualquer ordem; as duas são obrigatórias.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut ts = None;
        let mut v1 = None;

        for part in raw.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "ts" => ts = Some(value.trim().to_string()),
                "v1" => v1 = Some(value.trim().to_string()),
                _ => {}
            }
        }

        match (ts, v1) {
            (Some(ts), Some(v1)) if !ts.is_empty() && !v1.is_empty() => Some(Self { ts, v1 }),
            _ => None,
        }
    }
}

/// `id:<payment_id>;request-id:<request_id>;ts:<ts>;`
pub fn manifest(data_id: &str, request_id: &str, ts: &str) -> String {
    format!("id:{data_id};request-id:{request_id};ts:{ts};")
}

/// Confere a assinatura de uma notificação. Comparação em tempo constante.
pub fn verify(
    secret: &str,
    data_id: &str,
    request_id: &str,
    signature_header: Option<&str>,
) -> Result<(), AppError> {
    let header = signature_header
        .and_then(SignatureHeader::parse)
        .ok_or(AppError::InvalidSignature)?;

    let expected = hex::decode(&header.v1).map_err(|_| AppError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::InvalidSignature)?;
    mac.update(manifest(data_id, request_id, &header.ts).as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| AppError::InvalidSignature)
}
