use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::middleware::i18n::Locale;
use crate::services::payment_gateway::GatewayError;

// Nosso tipo de erro interno. Os handlers convertem em ApiError com o idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dados incompletos para criar a preferência")]
    MissingPreferenceFields,

    #[error("Dados incompletos para ativar a assinatura")]
    MissingActivationFields,

    #[error("Plano inválido")]
    InvalidPlan,

    #[error("Assinatura do webhook inválida")]
    InvalidSignature,

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Perfil já existe")]
    ProfileAlreadyExists,

    #[error("Orçamento não encontrado")]
    QuoteNotFound,

    #[error("Valor/hora ainda não calculado")]
    HourlyRateNotSet,

    #[error("Valores grandes demais para o cálculo")]
    AmountTooLarge,

    #[error("Limite mensal de orçamentos atingido ({limit})")]
    QuoteLimitReached { limit: i64 },

    #[error("Falha ao criar preferência: {0}")]
    PreferenceCreationFailed(GatewayError),

    #[error("Falha ao buscar pagamento: {0}")]
    PaymentLookupFailed(GatewayError),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// O erro que de fato vai para o cliente (já traduzido).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MissingPreferenceFields
            | AppError::MissingActivationFields
            | AppError::InvalidPlan
            | AppError::HourlyRateNotSet
            | AppError::AmountTooLarge => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::QuoteLimitReached { .. } => StatusCode::FORBIDDEN,
            AppError::ProfileNotFound | AppError::QuoteNotFound => StatusCode::NOT_FOUND,
            AppError::ProfileAlreadyExists => StatusCode::CONFLICT,
            AppError::PreferenceCreationFailed(_)
            | AppError::PaymentLookupFailed(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro na resposta final, com a mensagem no idioma pedido.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();
        let pick = |pt: &str, en_msg: &str| if en { en_msg.to_string() } else { pt.to_string() };

        let (message, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details = Map::new();
                collect_field_errors("", errors, &mut details);
                (
                    pick("Um ou mais campos são inválidos.", "One or more fields are invalid."),
                    Some(Value::Object(details)),
                )
            }
            AppError::MissingPreferenceFields => (
                pick(
                    "Dados incompletos. Envie: planId, userId, userEmail",
                    "Incomplete data. Send: planId, userId, userEmail",
                ),
                None,
            ),
            AppError::MissingActivationFields => (
                pick(
                    "Dados incompletos. Envie: userId, planId, paymentId",
                    "Incomplete data. Send: userId, planId, paymentId",
                ),
                None,
            ),
            AppError::InvalidPlan => (pick("Plano inválido", "Invalid plan"), None),
            // Resposta consumida pelo Mercado Pago, mantida fixa
            AppError::InvalidSignature => ("Invalid signature".to_string(), None),
            AppError::ProfileNotFound => (
                pick("Perfil de usuário não encontrado.", "User profile not found."),
                None,
            ),
            AppError::ProfileAlreadyExists => (
                pick("Este usuário já possui um perfil.", "This user already has a profile."),
                None,
            ),
            AppError::QuoteNotFound => (
                pick("Orçamento não encontrado.", "Quote not found."),
                None,
            ),
            AppError::HourlyRateNotSet => (
                pick(
                    "Primeiro calcule seu Valor/Hora na calculadora.",
                    "Calculate your hourly rate first.",
                ),
                None,
            ),
            AppError::AmountTooLarge => (
                pick(
                    "Os valores informados são grandes demais para calcular.",
                    "The values entered are too large to calculate.",
                ),
                None,
            ),
            AppError::QuoteLimitReached { limit } => (
                if en {
                    format!("Monthly limit of {limit} quotes reached. Upgrade your plan.")
                } else {
                    format!("Limite de {limit} orçamentos/mês atingido. Faça upgrade do plano.")
                },
                None,
            ),
            AppError::PreferenceCreationFailed(e) => {
                tracing::error!("❌ Erro ao criar preferência: {}", e);
                (
                    pick(
                        "Erro ao criar preferência de pagamento",
                        "Error creating payment preference",
                    ),
                    Some(json!(e.to_string())),
                )
            }
            AppError::PaymentLookupFailed(e) => {
                tracing::error!("❌ Erro ao buscar pagamento: {}", e);
                (
                    pick("Erro ao buscar pagamento", "Error fetching payment"),
                    Some(json!(e.to_string())),
                )
            }
            e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    pick("Ocorreu um erro inesperado.", "An unexpected error occurred."),
                    None,
                )
            }
        };

        ApiError {
            status: self.status(),
            message,
            details,
        }
    }
}

// Campos aninhados viram chaves com ponto: "timeFactors.creation" -> "time_factors.creation"
fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Map<String, Value>) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                out.insert(key, json!(messages));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{key}[{index}]"), inner, out);
                }
            }
        }
    }
}

// Para handlers que não recebem o Locale (ex.: webhook), usa o idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
