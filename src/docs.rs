// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "CálculoCerto API", description = "Valor/hora, orçamentos e assinaturas"),
    paths(
        // --- Status ---
        handlers::status::root,
        handlers::status::health,

        // --- Calculadora ---
        handlers::calculator::calculate_hourly_rate,
        handlers::calculator::save_calculator,

        // --- Orçamentos ---
        handlers::quotes::estimate,
        handlers::quotes::estimate_for_user,
        handlers::quotes::create_quote,
        handlers::quotes::list_quotes,
        handlers::quotes::update_quote,
        handlers::quotes::complete_quote,
        handlers::quotes::delete_quote,

        // --- Usuários ---
        handlers::profile::create_profile,
        handlers::profile::get_profile,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::reset_settings,

        // --- Pagamentos / Assinatura ---
        handlers::payments::list_plans,
        handlers::payments::create_preference,
        handlers::payments::get_payment,
        handlers::payments::activate_subscription,
        handlers::payments::get_subscription,
        handlers::payments::cancel_subscription,
        handlers::webhook::receive_webhook,
    ),
    components(
        schemas(
            // --- Calculadora ---
            models::calculator::CostItem,
            models::calculator::CalculatorInputs,
            models::calculator::HourlyRateBreakdown,

            // --- Orçamentos ---
            models::quote::Complexity,
            models::quote::CommercialUse,
            models::quote::QuoteStatus,
            models::quote::TimeFactors,
            models::quote::PriceModifiers,
            models::quote::PriceRange,
            models::quote::SavedQuote,
            models::quote::EstimateRequest,
            models::quote::UserEstimateRequest,
            models::quote::PriceEstimate,
            models::quote::CreateQuotePayload,
            models::quote::UpdateQuotePayload,

            // --- Configurações ---
            models::settings::ComplexityMultipliers,
            models::settings::CommercialUseMultipliers,
            models::settings::PricingSettings,
            models::settings::ComplexityOverrides,
            models::settings::CommercialUseOverrides,
            models::settings::UpdateSettingsRequest,

            // --- Usuários ---
            models::profile::UserProfile,
            models::profile::CreateProfilePayload,

            // --- Assinatura ---
            models::subscription::PlanId,
            models::subscription::SubscriptionStatus,
            models::subscription::Subscription,
            models::subscription::Plan,

            // --- Pagamentos ---
            models::payment::CreatePreferencePayload,
            models::payment::PreferenceResponse,
            models::payment::PaymentSnapshot,
        )
    ),
    tags(
        (name = "Status", description = "Saúde do servidor"),
        (name = "Calculadora", description = "Cálculo do valor/hora"),
        (name = "Orçamentos", description = "Estimativas e orçamentos salvos"),
        (name = "Usuários", description = "Perfil do usuário"),
        (name = "Configurações", description = "Multiplicadores de precificação"),
        (name = "Pagamentos", description = "Checkout e webhook do Mercado Pago"),
        (name = "Assinatura", description = "Plano do usuário")
    )
)]
pub struct ApiDoc;
