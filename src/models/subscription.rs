// src/models/subscription.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Duração de um ciclo pago (não há renovação/expiração automática).
pub const BILLING_CYCLE_DAYS: i64 = 30;

/// Limite mensal de orçamentos para quem não tem plano pago ativo.
pub const FREE_MONTHLY_QUOTES: i64 = 10;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plan_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    #[default]
    Free,
    Pro,
    Agency,
}

impl PlanId {
    pub fn parse(raw: &str) -> Option<PlanId> {
        match raw.trim().to_lowercase().as_str() {
            "free" => Some(PlanId::Free),
            "pro" => Some(PlanId::Pro),
            "agency" => Some(PlanId::Agency),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Pro => "pro",
            PlanId::Agency => "agency",
        }
    }

    /// Só os planos pagos passam pelo checkout.
    pub fn is_purchasable(&self) -> bool {
        !matches!(self, PlanId::Free)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Inactive,
    Canceled,
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[schema(example = "1234567890")]
    pub payment_id: Option<String>,
}

impl Subscription {
    /// Estado de um perfil recém-criado.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            plan: PlanId::Free,
            status: SubscriptionStatus::Inactive,
            start_date: Some(now),
            end_date: None,
            payment_id: None,
        }
    }

    /// inactive --(pagamento aprovado)--> active, por um ciclo de 30 dias.
    pub fn activated(plan: PlanId, payment_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            plan,
            status: SubscriptionStatus::Active,
            start_date: Some(now),
            end_date: Some(now + Duration::days(BILLING_CYCLE_DAYS)),
            payment_id: Some(payment_id.to_string()),
        }
    }

    /// Cancelar volta para o plano gratuito (ativo).
    pub fn cancelled(now: DateTime<Utc>) -> Self {
        Self {
            plan: PlanId::Free,
            status: SubscriptionStatus::Active,
            start_date: Some(now),
            end_date: None,
            payment_id: None,
        }
    }

    pub fn has_paid_plan(&self) -> bool {
        self.status == SubscriptionStatus::Active && self.plan.is_purchasable()
    }

    /// None = orçamentos ilimitados.
    pub fn monthly_quote_limit(&self) -> Option<i64> {
        if self.has_paid_plan() {
            None
        } else {
            Some(FREE_MONTHLY_QUOTES)
        }
    }
}

// =============================================================================
//  CATÁLOGO DE PLANOS
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    #[schema(example = "Plano Pro")]
    pub title: String,
    #[schema(example = "Orçamentos profissionais")]
    pub description: String,
    #[schema(value_type = f64, example = 29.0)]
    pub price: Decimal,
    #[schema(example = "BRL")]
    pub currency: String,
    pub monthly_quote_limit: Option<i64>,
    pub features: Vec<String>,
}

impl Plan {
    pub fn get(id: PlanId) -> Plan {
        let (title, description, price, limit, features): (&str, &str, Decimal, Option<i64>, Vec<&str>) = match id {
            PlanId::Free => (
                "Grátis",
                "Para começar a precificar",
                Decimal::ZERO,
                Some(FREE_MONTHLY_QUOTES),
                vec![
                    "Cálculo de valor/hora",
                    "Até 10 orçamentos/mês",
                    "Gestão básica de clientes",
                    "Salvamento na nuvem",
                    "Suporte por email",
                ],
            ),
            PlanId::Pro => (
                "Plano Pro",
                "Orçamentos profissionais",
                Decimal::new(2900, 2),
                None,
                vec![
                    "Tudo do plano Grátis",
                    "Orçamentos ilimitados",
                    "Relatórios avançados",
                    "Exportação em PDF",
                    "Suporte prioritário",
                    "Sem marca d'água",
                ],
            ),
            PlanId::Agency => (
                "Plano Agência",
                "Recursos avançados para agências",
                Decimal::new(9900, 2),
                None,
                vec![
                    "Tudo do plano Pro",
                    "Múltiplos usuários",
                    "Marca personalizada",
                    "API de integração",
                    "Suporte 24/7",
                    "Treinamento incluído",
                ],
            ),
        };

        Plan {
            id,
            title: title.to_string(),
            description: description.to_string(),
            price,
            currency: "BRL".to_string(),
            monthly_quote_limit: limit,
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn catalog() -> Vec<Plan> {
        [PlanId::Free, PlanId::Pro, PlanId::Agency]
            .into_iter()
            .map(Plan::get)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn approved_payment_activates_for_thirty_days() {
        let sub = Subscription::activated(PlanId::Pro, "98765", now());
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.plan, PlanId::Pro);
        assert_eq!(sub.payment_id.as_deref(), Some("98765"));
        assert_eq!(sub.end_date.unwrap() - sub.start_date.unwrap(), Duration::days(30));
        assert!(sub.has_paid_plan());
        assert_eq!(sub.monthly_quote_limit(), None);
    }

    #[test]
    fn cancelling_moves_to_active_free_plan() {
        let sub = Subscription::cancelled(now());
        assert_eq!(sub.plan, PlanId::Free);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.end_date, None);
        assert_eq!(sub.payment_id, None);
        assert_eq!(sub.monthly_quote_limit(), Some(FREE_MONTHLY_QUOTES));
    }

    #[test]
    fn new_profiles_start_inactive_on_free() {
        let sub = Subscription::initial(now());
        assert_eq!(sub.plan, PlanId::Free);
        assert_eq!(sub.status, SubscriptionStatus::Inactive);
        assert!(!sub.has_paid_plan());
    }

    #[test]
    fn canceled_paid_plan_is_limited() {
        let sub = Subscription {
            status: SubscriptionStatus::Canceled,
            ..Subscription::activated(PlanId::Agency, "1", now())
        };
        assert_eq!(sub.monthly_quote_limit(), Some(FREE_MONTHLY_QUOTES));
    }

    #[test]
    fn plan_ids_parse_case_insensitively() {
        assert_eq!(PlanId::parse("PRO"), Some(PlanId::Pro));
        assert_eq!(PlanId::parse(" agency "), Some(PlanId::Agency));
        assert_eq!(PlanId::parse("enterprise"), None);
        assert!(!PlanId::Free.is_purchasable());
    }

    #[test]
    fn catalog_lists_paid_prices() {
        let catalog = Plan::catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(Plan::get(PlanId::Pro).price, Decimal::from(29));
        assert_eq!(Plan::get(PlanId::Agency).price, Decimal::from(99));
        assert_eq!(Plan::get(PlanId::Free).monthly_quote_limit, Some(10));
    }
}
