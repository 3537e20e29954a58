// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::mpsc;

use crate::{
    db::{ProfileRepository, QuoteRepository, SettingsRepository, SubscriptionRepository},
    services::{
        payment_gateway::{MercadoPagoClient, PaymentGateway, DEFAULT_API_BASE},
        payment_service::PaymentService,
        profile_service::ProfileService,
        quote_service::QuoteService,
        subscription_service::SubscriptionService,
        webhook_worker::{PaymentNotification, WebhookWorker, QUEUE_CAPACITY},
    },
};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_PAYMENT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_WEBHOOK_MAX_ATTEMPTS: u32 = 3;
const WEBHOOK_BACKOFF: Duration = Duration::from_secs(1);

/// Configuração lida do ambiente (.env).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub access_token: String,
    pub webhook_secret: Option<String>,
    pub api_base_url: String,
    pub frontend_url: String,
    pub backend_url: String,
    pub port: u16,
    pub payment_timeout: Duration,
    pub webhook_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte de variáveis.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Variável vazia conta como ausente
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let access_token =
            var("MERCADO_PAGO_ACCESS_TOKEN").context("MERCADO_PAGO_ACCESS_TOKEN deve ser definido")?;

        let port = match var("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT inválida: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let payment_timeout_secs = match var("PAYMENT_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PAYMENT_TIMEOUT_SECS inválido: {raw}"))?,
            None => DEFAULT_PAYMENT_TIMEOUT_SECS,
        };

        let webhook_max_attempts = match var("WEBHOOK_MAX_ATTEMPTS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("WEBHOOK_MAX_ATTEMPTS inválido: {raw}"))?,
            None => DEFAULT_WEBHOOK_MAX_ATTEMPTS,
        };

        Ok(Self {
            database_url,
            access_token,
            webhook_secret: var("MERCADO_PAGO_WEBHOOK_SECRET"),
            api_base_url: var("MERCADO_PAGO_API_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            frontend_url: var("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            backend_url: var("BACKEND_URL").unwrap_or_else(|| format!("http://localhost:{port}")),
            port,
            payment_timeout: Duration::from_secs(payment_timeout_secs),
            webhook_max_attempts,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub profile_service: ProfileService,
    pub quote_service: QuoteService,
    pub subscription_service: SubscriptionService,
    pub payment_service: PaymentService,
    // Entrada da fila consumida pelo worker de webhooks
    pub notifications: mpsc::Sender<PaymentNotification>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let gateway: Arc<dyn PaymentGateway> = Arc::new(
            MercadoPagoClient::new(&config.api_base_url, &config.access_token, config.payment_timeout)
                .context("Falha ao criar o cliente do Mercado Pago")?,
        );

        let (state, rx) = Self::build(config, db_pool, gateway);
        state.webhook_worker().spawn(rx);

        Ok(state)
    }

    /// Monta o gráfico de dependências (repositórios -> serviços -> estado).
    /// Devolve também o lado receptor da fila de webhooks.
    pub fn build(
        config: Config,
        db_pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
    ) -> (Self, mpsc::Receiver<PaymentNotification>) {
        let profile_repo = ProfileRepository::new();
        let settings_repo = SettingsRepository::new();
        let quote_repo = QuoteRepository::new();
        let subscription_repo = SubscriptionRepository::new();

        let profile_service = ProfileService::new(
            profile_repo.clone(),
            settings_repo.clone(),
            subscription_repo.clone(),
        );
        let quote_service = QuoteService::new(
            quote_repo,
            profile_repo.clone(),
            settings_repo,
            subscription_repo.clone(),
        );
        let subscription_service = SubscriptionService::new(subscription_repo, profile_repo);
        let payment_service =
            PaymentService::new(gateway.clone(), &config.frontend_url, &config.backend_url);

        let (notifications, rx) = mpsc::channel(QUEUE_CAPACITY);

        let state = Self {
            db_pool,
            config: Arc::new(config),
            gateway,
            profile_service,
            quote_service,
            subscription_service,
            payment_service,
            notifications,
        };

        (state, rx)
    }

    pub fn webhook_worker(&self) -> WebhookWorker {
        WebhookWorker::new(
            self.gateway.clone(),
            self.subscription_service.clone(),
            self.db_pool.clone(),
            self.config.webhook_max_attempts,
            WEBHOOK_BACKOFF,
        )
    }
}
