//src/main.rs

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use calculo_certo::{config::AppState, docs::ApiDoc, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let app_state = AppState::new().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let port = app_state.config.port;
    tracing::info!(
        "🔑 Mercado Pago configurado: ✅ | 🔐 Webhook Secret: {}",
        if app_state.config.webhook_secret.is_some() { "✅" } else { "❌" }
    );

    // Rotas por usuário (o UID do provedor de identidade vai no caminho)
    let user_routes = Router::new()
        .route("/", post(handlers::profile::create_profile))
        .route("/{userId}", get(handlers::profile::get_profile))
        .route("/{userId}/calculator", put(handlers::calculator::save_calculator))
        .route(
            "/{userId}/settings",
            get(handlers::settings::get_settings)
                .put(handlers::settings::update_settings)
                .delete(handlers::settings::reset_settings),
        )
        .route(
            "/{userId}/quotes",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route("/{userId}/quotes/estimate", post(handlers::quotes::estimate_for_user))
        .route(
            "/{userId}/quotes/{quoteId}",
            patch(handlers::quotes::update_quote).delete(handlers::quotes::delete_quote),
        )
        .route("/{userId}/quotes/{quoteId}/complete", post(handlers::quotes::complete_quote))
        .route("/{userId}/subscription", get(handlers::payments::get_subscription))
        .route("/{userId}/subscription/cancel", post(handlers::payments::cancel_subscription));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/", get(handlers::status::root))
        .route("/api/health", get(handlers::status::health))
        .route("/api/calculator/hourly-rate", post(handlers::calculator::calculate_hourly_rate))
        .route("/api/quotes/estimate", post(handlers::quotes::estimate))
        .route("/api/plans", get(handlers::payments::list_plans))
        .route("/api/create-preference", post(handlers::payments::create_preference))
        .route("/api/payment/{id}", get(handlers::payments::get_payment))
        .route("/api/activate-subscription", get(handlers::payments::activate_subscription))
        .route("/webhook", post(handlers::webhook::receive_webhook))
        .nest("/api/users", user_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("🚀 Backend CálculoCerto escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
