//! Application entry point

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard_api::llm::{LlmAnalyzer, OllamaClient};
use phishguard_api::ml::{ModelRegistry, Predictor};
use phishguard_api::{config::Config, create_router, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishguard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let registry = Arc::new(ModelRegistry::load(Path::new(&config.models_dir)));
    let availability = registry.availability();
    if !availability.all_loaded() {
        tracing::warn!(
            "Running degraded: url={} text={} hybrid={}",
            availability.url,
            availability.text,
            availability.hybrid
        );
    }
    let predictor = Arc::new(Predictor::new(registry, config.whois()));

    let client = OllamaClient::new(
        &config.ollama_base_url,
        &config.ollama_model,
        config.llm_timeout(),
    );
    let llm = Arc::new(LlmAnalyzer::new(client));

    let state = AppState {
        pool,
        config: config.clone(),
        predictor,
        llm,
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Phishing Detection API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
