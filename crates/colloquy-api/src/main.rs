use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use colloquy_api::{build_router, config::Config, state::AppState, sweeper};
use colloquy_llm::{ChatClient, OpenAICompatibleClient};
use colloquy_store::{ConversationStore, InMemoryConversationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Colloquy API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!(
        base_url = %config.llm.base_url,
        model = %config.llm.model,
        "Initializing completion client"
    );
    let mut client_builder = OpenAICompatibleClient::builder()
        .base_url(&config.llm.base_url)
        .timeout(config.llm_timeout());
    if let Some(api_key) = &config.llm_api_key {
        client_builder = client_builder.api_key(api_key);
    }
    let llm_client: Arc<dyn ChatClient> = Arc::new(client_builder.build()?);

    let store_config = config.store_config();
    tracing::info!(
        max_history_messages = store_config.max_history_messages,
        idle_ttl_secs = store_config.idle_ttl.map(|ttl| ttl.as_secs()),
        max_conversations = store_config.max_conversations,
        turn_policy = ?config.conversation.turn_policy,
        "Initializing conversation store"
    );
    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new(store_config));

    let sweeper = config
        .sweep_interval()
        .map(|every| sweeper::spawn_eviction_sweeper(Arc::clone(&store), every));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store, llm_client));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
