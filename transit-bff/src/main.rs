use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transit_bff::chat::LlmClient;
use transit_bff::config::AppConfig;
use transit_bff::stops::{FeedSource, StopService};
use transit_bff::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    if !config.llm.is_configured() {
        warn!("Azure OpenAI settings incomplete; /chat and /plan will fail");
    }

    // Stops load lazily on the first /stops request
    let feed = FeedSource::new(config.feed.clone()).expect("Failed to create feed client");
    let stops = StopService::new(feed);

    let llm = LlmClient::new(config.llm.clone()).expect("Failed to create LLM client");

    let state = AppState::new(stops, llm);
    let app = create_router(state, &config.allowed_origins);

    let addr = config.addr;
    info!("Transit Chat BFF listening on http://{addr}");
    info!("  GET  /health  - Health check");
    info!("  GET  /stops   - Stops, optionally within a bounding box");
    info!("  POST /chat    - Relay a conversation to the LLM");
    info!("  POST /plan    - Plan a trip with the LLM");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
