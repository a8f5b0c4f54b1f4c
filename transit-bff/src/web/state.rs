//! Application state for the web layer.

use std::sync::Arc;

use crate::chat::LlmClient;
use crate::stops::StopService;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Stop queries over the cached GTFS feed
    pub stops: Arc<StopService>,

    /// LLM relay for chat and trip planning
    pub llm: Arc<LlmClient>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(stops: StopService, llm: LlmClient) -> Self {
        Self {
            stops: Arc::new(stops),
            llm: Arc::new(llm),
        }
    }
}
