mod handlers;
mod router;

pub use router::build_api_router;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::core::catches::CatchStore;
use crate::core::vision::SpotAnalyzer;

pub const SERVICE_NAME: &str = "FishCast API";
pub const AI_PROVIDER: &str = "Google AI Studio (Gemini)";

#[derive(Clone)]
pub struct AppState {
    /// The mutex serializes the store's load-mutate-save sequence; the
    /// backing file itself is still unsynchronized across processes.
    pub store: Arc<Mutex<CatchStore>>,
    pub analyzer: Arc<SpotAnalyzer>,
    pub api_configured: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(CatchStore::open(&config.catch_file))),
            analyzer: Arc::new(SpotAnalyzer::new(config.gemini_api_key.clone())),
            api_configured: config.api_configured(),
        }
    }
}
