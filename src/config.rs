use std::env;

/// The value shipped in the sample .env file; treated the same as no key.
pub const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub catch_file: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            catch_file: env::var("FISHCAST_CATCH_FILE")
                .unwrap_or_else(|_| "catches.json".to_string()),
            host: env::var("FISHCAST_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("FISHCAST_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }

    /// True iff a real key is present (set and not the sample placeholder).
    pub fn api_configured(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|key| key != PLACEHOLDER_API_KEY)
    }
}
