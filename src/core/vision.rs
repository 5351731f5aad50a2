use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PLACEHOLDER_API_KEY;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Tried in order; availability failures on one model advance to the next.
const MODEL_CHAIN: [&str; 2] = ["gemini-2.5-pro", "gemini-2.5-flash"];

const CASTING_PROMPT: &str = "Based on this fishing spot image, where should I cast my line? \
    Consider shade, visible cover, and fish-holding structure.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SETUP_MESSAGE: &str = "Error: GEMINI_API_KEY not configured properly.\n\n\
    To fix this:\n\
    1. Go to https://aistudio.google.com/app/apikey\n\
    2. Create a free API key\n\
    3. Add it to your .env file: GEMINI_API_KEY=your_actual_api_key\n\
    4. Restart the application\n\n\
    The free tier includes generous limits for testing.";

const SAFETY_BLOCKED_MESSAGE: &str =
    "The image was blocked by safety filters. Please try a different fishing spot image.";

const UNEXPECTED_FORMAT_MESSAGE: &str =
    "Error: Unexpected response format from Google AI Studio API.";

const NO_ANALYSIS_MESSAGE: &str = "Error: No analysis generated. The image might not be \
    suitable for analysis or was filtered for safety reasons.";

const QUOTA_MESSAGE: &str = "Error: API quota exceeded.\n\n\
    You have reached the free tier limit for Google AI Studio. Please wait a few minutes \
    and try again, or come back tomorrow for your daily quota to reset.";

const BAD_KEY_MESSAGE: &str = "Error: API key is invalid or doesn't have permission.\n\n\
    Please check:\n\
    1. Your GEMINI_API_KEY in the .env file is correct\n\
    2. The API key is enabled for the Gemini API\n\
    3. You haven't exceeded your quota limits\n\n\
    Get a new API key at: https://aistudio.google.com/app/apikey";

const ALL_MODELS_FAILED_MESSAGE: &str = "Error: All Gemini models failed. Please try again \
    later or check your API configuration.";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    error: Option<GeminiErrorDetail>,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: Option<String>,
}

/// Outcome of one model attempt. The driver loop advances to the next
/// model only on `Retry`; policy, quota, credential and safety failures
/// are `Terminal` because another model cannot change them.
enum Attempt {
    Success(String),
    Terminal(String),
    Retry,
}

/// Client for the Gemini multimodal endpoint. `analyze` is total: every
/// failure path becomes a descriptive message, so the web layer only
/// relays strings.
pub struct SpotAnalyzer {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl SpotAnalyzer {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    /// The base URL is injectable so tests can point the chain at a
    /// scripted in-process server.
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("building HTTP client"),
        }
    }

    /// Callers validate content type and size before invoking; this only
    /// handles the provider conversation.
    pub async fn analyze(&self, image: &[u8]) -> String {
        let api_key = match self.api_key.as_deref() {
            Some(key) if key != PLACEHOLDER_API_KEY => key,
            _ => return SETUP_MESSAGE.to_string(),
        };

        let payload = build_request(image);
        for model in MODEL_CHAIN {
            match self.try_model(model, api_key, &payload).await {
                Attempt::Success(text) => return text,
                Attempt::Terminal(message) => return message,
                Attempt::Retry => continue,
            }
        }
        ALL_MODELS_FAILED_MESSAGE.to_string()
    }

    async fn try_model(&self, model: &str, api_key: &str, payload: &GeminiRequest) -> Attempt {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let res = match self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(payload)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!("model {model} unreachable, trying next: {e}");
                return Attempt::Retry;
            }
        };

        match res.status() {
            StatusCode::OK => classify_candidates(model, res).await,
            StatusCode::NOT_FOUND => {
                info!("model {model} not available, trying next");
                Attempt::Retry
            }
            StatusCode::TOO_MANY_REQUESTS => Attempt::Terminal(QUOTA_MESSAGE.to_string()),
            StatusCode::BAD_REQUEST => {
                let detail = match res.json::<GeminiErrorBody>().await {
                    Ok(body) => body
                        .error
                        .and_then(|e| e.message)
                        .unwrap_or_else(|| "Bad request".to_string()),
                    Err(_) => "Invalid request format".to_string(),
                };
                Attempt::Terminal(format!(
                    "Error: Invalid request to Google AI Studio API. {detail}"
                ))
            }
            StatusCode::FORBIDDEN => Attempt::Terminal(BAD_KEY_MESSAGE.to_string()),
            status => {
                warn!("model {model} failed with status {status}, trying next");
                Attempt::Retry
            }
        }
    }
}

async fn classify_candidates(model: &str, res: reqwest::Response) -> Attempt {
    let parsed: GeminiResponse = match res.json().await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("model {model} returned an unparseable body, trying next: {e}");
            return Attempt::Retry;
        }
    };

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Attempt::Terminal(NO_ANALYSIS_MESSAGE.to_string());
    };

    let text = candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.clone());
    if let Some(text) = text {
        return Attempt::Success(format!("[Using {model}] {text}"));
    }

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Attempt::Terminal(SAFETY_BLOCKED_MESSAGE.to_string());
    }
    Attempt::Terminal(UNEXPECTED_FORMAT_MESSAGE.to_string())
}

fn build_request(image: &[u8]) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![
                GeminiPart {
                    text: Some(CASTING_PROMPT.to_string()),
                    inline_data: None,
                },
                GeminiPart {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: "image/jpeg".to_string(),
                        data: BASE64.encode(image),
                    }),
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1000,
        },
        safety_settings: [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_MEDIUM_AND_ABOVE",
        })
        .collect(),
    }
}
