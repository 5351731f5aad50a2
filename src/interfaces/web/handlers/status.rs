use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::interfaces::web::{AI_PROVIDER, AppState, SERVICE_NAME};

/// Service index. The original project served an HTML landing page here;
/// the informational role stays, the presentation does not.
pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "ai_provider": AI_PROVIDER,
        "api_configured": state.api_configured,
        "endpoints": {
            "GET /health": "Health check",
            "GET /api/status": "AI provider configuration status",
            "POST /api/analyze": "Upload a fishing spot image for casting advice",
            "POST /api/catches": "Log a catch",
            "GET /api/catches": "List catches (optional ?species= or ?location= filter)",
            "GET /api/catches/stats": "Catch statistics",
            "POST /api/forecast": "Fishing forecast for a location",
            "POST /api/forecast/extended": "Multi-day fishing forecast",
        },
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "ai_provider": AI_PROVIDER,
        "api_configured": state.api_configured,
    }))
}

pub async fn api_status(State(state): State<AppState>) -> Json<Value> {
    if state.api_configured {
        Json(json!({
            "api_configured": true,
            "message": "Google AI Studio is configured and ready.",
        }))
    } else {
        Json(json!({
            "api_configured": false,
            "message": "GEMINI_API_KEY is not configured. Image analysis will return setup instructions.",
            "setup_url": "https://aistudio.google.com/app/apikey",
        }))
    }
}
