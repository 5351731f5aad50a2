use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::core::catches::{CatchRecord, CatchStats, NewCatch};
use crate::interfaces::web::AppState;

pub async fn log_catch(
    State(state): State<AppState>,
    Json(payload): Json<NewCatch>,
) -> (StatusCode, Json<Value>) {
    let mut store = state.store.lock().await;
    match store.add(payload) {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Catch logged successfully! Total catches: {}", store.len()),
            })),
        ),
        Err(e) => {
            error!("failed to persist catch: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": format!("{e:#}") })),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct CatchQuery {
    species: Option<String>,
    location: Option<String>,
}

/// Unfiltered listing is date-descending; the filters keep insertion order.
pub async fn list_catches(
    State(state): State<AppState>,
    Query(query): Query<CatchQuery>,
) -> Json<Vec<CatchRecord>> {
    let store = state.store.lock().await;
    let catches = if let Some(species) = query.species.as_deref() {
        store.by_species(species)
    } else if let Some(location) = query.location.as_deref() {
        store.by_location(location)
    } else {
        store.all()
    };
    Json(catches)
}

pub async fn catch_stats(State(state): State<AppState>) -> Json<CatchStats> {
    let store = state.store.lock().await;
    Json(store.stats())
}
