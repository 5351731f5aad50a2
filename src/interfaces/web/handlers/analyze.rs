use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::info;

use crate::interfaces::web::{AI_PROVIDER, AppState};

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// `POST /api/analyze` — multipart upload with a single `file` field.
///
/// Validation failures are 400s; provider-side outcomes (missing key,
/// quota, safety block) come back as 200 with the explanation in
/// `recommendation`, so the UI renders them inline.
pub async fn analyze_endpoint(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((filename, content_type, bytes));
                        break;
                    }
                    Err(e) => return bad_request(format!("Failed to read upload: {e}")),
                }
            }
            Ok(None) => break,
            Err(e) => return bad_request(format!("Malformed multipart body: {e}")),
        }
    }

    let Some((filename, content_type, bytes)) = upload else {
        return bad_request("Missing file field".to_string());
    };
    if !content_type.starts_with("image/") {
        return bad_request("File must be an image".to_string());
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return bad_request("Image too large (max 10MB)".to_string());
    }

    info!("analyzing fishing spot image {filename} ({} bytes)", bytes.len());
    let recommendation = state.analyzer.analyze(&bytes).await;

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "recommendation": recommendation,
            "filename": filename,
            "api_provider": AI_PROVIDER,
        })),
    )
}

fn bad_request(error: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": error })),
    )
}
