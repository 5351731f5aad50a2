use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use super::AppState;
use super::handlers::{analyze, catches, forecast, status};

/// Above the 10 MiB image cap so oversize uploads reach the handler's own
/// size check instead of axum's body limit.
const BODY_LIMIT: usize = 12 * 1024 * 1024;

pub fn build_api_router(state: AppState) -> Router {
    // The API is open by policy, mirroring the browser clients it serves.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(status::index))
        .route("/health", get(status::health))
        .route("/api/status", get(status::api_status))
        .route("/api/analyze", post(analyze::analyze_endpoint))
        .route(
            "/api/catches",
            get(catches::list_catches).post(catches::log_catch),
        )
        .route("/api/catches/stats", get(catches::catch_stats))
        .route("/api/forecast", post(forecast::forecast_endpoint))
        .route(
            "/api/forecast/extended",
            post(forecast::extended_forecast_endpoint),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catches::CatchStore;
    use crate::core::vision::SpotAnalyzer;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::Mutex;
    use tower::util::ServiceExt;

    fn test_state(dir: &TempDir, analyzer: SpotAnalyzer, api_configured: bool) -> AppState {
        AppState {
            store: Arc::new(Mutex::new(CatchStore::open(
                dir.path().join("catches.json"),
            ))),
            analyzer: Arc::new(analyzer),
            api_configured,
        }
    }

    fn unconfigured_state(dir: &TempDir) -> AppState {
        test_state(dir, SpotAnalyzer::new(None), false)
    }

    async fn json_request(
        app: Router,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
            None => Body::empty(),
        };
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body_bytes = axum::body::to_bytes(resp.into_body(), 16 * 1024 * 1024)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));
        (status, json)
    }

    fn multipart_request(
        path: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Request<Body> {
        let boundary = "fishcast-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn sample_catch(species: &str, location: &str, date: &str) -> Value {
        json!({
            "species": species,
            "bait": "nightcrawler",
            "location": location,
            "date": date,
            "time": "06:30",
        })
    }

    #[tokio::test]
    async fn health_reports_service_and_configuration() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let (status, json) = json_request(app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "FishCast API");
        assert_eq!(json["ai_provider"], "Google AI Studio (Gemini)");
        assert_eq!(json["api_configured"], false);
    }

    #[tokio::test]
    async fn api_status_links_setup_when_unconfigured() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let (status, json) = json_request(app, Method::GET, "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["api_configured"], false);
        assert!(json["setup_url"].as_str().unwrap().contains("aistudio"));
    }

    #[tokio::test]
    async fn api_status_omits_setup_url_when_configured() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, SpotAnalyzer::new(Some("key".to_string())), true);
        let app = build_api_router(state);
        let (_, json) = json_request(app, Method::GET, "/api/status", None).await;
        assert_eq!(json["api_configured"], true);
        assert!(json.get("setup_url").is_none());
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let (status, json) = json_request(app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["endpoints"].get("POST /api/analyze").is_some());
    }

    #[tokio::test]
    async fn log_and_list_catches_roundtrip() {
        let dir = TempDir::new().unwrap();
        let state = unconfigured_state(&dir);

        let app = build_api_router(state.clone());
        let (status, json) = json_request(
            app,
            Method::POST,
            "/api/catches",
            Some(sample_catch("Bass", "Blue Lake", "2024-01-01")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Catch logged successfully! Total catches: 1");

        let app = build_api_router(state.clone());
        json_request(
            app,
            Method::POST,
            "/api/catches",
            Some(sample_catch("Trout", "Snake River", "2024-02-01")),
        )
        .await;

        let app = build_api_router(state);
        let (status, json) = json_request(app, Method::GET, "/api/catches", None).await;
        assert_eq!(status, StatusCode::OK);
        let catches = json.as_array().unwrap();
        assert_eq!(catches.len(), 2);
        // Newest date first.
        assert_eq!(catches[0]["species"], "Trout");
        assert_eq!(catches[1]["species"], "Bass");
        assert!(catches[0]["logged_at"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn list_catches_supports_filters() {
        let dir = TempDir::new().unwrap();
        let state = unconfigured_state(&dir);

        for body in [
            sample_catch("Bass", "Blue Lake", "2024-01-01"),
            sample_catch("Trout", "Snake River", "2024-02-01"),
        ] {
            let app = build_api_router(state.clone());
            json_request(app, Method::POST, "/api/catches", Some(body)).await;
        }

        let app = build_api_router(state.clone());
        let (_, json) = json_request(app, Method::GET, "/api/catches?species=bass", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["species"], "Bass");

        let app = build_api_router(state);
        let (_, json) = json_request(app, Method::GET, "/api/catches?location=lake", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["location"], "Blue Lake");
    }

    #[tokio::test]
    async fn catch_stats_endpoint_aggregates() {
        let dir = TempDir::new().unwrap();
        let state = unconfigured_state(&dir);

        for body in [
            sample_catch("Bass", "Blue Lake", "2024-01-01"),
            sample_catch("Bass", "Blue Lake", "2024-01-02"),
            sample_catch("Trout", "Snake River", "2024-02-01"),
        ] {
            let app = build_api_router(state.clone());
            json_request(app, Method::POST, "/api/catches", Some(body)).await;
        }

        let app = build_api_router(state);
        let (status, json) = json_request(app, Method::GET, "/api/catches/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_catches"], 3);
        assert_eq!(json["species_count"], 2);
        assert_eq!(json["most_common_species"], "Bass");
        assert_eq!(json["species_breakdown"]["Bass"], 2);
    }

    #[tokio::test]
    async fn malformed_catch_body_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let (status, _) = json_request(
            app,
            Method::POST,
            "/api/catches",
            Some(json!({ "species": "Bass" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn forecast_returns_a_full_report() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let (status, json) = json_request(
            app,
            Method::POST,
            "/api/forecast",
            Some(json!({ "location": "Blue Lake", "latitude": 44.0, "longitude": -121.3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["location"], "Blue Lake");
        let score = json["bite_score"].as_i64().unwrap();
        assert!((1..=10).contains(&score));
        let label = json["activity_level"].as_str().unwrap();
        assert!(["Poor", "Fair", "Good", "Excellent"].contains(&label));
        assert!(json["barometric_pressure"].as_str().unwrap().ends_with("inHg"));
    }

    #[tokio::test]
    async fn extended_forecast_defaults_to_a_week() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let (status, json) = json_request(
            app,
            Method::POST,
            "/api/forecast/extended",
            Some(json!({ "location": "Blue Lake" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reports = json.as_array().unwrap();
        assert_eq!(reports.len(), 7);
        assert!(reports[0]["day_name"].as_str().is_some());
    }

    #[tokio::test]
    async fn analyze_rejects_non_image_uploads() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let req = multipart_request("/api/analyze", "notes.txt", "text/plain", b"not an image");
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "File must be an image");
    }

    #[tokio::test]
    async fn analyze_rejects_oversize_images() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let oversized = vec![0u8; 11 * 1024 * 1024];
        let req = multipart_request("/api/analyze", "big.jpg", "image/jpeg", &oversized);
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Image too large (max 10MB)");
    }

    #[tokio::test]
    async fn analyze_without_key_returns_setup_guidance_inline() {
        // Provider-side outcomes are 200s with the explanation in the payload.
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let req = multipart_request("/api/analyze", "spot.jpg", "image/jpeg", b"jpegbytes");
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!(
            json["recommendation"]
                .as_str()
                .unwrap()
                .contains("GEMINI_API_KEY not configured")
        );
    }

    #[tokio::test]
    async fn analyze_relays_the_provider_recommendation() {
        let stub = Router::new().route(
            "/models/{model_call}",
            axum::routing::post(|| async {
                axum::Json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "Cast toward the weed line." }] } }]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, stub).await.unwrap();
        });

        let dir = TempDir::new().unwrap();
        let analyzer =
            SpotAnalyzer::with_base_url(Some("key".to_string()), format!("http://{addr}"));
        let app = build_api_router(test_state(&dir, analyzer, true));

        let req = multipart_request("/api/analyze", "spot.jpg", "image/jpeg", b"jpegbytes");
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["filename"], "spot.jpg");
        assert_eq!(json["api_provider"], "Google AI Studio (Gemini)");
        assert_eq!(
            json["recommendation"],
            "[Using gemini-2.5-pro] Cast toward the weed line."
        );
    }

    #[tokio::test]
    async fn analyze_requires_a_file_field() {
        let dir = TempDir::new().unwrap();
        let app = build_api_router(unconfigured_state(&dir));
        let boundary = "fishcast-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
