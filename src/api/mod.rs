//! Triage Board REST API
//!
//! HTTP API layer, built with Axum. The server keeps no records: each
//! request carries its dataset as a share token in the `data` query
//! parameter, and each response carries the token for the next link.
//!
//! # Endpoints
//!
//! ## Records
//! - `GET /api/v1/records` - List records (`?month=YYYY-MM` to filter)
//! - `POST /api/v1/records` - Create a record
//! - `DELETE /api/v1/records/:id` - Delete a record
//!
//! ## Dashboard
//! - `GET /api/v1/summary` - Month list and monthly summary
//! - `GET /api/v1/compare` - Compare records (`?ids=1,2`)
//! - `GET /api/v1/categories` - Risk category legend
//!
//! ## Export
//! - `GET /api/v1/export` - CSV spreadsheet
//!
//! ## Share
//! - `POST /api/v1/share/encode` - Encode records into a token and link
//! - `POST /api/v1/share/decode` - Decode a token or link
//!
//! ## Extraction
//! - `POST /api/v1/extract` - Parse an image-analysis reply into a record
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use triage_board::api::{serve, AppState};
//! use triage_board::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let state = AppState::new(config.api.clone(), config.share.clone());
//!     serve(state, &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Record routes
        .route("/records", get(routes::records::list_records))
        .route("/records", post(routes::records::create_record))
        .route("/records/:id", delete(routes::records::delete_record))
        // Dashboard routes
        .route("/summary", get(routes::summary::month_summary))
        .route("/compare", get(routes::summary::compare))
        .route("/categories", get(routes::summary::list_categories))
        // Export routes
        .route("/export", get(routes::export::export_csv))
        // Share routes
        .route("/share/encode", post(routes::share::encode_records))
        .route("/share/decode", post(routes::share::decode_token))
        // Extraction routes
        .route("/extract", post(routes::extract::extract_record));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_size);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Triage board API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Triage board API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TriageBoard;
    use crate::config::ShareConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let share = ShareConfig {
            public_url: "https://painel.example/".to_string(),
            ..Default::default()
        };
        build_router(AppState::new(ApiConfig::default(), share))
    }

    fn sample_token() -> String {
        TriageBoard::sample().to_token().unwrap()
    }

    async fn send(request: Request<Body>) -> Response {
        create_test_app().oneshot(request).await.unwrap()
    }

    async fn get(uri: &str) -> Response {
        send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(uri: &str, body: &str) -> Response {
        send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        assert_eq!(get("/health/live").await.status(), StatusCode::OK);
        assert_eq!(get("/health/ready").await.status(), StatusCode::OK);

        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_records_without_data_uses_sample() {
        let response = get("/api/v1/records").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["source"], "sample");
        assert_eq!(body["records"].as_array().unwrap().len(), 5);
        assert_eq!(body["token"], sample_token());
        assert!(body["share_url"]
            .as_str()
            .unwrap()
            .starts_with("https://painel.example/?data="));
    }

    #[tokio::test]
    async fn test_records_with_garbage_token_falls_back() {
        let body = json_body(get("/api/v1/records?data=not-a-valid-token").await).await;
        assert_eq!(body["source"], "sample");
    }

    #[tokio::test]
    async fn test_records_month_filter() {
        let uri = format!("/api/v1/records?data={}&month=2023-10", sample_token());
        let body = json_body(get(&uri).await).await;

        assert_eq!(body["source"], "shared");
        assert_eq!(body["format"], "compressed");
        let days: Vec<&str> = body["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["dia"].as_str().unwrap())
            .collect();
        assert_eq!(days.first(), Some(&"2023-10-05"));
        assert_eq!(days.last(), Some(&"2023-10-01"));

        let response = get("/api/v1/records?month=october").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_record() {
        let response = post_json(
            "/api/v1/records",
            r#"{"dia": "2023-10-06", "vermelho": 1, "verde": 9}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["record"]["total"], 10);
        assert_eq!(body["dataset"]["records"].as_array().unwrap().len(), 6);

        // The returned token carries the new record
        let token = body["dataset"]["token"].as_str().unwrap();
        let (board, _) = TriageBoard::from_token(Some(token));
        assert_eq!(board.len(), 6);
    }

    #[tokio::test]
    async fn test_create_record_invalid_json() {
        let response = post_json("/api/v1/records", "not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_record() {
        let uri = format!("/api/v1/records/3?data={}", sample_token());
        let response = send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["record"]["id"], "3");
        assert_eq!(body["dataset"]["records"].as_array().unwrap().len(), 4);

        let response = send(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/records/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "RECORD_NOT_FOUND");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_summary_defaults_to_latest_month() {
        let body = json_body(get("/api/v1/summary").await).await;
        assert_eq!(body["months"], serde_json::json!(["2023-10"]));
        assert_eq!(body["summary"]["month"], "2023-10");
        assert_eq!(body["summary"]["label"], "outubro de 2023");
        assert_eq!(body["summary"]["total"], 331);
    }

    #[tokio::test]
    async fn test_compare() {
        let body = json_body(get("/api/v1/compare?ids=4,1,nope").await).await;
        let ids: Vec<&str> = body["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(body["missing"], serde_json::json!(["nope"]));
    }

    #[tokio::test]
    async fn test_categories() {
        let body = json_body(get("/api/v1/categories").await).await;
        let categories = body.as_array().unwrap();
        assert_eq!(categories.len(), 5);
        assert_eq!(categories[1]["key"], "laranja");
        assert_eq!(categories[1]["label"], "Laranja (CRAI)");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let response = get("/api/v1/export").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("relatorio_triagem.csv"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Data,Vermelho,Laranja (CRAI),Amarelo,Verde,Azul,Total\n"));
        assert_eq!(text.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_share_encode_and_decode() {
        let records = serde_json::to_string(TriageBoard::sample().records()).unwrap();
        let response = post_json("/api/v1/share/encode", &format!(r#"{{"records": {}}}"#, records)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let share_url = body["share_url"].as_str().unwrap().to_string();
        assert_eq!(body["token"], sample_token());
        assert_eq!(body["link_length"], share_url.len());

        // Decoding accepts the whole link
        let response = post_json(
            "/api/v1/share/decode",
            &serde_json::json!({ "token": share_url }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["format"], "compressed");
        assert_eq!(body["legacy"], false);
        assert_eq!(body["records"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_share_encode_rejects_bad_total() {
        let response = post_json(
            "/api/v1/share/encode",
            r#"{"records": [{"id": "1", "dia": "2023-10-01", "vermelho": 1, "total": 5}]}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_share_decode_fails_closed() {
        let response = post_json("/api/v1/share/decode", r#"{"token": "not-a-valid-token!!"}"#).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "DECODE_ERROR");

        let response = post_json("/api/v1/share/decode", r#"{"token": "  "}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_preview_and_append() {
        let text = "```json\n{\"dia\": \"2023-10-06\", \"vermelho\": \"2\", \"azul\": 3}\n```";
        let body = serde_json::json!({ "text": text }).to_string();

        let preview = json_body(post_json("/api/v1/extract", &body).await).await;
        assert_eq!(preview["extracted"]["dia"], "2023-10-06");
        assert_eq!(preview["extracted"]["vermelho"], 2);
        assert!(preview.get("dataset").is_none());

        let body = serde_json::json!({ "text": text, "append": true }).to_string();
        let appended = json_body(post_json("/api/v1/extract", &body).await).await;
        assert_eq!(appended["record"]["total"], 5);
        assert_eq!(appended["dataset"]["records"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_extract_rejects_unreadable_reply() {
        let response = post_json("/api/v1/extract", r#"{"text": "sem dados"}"#).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
