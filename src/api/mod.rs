//! API module - Axum HTTP server and routes
//!
//! JSON endpoints for logging trades, reading history and analytics,
//! plus file exports and stored screenshots.

mod handlers;

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the main application router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let screenshots = ServeDir::new(&state.config.screenshot_dir);
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        // ==========================================
        // Health
        // ==========================================
        .route("/api/health", get(handlers::health_check))

        // ==========================================
        // Trade Log
        // ==========================================
        .route("/api/trades", get(handlers::get_trades))
        .route("/api/trades", post(handlers::create_trade))
        .route("/api/trades/upload", post(handlers::upload_trade))

        // ==========================================
        // Analytics
        // ==========================================
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/insights", get(handlers::get_insights))

        // ==========================================
        // Export
        // ==========================================
        .route("/api/export/csv", get(handlers::export_csv))
        .route("/api/export/xlsx", get(handlers::export_xlsx))

        // ==========================================
        // Stored screenshots
        // ==========================================
        .nest_service("/screenshots", screenshots)

        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app(dir: &TempDir) -> Router {
        let config = JournalConfig {
            trade_log_path: dir.path().join("trade_log.csv"),
            screenshot_dir: dir.path().join("screenshots"),
            ..JournalConfig::default()
        };
        let state = AppState::from_config(config).unwrap();
        create_router(Arc::new(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn submission(symbol: &str, entry_time: &str, outcome: &str) -> Value {
        serde_json::json!({
            "date": "2025-05-12",
            "symbol": symbol,
            "entry_time": entry_time,
            "exit_time": "23:00",
            "entry_price": "1.2710",
            "exit_price": "1.2755",
            "outcome": outcome,
            "lot_size": "0.20",
            "comments": "",
            "strategy_used": "Breakout",
            "emotion_tag": "Confident",
            "screenshot_url": ""
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get_json(&test_app(&dir), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_analytics_without_trades_reports_no_data() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get_json(&test_app(&dir), "/api/analytics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_data"], false);
        assert!(body.get("summary").is_none());
    }

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);

        let (status, body) = post_json(&app, "/api/trades", submission("gbpusd", "08:30", "Win")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["trade"]["session"], "London");
        assert_eq!(body["total_trades"], 1);

        post_json(&app, "/api/trades", submission("usdjpy", "14:10", "Loss")).await;

        let (status, body) = get_json(&app, "/api/trades").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["trades"][0]["symbol"], "USDJPY");
        assert_eq!(body["trades"][0]["time_block"], "14:00 - 16:00");
        assert_eq!(body["trades"][1]["symbol"], "GBPUSD");
        assert_eq!(body["trades"][1]["entry_time"], "08:30");
    }

    #[tokio::test]
    async fn test_invalid_submission_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);
        let mut payload = submission("EURUSD", "09:00", "Win");
        payload["lot_size"] = Value::from("0");

        let (status, body) = post_json(&app, "/api/trades", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (_, body) = get_json(&app, "/api/trades").await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_unknown_outcome_is_json_bad_request() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);

        let (status, body) =
            post_json(&app, "/api/trades", submission("EURUSD", "09:00", "Winner")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("outcome"), "{}", body);

        let (_, body) = get_json(&app, "/api/trades").await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_link_without_scheme_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);
        let mut payload = submission("EURUSD", "09:00", "Win");
        payload["screenshot_url"] = Value::from("www.tradingview.com/x/abc");

        let (status, body) = post_json(&app, "/api/trades", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_analytics_and_insights() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);
        post_json(&app, "/api/trades", submission("EURUSD", "08:05", "Win")).await;
        post_json(&app, "/api/trades", submission("EURUSD", "09:55", "Loss")).await;

        let (_, body) = get_json(&app, "/api/analytics").await;
        assert_eq!(body["has_data"], true);
        assert_eq!(body["summary"]["total_trades"], 2);
        assert_eq!(body["summary"]["win_rate"], 50.0);
        assert_eq!(body["summary"]["most_active_session"], "London");
        assert_eq!(body["win_rate_pivot"]["sessions"][0], "London");
        assert_eq!(body["win_rate_pivot"]["rows"][0]["time_block"], "08:00 - 10:00");
        assert_eq!(body["win_rate_pivot"]["rows"][0]["win_rates"][0], 50.0);

        let (_, body) = get_json(&app, "/api/insights").await;
        assert_eq!(body["top_zones"].as_array().unwrap().len(), 1);
        assert_eq!(body["top_strategies"][0]["strategy"], "Breakout");
        assert_eq!(body["top_strategies"][0]["wins"], 1);
    }

    #[tokio::test]
    async fn test_csv_export_download() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);
        post_json(&app, "/api/trades", submission("EURUSD", "08:05", "Win")).await;

        let request = Request::builder().uri("/api/export/csv").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().starts_with("2025-05-12,EURUSD,08:05,"));
    }

    #[tokio::test]
    async fn test_xlsx_export_download() {
        let dir = TempDir::new().unwrap();
        let request = Request::builder().uri("/api/export/xlsx").body(Body::empty()).unwrap();
        let (status, body) = send(&test_app(&dir), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_multipart_upload_stores_screenshot() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);

        let boundary = "journal-boundary";
        let mut body = String::new();
        let fields = [
            ("date", "2025-05-12"),
            ("symbol", "btcusd"),
            ("entry_time", "02:40"),
            ("exit_time", "03:15"),
            ("entry_price", "64000.5"),
            ("exit_price", "64410"),
            ("outcome", "Break-even"),
            ("lot_size", "0.05"),
            ("comments", "Asia range"),
            ("strategy_used", "Range Fade"),
            ("emotion_tag", "FOMO"),
            // a scheme-less link is fine when a file replaces it
            ("screenshot_url", "www.example.com/ignored.png"),
        ];
        for (name, value) in fields {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"screenshot_file\"; \
             filename=\"range.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
        ));

        let request = Request::builder()
            .method("POST")
            .uri("/api/trades/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["trade"]["session"], "Asia");
        assert_eq!(body["trade"]["outcome"], "Break-even");
        assert_eq!(body["trade"]["screenshot"]["kind"], "file");

        let stored = body["trade"]["screenshot"]["location"].as_str().unwrap();
        assert!(stored.ends_with("_range.png"));
        assert_eq!(std::fs::read(stored).unwrap(), b"PNGDATA");
    }
}
