//! API request handlers
//!
//! All endpoint handlers for the journal API.

use crate::analytics::{self, derive_fields, TOP_N};
use crate::error::JournalError;
use crate::export::{self, CSV_FILE_NAME, XLSX_FILE_NAME};
use crate::journal::{TradeSubmission, UploadedScreenshot};
use crate::types::{Screenshot, Trade};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

const SCREENSHOT_FIELD: &str = "screenshot_file";
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ==========================================
// Response Helpers
// ==========================================

pub fn error_response(error: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "success": false,
            "error": error
        }))
    ).into_response()
}

pub fn bad_request(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "success": false,
            "error": error
        }))
    ).into_response()
}

fn journal_error(e: JournalError) -> Response {
    if e.is_client_error() {
        warn!("Rejected trade: {}", e);
        bad_request(&e.to_string())
    } else {
        error!("Journal operation failed: {}", e);
        error_response(&e.to_string())
    }
}

fn attachment(content_type: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ).into_response()
}

// ==========================================
// Health
// ==========================================

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "smart_journal",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ==========================================
// Trade Log Handlers
// ==========================================

pub async fn get_trades(
    State(state): State<Arc<AppState>>,
) -> Response {
    match load_trades(&state).await {
        Ok(trades) => {
            let mut history = derive_fields(&trades);
            history.reverse();
            Json(serde_json::json!({
                "success": true,
                "count": history.len(),
                "trades": history
            })).into_response()
        }
        Err(e) => journal_error(e),
    }
}

pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TradeSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected trade payload: {}", rejection.body_text());
            return bad_request(&format!("Invalid trade: {}", rejection.body_text()));
        }
    };

    match submission.into_trade(None) {
        Ok(trade) => save_trade(state, trade).await,
        Err(e) => journal_error(e),
    }
}

/// Multipart variant of `create_trade` that may carry a screenshot file
pub async fn upload_trade(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut fields = serde_json::Map::new();
    let mut upload: Option<UploadedScreenshot> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(&format!("Invalid form data: {}", e)),
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == SCREENSHOT_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            match field.bytes().await {
                // an empty file input is sent with no file name
                Ok(_) if file_name.is_empty() => {}
                Ok(bytes) => {
                    upload = Some(UploadedScreenshot {
                        file_name,
                        bytes: bytes.to_vec(),
                    })
                }
                Err(e) => return bad_request(&format!("Failed to read screenshot: {}", e)),
            }
        } else {
            match field.text().await {
                Ok(value) => {
                    fields.insert(name, serde_json::Value::String(value));
                }
                Err(e) => return bad_request(&format!("Failed to read field '{}': {}", name, e)),
            }
        }
    }

    let mut submission: TradeSubmission = match serde_json::from_value(fields.into()) {
        Ok(s) => s,
        Err(e) => return bad_request(&format!("Invalid trade form: {}", e)),
    };
    if upload.is_some() {
        // the uploaded file replaces any pasted link
        submission.screenshot_url = None;
    }

    // validate the fields before anything touches the screenshot directory
    let mut trade = match submission.into_trade(None) {
        Ok(trade) => trade,
        Err(e) => return journal_error(e),
    };

    if let Some(upload) = upload {
        let saver = Arc::clone(&state);
        let saved = run_blocking(move || {
            saver.screenshots.save(&upload, Local::now().naive_local())
        })
        .await;
        match saved {
            Ok(path) => trade.screenshot = Screenshot::File(path),
            Err(e) => return journal_error(e),
        }
    }

    save_trade(state, trade).await
}

async fn save_trade(state: Arc<AppState>, trade: Trade) -> Response {
    let record = trade.clone();
    match run_blocking(move || state.store.append(&record)).await {
        Ok(total) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": true,
                "message": "Trade logged successfully",
                "total_trades": total,
                "trade": trade
            })),
        ).into_response(),
        Err(e) => journal_error(e),
    }
}

/// Store I/O is blocking `std::fs`, so keep it off the async workers
async fn run_blocking<T, F>(task: F) -> Result<T, JournalError>
where
    F: FnOnce() -> Result<T, JournalError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| JournalError::Io(std::io::Error::other(e)))?
}

async fn load_trades(state: &Arc<AppState>) -> Result<Vec<Trade>, JournalError> {
    let state = Arc::clone(state);
    run_blocking(move || state.store.load()).await
}

// ==========================================
// Analytics Handlers
// ==========================================

pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
) -> Response {
    let trades = match load_trades(&state).await {
        Ok(trades) => trades,
        Err(e) => return journal_error(e),
    };

    match analytics::analyze(&trades) {
        Some(report) => Json(serde_json::json!({
            "has_data": true,
            "summary": report.summary,
            "block_breakdown": report.block_breakdown,
            "win_rate_pivot": report.win_rate_pivot
        })).into_response(),
        None => Json(serde_json::json!({
            "has_data": false,
            "message": "No trades recorded yet for analytics."
        })).into_response(),
    }
}

pub async fn get_insights(
    State(state): State<Arc<AppState>>,
) -> Response {
    let trades = match load_trades(&state).await {
        Ok(trades) => trades,
        Err(e) => return journal_error(e),
    };

    let zones = analytics::zone_win_rates(&derive_fields(&trades));
    let top_zones = analytics::top_zones(&zones, TOP_N);
    let top_strategies = analytics::top_strategies(&trades, TOP_N);

    info!(
        "Insights computed over {} trades: {} zones, {} strategies",
        trades.len(),
        top_zones.len(),
        top_strategies.len()
    );

    Json(serde_json::json!({
        "has_data": !trades.is_empty(),
        "top_zones": top_zones,
        "top_strategies": top_strategies,
        "tip": "Focus on these zones with your best-performing strategies."
    })).into_response()
}

// ==========================================
// Export Handlers
// ==========================================

pub async fn export_csv(
    State(state): State<Arc<AppState>>,
) -> Response {
    match load_trades(&state).await.and_then(|trades| export::to_csv_bytes(&trades)) {
        Ok(bytes) => attachment("text/csv; charset=utf-8", CSV_FILE_NAME, bytes),
        Err(e) => journal_error(e),
    }
}

pub async fn export_xlsx(
    State(state): State<Arc<AppState>>,
) -> Response {
    match load_trades(&state).await.and_then(|trades| export::to_xlsx_bytes(&trades)) {
        Ok(bytes) => attachment(XLSX_CONTENT_TYPE, XLSX_FILE_NAME, bytes),
        Err(e) => journal_error(e),
    }
}
