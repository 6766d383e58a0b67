//! SmartJournal - trading journal backend
//!
//! Provides:
//! - Append-only CSV trade log
//! - Session and 2-hour time-block classification
//! - Win-rate analytics (summary, breakdowns, pivots, top zones/strategies)
//! - CSV and Excel export
//! - Axum HTTP API over all of the above

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod journal;
pub mod types;

use crate::config::JournalConfig;
use crate::error::Result;
use crate::journal::{ScreenshotStore, TradeStore};

/// Application state shared across all handlers
pub struct AppState {
    pub config: JournalConfig,
    pub store: TradeStore,
    pub screenshots: ScreenshotStore,
}

impl AppState {
    /// Open the trade log and screenshot directory named in the config
    pub fn from_config(config: JournalConfig) -> Result<Self> {
        let store = TradeStore::open(&config.trade_log_path)?;
        let screenshots = ScreenshotStore::new(&config.screenshot_dir)?;
        Ok(Self {
            config,
            store,
            screenshots,
        })
    }
}
