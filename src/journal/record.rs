//! On-disk row layout of the trade log

use crate::error::{JournalError, Result};
use crate::types::{format_clock_time, parse_clock_time, time_block_of, Screenshot, Trade};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Column names, in the order they are persisted
pub const TRADE_LOG_HEADER: [&str; 13] = [
    "Date",
    "Symbol",
    "Entry Time",
    "Exit Time",
    "Entry Price",
    "Exit Price",
    "Outcome",
    "Lot Size",
    "Comments",
    "Session",
    "Strategy Used",
    "Emotion Tag",
    "Screenshot",
];

/// Raw CSV row. Field order must match `TRADE_LOG_HEADER`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Entry Time")]
    pub entry_time: String,
    #[serde(rename = "Exit Time")]
    pub exit_time: String,
    #[serde(rename = "Entry Price")]
    pub entry_price: String,
    #[serde(rename = "Exit Price")]
    pub exit_price: String,
    #[serde(rename = "Outcome")]
    pub outcome: String,
    #[serde(rename = "Lot Size")]
    pub lot_size: String,
    #[serde(rename = "Comments")]
    pub comments: String,
    #[serde(rename = "Session")]
    pub session: String,
    #[serde(rename = "Strategy Used")]
    pub strategy_used: String,
    #[serde(rename = "Emotion Tag")]
    pub emotion_tag: String,
    #[serde(rename = "Screenshot")]
    pub screenshot: String,
}

impl From<&Trade> for TradeRow {
    fn from(trade: &Trade) -> Self {
        Self {
            date: trade.date.format("%Y-%m-%d").to_string(),
            symbol: trade.symbol.clone(),
            entry_time: format_clock_time(&trade.entry_time),
            exit_time: format_clock_time(&trade.exit_time),
            entry_price: trade.entry_price.to_string(),
            exit_price: trade.exit_price.to_string(),
            outcome: trade.outcome.to_string(),
            lot_size: trade.lot_size.to_string(),
            comments: trade.comments.clone(),
            session: trade.session.to_string(),
            strategy_used: trade.strategy_used.clone(),
            emotion_tag: trade.emotion_tag.to_string(),
            screenshot: trade.screenshot.as_cell().to_string(),
        }
    }
}

impl TryFrom<TradeRow> for Trade {
    type Error = JournalError;

    fn try_from(row: TradeRow) -> Result<Self> {
        // the stored entry time is what blocks are derived from
        time_block_of(row.entry_time.trim())?;

        Ok(Trade {
            date: NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
                .map_err(|e| JournalError::Parse(format!("invalid date '{}': {}", row.date, e)))?,
            symbol: row.symbol,
            entry_time: parse_clock_time(&row.entry_time)?,
            exit_time: parse_clock_time(&row.exit_time)?,
            entry_price: parse_decimal("Entry Price", &row.entry_price)?,
            exit_price: parse_decimal("Exit Price", &row.exit_price)?,
            outcome: row.outcome.parse()?,
            lot_size: parse_decimal("Lot Size", &row.lot_size)?,
            comments: row.comments,
            session: row.session.parse()?,
            strategy_used: row.strategy_used,
            emotion_tag: row.emotion_tag.parse()?,
            screenshot: Screenshot::from_cell(&row.screenshot),
        })
    }
}

fn parse_decimal(column: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| JournalError::Parse(format!("{} '{}' is not a number: {}", column, value, e)))
}
