//! Trade submission - the client payload and its validation

use crate::error::{JournalError, Result};
use crate::types::{parse_clock_time, session_of, EmotionTag, Outcome, Screenshot, Trade};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Form fields for a new trade, as sent by the client.
///
/// Numeric fields arrive as text from form posts and as numbers from JSON
/// clients; both are accepted and validated in `into_trade`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeSubmission {
    #[serde(default)]
    pub date: Option<String>,
    pub symbol: String,
    pub entry_time: String,
    pub exit_time: String,
    #[serde(deserialize_with = "text_or_number")]
    pub entry_price: String,
    #[serde(deserialize_with = "text_or_number")]
    pub exit_price: String,
    pub outcome: Outcome,
    #[serde(deserialize_with = "text_or_number")]
    pub lot_size: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub strategy_used: String,
    pub emotion_tag: EmotionTag,
    #[serde(default)]
    pub screenshot_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    })
}

impl TradeSubmission {
    /// Minimum position size accepted
    pub fn min_lot_size() -> Decimal {
        Decimal::new(1, 2)
    }

    /// Validate the submission and build the record to persist.
    ///
    /// `uploaded` is the relative path of a screenshot saved for this
    /// submission; it takes precedence over a pasted URL.
    pub fn into_trade(self, uploaded: Option<String>) -> Result<Trade> {
        let date = match self.date.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| JournalError::Validation(format!("date '{}': {}", d, e)))?,
            _ => Local::now().date_naive(),
        };

        let symbol = self.symbol.trim().to_uppercase();

        let entry_time = parse_clock_time(&self.entry_time).map_err(into_validation)?;
        let exit_time = parse_clock_time(&self.exit_time).map_err(into_validation)?;

        let entry_price = positive_decimal("entry price", &self.entry_price)?;
        let exit_price = positive_decimal("exit price", &self.exit_price)?;

        let lot_size = parse_decimal("lot size", &self.lot_size)?;
        if lot_size < Self::min_lot_size() {
            return Err(JournalError::Validation(format!(
                "lot size {} is below the minimum of {}",
                lot_size,
                Self::min_lot_size()
            )));
        }

        let screenshot = match uploaded {
            Some(path) => Screenshot::File(path),
            None => pasted_screenshot(self.screenshot_url.as_deref())?,
        };

        Ok(Trade {
            date,
            symbol,
            entry_time,
            exit_time,
            entry_price,
            exit_price,
            outcome: self.outcome,
            lot_size,
            comments: self.comments,
            session: session_of(entry_time),
            strategy_used: self.strategy_used.trim().to_string(),
            emotion_tag: self.emotion_tag,
            screenshot,
        })
    }
}

/// A pasted link must read back as a link, so it has to pass `Screenshot::from_cell`
fn pasted_screenshot(url: Option<&str>) -> Result<Screenshot> {
    let url = url.map(str::trim).unwrap_or_default();
    match Screenshot::from_cell(url) {
        Screenshot::File(_) => Err(JournalError::Validation(format!(
            "screenshot link '{}' must start with http:// or https://",
            url
        ))),
        screenshot => Ok(screenshot),
    }
}

fn into_validation(e: JournalError) -> JournalError {
    match e {
        JournalError::Parse(msg) => JournalError::Validation(msg),
        other => other,
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| {
        JournalError::Validation(format!("{} '{}' is not a number", field, value))
    })
}

fn positive_decimal(field: &str, value: &str) -> Result<Decimal> {
    let parsed = parse_decimal(field, value)?;
    if parsed <= Decimal::ZERO {
        return Err(JournalError::Validation(format!(
            "{} must be positive, got {}",
            field, parsed
        )));
    }
    Ok(parsed)
}
