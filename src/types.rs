//! Type definitions for the trading journal
//!
//! Trade records, their enumerated fields and the two time classifiers
//! (session of day and 2-hour time block).

use crate::error::{JournalError, Result};
use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Session
// ==========================================

/// Trading session bucket derived from the entry time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Session {
    Asia,
    London,
    #[serde(rename = "New York")]
    NewYork,
    #[serde(rename = "Off Hours")]
    OffHours,
}

impl Session {
    pub const ALL: [Session; 4] = [
        Session::Asia,
        Session::London,
        Session::NewYork,
        Session::OffHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Asia => "Asia",
            Session::London => "London",
            Session::NewYork => "New York",
            Session::OffHours => "Off Hours",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Session {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        Session::ALL
            .into_iter()
            .find(|session| session.as_str() == s.trim())
            .ok_or_else(|| JournalError::Parse(format!("unknown session '{}'", s)))
    }
}

/// Classify a time of day into its trading session.
///
/// Hours 0-7 are Asia, 8-12 London, 13-21 New York, 22-23 Off Hours.
pub fn session_of(time: NaiveTime) -> Session {
    match time.hour() {
        0..=7 => Session::Asia,
        8..=12 => Session::London,
        13..=21 => Session::NewYork,
        _ => Session::OffHours,
    }
}

// ==========================================
// Time Block
// ==========================================

/// One of the twelve 2-hour buckets of the day, keyed by its starting hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBlock {
    start_hour: u8,
}

impl TimeBlock {
    /// Block containing the given hour (0-23)
    pub fn from_hour(hour: u8) -> Self {
        Self {
            start_hour: (hour / 2) * 2,
        }
    }

    pub fn containing(time: NaiveTime) -> Self {
        // hour() is always < 24
        Self::from_hour(time.hour() as u8)
    }

    pub fn start_hour(&self) -> u8 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u8 {
        self.start_hour + 2
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00 - {:02}:00", self.start_hour, self.end_hour())
    }
}

impl Serialize for TimeBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Derive the 2-hour block label from an `HH:MM` entry time as stored in the log.
///
/// Only the hour component is read; it must be exactly two digits in 0-23.
/// Loading checks every row's Entry Time with this; typed trades use
/// `TimeBlock::containing`, which agrees for every valid hour.
pub fn time_block_of(entry_time: &str) -> Result<TimeBlock> {
    let hour_part = entry_time.split(':').next().unwrap_or_default();

    if hour_part.len() != 2 || !hour_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(JournalError::Parse(format!(
            "entry time '{}' does not start with a two-digit hour",
            entry_time
        )));
    }

    let hour: u8 = hour_part
        .parse()
        .map_err(|e| JournalError::Parse(format!("entry time '{}': {}", entry_time, e)))?;
    if hour > 23 {
        return Err(JournalError::Parse(format!(
            "entry time '{}' has hour {} outside 00-23",
            entry_time, hour
        )));
    }

    Ok(TimeBlock::from_hour(hour))
}

// ==========================================
// Clock times
// ==========================================

/// Parse `HH:MM` (or `HH:MM:SS`) and drop anything below the minute
pub fn parse_clock_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    let time = NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| JournalError::Parse(format!("invalid time '{}': {}", s, e)))?;
    Ok(truncate_to_minute(time))
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

pub fn format_clock_time(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn serialize_clock_time<S: Serializer>(
    time: &NaiveTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M"))
}

// ==========================================
// Outcome & Emotion
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    #[serde(rename = "Break-even")]
    BreakEven,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Win, Outcome::Loss, Outcome::BreakEven];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::BreakEven => "Break-even",
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        Outcome::ALL
            .into_iter()
            .find(|outcome| outcome.as_str() == s.trim())
            .ok_or_else(|| JournalError::Parse(format!("unknown outcome '{}'", s)))
    }
}

/// Emotional state tagged on a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionTag {
    Confident,
    Fearful,
    Revenge,
    #[serde(rename = "FOMO")]
    Fomo,
    Calm,
    Disciplined,
    Frustrated,
    Hopeful,
    Greedy,
    Other,
}

impl EmotionTag {
    pub const ALL: [EmotionTag; 10] = [
        EmotionTag::Confident,
        EmotionTag::Fearful,
        EmotionTag::Revenge,
        EmotionTag::Fomo,
        EmotionTag::Calm,
        EmotionTag::Disciplined,
        EmotionTag::Frustrated,
        EmotionTag::Hopeful,
        EmotionTag::Greedy,
        EmotionTag::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Confident => "Confident",
            EmotionTag::Fearful => "Fearful",
            EmotionTag::Revenge => "Revenge",
            EmotionTag::Fomo => "FOMO",
            EmotionTag::Calm => "Calm",
            EmotionTag::Disciplined => "Disciplined",
            EmotionTag::Frustrated => "Frustrated",
            EmotionTag::Hopeful => "Hopeful",
            EmotionTag::Greedy => "Greedy",
            EmotionTag::Other => "Other",
        }
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionTag {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        EmotionTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s.trim())
            .ok_or_else(|| JournalError::Parse(format!("unknown emotion tag '{}'", s)))
    }
}

// ==========================================
// Screenshot
// ==========================================

/// Where a trade's chart screenshot lives, if anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum Screenshot {
    None,
    /// Pasted link, stored verbatim
    Url(String),
    /// Uploaded image, stored as a path relative to the working directory
    File(String),
}

impl Screenshot {
    /// Classify a stored cell: empty is none, `http...` is a link, anything else a file path
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            Screenshot::None
        } else if cell.starts_with("http") {
            Screenshot::Url(cell.to_string())
        } else {
            Screenshot::File(cell.to_string())
        }
    }

    pub fn as_cell(&self) -> &str {
        match self {
            Screenshot::None => "",
            Screenshot::Url(url) => url,
            Screenshot::File(path) => path,
        }
    }
}

// ==========================================
// Trade
// ==========================================

/// One logged trade, in persisted column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub symbol: String,
    #[serde(serialize_with = "serialize_clock_time")]
    pub entry_time: NaiveTime,
    #[serde(serialize_with = "serialize_clock_time")]
    pub exit_time: NaiveTime,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub outcome: Outcome,
    pub lot_size: Decimal,
    pub comments: String,
    pub session: Session,
    pub strategy_used: String,
    pub emotion_tag: EmotionTag,
    pub screenshot: Screenshot,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.outcome.is_win()
    }

    pub fn time_block(&self) -> TimeBlock {
        TimeBlock::containing(self.entry_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_session_covers_every_hour() {
        for hour in 0..24 {
            let session = session_of(at(hour, 30));
            assert!(Session::ALL.contains(&session), "hour {} unclassified", hour);
        }
    }

    #[test]
    fn test_session_boundaries() {
        assert_eq!(session_of(at(0, 0)), Session::Asia);
        assert_eq!(session_of(at(7, 59)), Session::Asia);
        assert_eq!(session_of(at(8, 0)), Session::London);
        assert_eq!(session_of(at(12, 59)), Session::London);
        assert_eq!(session_of(at(13, 0)), Session::NewYork);
        assert_eq!(session_of(at(21, 59)), Session::NewYork);
        assert_eq!(session_of(at(22, 0)), Session::OffHours);
        assert_eq!(session_of(at(23, 59)), Session::OffHours);
    }

    #[test]
    fn test_time_block_labels() {
        assert_eq!(time_block_of("07:15").unwrap().to_string(), "06:00 - 08:00");
        assert_eq!(time_block_of("23:59").unwrap().to_string(), "22:00 - 24:00");
        assert_eq!(time_block_of("00:00").unwrap().to_string(), "00:00 - 02:00");
        assert_eq!(time_block_of("14:05").unwrap().to_string(), "14:00 - 16:00");
    }

    #[test]
    fn test_time_block_twelve_buckets() {
        let mut blocks: Vec<TimeBlock> = (0..24).map(TimeBlock::from_hour).collect();
        blocks.dedup();
        assert_eq!(blocks.len(), 12);
    }

    #[test]
    fn test_time_block_rejects_bad_hours() {
        assert!(matches!(time_block_of("24:00"), Err(JournalError::Parse(_))));
        assert!(matches!(time_block_of("7:15"), Err(JournalError::Parse(_))));
        assert!(matches!(time_block_of("ab:15"), Err(JournalError::Parse(_))));
        assert!(matches!(time_block_of(""), Err(JournalError::Parse(_))));
    }

    #[test]
    fn test_time_block_matches_typed_form() {
        for hour in 0..24u32 {
            let label = format!("{:02}:45", hour);
            assert_eq!(time_block_of(&label).unwrap(), TimeBlock::containing(at(hour, 45)));
        }
    }

    #[test]
    fn test_parse_clock_time_truncates_seconds() {
        assert_eq!(parse_clock_time("09:30").unwrap(), at(9, 30));
        assert_eq!(parse_clock_time("09:30:45").unwrap(), at(9, 30));
        assert!(parse_clock_time("noon").is_err());
    }

    #[test]
    fn test_enum_labels_round_trip() {
        for session in Session::ALL {
            assert_eq!(session.as_str().parse::<Session>().unwrap(), session);
        }
        for outcome in Outcome::ALL {
            assert_eq!(outcome.as_str().parse::<Outcome>().unwrap(), outcome);
        }
        for tag in EmotionTag::ALL {
            assert_eq!(tag.as_str().parse::<EmotionTag>().unwrap(), tag);
        }
        assert!("Scalping".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_screenshot_classification() {
        assert_eq!(Screenshot::from_cell(""), Screenshot::None);
        assert_eq!(
            Screenshot::from_cell("https://www.tradingview.com/x/abc"),
            Screenshot::Url("https://www.tradingview.com/x/abc".to_string())
        );
        assert_eq!(
            Screenshot::from_cell("screenshots/20250101_093000_chart.png"),
            Screenshot::File("screenshots/20250101_093000_chart.png".to_string())
        );
    }
}
