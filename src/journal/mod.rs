//! Journal module - CSV-backed trade log and screenshot storage
//!
//! The trade log is append-only. Rows are written in a fixed 13-column
//! layout and read back into typed `Trade` values.

mod record;
mod screenshots;
mod store;
mod submission;

pub use record::TRADE_LOG_HEADER;
pub use screenshots::{ScreenshotStore, UploadedScreenshot};
pub use store::{append, initialize, load, write_csv, TradeStore};
pub use submission::TradeSubmission;
