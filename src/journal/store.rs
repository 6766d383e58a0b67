//! Trade store - the CSV trade log on disk
//!
//! No cross-process locking: one writer is assumed.

use super::record::{TradeRow, TRADE_LOG_HEADER};
use crate::error::{JournalError, Result};
use crate::types::Trade;
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create the trade log with only its header row if it does not exist yet.
///
/// Returns `true` when a new file was created. An existing file is never touched.
pub fn initialize(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    write_csv(file, &[])?;
    info!("Created trade log at {}", path.display());
    Ok(true)
}

/// Read every trade in file order
pub fn load(path: &Path) -> Result<Vec<Trade>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    let headers = reader.headers()?;
    if headers.iter().ne(TRADE_LOG_HEADER.iter().copied()) {
        return Err(JournalError::Malformed(format!(
            "{}: unexpected header {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut trades = Vec::new();
    for (index, row) in reader.deserialize::<TradeRow>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let line = index + 2;
        let row = row.map_err(|e| match e.kind() {
            csv::ErrorKind::UnequalLengths { .. } => {
                JournalError::Malformed(format!("{} line {}: {}", path.display(), line, e))
            }
            _ => JournalError::Csv(e),
        })?;
        let trade = Trade::try_from(row).map_err(|e| match e {
            JournalError::Parse(msg) => {
                JournalError::Parse(format!("{} line {}: {}", path.display(), line, msg))
            }
            other => other,
        })?;
        trades.push(trade);
    }

    debug!("Loaded {} trades from {}", trades.len(), path.display());
    Ok(trades)
}

/// Add one trade to the end of the log.
///
/// The full updated set is written to a sibling file which then replaces the
/// log, so earlier rows and the header are preserved byte-for-byte in content.
pub fn append(path: &Path, trade: &Trade) -> Result<usize> {
    let mut trades = load(path)?;
    trades.push(trade.clone());

    let tmp_path = temp_path_for(path);
    let file = fs::File::create(&tmp_path)?;
    if let Err(e) = write_csv(file, &trades) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    replace_with(&tmp_path, path)?;

    Ok(trades.len())
}

/// Move `tmp_path` over `path`; on failure the temp file is removed
fn replace_with(tmp_path: &Path, path: &Path) -> Result<()> {
    if let Err(e) = fs::rename(tmp_path, path) {
        let _ = fs::remove_file(tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Write the header followed by one row per trade
pub fn write_csv<W: Write>(writer: W, trades: &[Trade]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(TRADE_LOG_HEADER)?;
    for trade in trades {
        wtr.serialize(TradeRow::from(trade))?;
    }
    wtr.flush()?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Handle on the trade log with writes serialized inside this process
pub struct TradeStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TradeStore {
    /// Open the trade log, creating it with a header if absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !initialize(&path)? {
            info!("Using existing trade log at {}", path.display());
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Trade>> {
        load(&self.path)
    }

    /// Append a trade, returning the new total
    pub fn append(&self, trade: &Trade) -> Result<usize> {
        let _guard = self.write_lock.lock();
        let total = append(&self.path, trade)?;
        info!(
            "Logged trade #{}: {} {} ({})",
            total, trade.date, trade.symbol, trade.outcome
        );
        Ok(total)
    }
}
