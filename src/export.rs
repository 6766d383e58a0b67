//! Export - full trade log as CSV or an Excel workbook

use crate::error::Result;
use crate::journal::{write_csv, TRADE_LOG_HEADER};
use crate::types::{format_clock_time, Trade};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Workbook, Worksheet};

pub const CSV_FILE_NAME: &str = "trade_log.csv";
pub const XLSX_FILE_NAME: &str = "trade_log.xlsx";
pub const XLSX_SHEET_NAME: &str = "Trades";

/// UTF-8 CSV in the same column order as the trade log
pub fn to_csv_bytes(trades: &[Trade]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, trades)?;
    Ok(buffer)
}

/// Single-sheet workbook named "Trades" with the trade log columns
pub fn to_xlsx_bytes(trades: &[Trade]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET_NAME)?;

    for (col, title) in TRADE_LOG_HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }

    for (index, trade) in trades.iter().enumerate() {
        write_trade_row(sheet, index as u32 + 1, trade)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_trade_row(sheet: &mut Worksheet, row: u32, trade: &Trade) -> Result<()> {
    sheet.write_string(row, 0, trade.date.format("%Y-%m-%d").to_string())?;
    sheet.write_string(row, 1, trade.symbol.as_str())?;
    sheet.write_string(row, 2, format_clock_time(&trade.entry_time))?;
    sheet.write_string(row, 3, format_clock_time(&trade.exit_time))?;
    write_decimal(sheet, row, 4, trade.entry_price)?;
    write_decimal(sheet, row, 5, trade.exit_price)?;
    sheet.write_string(row, 6, trade.outcome.as_str())?;
    write_decimal(sheet, row, 7, trade.lot_size)?;
    sheet.write_string(row, 8, trade.comments.as_str())?;
    sheet.write_string(row, 9, trade.session.as_str())?;
    sheet.write_string(row, 10, trade.strategy_used.as_str())?;
    sheet.write_string(row, 11, trade.emotion_tag.as_str())?;
    sheet.write_string(row, 12, trade.screenshot.as_cell())?;
    Ok(())
}

fn write_decimal(sheet: &mut Worksheet, row: u32, col: u16, value: Decimal) -> Result<()> {
    match value.to_f64() {
        Some(number) => sheet.write_number(row, col, number)?,
        None => sheet.write_string(row, col, value.to_string())?,
    };
    Ok(())
}
