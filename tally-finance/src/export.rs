//! Output sinks for a finished ledger: flat CSV, and the sheet/batch layout a
//! spreadsheet uploader consumes.

use std::io::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::pipeline::Ledger;

pub const HEADER: [&str; 4] = ["date", "description", "amount", "category"];

/// Rows appended per spreadsheet request
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Write the ledger as CSV with a header row.
pub fn write_csv<W: Write>(ledger: &Ledger, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for row in &ledger.rows {
        wtr.write_record(row.columns())?;
    }
    wtr.flush()?;
    Ok(())
}

/// `Transactions_<YYYYMMDD>_<HHMMSS>`
pub fn sheet_title(at: NaiveDateTime) -> String {
    at.format("Transactions_%Y%m%d_%H%M%S").to_string()
}

/// A new sheet: title, header row, then data rows in append-sized batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetPlan {
    pub title: String,
    pub header: Vec<String>,
    pub batches: Vec<Vec<[String; 4]>>,
}

impl SheetPlan {
    pub fn new(ledger: &Ledger, at: NaiveDateTime, batch_size: usize) -> Self {
        let rows: Vec<[String; 4]> = ledger
            .rows
            .iter()
            .map(|r| r.columns().map(str::to_string))
            .collect();
        let batches = rows
            .chunks(batch_size.max(1))
            .map(<[[String; 4]]>::to_vec)
            .collect();
        Self {
            title: sheet_title(at),
            header: HEADER.iter().map(|h| h.to_string()).collect(),
            batches,
        }
    }

    pub fn row_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}
