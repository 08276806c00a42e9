mod csv_store;
mod memory;

pub use csv_store::CsvLedger;
pub use memory::MemoryLedger;

use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::LedgerRecord;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing file exists but cannot be read as the expected table.
    /// Fatal for the cycle; the file is left untouched.
    #[error("ledger store {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("revert requested on an empty ledger")]
    NothingToRevert,

    #[error("ledger store I/O failure at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only historical table of valuation snapshots.
///
/// Row order is insertion order is chronological order; nothing is keyed.
/// A missing backing file is the initial state, not an error.
pub trait LedgerStore<R: LedgerRecord>: Send + Sync {
    /// All rows, oldest first. Empty when the store does not exist yet.
    fn load(&self) -> Result<Vec<R>, LedgerError>;

    /// Stamps every row with the current wall-clock time (one shared
    /// timestamp per call), appends, and persists. Returns the timestamp.
    fn append(&self, rows: Vec<R>) -> Result<NaiveDateTime, LedgerError>;

    /// The last `n` rows in chronological order.
    fn tail(&self, n: usize) -> Result<Vec<R>, LedgerError>;

    /// Removes every row sharing the maximum timestamp and persists.
    ///
    /// This undoes exactly one prior `append`. If two appends landed in the
    /// same second their batches share a timestamp and both are removed;
    /// that coarseness is part of the contract. Returns rows removed.
    fn revert_last(&self) -> Result<usize, LedgerError>;
}

/// Shared revert arithmetic: drop all rows at the max timestamp.
fn drop_last_snapshot<R: LedgerRecord>(rows: &mut Vec<R>) -> Result<usize, LedgerError> {
    let last = rows
        .iter()
        .map(LedgerRecord::timestamp)
        .max()
        .ok_or(LedgerError::NothingToRevert)?;
    let before = rows.len();
    rows.retain(|row| row.timestamp() != last);
    Ok(before - rows.len())
}

fn tail_of<R: Clone>(rows: &[R], n: usize) -> Vec<R> {
    let start = rows.len().saturating_sub(n);
    rows[start..].to_vec()
}
