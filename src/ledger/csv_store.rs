use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::{drop_last_snapshot, tail_of, LedgerError, LedgerStore};
use crate::clock::{Clock, SystemClock};
use crate::models::LedgerRecord;

/// CSV-backed ledger. The header row carries the column names; every persist
/// rewrites the full table, matching the append-then-rewrite behavior the
/// history files were produced with.
pub struct CsvLedger<R> {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    _record: PhantomData<fn() -> R>,
}

impl<R: LedgerRecord> CsvLedger<R> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            clock,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, source: csv::Error) -> LedgerError {
        LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        }
    }

    fn io(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn persist(&self, rows: &[R]) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| self.io(err))?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path).map_err(|err| self.corrupt(err))?;
        for row in rows {
            writer.serialize(row).map_err(|err| self.corrupt(err))?;
        }
        writer.flush().map_err(|err| self.io(err))?;
        Ok(())
    }
}

impl<R: LedgerRecord> LedgerStore<R> for CsvLedger<R> {
    fn load(&self) -> Result<Vec<R>, LedgerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|err| self.corrupt(err))?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record.map_err(|err| self.corrupt(err))?);
        }
        Ok(rows)
    }

    fn append(&self, mut rows: Vec<R>) -> Result<NaiveDateTime, LedgerError> {
        let timestamp = self.clock.now();
        for row in &mut rows {
            row.set_timestamp(timestamp);
        }

        let mut all = self.load()?;
        all.append(&mut rows);
        self.persist(&all)?;
        Ok(timestamp)
    }

    fn tail(&self, n: usize) -> Result<Vec<R>, LedgerError> {
        Ok(tail_of(&self.load()?, n))
    }

    fn revert_last(&self) -> Result<usize, LedgerError> {
        let mut rows = self.load()?;
        let removed = drop_last_snapshot(&mut rows)?;
        self.persist(&rows)?;
        Ok(removed)
    }
}
