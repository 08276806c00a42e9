//! In-memory ledger for tests.

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;

use super::{drop_last_snapshot, tail_of, LedgerError, LedgerStore};
use crate::clock::{Clock, SystemClock};
use crate::models::LedgerRecord;

pub struct MemoryLedger<R> {
    rows: Mutex<Vec<R>>,
    clock: Arc<dyn Clock>,
}

impl<R: LedgerRecord> MemoryLedger<R> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock,
        }
    }
}

impl<R: LedgerRecord> Default for MemoryLedger<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LedgerRecord> LedgerStore<R> for MemoryLedger<R> {
    fn load(&self) -> Result<Vec<R>, LedgerError> {
        Ok(self.rows.lock().expect("ledger lock poisoned").clone())
    }

    fn append(&self, mut incoming: Vec<R>) -> Result<NaiveDateTime, LedgerError> {
        let timestamp = self.clock.now();
        for row in &mut incoming {
            row.set_timestamp(timestamp);
        }
        let mut rows = self.rows.lock().expect("ledger lock poisoned");
        rows.append(&mut incoming);
        Ok(timestamp)
    }

    fn tail(&self, n: usize) -> Result<Vec<R>, LedgerError> {
        let rows = self.rows.lock().expect("ledger lock poisoned");
        Ok(tail_of(&rows, n))
    }

    fn revert_last(&self) -> Result<usize, LedgerError> {
        let mut rows = self.rows.lock().expect("ledger lock poisoned");
        drop_last_snapshot(&mut rows)
    }
}
