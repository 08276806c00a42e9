use std::sync::{Arc, Mutex};

use anyhow::Result;
use balancebook::clock::Clock;
use balancebook::ledger::{CsvLedger, LedgerError, LedgerStore, MemoryLedger};
use balancebook::models::LedgerRow;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use tempfile::TempDir;

/// Clock that tests can advance between appends.
struct StepClock {
    now: Mutex<NaiveDateTime>,
}

impl StepClock {
    fn starting_at(now: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for StepClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn row(symbol: &str) -> LedgerRow {
    LedgerRow {
        timestamp: NaiveDateTime::default(),
        group: "Assets".into(),
        symbol: symbol.into(),
        name: symbol.into(),
        quantity: dec!(1),
        unit_price: dec!(2),
        value: dec!(2),
        category: "Cash".into(),
    }
}

fn stores(
    dir: &TempDir,
    clock: Arc<StepClock>,
) -> Vec<(&'static str, Box<dyn LedgerStore<LedgerRow>>)> {
    vec![
        (
            "csv",
            Box::new(CsvLedger::with_clock(
                dir.path().join("ledger.csv"),
                clock.clone(),
            )),
        ),
        ("memory", Box::new(MemoryLedger::with_clock(clock))),
    ]
}

#[test]
fn missing_store_loads_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let store: CsvLedger<LedgerRow> = CsvLedger::new(dir.path().join("absent.csv"));
    assert!(store.load()?.is_empty());
    assert!(store.tail(10)?.is_empty());
    Ok(())
}

#[test]
fn tail_returns_last_rows_in_chronological_order() -> Result<()> {
    let dir = TempDir::new()?;
    let clock = StepClock::starting_at(at(1, 20));

    for (name, store) in stores(&dir, clock.clone()) {
        for day in 1..=12 {
            clock.set(at(day, 20));
            store.append(vec![row(&format!("S{day}"))])?;
        }

        let tail = store.tail(10)?;
        assert_eq!(tail.len(), 10, "store {name}");
        assert_eq!(tail.first().unwrap().symbol, "S3", "store {name}");
        assert_eq!(tail.last().unwrap().symbol, "S12", "store {name}");
        assert!(
            tail.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
            "store {name}"
        );
    }
    Ok(())
}

#[test]
fn revert_removes_only_the_latest_snapshot() -> Result<()> {
    let dir = TempDir::new()?;
    let clock = StepClock::starting_at(at(1, 20));

    for (name, store) in stores(&dir, clock.clone()) {
        // Two rows at T1, one at T2.
        clock.set(at(1, 20));
        store.append(vec![row("A"), row("B")])?;
        clock.set(at(2, 20));
        store.append(vec![row("C")])?;

        let removed = store.revert_last()?;
        assert_eq!(removed, 1, "store {name}");

        let rows = store.load()?;
        assert_eq!(rows.len(), 2, "store {name}");
        assert!(
            rows.iter().all(|r| r.timestamp == at(1, 20)),
            "store {name}"
        );
    }
    Ok(())
}

#[test]
fn revert_with_a_single_timestamp_empties_the_store() -> Result<()> {
    let dir = TempDir::new()?;
    let clock = StepClock::starting_at(at(1, 20));

    for (name, store) in stores(&dir, clock.clone()) {
        store.append(vec![row("A"), row("B"), row("C")])?;
        let removed = store.revert_last()?;
        assert_eq!(removed, 3, "store {name}");
        assert!(store.load()?.is_empty(), "store {name}");
    }
    Ok(())
}

#[test]
fn revert_removes_both_batches_of_a_same_second_double_append() -> Result<()> {
    // Coarse-undo boundary condition: two appends sharing one wall-clock
    // second are indistinguishable and revert together.
    let dir = TempDir::new()?;
    let clock = StepClock::starting_at(at(1, 20));

    for (name, store) in stores(&dir, clock.clone()) {
        store.append(vec![row("A")])?;
        store.append(vec![row("B")])?;

        let removed = store.revert_last()?;
        assert_eq!(removed, 2, "store {name}");
        assert!(store.load()?.is_empty(), "store {name}");
    }
    Ok(())
}

#[test]
fn revert_on_empty_store_reports_nothing_to_revert() -> Result<()> {
    let dir = TempDir::new()?;
    let clock = StepClock::starting_at(at(1, 20));

    for (name, store) in stores(&dir, clock) {
        let err = store.revert_last().unwrap_err();
        assert!(
            matches!(err, LedgerError::NothingToRevert),
            "store {name}: {err}"
        );
    }

    // The CSV file was never created; an absent store stays absent.
    assert!(!dir.path().join("ledger.csv").exists());
    Ok(())
}

#[test]
fn csv_store_round_trips_through_the_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("ledger.csv");
    let clock = StepClock::starting_at(at(3, 20));

    let writer: CsvLedger<LedgerRow> = CsvLedger::with_clock(&path, clock);
    writer.append(vec![row("0700.HK")])?;

    // A fresh handle on the same file sees the same rows.
    let reader: CsvLedger<LedgerRow> = CsvLedger::new(&path);
    let rows = reader.load()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].symbol, "0700.HK");
    assert_eq!(rows[0].timestamp, at(3, 20));
    assert_eq!(rows[0].value, dec!(2));
    Ok(())
}
