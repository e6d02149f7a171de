//! Shared test utilities for `ApartmentBuddy`.
//!
//! Helpers for opening scratch ledgers in temporary directories and creating test
//! apartments with sensible defaults.

use crate::{
    core::{
        apartment::{ApartmentRecord, Ledger},
        store::LedgerStore,
    },
    errors::Result,
};
use tempfile::TempDir;

const TEST_LEDGER_FILE: &str = "apartments.json";

/// Opens an empty ledger backed by a fresh temporary directory.
/// Keep the returned `TempDir` alive for as long as the ledger is used.
pub fn setup_test_ledger() -> Result<(TempDir, Ledger)> {
    let dir = tempfile::tempdir()?;
    let ledger = Ledger::open(LedgerStore::new(dir.path().join(TEST_LEDGER_FILE)))?;
    Ok((dir, ledger))
}

/// Opens a second ledger over the document written by [`setup_test_ledger`],
/// as a restart would.
pub fn reopen_ledger(dir: &TempDir) -> Result<Ledger> {
    Ledger::open(LedgerStore::new(dir.path().join(TEST_LEDGER_FILE)))
}

/// Creates a test apartment with sensible defaults.
///
/// # Defaults
/// * `max_residents`: 10
pub fn create_test_apartment(ledger: &Ledger, name: &str) -> Result<ApartmentRecord> {
    ledger.create_apartment(name, 10)
}
