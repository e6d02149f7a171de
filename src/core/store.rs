//! Ledger store - durable persistence of the apartment ledger as one JSON document.
//!
//! The store holds no logic: it loads a snapshot at startup and replaces the whole
//! document on every save. Saves go to a temporary file in the same directory which
//! is then renamed over the target, so readers never observe a half-written ledger.

use crate::{
    core::apartment::{ApartmentRecord, Apartments},
    errors::{Error, Result},
};
use std::{
    fs,
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Default location of the ledger document when `LEDGER_PATH` is not set.
pub const DEFAULT_LEDGER_PATH: &str = "data/apartments.json";

/// Flat-file persistence for the apartment ledger.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Creates a store backed by the document at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the ledger document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted ledger.
    ///
    /// A missing document is an empty ledger. A document that cannot be read,
    /// does not parse, or holds a record with more residents than capacity is an
    /// error: silently starting empty would drop every record on the next save.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Apartments> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No ledger document yet, starting empty");
                return Ok(Apartments::new());
            }
            Err(source) => {
                return Err(Error::LedgerRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let apartments: Apartments =
            serde_json::from_str(&contents).map_err(|source| Error::LedgerParse {
                path: self.path.clone(),
                source,
            })?;

        for (name, record) in &apartments {
            validate_record(name, record).map_err(|message| Error::LedgerInvalid {
                path: self.path.clone(),
                message,
            })?;
        }

        info!(apartments = apartments.len(), "Loaded ledger");
        Ok(apartments)
    }

    /// Replaces the persisted document with `apartments`.
    ///
    /// The snapshot is fully written and synced to a sibling temporary file before
    /// being renamed into place.
    #[instrument(skip(self, apartments), fields(path = %self.path.display(), apartments = apartments.len()))]
    pub fn save(&self, apartments: &Apartments) -> Result<()> {
        self.write_snapshot(apartments)
            .map_err(|source| Error::LedgerWrite {
                path: self.path.clone(),
                source,
            })?;
        debug!("Ledger snapshot written");
        Ok(())
    }

    fn write_snapshot(&self, apartments: &Apartments) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, apartments)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn validate_record(name: &str, record: &ApartmentRecord) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err("apartment with an empty name".to_string());
    }
    if record.current_residents > record.max_residents {
        return Err(format!(
            "'{name}' has {} residents but capacity {}",
            record.current_residents, record.max_residents
        ));
    }
    Ok(())
}
