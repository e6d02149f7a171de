//! Apartment ledger - capacity and waiting-list bookkeeping for VIP apartments.
//!
//! The [`Ledger`] owns every apartment record. Each mutation runs under one lock
//! as read, modify, persist, commit: the changed snapshot is written through the
//! [`LedgerStore`] first and only then replaces the in-memory map, so memory is
//! never ahead of disk and concurrent commands cannot lose updates.

use crate::{
    core::store::LedgerStore,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};
use tracing::{info, instrument, warn};

/// Longest apartment name accepted, in characters. Discord caps autocomplete
/// choices at this length and embed field names not far above it.
pub const MAX_NAME_LEN: usize = 100;

/// All apartment records keyed by name, in name order.
pub type Apartments = BTreeMap<String, ApartmentRecord>;

/// Capacity state of a single apartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApartmentRecord {
    /// Capacity ceiling fixed at creation
    pub max_residents: u32,
    /// Residents currently admitted, never above `max_residents`
    pub current_residents: u32,
    /// Residents queued because the apartment was full
    pub waiting_list: u32,
}

/// Outcome of an [`Ledger::add_residents`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Residents that took a free slot
    pub admitted: u32,
    /// Residents that went onto the waiting list
    pub waitlisted: u32,
    /// Apartment state after the call
    pub record: ApartmentRecord,
}

/// Apartment configured in `config.toml` to exist at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApartmentSeed {
    /// Apartment name
    pub name: String,
    /// Capacity for a newly created apartment
    pub max_residents: u32,
}

impl ApartmentRecord {
    /// A fresh, empty apartment with the given capacity.
    #[must_use]
    pub const fn new(max_residents: u32) -> Self {
        Self {
            max_residents,
            current_residents: 0,
            waiting_list: 0,
        }
    }

    /// Free slots left before new residents are queued.
    #[must_use]
    pub const fn available_slots(&self) -> u32 {
        self.max_residents.saturating_sub(self.current_residents)
    }

    /// Admits up to the free capacity and queues the rest.
    fn admit(&mut self, count: u32) -> Result<Admission> {
        let available = self.available_slots();
        if count <= available {
            self.current_residents += count;
            return Ok(Admission {
                admitted: count,
                waitlisted: 0,
                record: *self,
            });
        }

        let overflow = count - available;
        let waiting_list =
            self.waiting_list
                .checked_add(overflow)
                .ok_or_else(|| Error::InvalidArgument {
                    message: format!("waiting list cannot grow by {overflow}"),
                })?;
        self.current_residents = self.max_residents;
        self.waiting_list = waiting_list;
        Ok(Admission {
            admitted: available,
            waitlisted: overflow,
            record: *self,
        })
    }

    /// Reconciles the apartment to a corrected resident total.
    ///
    /// A lower total drains the waiting list before touching occupancy. A higher
    /// or equal total sets occupancy, capped at capacity, and leaves the waiting
    /// list as it was.
    fn reconcile(&mut self, updated_total: u32) {
        if updated_total < self.current_residents {
            let difference = self.current_residents - updated_total;
            if difference <= self.waiting_list {
                self.waiting_list -= difference;
            } else {
                self.waiting_list = 0;
                self.current_residents = updated_total;
            }
        } else {
            self.current_residents = updated_total.min(self.max_residents);
        }
    }
}

/// The apartment ledger: sole owner of all records, written through to disk.
#[derive(Debug)]
pub struct Ledger {
    store: LedgerStore,
    apartments: Mutex<Apartments>,
}

impl Ledger {
    /// Loads the ledger from `store`. Fails if the persisted document is unreadable
    /// or corrupt; a missing document gives an empty ledger.
    pub fn open(store: LedgerStore) -> Result<Self> {
        let apartments = store.load()?;
        Ok(Self {
            store,
            apartments: Mutex::new(apartments),
        })
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }

    /// Registers a new, empty apartment.
    #[instrument(skip(self))]
    pub fn create_apartment(&self, name: &str, max_residents: i64) -> Result<ApartmentRecord> {
        let name = validate_name(name)?;
        let max_residents = validate_count("max_residents", max_residents)?;

        let record = self.mutate(|apartments| {
            if apartments.contains_key(name) {
                return Err(Error::ApartmentExists {
                    name: name.to_string(),
                });
            }
            let record = ApartmentRecord::new(max_residents);
            apartments.insert(name.to_string(), record);
            Ok(record)
        })?;

        info!(max_residents, "Apartment created");
        Ok(record)
    }

    /// Admits `count` residents, queueing any that do not fit.
    #[instrument(skip(self))]
    pub fn add_residents(&self, name: &str, count: i64) -> Result<Admission> {
        let name = validate_name(name)?;
        let count = validate_count("count", count)?;

        let admission = self.mutate(|apartments| lookup_mut(apartments, name)?.admit(count))?;

        info!(
            admitted = admission.admitted,
            waitlisted = admission.waitlisted,
            "Residents added"
        );
        Ok(admission)
    }

    /// Reconciles an apartment to a corrected resident total.
    #[instrument(skip(self))]
    pub fn update_residents(&self, name: &str, updated_total: i64) -> Result<ApartmentRecord> {
        let name = validate_name(name)?;
        let updated_total = validate_count("updated_total", updated_total)?;

        let record = self.mutate(|apartments| {
            let record = lookup_mut(apartments, name)?;
            record.reconcile(updated_total);
            Ok(*record)
        })?;

        info!(
            current_residents = record.current_residents,
            waiting_list = record.waiting_list,
            "Residents updated"
        );
        Ok(record)
    }

    /// Removes an apartment and returns its final state.
    #[instrument(skip(self))]
    pub fn delete_apartment(&self, name: &str) -> Result<ApartmentRecord> {
        let name = validate_name(name)?;

        let record = self.mutate(|apartments| {
            apartments
                .remove(name)
                .ok_or_else(|| Error::ApartmentNotFound {
                    name: name.to_string(),
                })
        })?;

        info!("Apartment deleted");
        Ok(record)
    }

    /// Looks up a single apartment.
    pub fn get_apartment(&self, name: &str) -> Result<Option<ApartmentRecord>> {
        let apartments = self.apartments.lock().map_err(|_| Error::LedgerPoisoned)?;
        Ok(apartments.get(name.trim()).copied())
    }

    /// All apartments in name order.
    pub fn list_apartments(&self) -> Result<Vec<(String, ApartmentRecord)>> {
        let apartments = self.apartments.lock().map_err(|_| Error::LedgerPoisoned)?;
        Ok(apartments
            .iter()
            .map(|(name, record)| (name.clone(), *record))
            .collect())
    }

    /// Creates the configured apartments that do not exist yet. Existing
    /// apartments keep their current state. Returns how many were created.
    pub fn seed_apartments(&self, seeds: &[ApartmentSeed]) -> Result<usize> {
        let mut created = 0;
        for seed in seeds {
            match self.create_apartment(&seed.name, i64::from(seed.max_residents)) {
                Ok(_) => created += 1,
                Err(Error::ApartmentExists { .. }) => {}
                Err(e) => {
                    warn!(name = %seed.name, error = %e, "Failed to seed apartment");
                    return Err(e);
                }
            }
        }
        Ok(created)
    }

    /// Runs `operation` on tokio's blocking pool so ledger saves stay off the
    /// async executor.
    pub async fn run_blocking<T, F>(self: &Arc<Self>, operation: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(self);
        tokio::task::spawn_blocking(move || operation(&ledger)).await?
    }

    /// Runs `change` against a copy of the ledger, persists the copy, then commits
    /// it. On any error the in-memory ledger is left untouched.
    fn mutate<T>(&self, change: impl FnOnce(&mut Apartments) -> Result<T>) -> Result<T> {
        let mut apartments = self.apartments.lock().map_err(|_| Error::LedgerPoisoned)?;

        let mut next = apartments.clone();
        let outcome = change(&mut next)?;
        self.store.save(&next)?;
        *apartments = next;

        Ok(outcome)
    }
}

fn lookup_mut<'a>(apartments: &'a mut Apartments, name: &str) -> Result<&'a mut ApartmentRecord> {
    apartments
        .get_mut(name)
        .ok_or_else(|| Error::ApartmentNotFound {
            name: name.to_string(),
        })
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument {
            message: "apartment name cannot be empty".to_string(),
        });
    }
    let length = trimmed.chars().count();
    if length > MAX_NAME_LEN {
        return Err(Error::InvalidArgument {
            message: format!(
                "apartment name is too long ({length} characters, at most {MAX_NAME_LEN})"
            ),
        });
    }
    Ok(trimmed)
}

fn validate_count(field: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(Error::InvalidArgument {
            message: format!("{field} must not be negative (got {value})"),
        });
    }
    u32::try_from(value).map_err(|_| Error::InvalidArgument {
        message: format!("{field} is too large (got {value})"),
    })
}
