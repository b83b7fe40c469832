//! Hookstream event storage adapters.
//!
//! Implements the [`events::EventStore`] port with two backends:
//!
//! - [`InMemoryEventStore`]: a process-local document list. Volatile; meant
//!   for development and for tests of the layers above.
//! - [`SqliteEventStore`]: a single SQLite file holding one JSON document per
//!   event, indexed by kind and timestamp.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Storage
//! identifiers are assigned here (a UUID v4 per SQLite row) and never leave
//! the backend.
//!
//! ## Backend selection
//!
//! The composition root picks a backend through [`StoreBackend`] and
//! [`open_store`]. There is no default backend and no default database
//! location: the operator chooses explicitly.

use std::path::PathBuf;
use std::sync::Arc;

use events::{EventStore, StoreError};

mod memory;
mod sqlite;

#[cfg(test)]
mod conformance;

pub use memory::InMemoryEventStore;
pub use sqlite::SqliteEventStore;

/// Which [`EventStore`] implementation to construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Volatile in-process storage.
    InMemory,
    /// SQLite database at the given path (created if absent).
    Sqlite(PathBuf),
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::InMemory => write!(f, "in-memory"),
            StoreBackend::Sqlite(path) => write!(f, "sqlite:{}", path.display()),
        }
    }
}

/// Opens the selected backend as a shareable [`EventStore`] capability.
pub fn open_store(backend: &StoreBackend) -> Result<Arc<dyn EventStore>, StoreError> {
    let store: Arc<dyn EventStore> = match backend {
        StoreBackend::InMemory => Arc::new(InMemoryEventStore::new()),
        StoreBackend::Sqlite(path) => Arc::new(SqliteEventStore::open(path)?),
    };
    tracing::info!(backend = %backend, "Event store opened");
    Ok(store)
}
