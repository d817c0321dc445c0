//! Durable home of the session's inputs.
//!
//! Backends are interchangeable behind [`InputStore`]; which one is used is
//! decided by [`StoreKind`] at startup.

use std::{fmt, path::Path, str::FromStr, sync::Arc};

use anyhow::{anyhow, Error, Result};
use async_trait::async_trait;

pub mod json_file;
pub mod memory;
pub mod record;
pub mod sqlite;

pub use json_file::JsonFileInputStore;
pub use memory::MemoryInputStore;
pub use record::{next_updated_at, InputPatch, PersistedInputs};
pub use sqlite::SqliteInputStore;

/// Key of the one record the calculator keeps.
pub const DEFAULT_SESSION_ID: &str = "default";

const SQLITE_FILE_NAME: &str = "bodyfat.sqlite3";
const JSON_FILE_NAME: &str = "inputs.json";

#[async_trait]
pub trait InputStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// The stored record, if one has ever been written.
    async fn load(&self) -> Result<Option<PersistedInputs>>;

    /// Merges `patch` over the stored record, stamps `updated_at` and writes
    /// the result as one record. Fields the patch leaves alone are kept.
    async fn save(&self, patch: InputPatch) -> Result<PersistedInputs>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Sqlite,
    JsonFile,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Sqlite => "sqlite",
            StoreKind::JsonFile => "json",
            StoreKind::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "json" | "json-file" => Ok(StoreKind::JsonFile),
            "memory" => Ok(StoreKind::Memory),
            other => Err(anyhow!("unknown store kind '{other}'")),
        }
    }
}

/// Opens the backend for `kind`, placing its files under `data_dir`.
pub fn open_store(kind: StoreKind, data_dir: &Path) -> Result<Arc<dyn InputStore>> {
    let store: Arc<dyn InputStore> = match kind {
        StoreKind::Sqlite => Arc::new(SqliteInputStore::open(data_dir.join(SQLITE_FILE_NAME))?),
        StoreKind::JsonFile => Arc::new(JsonFileInputStore::new(data_dir.join(JSON_FILE_NAME))),
        StoreKind::Memory => Arc::new(MemoryInputStore::new()),
    };
    Ok(store)
}
