use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::db::Database;

use super::{InputPatch, InputStore, PersistedInputs, StoreKind, DEFAULT_SESSION_ID};

pub struct SqliteInputStore {
    db: Database,
    session_id: String,
}

impl SqliteInputStore {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        Ok(Self::from_database(Database::new(db_path)?))
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db,
            session_id: DEFAULT_SESSION_ID.to_string(),
        }
    }
}

#[async_trait]
impl InputStore for SqliteInputStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    async fn load(&self) -> Result<Option<PersistedInputs>> {
        self.db.get_inputs(&self.session_id).await
    }

    async fn save(&self, patch: InputPatch) -> Result<PersistedInputs> {
        self.db.merge_inputs(&self.session_id, patch, Utc::now()).await
    }
}
