use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{InputPatch, InputStore, PersistedInputs, StoreKind};

/// Keeps the record for the life of the process only.
#[derive(Default)]
pub struct MemoryInputStore {
    record: Mutex<Option<PersistedInputs>>,
}

impl MemoryInputStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PersistedInputs) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

#[async_trait]
impl InputStore for MemoryInputStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn load(&self) -> Result<Option<PersistedInputs>> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, patch: InputPatch) -> Result<PersistedInputs> {
        let mut guard = self.record.lock().await;
        let merged = PersistedInputs::merged(guard.as_ref(), &patch, Utc::now());
        *guard = Some(merged.clone());
        Ok(merged)
    }
}
