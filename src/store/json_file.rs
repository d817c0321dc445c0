use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use serde_json::Value;
use tokio::{fs, sync::Mutex};

use super::{InputPatch, InputStore, PersistedInputs, StoreKind, DEFAULT_SESSION_ID};

/// On-disk shape: session id → record. Records of other sessions are kept
/// verbatim so a rewrite never drops them.
type SessionFile = BTreeMap<String, Value>;

/// Stores the record in a pretty-printed JSON file next to the app data.
pub struct JsonFileInputStore {
    path: PathBuf,
    session_id: String,
    write_lock: Mutex<()>,
}

impl JsonFileInputStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            session_id: DEFAULT_SESSION_ID.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Raw file contents, `None` when the file does not exist yet.
    async fn read_contents(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read inputs from {}", self.path.display())),
        }
    }

    fn parse_sessions(&self, contents: &str) -> Result<SessionFile> {
        serde_json::from_str(contents)
            .with_context(|| format!("Malformed inputs file {}", self.path.display()))
    }

    async fn read_sessions(&self) -> Result<SessionFile> {
        match self.read_contents().await? {
            Some(contents) => self.parse_sessions(&contents),
            None => Ok(SessionFile::new()),
        }
    }

    fn decode(&self, sessions: &SessionFile) -> Result<Option<PersistedInputs>> {
        sessions
            .get(&self.session_id)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .with_context(|| format!("Malformed inputs record '{}'", self.session_id))
            })
            .transpose()
    }

    async fn persist(&self, sessions: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let serialized = serde_json::to_string_pretty(sessions)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .await
            .with_context(|| format!("Failed to write inputs to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }
}

#[async_trait]
impl InputStore for JsonFileInputStore {
    fn kind(&self) -> StoreKind {
        StoreKind::JsonFile
    }

    async fn load(&self) -> Result<Option<PersistedInputs>> {
        let sessions = self.read_sessions().await?;
        self.decode(&sessions)
    }

    async fn save(&self, patch: InputPatch) -> Result<PersistedInputs> {
        let _guard = self.write_lock.lock().await;

        // Only a file that cannot be parsed is replaced; I/O failures abort the save.
        let mut sessions = match self.read_contents().await? {
            Some(contents) => self.parse_sessions(&contents).unwrap_or_else(|err| {
                warn!("Starting a fresh inputs file: {err:#}");
                SessionFile::new()
            }),
            None => SessionFile::new(),
        };
        let existing = self.decode(&sessions).unwrap_or_else(|err| {
            warn!("Discarding unreadable inputs record: {err:#}");
            None
        });

        let merged = PersistedInputs::merged(existing.as_ref(), &patch, Utc::now());
        sessions.insert(self.session_id.clone(), serde_json::to_value(&merged)?);
        self.persist(&sessions).await?;

        Ok(merged)
    }
}
