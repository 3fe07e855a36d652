//! Versioned session snapshots.
//!
//! Snapshots hold the complete state, solution included, and are only ever read back by
//! the session itself. They are stored as JSON, one file per session.

use async_trait::async_trait;
use case_rules::GameState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::session::SessionId;

/// Current snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found}, expected {}", SNAPSHOT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("no snapshot for session {0}")]
    NotFound(SessionId),
}

/// Everything needed to resume a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub session_id: SessionId,
    pub saved_at: DateTime<Utc>,
    /// `None` while the session is still in setup.
    pub state: Option<GameState>,
}

impl SessionSnapshot {
    pub fn new(session_id: SessionId, state: Option<GameState>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session_id,
            saved_at: Utc::now(),
            state,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, checking the version before anything else.
    pub fn from_json(source: &str) -> Result<Self, SnapshotError> {
        #[derive(Deserialize)]
        struct Header {
            version: u32,
        }

        let header: Header = serde_json::from_str(source)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: header.version,
            });
        }
        Ok(serde_json::from_str(source)?)
    }
}

/// Where snapshots are kept.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SnapshotError>;

    async fn load(&self, session_id: SessionId) -> Result<SessionSnapshot, SnapshotError>;
}

/// Stores each snapshot as `<dir>/<session id>.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: SessionId) -> PathBuf {
        self.dir.join(format!("{}.json", session_id))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SnapshotError> {
        let json = snapshot.to_json()?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write aside and rename so a crash never leaves a truncated snapshot.
        let path = self.path_for(snapshot.session_id);
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &path).await?;

        tracing::info!(session = %snapshot.session_id, path = %path.display(), "Snapshot saved");
        Ok(())
    }

    async fn load(&self, session_id: SessionId) -> Result<SessionSnapshot, SnapshotError> {
        let path = self.path_for(session_id);
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound(session_id))
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot = SessionSnapshot::from_json(&source)?;
        tracing::info!(session = %session_id, "Snapshot loaded");
        Ok(snapshot)
    }
}
