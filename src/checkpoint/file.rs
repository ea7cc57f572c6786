// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{CheckpointError, CheckpointState, CheckpointStore};

/// `<path>.tmp`, written and synced before the rename
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Replace `path` with `bytes` so readers see either the old or the new
/// contents, never a partial write. Missing parent directories are created.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    // Write atomically using a temp file
    let temp_path = temp_path_for(path);
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp_path, path).await
}

/// Checkpoint persisted as a single JSON file
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        temp_path_for(&self.path)
    }

    fn io_error(&self, source: std::io::Error) -> CheckpointError {
        CheckpointError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self) -> Result<Option<CheckpointState>, CheckpointError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let state = serde_json::from_str(&contents).map_err(|e| CheckpointError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(state))
    }

    async fn save(&self, state: &CheckpointState) -> Result<(), CheckpointError> {
        let mut stamped = state.clone();
        stamped.touch();
        let json = serde_json::to_string_pretty(&stamped)
            .map_err(|e| CheckpointError::Serialize(e.to_string()))?;

        write_atomic(&self.path, json.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(
            path = %self.path.display(),
            next_index = state.next_index,
            "Checkpoint saved"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), CheckpointError> {
        for path in [self.path.clone(), self.temp_path()] {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(self.io_error(e)),
            }
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
