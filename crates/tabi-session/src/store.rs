//! JSON persistence for [`MemorySession`].
//!
//! A session file is the serialized [`SessionState`]. The CLI loads it before
//! an invocation and writes it back afterwards.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::memory::{MemorySession, SessionState};

/// Errors reading or writing a session file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("session file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load a session from a JSON file.
pub fn load_session(path: &Path) -> Result<MemorySession, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let state: SessionState =
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(
        path = %path.display(),
        windows = state.windows.len(),
        tabs = state.tabs.len(),
        "loaded session file"
    );
    Ok(MemorySession::from_state(state))
}

/// Write a session's current state to a JSON file.
pub fn save_session(session: &MemorySession, path: &Path) -> Result<(), StoreError> {
    let contents =
        serde_json::to_string_pretty(&session.state()).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    std::fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Window, WindowId, WindowKind};

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("session.json");

        let session = MemorySession::from_state(SessionState {
            windows: vec![Window {
                id: WindowId(4),
                focused: true,
                kind: WindowKind::Normal,
            }],
            ..Default::default()
        });
        save_session(&session, &path).unwrap();

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.state(), session.state());
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_session(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }), "got: {err}");
    }

    #[test]
    fn load_garbage_is_json_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_session(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }), "got: {err}");
    }
}
