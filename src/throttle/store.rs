use crate::throttle::ThrottleState;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Abstract storage for the persisted throttle state.
///
/// One record per user/device. `save` must land the pair as a single atomic
/// unit so no reader ever observes a half-updated record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The last persisted state, or the zero-value state when no record
    /// exists yet. "No data yet" is a normal case, not an error.
    async fn load(&self) -> Result<ThrottleState, Self::Error>;

    /// Durably persist the full state.
    async fn save(&self, state: ThrottleState) -> Result<(), Self::Error>;
}

/// Simple in-memory state store.
#[derive(Default, Clone, Debug)]
pub struct MemoryStateStore {
    state: Arc<Mutex<ThrottleState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    type Error = std::convert::Infallible;

    async fn load(&self) -> Result<ThrottleState, Self::Error> {
        Ok(*self.state.lock().unwrap())
    }

    async fn save(&self, state: ThrottleState) -> Result<(), Self::Error> {
        *self.state.lock().unwrap() = state;
        Ok(())
    }
}

/// Errors from the file-backed stores.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding a record for persistence failed.
    #[error("store encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed store holding the state as one small JSON document.
///
/// Saves write a sibling temp file and rename it into place, so a crashed
/// or abandoned save either lands completely or leaves the old record
/// untouched. An unreadable record loads as the zero-value state (logged);
/// the next save rewrites it.
#[derive(Clone, Debug)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Store backed by the JSON document at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    type Error = StoreError;

    async fn load(&self) -> Result<ThrottleState, Self::Error> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ThrottleState::default());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unreadable throttle state, starting from an empty record"
                );
                Ok(ThrottleState::default())
            }
        }
    }

    async fn save(&self, state: ThrottleState) -> Result<(), Self::Error> {
        let bytes = serde_json::to_vec(&state)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_starts_at_zero() {
        let store = MemoryStateStore::new();
        assert_eq!(store.load().await.expect("infallible"), ThrottleState::default());
    }

    #[tokio::test]
    async fn memory_store_clones_share_state() {
        let store = MemoryStateStore::new();
        let handle = store.clone();
        let state = ThrottleState { window_start_millis: 42, count_in_window: 1 };
        store.save(state).await.expect("infallible");
        assert_eq!(handle.load().await.expect("infallible"), state);
    }

    #[tokio::test]
    async fn json_store_missing_file_is_zero_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonStateStore::new(dir.path().join("throttle.json"));
        assert_eq!(store.load().await.expect("load"), ThrottleState::default());
    }

    #[tokio::test]
    async fn json_store_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("throttle.json");
        let store = JsonStateStore::new(&path);

        let state = ThrottleState { window_start_millis: 1_700_000_000_000, count_in_window: 2 };
        store.save(state).await.expect("save");
        assert_eq!(store.load().await.expect("load"), state);

        // A fresh store over the same path sees the same record.
        let reopened = JsonStateStore::new(&path);
        assert_eq!(reopened.load().await.expect("load"), state);
    }

    #[tokio::test]
    async fn json_store_corrupt_file_resets_to_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("throttle.json");
        tokio::fs::write(&path, b"{not json").await.expect("write");

        let store = JsonStateStore::new(&path);
        assert_eq!(store.load().await.expect("load"), ThrottleState::default());

        // The next save repairs the record.
        let state = ThrottleState { window_start_millis: 7, count_in_window: 1 };
        store.save(state).await.expect("save");
        assert_eq!(store.load().await.expect("load"), state);
    }

    #[tokio::test]
    async fn json_store_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("throttle.json");
        let store = JsonStateStore::new(&path);
        store.save(ThrottleState::default()).await.expect("save");

        let mut entries = tokio::fs::read_dir(dir.path()).await.expect("read_dir");
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.expect("entry") {
            names.push(entry.file_name());
        }
        assert_eq!(names, vec![std::ffi::OsString::from("throttle.json")]);
    }
}
