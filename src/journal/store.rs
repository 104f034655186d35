use crate::mood::Mood;
use crate::throttle::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Abstract storage for per-mood submission tallies.
#[async_trait]
pub trait TallyStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Add one to `mood`'s tally and return the new value.
    async fn increment(&self, mood: Mood) -> Result<u32, Self::Error>;

    /// Current tally for every mood; moods never logged report zero.
    async fn counts(&self) -> Result<HashMap<Mood, u32>, Self::Error>;
}

fn with_all_moods(mut counts: HashMap<Mood, u32>) -> HashMap<Mood, u32> {
    for mood in Mood::ALL {
        counts.entry(mood).or_insert(0);
    }
    counts
}

/// Simple in-memory tally store.
#[derive(Default, Clone, Debug)]
pub struct MemoryTallyStore {
    counts: Arc<Mutex<HashMap<Mood, u32>>>,
}

impl MemoryTallyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TallyStore for MemoryTallyStore {
    type Error = std::convert::Infallible;

    async fn increment(&self, mood: Mood) -> Result<u32, Self::Error> {
        let mut counts = self.counts.lock().unwrap();
        let entry = counts.entry(mood).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn counts(&self) -> Result<HashMap<Mood, u32>, Self::Error> {
        Ok(with_all_moods(self.counts.lock().unwrap().clone()))
    }
}

/// File-backed tally store holding the counters as one JSON object.
///
/// Same persistence discipline as the throttle's state store: saves land
/// via temp-file-and-rename, an unreadable record starts over from empty.
#[derive(Clone, Debug)]
pub struct JsonTallyStore {
    path: PathBuf,
}

impl JsonTallyStore {
    /// Store backed by the JSON document at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }

    async fn read_counts(&self) -> Result<HashMap<Mood, u32>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(counts) => Ok(counts),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unreadable mood tallies, starting from empty"
                );
                Ok(HashMap::new())
            }
        }
    }

    async fn write_counts(&self, counts: &HashMap<Mood, u32>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(counts)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TallyStore for JsonTallyStore {
    type Error = StoreError;

    async fn increment(&self, mood: Mood) -> Result<u32, Self::Error> {
        let mut counts = self.read_counts().await?;
        let entry = counts.entry(mood).or_insert(0);
        *entry += 1;
        let new_count = *entry;
        self.write_counts(&counts).await?;
        Ok(new_count)
    }

    async fn counts(&self) -> Result<HashMap<Mood, u32>, Self::Error> {
        Ok(with_all_moods(self.read_counts().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_tallies_count_per_mood() {
        let store = MemoryTallyStore::new();
        assert_eq!(store.increment(Mood::Happy).await.expect("infallible"), 1);
        assert_eq!(store.increment(Mood::Happy).await.expect("infallible"), 2);
        assert_eq!(store.increment(Mood::Sad).await.expect("infallible"), 1);

        let counts = store.counts().await.expect("infallible");
        assert_eq!(counts[&Mood::Happy], 2);
        assert_eq!(counts[&Mood::Sad], 1);
    }

    #[tokio::test]
    async fn counts_report_every_mood() {
        let store = MemoryTallyStore::new();
        let counts = store.counts().await.expect("infallible");
        assert_eq!(counts.len(), Mood::ALL.len());
        assert!(counts.values().all(|&c| c == 0));
    }

    #[tokio::test]
    async fn json_tallies_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tallies.json");

        let store = JsonTallyStore::new(&path);
        store.increment(Mood::Excited).await.expect("increment");
        store.increment(Mood::Excited).await.expect("increment");

        let reopened = JsonTallyStore::new(&path);
        let counts = reopened.counts().await.expect("counts");
        assert_eq!(counts[&Mood::Excited], 2);
        assert_eq!(counts[&Mood::Neutral], 0);
    }

    #[tokio::test]
    async fn json_tallies_corrupt_file_starts_over() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tallies.json");
        tokio::fs::write(&path, b"\xff\xfe").await.expect("write");

        let store = JsonTallyStore::new(&path);
        assert_eq!(store.increment(Mood::Calm).await.expect("increment"), 1);
    }
}
