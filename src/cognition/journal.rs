//! Diary persistence.
//!
//! The loop only requires that appends are durable and ordered by cycle.
//! [`JsonlJournal`] writes one JSON object per line; [`MemoryJournal`]
//! keeps entries in process for tests and live readers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::types::DiaryEntry;

#[async_trait]
pub trait JournalSink: Send + Sync {
    async fn append(&self, entry: &DiaryEntry) -> Result<()>;
}

// ============================================================================
// JSONL file
// ============================================================================

/// Append-only JSON Lines diary.
#[derive(Debug)]
pub struct JsonlJournal {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry back, in file order.
    pub async fn load(path: impl AsRef<Path>) -> Result<Vec<DiaryEntry>> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read journal {}", path.display()))?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Invalid journal line {} in {}", i + 1, path.display()))
            })
            .collect()
    }
}

#[async_trait]
impl JournalSink for JsonlJournal {
    async fn append(&self, entry: &DiaryEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry).context("Failed to serialize diary entry")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open journal {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .context("Failed to append diary entry")?;
        file.flush().await.context("Failed to flush journal")?;
        file.sync_data().await.context("Failed to sync journal")?;

        debug!(cycle = entry.cycle, path = %self.path.display(), "Diary entry appended");
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: RwLock<Vec<DiaryEntry>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<DiaryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl JournalSink for MemoryJournal {
    async fn append(&self, entry: &DiaryEntry) -> Result<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognition::types::{
        Candidate, CuriosityKind, Exploration, Integration, Reflection, Verdict,
    };

    fn entry(cycle: u64) -> DiaryEntry {
        DiaryEntry {
            run_id: uuid::Uuid::new_v4(),
            cycle,
            timestamp: chrono::Utc::now(),
            candidate: Candidate::new(CuriosityKind::Bridge, "river", 0.7, "bridge"),
            exploration: Exploration::empty(Some("river".into())),
            reflection: Reflection {
                novelty: 0.0,
                coherence: 0.0,
                converged: false,
                score: 0.0,
                verdict: Verdict::Routine,
            },
            integration: Integration::default(),
            rest_ms: 10_000,
        }
    }

    #[tokio::test]
    async fn test_jsonl_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("diary.jsonl");
        let journal = JsonlJournal::new(&path);

        for c in 1..=3 {
            journal.append(&entry(c)).await.unwrap();
        }

        let loaded = JsonlJournal::load(&path).await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(
            loaded.iter().map(|e| e.cycle).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(loaded[0].candidate.concept.as_deref(), Some("river"));
    }

    #[tokio::test]
    async fn test_jsonl_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary.jsonl");
        JsonlJournal::new(&path).append(&entry(1)).await.unwrap();
        JsonlJournal::new(&path).append(&entry(2)).await.unwrap();
        assert_eq!(JsonlJournal::load(&path).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlJournal::load(dir.path().join("nope.jsonl")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_journal() {
        let journal = MemoryJournal::new();
        journal.append(&entry(1)).await.unwrap();
        journal.append(&entry(2)).await.unwrap();
        assert_eq!(journal.len().await, 2);
        assert_eq!(journal.entries().await[1].cycle, 2);
    }
}
