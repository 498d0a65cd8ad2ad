//! LogSink implementations.

use crate::error::LogError;
use crate::types::SendAttempt;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

/// Persists one record per send attempt.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one attempt. Called exactly once per dispatch call that gets
    /// past validation.
    async fn append(&self, attempt: &SendAttempt) -> Result<(), LogError>;

    /// Read the full attempt log in append order.
    async fn list_all(&self) -> Result<Vec<SendAttempt>, LogError>;
}

/// File-backed log: one JSON array, rewritten on every append.
///
/// Writers are serialized by an internal mutex. Not safe under concurrent
/// processes; single-process deployment is assumed.
pub struct FileLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_entries(&self) -> Result<Vec<SendAttempt>, LogError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl LogSink for FileLog {
    #[instrument(skip(self, attempt))]
    async fn append(&self, attempt: &SendAttempt) -> Result<(), LogError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_entries().await?;
        entries.push(attempt.clone());

        let json = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, json).await?;

        debug!(recipient = %attempt.recipient, total = entries.len(), "Attempt logged");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SendAttempt>, LogError> {
        let _guard = self.write_lock.lock().await;
        self.read_entries().await
    }
}

/// In-memory log for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryLog {
    entries: RwLock<Vec<SendAttempt>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogSink for MemoryLog {
    async fn append(&self, attempt: &SendAttempt) -> Result<(), LogError> {
        self.entries.write().await.push(attempt.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SendAttempt>, LogError> {
        Ok(self.entries.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PayloadDescriptor;

    fn attempt(body: &str) -> SendAttempt {
        SendAttempt::success(
            "primary",
            "6281234567890@c.us",
            PayloadDescriptor::Text { body: body.into() },
            "msg-1",
        )
    }

    #[tokio::test]
    async fn test_memory_log_append_and_list() {
        let log = MemoryLog::new();

        log.append(&attempt("one")).await.unwrap();
        log.append(&attempt("two")).await.unwrap();

        let all = log.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[0].payload,
            PayloadDescriptor::Text { body: "one".into() }
        );
    }

    #[tokio::test]
    async fn test_file_log_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileLog::new(dir.path().join("attempts.json"));

        assert!(log.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_log_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts.json");
        let log = FileLog::new(&path);

        log.append(&attempt("first")).await.unwrap();
        log.append(&attempt("second")).await.unwrap();

        let all = log.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[1].payload,
            PayloadDescriptor::Text {
                body: "second".into()
            }
        );

        // File holds a single well-formed JSON array
        let raw = std::fs::read(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_log_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts.json");

        {
            let log = FileLog::new(&path);
            log.append(&attempt("persisted")).await.unwrap();
        }

        let reopened = FileLog::new(&path);
        let all = reopened.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
