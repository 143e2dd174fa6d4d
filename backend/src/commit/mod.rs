//! Commit sinks: where operator-approved records go.
//!
//! The pipeline hands the final records to a [`CommitSink`] exactly once
//! per successful finalize. Sinks never retry and have no timeout; a
//! rejected commit leaves the session in preview for a manual retry.
//!
//! - [`HttpCommitSink`] - POST the records to a remote store
//! - [`JsonFileSink`] - write the records to one JSON file
//! - [`DirectorySink`] - write each commit to a new file in a directory

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::api::logs::{log_error, log_info, log_success};
use crate::error::{CommitError, CommitResult};
use crate::models::PlainRecord;

/// Persists the final record set of an import session.
#[async_trait]
pub trait CommitSink: Send + Sync {
    async fn commit(&self, records: Vec<PlainRecord>) -> CommitResult<()>;
}

/// Insert a random UUID under `key` into every record lacking a value there.
///
/// Placeholders are only unique within this process and only meant to live
/// until the external store assigns its own identifier.
pub fn assign_placeholder_ids(records: &mut [PlainRecord], key: &str) {
    for record in records.iter_mut() {
        let missing = match record.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if missing {
            record.insert(key.to_string(), Value::String(Uuid::new_v4().to_string()));
        }
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// POSTs the records as a JSON array to a remote tabular store.
pub struct HttpCommitSink {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    placeholder_key: Option<String>,
}

impl HttpCommitSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            token: None,
            placeholder_key: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_placeholder_key(mut self, key: impl Into<String>) -> Self {
        self.placeholder_key = Some(key.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CommitSink for HttpCommitSink {
    async fn commit(&self, mut records: Vec<PlainRecord>) -> CommitResult<()> {
        if let Some(key) = &self.placeholder_key {
            assign_placeholder_ids(&mut records, key);
        }

        log_info(format!("📤 Sending {} records to {}", records.len(), self.url));

        let mut request = self.client.post(&self.url).json(&records);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CommitError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_error(format!("Remote store rejected commit ({})", status));
            return Err(CommitError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log_success(format!("Remote store accepted {} records", records.len()));
        Ok(())
    }
}

// =============================================================================
// Files
// =============================================================================

/// Writes the records as pretty JSON to a fixed path.
pub struct JsonFileSink {
    path: PathBuf,
    placeholder_key: Option<String>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            placeholder_key: None,
        }
    }

    pub fn with_placeholder_key(mut self, key: impl Into<String>) -> Self {
        self.placeholder_key = Some(key.into());
        self
    }
}

#[async_trait]
impl CommitSink for JsonFileSink {
    async fn commit(&self, mut records: Vec<PlainRecord>) -> CommitResult<()> {
        if let Some(key) = &self.placeholder_key {
            assign_placeholder_ids(&mut records, key);
        }
        write_json(&self.path, &records).await
    }
}

/// Writes each commit to `<dir>/<timestamp>-<uuid>.json`.
pub struct DirectorySink {
    dir: PathBuf,
    placeholder_key: Option<String>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            placeholder_key: None,
        }
    }

    pub fn with_placeholder_key(mut self, key: impl Into<String>) -> Self {
        self.placeholder_key = Some(key.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CommitSink for DirectorySink {
    async fn commit(&self, mut records: Vec<PlainRecord>) -> CommitResult<()> {
        if let Some(key) = &self.placeholder_key {
            assign_placeholder_ids(&mut records, key);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!(
            "{}-{}.json",
            chrono::Utc::now().format("%Y%m%dT%H%M%S"),
            Uuid::new_v4()
        );
        write_json(&self.dir.join(name), &records).await
    }
}

async fn write_json(path: &Path, records: &[PlainRecord]) -> CommitResult<()> {
    let content = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, content).await?;
    log_success(format!("💾 {} records written to {}", records.len(), path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn records() -> Vec<PlainRecord> {
        vec![
            json!({"code": "M101", "id": null}).as_object().cloned().unwrap(),
            json!({"code": "M102", "id": "kept"}).as_object().cloned().unwrap(),
        ]
    }

    #[test]
    fn test_placeholder_ids_fill_blanks_only() {
        let mut recs = records();
        assign_placeholder_ids(&mut recs, "id");

        let first = recs[0]["id"].as_str().unwrap();
        assert!(Uuid::parse_str(first).is_ok());
        assert_eq!(recs[1]["id"], "kept");
    }

    #[test]
    fn test_placeholder_ids_unique() {
        let mut recs = vec![PlainRecord::new(), PlainRecord::new()];
        assign_placeholder_ids(&mut recs, "uid");
        assert_ne!(recs[0]["uid"], recs[1]["uid"]);
    }

    #[tokio::test]
    async fn test_json_file_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        JsonFileSink::new(&path).commit(records()).await.unwrap();

        let written: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0]["code"], "M101");
    }

    #[tokio::test]
    async fn test_json_file_sink_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("missing").join("out.json"));
        let err = sink.commit(records()).await.unwrap_err();
        assert!(matches!(err, CommitError::Io(_)));
    }

    #[tokio::test]
    async fn test_directory_sink_writes_new_file_per_commit() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("commits")).with_placeholder_key("id");
        sink.commit(records()).await.unwrap();
        sink.commit(records()).await.unwrap();

        let files: Vec<_> = std::fs::read_dir(sink.dir()).unwrap().flatten().collect();
        assert_eq!(files.len(), 2);

        let written: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(files[0].path()).unwrap()).unwrap();
        assert!(written[0]["id"].is_string());
    }
}
