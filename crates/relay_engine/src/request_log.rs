use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use relay_core::{BackendKind, RelayError, RequestId};
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("log directory missing or not writable: {0}")]
    LogDir(String),
    #[error("could not encode log entry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedError {
    pub title: String,
    pub message: String,
    /// Debug rendering of the error value, standing in for a stack trace.
    pub detail: String,
}

impl From<&RelayError> for LoggedError {
    fn from(err: &RelayError) -> Self {
        Self {
            title: err.title().to_string(),
            message: err.to_string(),
            detail: format!("{err:?}"),
        }
    }
}

/// One artifact per send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub request_id: RequestId,
    pub backend: BackendKind,
    pub selection: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LoggedError>,
}

/// Writes request log entries as JSON files into a directory.
pub struct RequestLogger {
    dir: PathBuf,
}

impl RequestLogger {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name is `{compact utc}-request-{id}.json`, safe on every platform.
    pub fn file_name(at: DateTime<Utc>, request_id: RequestId) -> String {
        format!(
            "{}-request-{request_id}.json",
            at.format("%Y%m%dT%H%M%S%.3fZ")
        )
    }

    /// Atomically write the entry: temp file in the same directory, then rename.
    pub fn write(
        &self,
        at: DateTime<Utc>,
        entry: &RequestLogEntry,
    ) -> Result<PathBuf, PersistError> {
        ensure_log_dir(&self.dir)?;

        let content = serde_json::to_string_pretty(entry)?;
        let target = self.dir.join(Self::file_name(at, entry.request_id));
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Ensure the log directory exists; create it if missing.
pub fn ensure_log_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::LogDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::LogDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::LogDir(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_has_no_reserved_characters() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let name = RequestLogger::file_name(at, 12);
        assert_eq!(name, "20240309T140507.000Z-request-12.json");
        assert!(!name.contains(':'));
    }

    #[test]
    fn logged_error_keeps_title_and_message() {
        let err = RelayError::Http {
            status: 503,
            message: "busy".into(),
        };
        let logged = LoggedError::from(&err);
        assert_eq!(logged.title, "Backend error");
        assert_eq!(logged.message, "backend responded with 503: busy");
        assert!(logged.detail.contains("Http"));
    }
}
