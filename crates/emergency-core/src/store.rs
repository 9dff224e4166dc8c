//! Record Store
//!
//! Two JSON collections under the logs directory, each rewritten wholesale on
//! every save: read the current array (empty when the file is missing or
//! zero-length), append, write the whole array back.
//!
//! Not safe for concurrent writers; one process, one operation at a time.

use crate::{FeedbackRecord, IncidentReport, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const INCIDENTS_FILE: &str = "emergency_history.json";
pub const FEEDBACK_FILE: &str = "user_feedback.json";

pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    /// The directory is not touched until the first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn incidents_path(&self) -> PathBuf {
        self.dir.join(INCIDENTS_FILE)
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.dir.join(FEEDBACK_FILE)
    }

    /// Append the report to the history under a fresh identifier.
    ///
    /// The caller's report only receives the identifier once the write
    /// succeeded.
    pub fn save_incident(&self, report: &mut IncidentReport) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut stored = report.clone();
        stored.assign_id(id.clone());

        let path = self.incidents_path();
        let mut incidents: Vec<IncidentReport> = read_collection(&path)?;
        incidents.push(stored);
        self.write_collection(&path, &incidents)?;
        report.assign_id(id.clone());

        tracing::info!(%id, total = incidents.len(), "incident persisted");
        Ok(id)
    }

    /// Append a feedback record; its incident must already be persisted
    pub fn save_feedback(&self, feedback: &FeedbackRecord) -> Result<(), StoreError> {
        let known = self
            .load_incidents()?
            .iter()
            .any(|r| r.id() == Some(feedback.emergency_id()));
        if !known {
            return Err(StoreError::UnknownIncident(feedback.emergency_id().to_string()));
        }

        let path = self.feedback_path();
        let mut records: Vec<FeedbackRecord> = read_collection(&path)?;
        records.push(feedback.clone());
        self.write_collection(&path, &records)?;

        tracing::info!(id = feedback.emergency_id(), "feedback persisted");
        Ok(())
    }

    pub fn load_incidents(&self) -> Result<Vec<IncidentReport>, StoreError> {
        read_collection(&self.incidents_path())
    }

    pub fn load_feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        read_collection(&self.feedback_path())
    }

    fn write_collection<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmergencyKind, Rating};
    use tempfile::TempDir;

    fn report(location: &str) -> IncidentReport {
        IncidentReport::new(
            EmergencyKind::Assault,
            location.into(),
            4,
            "Name: Ana Ruiz".into(),
        )
    }

    #[test]
    fn test_directory_created_lazily() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path().join("nested").join("logs"));
        assert!(!store.dir().exists());
        assert!(store.load_incidents().unwrap().is_empty());
        assert!(!store.dir().exists());

        store.save_incident(&mut report("Calle Mayor")).unwrap();
        assert!(store.incidents_path().exists());
    }

    #[test]
    fn test_save_then_reload_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());

        let mut first = report("Calle Mayor");
        let mut second = report("Plaza Nueva");
        let id1 = store.save_incident(&mut first).unwrap();
        let id2 = store.save_incident(&mut second).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(second.id(), Some(id2.as_str()));

        let loaded = store.load_incidents().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], first);
        assert_eq!(loaded.last(), Some(&second));
    }

    #[test]
    fn test_empty_file_treated_as_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());
        fs::write(store.incidents_path(), "").unwrap();

        store.save_incident(&mut report("Calle Mayor")).unwrap();
        assert_eq!(store.load_incidents().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_collection_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());
        fs::write(store.incidents_path(), "{ not json").unwrap();

        let mut rejected = report("Calle Mayor");
        let result = store.save_incident(&mut rejected);
        assert!(matches!(result, Err(StoreError::Json { .. })));
        assert!(rejected.id().is_none());
    }

    #[test]
    fn test_feedback_requires_known_incident() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());

        let orphan = FeedbackRecord::new("missing", Rating::Score(3), "");
        assert!(matches!(
            store.save_feedback(&orphan),
            Err(StoreError::UnknownIncident(_))
        ));
        assert!(!store.feedback_path().exists());

        let id = store.save_incident(&mut report("Calle Mayor")).unwrap();
        let feedback = FeedbackRecord::new(id.clone(), Rating::Skipped, "fine");
        store.save_feedback(&feedback).unwrap();

        let loaded = store.load_feedback().unwrap();
        assert_eq!(loaded, vec![feedback]);
        assert_eq!(loaded[0].emergency_id(), id);
    }
}
