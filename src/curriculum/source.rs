//! Curriculum data source: where documents come from.
//! The store talks to a `CurriculumSource` trait so resolution logic can be
//! tested without a real filesystem; production uses `DirSource`, one
//! `<subject>_curriculum.json` file per subject.

use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::CurriculumDocument;

/// Suffix of every curriculum file inside the data directory.
const FILE_SUFFIX: &str = "_curriculum.json";

#[derive(Debug)]
pub enum StoreError {
    /// The data source itself is inaccessible (permissions, I/O). The only
    /// condition that aborts a request instead of degrading.
    Unavailable { subject: String, source: io::Error },
    /// A document exists but is not valid structured data. Functionally
    /// equivalent to absence, but surfaced separately for observability.
    Malformed {
        subject: String,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable { subject, source } => {
                write!(f, "curriculum source unavailable for '{subject}': {source}")
            }
            StoreError::Malformed { subject, source } => {
                write!(f, "curriculum for '{subject}' is malformed: {source}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// A set of named curriculum documents, addressable by canonical subject
/// name and enumerable. `load` returns `Ok(None)` for plain absence.
pub trait CurriculumSource: Send + Sync {
    fn load(&self, subject: &str) -> Result<Option<CurriculumDocument>, StoreError>;

    /// Canonical names of all subjects a document exists for, sorted so
    /// fuzzy tie-breaking stays deterministic.
    fn list_available(&self) -> Result<Vec<String>, StoreError>;
}

/// Directory of `<subject>_curriculum.json` files.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, subject: &str) -> PathBuf {
        self.dir.join(format!("{subject}{FILE_SUFFIX}"))
    }
}

impl CurriculumSource for DirSource {
    fn load(&self, subject: &str) -> Result<Option<CurriculumDocument>, StoreError> {
        let path = self.path_for(subject);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(subject, path = %path.display(), "no curriculum file");
                return Ok(None);
            }
            Err(e) => {
                return Err(StoreError::Unavailable {
                    subject: subject.to_string(),
                    source: e,
                })
            }
        };

        let document = serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
            subject: subject.to_string(),
            source: e,
        })?;
        Ok(Some(document))
    }

    fn list_available(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // A missing data directory means "no subjects", not a failure.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Unavailable {
                    subject: String::new(),
                    source: e,
                })
            }
        };

        let mut subjects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Unavailable {
                subject: String::new(),
                source: e,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(subject) = name.strip_suffix(FILE_SUFFIX) {
                if !subject.is_empty() {
                    subjects.push(subject.to_lowercase());
                }
            }
        }
        subjects.sort();
        Ok(subjects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_lists_no_subjects() {
        let source = DirSource::new("/nonexistent/curriculum/dir");
        assert!(source.list_available().expect("ok").is_empty());
    }

    #[test]
    fn missing_file_is_absence_not_error() {
        let source = DirSource::new(std::env::temp_dir());
        assert!(source.load("no-such-subject").expect("ok").is_none());
    }
}
