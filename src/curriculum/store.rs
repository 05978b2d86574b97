//! Curriculum store: exact subject lookup with fuzzy correction on miss.
//! Documents are cached read-through in an LRU keyed by the canonical
//! lowercase subject name; entries are immutable for the process lifetime.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::matcher::find_best_match;
use super::source::{CurriculumSource, StoreError};
use super::CurriculumDocument;

/// Minimum similarity for correcting a misspelled subject name. Subject
/// names are short single tokens, so this sits above the strand threshold.
/// Empirically tuned; a default, not an invariant.
pub const SUBJECT_MATCH_THRESHOLD: u8 = 75;

const CACHE_CAPACITY: usize = 32;

/// A document together with the canonical subject name it was loaded under,
/// which may differ from what the caller asked for.
#[derive(Clone)]
pub struct LoadedCurriculum {
    pub subject: String,
    pub document: Arc<CurriculumDocument>,
}

pub struct CurriculumStore {
    source: Box<dyn CurriculumSource>,
    cache: Mutex<LruCache<String, Arc<CurriculumDocument>>>,
    subject_threshold: u8,
}

impl CurriculumStore {
    pub fn new(source: Box<dyn CurriculumSource>) -> Self {
        Self::with_threshold(source, SUBJECT_MATCH_THRESHOLD)
    }

    pub fn with_threshold(source: Box<dyn CurriculumSource>, subject_threshold: u8) -> Self {
        Self {
            source,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).expect("cache capacity must be > 0"),
            )),
            subject_threshold,
        }
    }

    /// Load the curriculum for `subject`, correcting the name against the
    /// available documents when the exact lookup misses. `Ok(None)` means
    /// "no curriculum for this subject" and is a normal outcome; only an
    /// unavailable data source is an error.
    pub fn load(&self, subject: &str) -> Result<Option<LoadedCurriculum>, StoreError> {
        let canonical = subject.trim().to_lowercase();
        if canonical.is_empty() {
            return Ok(None);
        }

        if let Some(document) = self.cache_get(&canonical) {
            return Ok(Some(LoadedCurriculum {
                subject: canonical,
                document,
            }));
        }

        match self.source.load(&canonical) {
            Ok(Some(document)) => {
                return Ok(Some(self.cache_put(canonical, document)));
            }
            Ok(None) => {}
            Err(StoreError::Malformed { subject, source }) => {
                // Data-integrity problem, not absence; the fuzzy pass below
                // may still land on a healthy similarly-named document.
                warn!(subject = %subject, error = %source, "curriculum file exists but failed to parse");
            }
            Err(e) => return Err(e),
        }

        let available = self.source.list_available()?;
        let Some(m) = find_best_match(&canonical, &available, self.subject_threshold) else {
            info!(requested = %canonical, "no curriculum close enough to subject name");
            return Ok(None);
        };
        let corrected = m.value.to_string();
        info!(requested = %canonical, matched = %corrected, score = m.score, "subject name corrected");

        if let Some(document) = self.cache_get(&corrected) {
            return Ok(Some(LoadedCurriculum {
                subject: corrected,
                document,
            }));
        }

        match self.source.load(&corrected) {
            Ok(Some(document)) => Ok(Some(self.cache_put(corrected, document))),
            Ok(None) => Ok(None),
            Err(StoreError::Malformed { subject, source }) => {
                warn!(subject = %subject, error = %source, "corrected curriculum failed to parse");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Canonical names of every subject that has a document.
    pub fn available_subjects(&self) -> Result<Vec<String>, StoreError> {
        self.source.list_available()
    }

    fn cache_get(&self, subject: &str) -> Option<Arc<CurriculumDocument>> {
        self.cache.lock().get(subject).cloned()
    }

    fn cache_put(&self, subject: String, document: CurriculumDocument) -> LoadedCurriculum {
        let document = Arc::new(document);
        self.cache.lock().put(subject.clone(), Arc::clone(&document));
        LoadedCurriculum { subject, document }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source counting loads, for cache and correction tests.
    struct MapSource {
        documents: Vec<(String, &'static str)>,
        loads: Arc<AtomicUsize>,
    }

    impl MapSource {
        fn new(documents: Vec<(String, &'static str)>) -> Self {
            Self {
                documents,
                loads: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl CurriculumSource for MapSource {
        fn load(&self, subject: &str) -> Result<Option<CurriculumDocument>, StoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            match self.documents.iter().find(|(name, _)| name == subject) {
                Some((name, json)) => serde_json::from_str(json)
                    .map(Some)
                    .map_err(|e| StoreError::Malformed {
                        subject: name.clone(),
                        source: e,
                    }),
                None => Ok(None),
            }
        }

        fn list_available(&self) -> Result<Vec<String>, StoreError> {
            let mut names: Vec<String> =
                self.documents.iter().map(|(name, _)| name.clone()).collect();
            names.sort();
            Ok(names)
        }
    }

    const GEOGRAPHY: &str = r#"{"strands":[{"name":"Population Growth","sub_strands":[]}]}"#;

    fn store_with(documents: Vec<(String, &'static str)>) -> CurriculumStore {
        CurriculumStore::new(Box::new(MapSource::new(documents)))
    }

    #[test]
    fn exact_subject_loads_without_correction() {
        let store = store_with(vec![("geography".to_string(), GEOGRAPHY)]);
        let loaded = store.load("Geography").expect("ok").expect("document");
        assert_eq!(loaded.subject, "geography");
        assert_eq!(loaded.document.strands[0].name, "Population Growth");
    }

    #[test]
    fn misspelled_subject_is_corrected() {
        let store = store_with(vec![
            ("geography".to_string(), GEOGRAPHY),
            ("history".to_string(), r#"{"strands":[]}"#),
        ]);
        let loaded = store.load("geogrphy").expect("ok").expect("document");
        assert_eq!(loaded.subject, "geography");
    }

    #[test]
    fn unrelated_subject_degrades_to_none() {
        let store = store_with(vec![("geography".to_string(), GEOGRAPHY)]);
        assert!(store.load("astrophysics").expect("ok").is_none());
    }

    #[test]
    fn empty_source_degrades_to_none() {
        let store = store_with(Vec::new());
        assert!(store.load("geography").expect("ok").is_none());
    }

    #[test]
    fn blank_subject_degrades_to_none() {
        let store = store_with(vec![("geography".to_string(), GEOGRAPHY)]);
        assert!(store.load("   ").expect("ok").is_none());
    }

    #[test]
    fn malformed_document_is_treated_as_absent() {
        let store = store_with(vec![("geography".to_string(), "{not json")]);
        assert!(store.load("geography").expect("ok").is_none());
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let source = MapSource::new(vec![("geography".to_string(), GEOGRAPHY)]);
        let loads = Arc::clone(&source.loads);
        let store = CurriculumStore::new(Box::new(source));
        store.load("geography").expect("ok").expect("document");
        store.load("GEOGRAPHY ").expect("ok").expect("document");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
