//! File-backed Q-matrix store

use crate::StoreError;
use diagnos_domain::traits::QMatrixStore;
use diagnos_domain::{CohortId, DiagnosisError, QMatrix};
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Serves Q-matrices from one text file per cohort
///
/// Each file holds an items x skills binary matrix, one item per line.
/// A matrix is parsed on first use and cached for the life of the store.
#[derive(Debug, Default)]
pub struct FileQMatrixStore {
    paths: BTreeMap<CohortId, PathBuf>,
    cache: RwLock<HashMap<CohortId, Arc<QMatrix>>>,
}

impl FileQMatrixStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cohort's file (builder style)
    pub fn with_cohort<P: Into<PathBuf>>(mut self, cohort: CohortId, path: P) -> Self {
        self.register(cohort, path);
        self
    }

    /// Register a cohort's file, replacing any previous registration
    pub fn register<P: Into<PathBuf>>(&mut self, cohort: CohortId, path: P) {
        self.paths.insert(cohort, path.into());
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(&cohort);
        }
    }

    /// Path registered for a cohort
    pub fn path(&self, cohort: CohortId) -> Option<&Path> {
        self.paths.get(&cohort).map(PathBuf::as_path)
    }

    fn read_file(cohort: CohortId, path: &Path) -> Result<QMatrix, StoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Domain(DiagnosisError::NotFound(format!(
                    "Q-matrix file {} for cohort {} does not exist",
                    path.display(),
                    cohort
                ))));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(QMatrix::parse(&text)?)
    }
}

impl QMatrixStore for FileQMatrixStore {
    type Error = StoreError;

    fn load(&self, cohort: CohortId) -> Result<Arc<QMatrix>, Self::Error> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| StoreError::LockPoisoned(cohort))?;
            if let Some(q) = cache.get(&cohort) {
                return Ok(Arc::clone(q));
            }
        }

        let path = self
            .paths
            .get(&cohort)
            .ok_or_else(|| StoreError::unknown_cohort("Q-matrix", cohort))?;
        let q = Arc::new(Self::read_file(cohort, path)?);
        debug!(
            "Loaded Q-matrix for cohort {} from {}: {} items x {} skills",
            cohort,
            path.display(),
            q.items(),
            q.skills()
        );

        let mut cache = self
            .cache
            .write()
            .map_err(|_| StoreError::LockPoisoned(cohort))?;
        Ok(Arc::clone(cache.entry(cohort).or_insert(q)))
    }

    fn cohorts(&self) -> Vec<CohortId> {
        self.paths.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_and_cache() {
        let file = write_temp("1 0\n0 1\n1 1\n");
        let store = FileQMatrixStore::new().with_cohort(CohortId(4), file.path());

        let first = store.load(CohortId(4)).unwrap();
        assert_eq!(first.items(), 3);
        assert_eq!(first.skills(), 2);

        let second = store.load(CohortId(4)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_cohort() {
        let store = FileQMatrixStore::new();
        let err = store.load(CohortId(9)).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DiagnosisError::NotFound(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let store = FileQMatrixStore::new().with_cohort(CohortId(4), "/nonexistent/q.txt");
        let err = store.load(CohortId(4)).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DiagnosisError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_temp("1 0\n0 2\n");
        let store = FileQMatrixStore::new().with_cohort(CohortId(4), file.path());
        let err = store.load(CohortId(4)).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DiagnosisError::MalformedData(_))));
    }

    #[test]
    fn test_cohorts_sorted() {
        let store = FileQMatrixStore::new()
            .with_cohort(CohortId(8), "b.txt")
            .with_cohort(CohortId(4), "a.txt");
        assert_eq!(store.cohorts(), vec![CohortId(4), CohortId(8)]);
    }
}
