//! File-backed append-only response log

use crate::StoreError;
use diagnos_domain::traits::ResponseLog;
use diagnos_domain::{BinaryMatrix, CohortId, DiagnosisError, ResponseMatrix, ResponseVector};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// One cohort's log file and its lock
#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    items: usize,
    lock: RwLock<()>,
}

/// Append-only response log, one text file per cohort
///
/// Each line holds one response vector as space-separated 0/1 values.
/// Rows are never rewritten or removed.
///
/// # Thread Safety
///
/// Every cohort has its own `RwLock`. Appends hold the write half for the
/// whole open-write-sync sequence; reads hold the read half, so they run
/// alongside each other but never see a half-written line. The lock is
/// per process; two processes appending to the same file are not
/// coordinated.
#[derive(Debug, Default)]
pub struct FileResponseLog {
    cohorts: BTreeMap<CohortId, LogFile>,
}

impl FileResponseLog {
    /// Create a log with no cohorts
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cohort's file and item count (builder style)
    pub fn with_cohort<P: Into<PathBuf>>(mut self, cohort: CohortId, path: P, items: usize) -> Self {
        self.register(cohort, path, items);
        self
    }

    /// Register a cohort's file and item count
    pub fn register<P: Into<PathBuf>>(&mut self, cohort: CohortId, path: P, items: usize) {
        self.cohorts.insert(
            cohort,
            LogFile {
                path: path.into(),
                items,
                lock: RwLock::new(()),
            },
        );
    }

    /// Path of a cohort's log file
    pub fn path(&self, cohort: CohortId) -> Option<&Path> {
        self.cohorts.get(&cohort).map(|log| log.path.as_path())
    }

    /// Item count a cohort's vectors must have
    pub fn items(&self, cohort: CohortId) -> Option<usize> {
        self.cohorts.get(&cohort).map(|log| log.items)
    }

    fn log_file(&self, cohort: CohortId) -> Result<&LogFile, StoreError> {
        self.cohorts
            .get(&cohort)
            .ok_or_else(|| StoreError::unknown_cohort("response log", cohort))
    }
}

/// True if the file is non-empty and its last byte is not a newline
fn missing_trailing_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Append target that can be cut back to an earlier length
trait Truncate: Write {
    fn current_len(&mut self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl Truncate for File {
    fn current_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Write and sync `bytes`; on failure remove whatever part of them landed
fn append_durably<T: Truncate>(sink: &mut T, bytes: &[u8]) -> io::Result<()> {
    let len = sink.current_len()?;
    let result = sink.write_all(bytes).and_then(|()| sink.sync());
    if result.is_err() {
        if let Err(e) = sink.truncate_to(len) {
            warn!("Could not remove partial log line: {}", e);
        }
    }
    result
}

impl ResponseLog for FileResponseLog {
    type Error = StoreError;

    fn append(&self, cohort: CohortId, vector: &ResponseVector) -> Result<(), Self::Error> {
        let log = self.log_file(cohort)?;
        DiagnosisError::check_dimension(
            format!("response vector for cohort {}", cohort),
            log.items,
            vector.len(),
        )?;

        let _guard = log
            .lock
            .write()
            .map_err(|_| StoreError::LockPoisoned(cohort))?;

        if let Some(parent) = log.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&log.path)?;

        // Hand-edited files may lack the final newline
        let mut line = String::new();
        if missing_trailing_newline(&mut file)? {
            line.push('\n');
        }
        line.push_str(&vector.to_string());
        line.push('\n');

        append_durably(&mut file, line.as_bytes())?;

        debug!("Appended response to cohort {} log {}", cohort, log.path.display());
        Ok(())
    }

    fn read_all(&self, cohort: CohortId) -> Result<ResponseMatrix, Self::Error> {
        let log = self.log_file(cohort)?;
        let _guard = log
            .lock
            .read()
            .map_err(|_| StoreError::LockPoisoned(cohort))?;

        let text = match std::fs::read_to_string(&log.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ResponseMatrix::empty(log.items)),
            Err(e) => return Err(e.into()),
        };

        let matrix = BinaryMatrix::parse_with_width(&text, log.items)?;
        Ok(ResponseMatrix::new(matrix))
    }
}
