//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use diagnos_domain::traits::QMatrixStore;
use diagnos_domain::CohortId;
use diagnos_engine::{CalibrationConfig, CohortPolicy, DiagnosisService, EngineConfig, RemedialConfig};
use diagnos_store::{FileQMatrixStore, FileResponseLog};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Diagnosis service over the configured files.
pub type FileService = DiagnosisService<FileQMatrixStore, FileResponseLog>;

/// CLI configuration.
///
/// ```toml
/// default_cohort = 4
/// strict_cohorts = false
///
/// [[cohorts]]
/// id = 4
/// qmatrix = "grade4-qmatrix.txt"
/// responses = "score4.txt"
///
/// [calibration]
/// max_iterations = 100
///
/// [remedial]
/// num_remedial = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cohort used for unknown cohort ids
    #[serde(default = "default_cohort")]
    pub default_cohort: CohortId,

    /// Reject unknown cohorts instead of falling back
    #[serde(default)]
    pub strict_cohorts: bool,

    /// Registered cohorts
    #[serde(default = "default_cohorts")]
    pub cohorts: Vec<CohortEntry>,

    /// EM settings
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Remedial selection settings
    #[serde(default)]
    pub remedial: RemedialConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Files of one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortEntry {
    /// Cohort identifier (the grade in the default setup)
    pub id: CohortId,

    /// Q-matrix file (items x skills)
    pub qmatrix: PathBuf,

    /// Response log file (one response vector per line)
    pub responses: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".diagnos").join("config.toml"))
    }

    /// Load configuration from the default location or fall back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.base_dir = parent.to_path_buf();
            }
            Ok(config)
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check cohort ids and engine settings.
    pub fn validate(&self) -> Result<()> {
        let mut ids: Vec<CohortId> = self.cohorts.iter().map(|c| c.id).collect();
        ids.sort();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(CliError::Config(format!("Cohort {} is configured twice", pair[0])));
        }
        self.engine_config().validate()?;
        Ok(())
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Override the base directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Resolve a configured path against the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Look up a cohort entry.
    pub fn cohort(&self, id: CohortId) -> Option<&CohortEntry> {
        self.cohorts.iter().find(|c| c.id == id)
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            calibration: self.calibration.clone(),
            remedial: self.remedial.clone(),
            cohorts: CohortPolicy {
                default_cohort: self.default_cohort,
                strict: self.strict_cohorts,
            },
        }
    }

    /// Build the diagnosis service over the configured files.
    ///
    /// A cohort whose Q-matrix cannot be read is still listed; using it
    /// reports the load error.
    pub fn open_service(&self) -> Result<FileService> {
        let mut qmatrices = FileQMatrixStore::new();
        for entry in &self.cohorts {
            qmatrices.register(entry.id, self.resolve(&entry.qmatrix));
        }

        let mut log = FileResponseLog::new();
        for entry in &self.cohorts {
            match qmatrices.load(entry.id) {
                Ok(q) => log.register(entry.id, self.resolve(&entry.responses), q.items()),
                Err(e) => warn!("Cohort {} is unavailable: {}", entry.id, e),
            }
        }

        Ok(DiagnosisService::new(qmatrices, log, self.engine_config()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_cohort: default_cohort(),
            strict_cohorts: false,
            cohorts: default_cohorts(),
            calibration: CalibrationConfig::default(),
            remedial: RemedialConfig::default(),
            settings: Settings::default(),
            base_dir: PathBuf::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_cohort() -> CohortId {
    CohortId(4)
}

fn default_cohorts() -> Vec<CohortEntry> {
    [4, 8]
        .into_iter()
        .map(|grade| CohortEntry {
            id: CohortId(grade),
            qmatrix: PathBuf::from(format!("grade{}-qmatrix.txt", grade)),
            responses: PathBuf::from(format!("score{}.txt", grade)),
        })
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
