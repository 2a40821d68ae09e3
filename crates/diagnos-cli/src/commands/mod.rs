//! Command implementations.

pub mod calibrate;
pub mod cohorts;
pub mod diagnose;
pub mod estimate;
pub mod log;
pub mod remedial;
pub mod simulate;

pub use self::calibrate::execute_calibrate;
pub use self::cohorts::execute_cohorts;
pub use self::diagnose::execute_diagnose;
pub use self::estimate::execute_estimate;
pub use self::log::execute_log;
pub use self::remedial::execute_remedial;
pub use self::simulate::execute_simulate;

use crate::cli::CohortArg;
use crate::config::Config;
use diagnos_domain::CohortId;

/// Requested cohort, or the configured default when none was given.
fn requested_cohort(arg: &CohortArg, config: &Config) -> CohortId {
    arg.cohort.map(CohortId).unwrap_or(config.default_cohort)
}

#[cfg(test)]
pub(crate) mod fixture {
    use crate::config::{CohortEntry, Config};
    use diagnos_domain::CohortId;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Config with one 3-item, 2-skill cohort (4) in a temporary directory
    pub fn config() -> (TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("q4.txt"), "1 0\n0 1\n1 1\n").unwrap();
        let mut config = Config::default().with_base_dir(dir.path());
        config.cohorts = vec![CohortEntry {
            id: CohortId(4),
            qmatrix: PathBuf::from("q4.txt"),
            responses: PathBuf::from("score4.txt"),
        }];
        (dir, config)
    }
}
