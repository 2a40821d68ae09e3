//! Calibrate command implementation.

use super::requested_cohort;
use crate::cli::CalibrateArgs;
use crate::config::{Config, FileService};
use crate::error::Result;
use crate::output::Formatter;
use std::fs;

/// Execute the calibrate command.
pub fn execute_calibrate(
    args: CalibrateArgs,
    config: &Config,
    service: &FileService,
    formatter: &Formatter,
) -> Result<()> {
    let report = service.calibrate(requested_cohort(&args.cohort, config))?;

    println!("{}", formatter.format_report(&report)?);

    if let Some(path) = args.save {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        eprintln!(
            "{}",
            formatter.success(&format!("Calibration saved to {}", path.display()))
        );
    }

    Ok(())
}
