//! Estimate command implementation.

use super::requested_cohort;
use crate::cli::EstimateArgs;
use crate::config::{Config, FileService};
use crate::error::Result;
use crate::output::Formatter;
use diagnos_domain::{ItemParameters, ResponseVector};
use diagnos_engine::{CalibrationReport, SkillEstimator};
use std::fs;
use std::path::Path;

/// Execute the estimate command.
pub fn execute_estimate(
    args: EstimateArgs,
    config: &Config,
    service: &FileService,
    formatter: &Formatter,
) -> Result<()> {
    let cohort = service.resolve_cohort(requested_cohort(&args.cohort, config))?;
    let responses: ResponseVector = args.responses.parse()?;

    let parameters = match &args.params {
        Some(path) => load_parameters(path)?,
        None => service.calibrate(cohort)?.parameters,
    };

    let estimate = service.estimate(cohort, &responses, Some(parameters.clone()))?;
    let probabilities = if args.probabilities {
        let estimator = SkillEstimator::new(service.qmatrix(cohort)?, parameters)?;
        Some(estimator.skill_probabilities(responses.as_slice())?)
    } else {
        None
    };

    println!(
        "{}",
        formatter.format_estimate(&estimate, probabilities.as_deref())?
    );
    Ok(())
}

/// Read item parameters from a saved calibration report.
fn load_parameters(path: &Path) -> Result<Vec<ItemParameters>> {
    let contents = fs::read_to_string(path)?;
    let report: CalibrationReport = serde_json::from_str(&contents)?;
    Ok(report.parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CohortArg;
    use crate::commands::fixture;
    use crate::config::OutputFormat;

    fn report(items: usize) -> CalibrationReport {
        CalibrationReport {
            parameters: ItemParameters::uniform(items, 0.1, 0.9),
            iterations: 1,
            converged: true,
            log_likelihood: 0.0,
            final_delta: 0.0,
            students: 1,
            skills: 2,
        }
    }

    #[test]
    fn test_estimate_with_saved_params_does_not_log() {
        let (dir, config) = fixture::config();
        let params = dir.path().join("params.json");
        std::fs::write(&params, serde_json::to_string(&report(3)).unwrap()).unwrap();
        let service = config.open_service().unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);

        let args = EstimateArgs {
            cohort: CohortArg { cohort: Some(4) },
            responses: "1 0 0".to_string(),
            params: Some(params),
            probabilities: true,
        };
        execute_estimate(args, &config, &service, &formatter).unwrap();
        assert!(!dir.path().join("score4.txt").exists());
    }

    #[test]
    fn test_estimate_with_wrong_param_count() {
        let (dir, config) = fixture::config();
        let params = dir.path().join("params.json");
        std::fs::write(&params, serde_json::to_string(&report(5)).unwrap()).unwrap();
        let service = config.open_service().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = EstimateArgs {
            cohort: CohortArg { cohort: None },
            responses: "1 0 0".to_string(),
            params: Some(params),
            probabilities: false,
        };
        assert!(execute_estimate(args, &config, &service, &formatter).is_err());
    }
}
