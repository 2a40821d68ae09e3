//! Diagnose command implementation.

use super::requested_cohort;
use crate::cli::DiagnoseArgs;
use crate::config::{Config, FileService};
use crate::error::Result;
use crate::output::Formatter;
use diagnos_domain::ResponseVector;

/// Execute the diagnose command.
pub fn execute_diagnose(
    args: DiagnoseArgs,
    config: &Config,
    service: &FileService,
    formatter: &Formatter,
) -> Result<()> {
    let responses: ResponseVector = args.responses.parse()?;
    let diagnosis = service.diagnose(requested_cohort(&args.cohort, config), &responses)?;

    println!("{}", formatter.format_diagnosis(&diagnosis)?);

    if args.remedial {
        let items = service.remedial(diagnosis.cohort, &diagnosis.estimate.pattern, None)?;
        println!("{}", formatter.format_remedial(&items)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CohortArg;
    use crate::commands::fixture;
    use crate::config::OutputFormat;

    #[test]
    fn test_diagnose_appends_to_log() {
        let (dir, config) = fixture::config();
        let service = config.open_service().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = DiagnoseArgs {
            cohort: CohortArg { cohort: None },
            responses: "1 0 1".to_string(),
            remedial: true,
        };
        execute_diagnose(args, &config, &service, &formatter).unwrap();

        let logged = std::fs::read_to_string(dir.path().join("score4.txt")).unwrap();
        assert_eq!(logged, "1 0 1\n");
    }

    #[test]
    fn test_diagnose_rejects_bad_input() {
        let (dir, config) = fixture::config();
        let service = config.open_service().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = DiagnoseArgs {
            cohort: CohortArg { cohort: Some(4) },
            responses: "1 0 2".to_string(),
            remedial: false,
        };
        assert!(execute_diagnose(args, &config, &service, &formatter).is_err());
        assert!(!dir.path().join("score4.txt").exists());
    }
}
