//! Log command implementation.

use super::requested_cohort;
use crate::cli::{LogAction, LogArgs};
use crate::config::{Config, FileService};
use crate::error::Result;
use crate::output::Formatter;
use diagnos_domain::ResponseVector;

/// Execute the log command.
pub fn execute_log(
    args: LogArgs,
    config: &Config,
    service: &FileService,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        LogAction::Append { cohort, responses } => {
            let responses: ResponseVector = responses.parse()?;
            let cohort = service.append(requested_cohort(&cohort, config), &responses)?;
            eprintln!(
                "{}",
                formatter.success(&format!("Logged response for cohort {}", cohort))
            );
        }
        LogAction::Show { cohort, tail } => {
            let snapshot = service.responses(requested_cohort(&cohort, config))?;
            let skip = tail.map_or(0, |n| snapshot.students().saturating_sub(n));
            println!("{}", formatter.format_responses(&snapshot, skip)?);
        }
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
    fn test_append_then_show() {
        let (dir, config) = fixture::config();
        let service = config.open_service().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        for line in ["1 0 1", "0 0 1"] {
            let args = LogArgs {
                action: LogAction::Append {
                    cohort: CohortArg { cohort: Some(4) },
                    responses: line.to_string(),
                },
            };
            execute_log(args, &config, &service, &formatter).unwrap();
        }

        let args = LogArgs {
            action: LogAction::Show {
                cohort: CohortArg { cohort: None },
                tail: Some(1),
            },
        };
        execute_log(args, &config, &service, &formatter).unwrap();

        let logged = std::fs::read_to_string(dir.path().join("score4.txt")).unwrap();
        assert_eq!(logged, "1 0 1\n0 0 1\n");
    }

    #[test]
    fn test_append_wrong_length() {
        let (dir, config) = fixture::config();
        let service = config.open_service().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = LogArgs {
            action: LogAction::Append {
                cohort: CohortArg { cohort: Some(4) },
                responses: "1 0".to_string(),
            },
        };
        assert!(execute_log(args, &config, &service, &formatter).is_err());
        assert!(!dir.path().join("score4.txt").exists());
    }
}
