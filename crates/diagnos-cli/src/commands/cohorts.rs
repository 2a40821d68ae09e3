//! Cohorts command implementation.

use crate::config::{Config, FileService};
use crate::error::Result;
use crate::output::{CohortSummary, Formatter};
use diagnos_domain::CohortId;

/// Execute the cohorts command.
pub fn execute_cohorts(config: &Config, service: &FileService, formatter: &Formatter) -> Result<()> {
    let summaries = summarize(config, service);
    println!("{}", formatter.format_cohorts(&summaries)?);
    if !summaries.iter().any(|c| c.default) {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "Default cohort {} is not configured",
                config.default_cohort
            ))
        );
    }
    Ok(())
}

/// Shape and log size of every configured cohort.
///
/// Unreadable files show up as missing values rather than errors.
fn summarize(config: &Config, service: &FileService) -> Vec<CohortSummary> {
    service
        .cohorts()
        .into_iter()
        .map(|id: CohortId| {
            let q = service.qmatrix(id).ok();
            let responses = q
                .as_ref()
                .and_then(|_| service.responses(id).ok())
                .map(|r| r.students());
            CohortSummary {
                id,
                items: q.as_ref().map(|q| q.items()),
                skills: q.as_ref().map(|q| q.skills()),
                responses,
                default: id == config.default_cohort,
            }
        })
        .collect()
}
