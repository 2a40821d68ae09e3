//! Remedial command implementation.

use super::requested_cohort;
use crate::cli::RemedialArgs;
use crate::config::{Config, FileService};
use crate::error::Result;
use crate::output::Formatter;
use diagnos_domain::SkillPattern;

/// Execute the remedial command.
pub fn execute_remedial(
    args: RemedialArgs,
    config: &Config,
    service: &FileService,
    formatter: &Formatter,
) -> Result<()> {
    let pattern: SkillPattern = args.skills.parse()?;
    let items = service.remedial(requested_cohort(&args.cohort, config), &pattern, args.count)?;

    println!("{}", formatter.format_remedial(&items)?);
    Ok(())
}
