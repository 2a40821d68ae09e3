//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Diagnos CLI - Diagnose student skill mastery and pick remedial items.
#[derive(Debug, Parser)]
#[command(name = "diagnos")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DIAGNOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare values)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a student's responses, recalibrate and estimate their skills
    Diagnose(DiagnoseArgs),

    /// Calibrate item parameters on a cohort's response log
    Calibrate(CalibrateArgs),

    /// Estimate skills without logging the responses
    Estimate(EstimateArgs),

    /// Recommend remedial items for a skill pattern
    Remedial(RemedialArgs),

    /// Append to or show a cohort's response log
    Log(LogArgs),

    /// Write a synthetic Q-matrix and response log
    Simulate(SimulateArgs),

    /// List configured cohorts
    Cohorts,
}

/// Cohort selection shared by most commands.
#[derive(Debug, Clone, Args)]
pub struct CohortArg {
    /// Cohort (grade); defaults to the configured default cohort
    #[arg(short = 'g', long)]
    pub cohort: Option<u32>,
}

/// Arguments for the diagnose command.
#[derive(Debug, Parser)]
pub struct DiagnoseArgs {
    #[command(flatten)]
    pub cohort: CohortArg,

    /// Responses, one 0/1 per item (e.g. "1 0 1 1")
    #[arg(short, long)]
    pub responses: String,

    /// Also list remedial items for the estimated pattern
    #[arg(long)]
    pub remedial: bool,
}

/// Arguments for the calibrate command.
#[derive(Debug, Parser)]
pub struct CalibrateArgs {
    #[command(flatten)]
    pub cohort: CohortArg,

    /// Write the calibration report as JSON
    #[arg(short, long)]
    pub save: Option<PathBuf>,
}

/// Arguments for the estimate command.
#[derive(Debug, Parser)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub cohort: CohortArg,

    /// Responses, one 0/1 per item
    #[arg(short, long)]
    pub responses: String,

    /// Calibration report saved by `calibrate --save`; calibrates afresh when omitted
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Also show the probability that each skill is mastered
    #[arg(long)]
    pub probabilities: bool,
}

/// Arguments for the remedial command.
#[derive(Debug, Parser)]
pub struct RemedialArgs {
    #[command(flatten)]
    pub cohort: CohortArg,

    /// Skill pattern, one 0/1 per skill (e.g. "1 0 1")
    #[arg(short, long)]
    pub skills: String,

    /// Number of items; defaults to the configured count
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

/// Arguments for the log command.
#[derive(Debug, Parser)]
pub struct LogArgs {
    #[command(subcommand)]
    pub action: LogAction,
}

/// Response log actions.
#[derive(Debug, Subcommand)]
pub enum LogAction {
    /// Append one response vector
    Append {
        #[command(flatten)]
        cohort: CohortArg,

        /// Responses, one 0/1 per item
        #[arg(short, long)]
        responses: String,
    },

    /// Print the logged responses
    Show {
        #[command(flatten)]
        cohort: CohortArg,

        /// Only the most recent rows
        #[arg(short, long)]
        tail: Option<usize>,
    },
}

/// Arguments for the simulate command.
#[derive(Debug, Parser)]
pub struct SimulateArgs {
    /// Number of items
    #[arg(long, default_value = "42")]
    pub items: usize,

    /// Number of skills
    #[arg(long, default_value = "15")]
    pub skills: usize,

    /// Number of students
    #[arg(long, default_value = "500")]
    pub students: usize,

    /// RNG seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Probability that a student masters a skill
    #[arg(long, default_value = "0.7")]
    pub mastery_rate: f64,

    /// Output directory
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// File name stem; writes `<name>-qmatrix.txt`, `<name>-responses.txt`
    /// and `<name>-truth.json`
    #[arg(long, default_value = "simulated")]
    pub name: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
