//! Simulate command implementation.

use crate::cli::SimulateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use diagnos_engine::{simulate, SimulationConfig};
use serde_json::json;
use std::fs;

/// Execute the simulate command.
pub fn execute_simulate(args: SimulateArgs, formatter: &Formatter) -> Result<()> {
    if args.name.is_empty() || args.name.contains(['/', '\\']) {
        return Err(CliError::InvalidInput(format!(
            "'{}' is not a valid file name stem",
            args.name
        )));
    }

    let config = SimulationConfig {
        items: args.items,
        skills: args.skills,
        students: args.students,
        seed: args.seed,
        mastery_rate: args.mastery_rate,
        ..SimulationConfig::default()
    };
    let data = simulate(&config)?;

    fs::create_dir_all(&args.out_dir)?;
    let q_path = args.out_dir.join(format!("{}-qmatrix.txt", args.name));
    let responses_path = args.out_dir.join(format!("{}-responses.txt", args.name));
    let truth_path = args.out_dir.join(format!("{}-truth.json", args.name));

    fs::write(&q_path, data.qmatrix.as_matrix().to_text())?;
    fs::write(&responses_path, data.responses.as_matrix().to_text())?;
    let truth = json!({
        "config": config,
        "parameters": data.parameters,
        "profiles": data.profiles,
    });
    fs::write(&truth_path, serde_json::to_string_pretty(&truth)?)?;

    eprintln!(
        "{}",
        formatter.success(&format!(
            "Simulated {} students on {} items and {} skills",
            config.students, config.items, config.skills
        ))
    );
    println!("{}", q_path.display());
    println!("{}", responses_path.display());
    println!("{}", truth_path.display());
    Ok(())
}
