//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use diagnos_domain::matrix::format_row;
use diagnos_domain::{CohortId, ResponseMatrix};
use diagnos_engine::{CalibrationReport, Diagnosis, RemedialItem, SkillEstimate};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One row of the `cohorts` listing.
#[derive(Debug, Clone, Serialize)]
pub struct CohortSummary {
    /// Cohort identifier
    pub id: CohortId,
    /// Item count, if the Q-matrix loaded
    pub items: Option<usize>,
    /// Skill count, if the Q-matrix loaded
    pub skills: Option<usize>,
    /// Logged responses, if the log could be read
    pub responses: Option<usize>,
    /// Whether unknown cohorts fall back to this one
    pub default: bool,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a full diagnosis.
    pub fn format_diagnosis(&self, diagnosis: &Diagnosis) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(diagnosis)?),
            OutputFormat::Quiet => Ok(diagnosis.estimate.pattern.to_string()),
            OutputFormat::Table => {
                let items = diagnosis.calibration.items();
                let mut lines = vec![
                    format!("Cohort:          {}", diagnosis.cohort),
                    format!("Score:           {}/{}", diagnosis.score, items),
                ];
                lines.push(self.estimate_line(&diagnosis.estimate));
                lines.push(self.unmastered_line(&diagnosis.estimate));
                lines.push(format!(
                    "Calibration:     {} students, {} iterations{}",
                    diagnosis.calibration.students,
                    diagnosis.calibration.iterations,
                    if diagnosis.calibration.converged {
                        ""
                    } else {
                        " (cap reached)"
                    }
                ));
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a skill estimate, optionally with per-skill probabilities.
    pub fn format_estimate(&self, estimate: &SkillEstimate, probabilities: Option<&[f64]>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "estimate": estimate,
                "skill_probabilities": probabilities,
            }))?),
            OutputFormat::Quiet => Ok(estimate.pattern.to_string()),
            OutputFormat::Table => {
                let mut out = vec![self.estimate_line(estimate), self.unmastered_line(estimate)];
                if let Some(probs) = probabilities {
                    let mut builder = Builder::default();
                    builder.push_record(["Skill", "Mastered", "P(mastered)"]);
                    for (k, (bit, p)) in estimate.pattern.as_slice().iter().zip(probs).enumerate() {
                        builder.push_record([k.to_string(), bit.to_string(), format!("{:.3}", p)]);
                    }
                    out.push(self.table(builder));
                }
                Ok(out.join("\n"))
            }
        }
    }

    /// Format ranked remedial items.
    pub fn format_remedial(&self, items: &[RemedialItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
            OutputFormat::Quiet => Ok(items
                .iter()
                .map(|i| i.index.to_string())
                .collect::<Vec<_>>()
                .join(" ")),
            OutputFormat::Table => {
                if items.is_empty() {
                    return Ok(self.colorize("No remedial items.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Rank", "Item", "Distance"]);
                for (rank, item) in items.iter().enumerate() {
                    builder.push_record([
                        (rank + 1).to_string(),
                        item.index.to_string(),
                        item.distance.to_string(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a calibration report.
    pub fn format_report(&self, report: &CalibrationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(report
                .parameters
                .iter()
                .map(|p| format!("{:.4} {:.4}", p.guess, p.no_slip))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Item", "Guess", "No-slip", "Discrimination"]);
                for (i, p) in report.parameters.iter().enumerate() {
                    builder.push_record([
                        i.to_string(),
                        format!("{:.4}", p.guess),
                        format!("{:.4}", p.no_slip),
                        format!("{:.4}", p.discrimination()),
                    ]);
                }
                let summary = if report.converged {
                    report.summary()
                } else {
                    self.colorize(&report.summary(), "yellow")
                };
                Ok(format!("{}\n\n{}", summary, self.table(builder)))
            }
        }
    }

    /// Format logged responses.
    pub fn format_responses(&self, responses: &ResponseMatrix, skip: usize) -> Result<String> {
        let rows: Vec<&[u8]> = responses.iter_rows().skip(skip).collect();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
            OutputFormat::Quiet => Ok(rows.iter().map(|r| format_row(r)).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No responses logged.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Row", "Score", "Responses"]);
                for (i, row) in rows.iter().enumerate() {
                    let score = row.iter().filter(|&&v| v == 1).count();
                    builder.push_record([
                        (skip + i).to_string(),
                        format!("{}/{}", score, row.len()),
                        format_row(row),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format the cohort listing.
    pub fn format_cohorts(&self, cohorts: &[CohortSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(cohorts)?),
            OutputFormat::Quiet => Ok(cohorts
                .iter()
                .map(|c| c.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if cohorts.is_empty() {
                    return Ok(self.colorize("No cohorts configured.", "yellow"));
                }
                let show = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |n| n.to_string());
                let mut builder = Builder::default();
                builder.push_record(["Cohort", "Items", "Skills", "Responses", "Default"]);
                for c in cohorts {
                    builder.push_record([
                        c.id.to_string(),
                        show(c.items),
                        show(c.skills),
                        show(c.responses),
                        if c.default { "*".to_string() } else { String::new() },
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn estimate_line(&self, estimate: &SkillEstimate) -> String {
        format!(
            "Skill pattern:   {} ({} of {} mastered)",
            self.colorize(&estimate.pattern.to_string(), "cyan"),
            estimate.pattern.mastered_count(),
            estimate.pattern.len()
        )
    }

    fn unmastered_line(&self, estimate: &SkillEstimate) -> String {
        let missing = estimate.pattern.unmastered();
        let text = if missing.is_empty() {
            "none".to_string()
        } else {
            missing
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("Unmastered:      {}", text)
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnos_domain::{BinaryMatrix, ItemParameters, SkillPattern};

    fn estimate() -> SkillEstimate {
        SkillEstimate {
            pattern: SkillPattern::new(vec![1, 0, 1]).unwrap(),
            class: 0b101,
            log_likelihood: -3.2,
        }
    }

    fn report() -> CalibrationReport {
        CalibrationReport {
            parameters: vec![ItemParameters::new(0.2, 0.8).unwrap(); 2],
            iterations: 5,
            converged: true,
            log_likelihood: -10.0,
            final_delta: 0.00001,
            students: 3,
            skills: 3,
        }
    }

    #[test]
    fn test_estimate_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_estimate(&estimate(), None).unwrap(), "1 0 1");
    }

    #[test]
    fn test_estimate_table_lists_unmastered() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_estimate(&estimate(), Some(&[0.9, 0.1, 0.8]))
            .unwrap();
        assert!(output.contains("2 of 3 mastered"));
        assert!(output.contains("Unmastered:      1"));
        assert!(output.contains("P(mastered)"));
    }

    #[test]
    fn test_estimate_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_estimate(&estimate(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["estimate"]["pattern"], serde_json::json!([1, 0, 1]));
        assert_eq!(value["estimate"]["class"], 5);
    }

    #[test]
    fn test_remedial_formats() {
        let items = vec![
            RemedialItem { index: 0, distance: 0 },
            RemedialItem { index: 2, distance: 1 },
        ];
        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.format_remedial(&items).unwrap(), "0 2");

        let table = Formatter::new(OutputFormat::Table, false);
        assert!(table.format_remedial(&items).unwrap().contains("Distance"));
        assert!(table.format_remedial(&[]).unwrap().contains("No remedial items"));
    }

    #[test]
    fn test_report_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&report()).unwrap();
        assert!(output.contains("Calibration Summary"));
        assert!(output.contains("No-slip"));
        assert!(output.contains("0.6000"));
    }

    #[test]
    fn test_responses_skip() {
        let matrix = ResponseMatrix::new(
            BinaryMatrix::from_rows(vec![vec![1, 0], vec![1, 1], vec![0, 0]]).unwrap(),
        );
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_responses(&matrix, 1).unwrap(), "1 1\n0 0");
    }

    #[test]
    fn test_cohorts_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_cohorts(&[CohortSummary {
                id: CohortId(4),
                items: Some(42),
                skills: Some(15),
                responses: None,
                default: true,
            }])
            .unwrap();
        assert!(output.contains("42"));
        assert!(output.contains("-"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
