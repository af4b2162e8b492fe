//! Eval command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use qirk_eval::{Evaluator, GateLogger, OutputRecord, QuantumOp, RunMetadata};
use serde::Serialize;
use tracing::info;

use super::common::{load_module, parse_results};
use crate::config::EvalSettings;

/// Output format of `qirk eval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Gate log followed by recorded output
    Text,
    /// Trace and run metadata as JSON
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    instructions: &'a [String],
    trace: &'a [QuantumOp],
    metadata: &'a RunMetadata,
}

/// Execute the eval command.
pub fn execute(
    input: &Path,
    settings: &EvalSettings,
    results: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let module = load_module(input)?;
    let stream = results.map(parse_results).transpose()?;

    info!(
        input = %input.display(),
        stream = stream.as_ref().map_or(0, Vec::len),
        "evaluating"
    );

    let evaluator = Evaluator::new(settings.limits.clone());
    let mut logger = GateLogger::new();
    let metadata = evaluator
        .eval(
            &module,
            &mut logger,
            settings.entry_point.as_deref(),
            stream.as_deref(),
        )
        .with_context(|| format!("Evaluation of {} failed", input.display()))?;

    match format {
        OutputFormat::Text => {
            print!("{logger}");
            for record in &metadata.output {
                println!("{}", format_record(record));
            }
        }
        OutputFormat::Json => {
            let report = Report {
                instructions: &logger.instructions,
                trace: &logger.ops,
                metadata: &metadata,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// One line per recorded value, in the QIR output schema's tab-separated
/// layout.
fn format_record(record: &OutputRecord) -> String {
    let (kind, value) = match record {
        OutputRecord::Result { value, .. } => ("RESULT", u8::from(*value).to_string()),
        OutputRecord::Bool { value, .. } => ("BOOL", value.to_string()),
        OutputRecord::Int { value, .. } => ("INT", value.to_string()),
        OutputRecord::Double { value, .. } => ("DOUBLE", value.to_string()),
        OutputRecord::Array { len, .. } => ("ARRAY", len.to_string()),
        OutputRecord::Tuple { len, .. } => ("TUPLE", len.to_string()),
    };
    match record.label() {
        Some(label) => format!("OUTPUT\t{kind}\t{value}\t{label}"),
        None => format!("OUTPUT\t{kind}\t{value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_record() {
        let record = OutputRecord::Result {
            value: true,
            label: Some("r0".into()),
        };
        assert_eq!(format_record(&record), "OUTPUT\tRESULT\t1\tr0");

        let record = OutputRecord::Int {
            value: -3,
            label: None,
        };
        assert_eq!(format_record(&record), "OUTPUT\tINT\t-3");
    }
}
