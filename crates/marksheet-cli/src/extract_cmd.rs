use std::path::Path;

use marksheet::{DisabledOracle, FieldOracle, OllamaOracle, process_document};

use crate::cli::{LabelArgs, OracleArgs};
use crate::shared::{ProgressReporter, build_oracle, output_path, pipeline_options};

pub fn run(
    file: &Path,
    output: Option<&Path>,
    no_oracle: bool,
    oracle_args: &OracleArgs,
    labels: &LabelArgs,
) -> Result<(), i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    let http_oracle: Option<OllamaOracle> = if no_oracle {
        None
    } else {
        Some(build_oracle(oracle_args)?)
    };
    let oracle: &dyn FieldOracle = match &http_oracle {
        Some(oracle) => oracle,
        None => &DisabledOracle,
    };

    let output = output_path(file, output);
    let options = pipeline_options(labels);
    let progress = ProgressReporter::new();

    let result = process_document(file, &output, oracle, &options, |p| progress.report(p));
    progress.finish();

    let outcome = result.map_err(|e| {
        eprintln!("Error processing PDF: {e}");
        1
    })?;
    println!(
        "Wrote {} records from {} pages to {}",
        outcome.records_count,
        outcome.pages,
        outcome.output_file.display()
    );
    Ok(())
}
