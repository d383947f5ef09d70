use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use marksheet::{OllamaOracle, OracleConfig, PipelineOptions, Pdf, Progress};

use crate::cli::{LabelArgs, OracleArgs};
use crate::page_range::parse_page_range;

/// Open a PDF file, printing a user-facing message on failure.
pub fn open_pdf(file: &Path) -> Result<Pdf, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    Pdf::open_file(file, None).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Resolve an optional page range into 0-based indices; all pages when absent.
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

pub fn oracle_config(args: &OracleArgs) -> OracleConfig {
    OracleConfig {
        endpoint: args.endpoint.clone(),
        model: args.model.clone(),
        timeout: Duration::from_secs(args.timeout),
    }
}

/// Build the HTTP oracle from command-line settings.
pub fn build_oracle(args: &OracleArgs) -> Result<OllamaOracle, i32> {
    OllamaOracle::new(oracle_config(args)).map_err(|e| {
        eprintln!("Error: cannot set up oracle client: {e}");
        1
    })
}

pub fn pipeline_options(labels: &LabelArgs) -> PipelineOptions {
    let mut options = PipelineOptions::default();
    if !labels.name_labels.is_empty() {
        options.name_labels = labels.name_labels.clone();
    }
    options
}

/// Output path for `extract`: the explicit one, else the input with `.csv`.
pub fn output_path(file: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => file.with_extension("csv"),
    }
}

/// Prints pipeline progress to stderr, but only when stderr is a terminal.
pub struct ProgressReporter {
    is_tty: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            is_tty: io::stderr().is_terminal(),
        }
    }

    pub fn report(&self, progress: &Progress) {
        if self.is_tty {
            eprint!("\r{:<60}", progress.message());
            let _ = io::stderr().flush();
        }
    }

    /// Clear the progress line.
    pub fn finish(&self) {
        if self.is_tty {
            eprint!("\r{}\r", " ".repeat(60));
            let _ = io::stderr().flush();
        }
    }
}
