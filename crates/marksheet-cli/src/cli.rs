use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use marksheet::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Extract student result records from marksheet PDFs.
#[derive(Debug, Parser)]
#[command(name = "marksheet", about, version)]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract one record per student into a CSV table
    Extract {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output CSV path. Default: FILE with a .csv extension
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Skip the language model and use rule-based extraction only
        #[arg(long)]
        no_oracle: bool,

        #[command(flatten)]
        oracle: OracleArgs,

        #[command(flatten)]
        labels: LabelArgs,
    },

    /// Show each page's position-ordered lines and text blocks
    Lines {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = LinesFormat::Text)]
        format: LinesFormat,

        /// Also print text blocks
        #[arg(long)]
        blocks: bool,
    },

    /// Check that the language model answers with usable fields
    Probe {
        #[command(flatten)]
        oracle: OracleArgs,
    },
}

/// Connection settings for the language model service.
#[derive(Debug, Clone, Args)]
pub struct OracleArgs {
    /// Ollama generate endpoint
    #[arg(long, env = "MARKSHEET_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Model name
    #[arg(long, env = "MARKSHEET_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "MARKSHEET_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,
}

/// Student-name label synonyms.
#[derive(Debug, Clone, Args)]
pub struct LabelArgs {
    /// Student-name label, most specific first (repeatable).
    /// Default: "Student Name", "Name of Student", "Name"
    #[arg(long = "name-label", value_name = "LABEL")]
    pub name_labels: Vec<String>,
}

/// Output format for the lines subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum LinesFormat {
    /// Plain text, one line per row
    Text,
    /// One JSON object per page
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_defaults() {
        let cli = Cli::try_parse_from(["marksheet", "extract", "results.pdf"]).unwrap();
        let Commands::Extract {
            file,
            output,
            no_oracle,
            oracle,
            labels,
        } = cli.command
        else {
            panic!("expected extract");
        };
        assert_eq!(file, PathBuf::from("results.pdf"));
        assert!(output.is_none());
        assert!(!no_oracle);
        assert_eq!(oracle.model, DEFAULT_MODEL);
        assert_eq!(oracle.timeout, 30);
        assert!(labels.name_labels.is_empty());
    }

    #[test]
    fn name_label_is_repeatable() {
        let cli = Cli::try_parse_from([
            "marksheet",
            "extract",
            "r.pdf",
            "--name-label",
            "Candidate",
            "--name-label",
            "Student",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Extract { labels, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(labels.name_labels, ["Candidate", "Student"]);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["marksheet", "-v", "-q", "probe"]).is_err());
    }
}
