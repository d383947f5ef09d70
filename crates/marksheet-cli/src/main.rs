mod cli;
mod extract_cmd;
mod lines_cmd;
mod logging;
mod page_range;
mod probe_cmd;
mod shared;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        cli::Commands::Extract {
            ref file,
            ref output,
            no_oracle,
            ref oracle,
            ref labels,
        } => extract_cmd::run(file, output.as_deref(), no_oracle, oracle, labels),
        cli::Commands::Lines {
            ref file,
            ref pages,
            ref format,
            blocks,
        } => lines_cmd::run(file, pages.as_deref(), format, blocks),
        cli::Commands::Probe { ref oracle } => probe_cmd::run(oracle),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
