//! htmlify CLI - converts BBCode-style text files to HTML 4.01 or XHTML.
//!
//! Each input file is converted into a sibling file with the `_htmlified`
//! suffix. Exit codes: 1 for invalid parameters, 2 for file errors, 3 for
//! failed conversions.

mod batch;
mod cli;
mod error;
mod io;

use clap::error::ErrorKind;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use batch::Batch;
use cli::Cli;
use error::{CliError, EXIT_INVALID_PARAMETER};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            let _ = err.print();
            std::process::exit(EXIT_INVALID_PARAMETER);
        }
    };

    // --verbose forces DEBUG, otherwise RUST_LOG or INFO
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("{} {err}", style("error:").red().bold());
        std::process::exit(err.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let options = cli.options()?;
    let inputs = cli.inputs()?;
    let batch = Batch::new(&options, cli.encoding())?;
    batch.run(&inputs)
}
