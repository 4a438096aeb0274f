//! Condo CLI - terminal dashboard for the Vila da Serra condominium
//!
//! # Usage
//!
//! ```bash
//! # Sign in (prompts for the password)
//! condo login --email sindico@vila.com
//!
//! # Residents of building 2, as JSON
//! condo residents list --building 2 --json
//!
//! # Cash flow for September
//! condo cashflow list --from 2026-09-01 --to 2026-09-30
//! ```

use clap::Parser;

use condo_cli::logging::init_logging;
use condo_cli::{CLIError, OutputFormat, OutputFormatter};

mod args;
mod commands;

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let formatter = OutputFormatter::new(OutputFormat::Table, !cli.no_color);
    if let Err(err) = commands::run(cli).await {
        eprintln!("{}", formatter.error(&err.to_string()));
        let code = match err {
            CLIError::SignInRequired(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
