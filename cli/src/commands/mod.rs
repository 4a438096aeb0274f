//! Subcommand dispatch.
//!
//! One invocation is one execution context: configuration is resolved, a
//! fresh [`SessionContext`] is built over the session file, and the chosen
//! page runs against it.

use condo_cli::config::expand_config_path;
use condo_cli::{CLIConfiguration, FileSessionStore, OutputFormat, OutputFormatter, Result};
use condo_link::SessionContext;

use crate::args::{Cli, Command};

mod data;
mod session;

pub async fn run(cli: Cli) -> Result<()> {
    let config = CLIConfiguration::load(&cli.config)?;

    let format = if cli.json {
        OutputFormat::Json
    } else {
        cli.format.unwrap_or_else(|| config.output_format())
    };
    let color = !cli.no_color && config.resolved_ui().color;
    colored::control::set_override(color);
    let formatter = OutputFormatter::new(format, color);

    let project = config.resolve(&cli.overrides())?;
    let client = project.build_client()?;
    let store = match &cli.session_file {
        Some(path) => FileSessionStore::with_path(expand_config_path(path))?,
        None => FileSessionStore::new()?,
    };
    log::debug!(
        "[CLI] project={} schema={} instance={} session_file={}",
        project.url,
        project.schema,
        project.instance,
        store.path().display()
    );
    let mut ctx = SessionContext::new(client, Box::new(store), project.instance.clone());

    match cli.command {
        Command::Login { email, password } => {
            session::login(&mut ctx, &formatter, email, password).await
        },
        Command::Logout => session::logout(&mut ctx, &formatter).await,
        Command::Whoami => session::whoami(&mut ctx, &formatter).await,
        Command::Residents(cmd) => data::residents(&mut ctx, &formatter, cmd).await,
        Command::Incidents(cmd) => data::incidents(&mut ctx, &formatter, cmd).await,
        Command::Cashflow(cmd) => data::cashflow(&mut ctx, &formatter, cmd).await,
        Command::Agenda(cmd) => data::agenda(&mut ctx, &formatter, cmd).await,
        Command::Metrics => data::metrics(&mut ctx, &formatter).await,
    }
}
