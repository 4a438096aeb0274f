use clap::{Args, Parser, Subcommand};
use condo_cli::pages::{cashflow::TransactionKind, incidents::IncidentStatus};
use condo_cli::{OutputFormat, Overrides};
use std::path::PathBuf;

/// Condo CLI - Vila da Serra condominium dashboard
#[derive(Parser, Debug)]
#[command(name = "condo")]
#[command(author = "Vila da Serra Team")]
#[command(version)]
#[command(about = "Condominium dashboard: residents, incidents, cash flow and agenda", long_about = None)]
pub struct Cli {
    /// Project URL (overrides SUPABASE_URL and the config file)
    #[arg(short = 'u', long = "url", global = true)]
    pub url: Option<String>,

    /// Anon key (overrides SUPABASE_KEY and the config file)
    #[arg(long = "key", global = true)]
    pub key: Option<String>,

    /// Schema holding the condominium tables (overrides CONDO_SCHEMA)
    #[arg(long = "schema", global = true)]
    pub schema: Option<String>,

    /// Name the session is stored under
    #[arg(long = "instance", global = true)]
    pub instance: Option<String>,

    /// Session file path
    #[arg(long = "session-file", env = "CONDO_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(long = "config", default_value = "~/.condo/config.toml", global = true)]
    pub config: PathBuf,

    /// Output format
    #[arg(long = "format", global = true)]
    pub format: Option<OutputFormat>,

    /// Enable JSON output (shorthand for --format=json)
    #[arg(long = "json", conflicts_with = "format", global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            anon_key: self.key.clone(),
            schema: self.schema.clone(),
            instance: self.instance.clone(),
            timeout: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Residents (moradores)
    #[command(subcommand)]
    Residents(ResidentsCommand),
    /// Incidents (ocorrências)
    #[command(subcommand)]
    Incidents(IncidentsCommand),
    /// Cash flow (transações)
    #[command(subcommand)]
    Cashflow(CashflowCommand),
    /// Agenda of dated incidents and staff tasks
    #[command(subcommand)]
    Agenda(AgendaCommand),
    /// Resident and incident counts
    Metrics,
}

#[derive(Subcommand, Debug)]
pub enum ResidentsCommand {
    /// List residents, ordered by name
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        building: Option<String>,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Register a resident
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        building: String,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change a resident
    Update {
        id: String,
        #[command(flatten)]
        fields: ResidentFields,
    },
    /// Remove a resident
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct ResidentFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub building: Option<String>,
    #[arg(long)]
    pub unit: Option<String>,
    /// Empty string clears the phone
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum IncidentsCommand {
    /// List incidents, latest first
    List {
        #[arg(long, value_enum)]
        status: Option<IncidentStatus>,
        /// Case-insensitive text to find in title or description
        #[arg(long)]
        search: Option<String>,
    },
    /// Open an incident
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<IncidentStatus>,
        #[arg(long = "resident-id")]
        resident_id: Option<String>,
        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Change an incident
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Empty string clears the description
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<IncidentStatus>,
        /// Empty string unlinks the resident
        #[arg(long = "resident-id")]
        resident_id: Option<String>,
        /// Event date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_date")]
        date: Option<String>,
        /// Remove the event date
        #[arg(long = "clear-date")]
        clear_date: bool,
    },
    /// Remove an incident
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CashflowCommand {
    /// List transactions in a date window (default: last 30 days)
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<TransactionKind>,
    },
    /// Record a transaction
    Add {
        #[arg(long)]
        description: String,
        #[arg(long, value_enum, default_value = "entrada")]
        kind: TransactionKind,
        #[arg(long)]
        amount: f64,
        /// Transaction date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Change a transaction
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a transaction
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AgendaCommand {
    /// Dated incidents and tasks, in date order
    List,
    /// Schedule an all-day staff task
    AddTask {
        /// Day of the task (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "incident-id")]
        incident_id: Option<String>,
    },
}
