//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
use panther_seim::api::DEFAULT_INTERVAL_MINUTES;

pub mod alert;
pub mod args;
pub mod cloud_account;
pub mod context;
pub mod database;
pub mod init;
pub mod metrics;
pub mod query;
pub mod role;
pub mod source;
pub mod status;
pub mod token;
pub mod user;

pub use args::{OutputFormat, PaginationArgs};
pub use context::CommandContext;

/// Panther CLI - companion for the Panther security data platform
#[derive(Parser, Debug)]
#[command(name = "panther")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "PANTHER_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "PANTHER_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "PANTHER_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Convert timestamp fields to RFC 3339
    #[arg(long, global = true)]
    pub convert: bool,

    /// Override the API base URL
    #[arg(long, global = true, env = "PANTHER_API_BASE", hide = true)]
    pub api_base: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Panther configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// View and triage alerts
    #[command(subcommand)]
    Alert(AlertCommands),

    /// List and inspect users
    #[command(subcommand)]
    User(UserCommands),

    /// List roles
    #[command(subcommand)]
    Role(RoleCommands),

    /// List cloud accounts
    #[command(subcommand)]
    CloudAccount(CloudAccountCommands),

    /// List log sources
    #[command(subcommand)]
    Source(SourceCommands),

    /// List datalake databases
    #[command(subcommand)]
    Database(DatabaseCommands),

    /// Run datalake queries
    #[command(subcommand)]
    Query(QueryCommands),

    /// Show alert and ingestion metrics for a time window
    Metrics {
        /// Window start: RFC 3339 timestamp or epoch seconds (default: 7 days ago)
        #[arg(long)]
        start: Option<String>,

        /// Window end: RFC 3339 timestamp or epoch seconds (default: now)
        #[arg(long)]
        end: Option<String>,

        /// Breakdown interval in minutes
        #[arg(long, default_value_t = DEFAULT_INTERVAL_MINUTES)]
        interval: i64,
    },

    /// Manage the API token
    #[command(subcommand)]
    Token(TokenCommands),
}

/// Alert subcommands
#[derive(Subcommand, Debug)]
pub enum AlertCommands {
    /// List alerts created in a time window
    List {
        /// Window start: RFC 3339 timestamp or epoch seconds (default: 7 days ago)
        #[arg(long)]
        start: Option<String>,

        /// Window end: RFC 3339 timestamp or epoch seconds (default: now)
        #[arg(long)]
        end: Option<String>,

        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show one alert
    Get {
        /// Alert ID
        id: String,
    },

    /// Comment on an alert
    Comment {
        /// Alert ID
        id: String,

        /// Comment body
        body: String,

        /// Send the body as HTML instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// Change the status or assignee of alerts
    Update {
        /// Alert IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// New status (OPEN, TRIAGED, CLOSED, RESOLVED)
        #[arg(long)]
        status: Option<String>,

        /// Assignee user ID or email
        #[arg(long)]
        assignee: Option<String>,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show a user by ID or email
    Get {
        /// User ID or email
        user: String,
    },
}

/// Role subcommands
#[derive(Subcommand, Debug)]
pub enum RoleCommands {
    /// List roles
    List {
        /// Only roles whose name contains this text
        #[arg(long)]
        name: Option<String>,
    },
}

/// Cloud account subcommands
#[derive(Subcommand, Debug)]
pub enum CloudAccountCommands {
    /// List cloud accounts
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show one cloud account
    Get {
        /// Cloud account ID
        id: String,
    },
}

/// Log source subcommands
#[derive(Subcommand, Debug)]
pub enum SourceCommands {
    /// List log sources
    List {
        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show one log source
    Get {
        /// Source integration ID
        id: String,
    },
}

/// Database subcommands
#[derive(Subcommand, Debug)]
pub enum DatabaseCommands {
    /// List datalake databases
    List,
}

/// Query subcommands
#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Run SQL in the datalake and wait for its results
    Run {
        /// SQL to execute
        sql: String,

        /// Seconds between status checks
        #[arg(long, default_value_t = 2)]
        poll_secs: u64,

        #[command(flatten)]
        pagination: PaginationArgs,
    },

    /// Show the status and results of a query
    Results {
        /// Query ID
        id: String,
    },
}

/// Token subcommands
#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    /// Rotate the API token and save the new one to the config file
    Rotate,
}
