//! Panther CLI - companion for the Panther security data platform

use clap::Parser;
use log::LevelFilter;

mod cli;
mod output;

use cli::args::GlobalOptions;
use cli::{
    AlertCommands, Cli, CloudAccountCommands, Commands, DatabaseCommands, QueryCommands,
    RoleCommands, SourceCommands, TokenCommands, UserCommands,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("panther version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Alert(cmd) => match cmd {
            AlertCommands::List {
                start,
                end,
                pagination,
            } => cli::alert::list(&opts, start.as_deref(), end.as_deref(), &pagination).await,
            AlertCommands::Get { id } => cli::alert::get(&opts, &id).await,
            AlertCommands::Comment { id, body, html } => {
                cli::alert::comment(&opts, &id, &body, html).await
            }
            AlertCommands::Update {
                ids,
                status,
                assignee,
            } => cli::alert::update(&opts, &ids, status.as_deref(), assignee.as_deref()).await,
        },
        Commands::User(cmd) => match cmd {
            UserCommands::List { pagination } => cli::user::list(&opts, &pagination).await,
            UserCommands::Get { user } => cli::user::get(&opts, &user).await,
        },
        Commands::Role(RoleCommands::List { name }) => cli::role::list(&opts, name.as_deref()).await,
        Commands::CloudAccount(cmd) => match cmd {
            CloudAccountCommands::List { pagination } => {
                cli::cloud_account::list(&opts, &pagination).await
            }
            CloudAccountCommands::Get { id } => cli::cloud_account::get(&opts, &id).await,
        },
        Commands::Source(cmd) => match cmd {
            SourceCommands::List { pagination } => cli::source::list(&opts, &pagination).await,
            SourceCommands::Get { id } => cli::source::get(&opts, &id).await,
        },
        Commands::Database(DatabaseCommands::List) => cli::database::list(&opts).await,
        Commands::Query(cmd) => match cmd {
            QueryCommands::Run {
                sql,
                poll_secs,
                pagination,
            } => cli::query::run(&opts, &sql, poll_secs, &pagination).await,
            QueryCommands::Results { id } => cli::query::results(&opts, &id).await,
        },
        Commands::Metrics {
            start,
            end,
            interval,
        } => cli::metrics::run(&opts, start.as_deref(), end.as_deref(), interval).await,
        Commands::Token(TokenCommands::Rotate) => cli::token::rotate(&opts).await,
    }
}
