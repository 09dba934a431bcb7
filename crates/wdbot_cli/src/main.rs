use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wdbot_core::WdbotConfig;
use wdbot_memory::InteractionState;

mod collaborators;
mod commands;
mod repl;

use collaborators::Collaborators;
use commands::{Command, Session};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "wdbot.toml")]
    config: String,

    /// Override the history database path
    #[arg(long, env = "WDBOT_DB_PATH")]
    db: Option<String>,

    /// Chat user the commands act for
    #[arg(short, long, default_value_t = 0)]
    user: i64,

    /// Use built-in sample data instead of the Wikidata endpoints
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = WdbotConfig::load_or_default(&args.config);
    if let Some(db) = args.db {
        config.database.path = db;
    }

    let collaborators = if args.offline {
        info!("Running offline with sample collaborators");
        Collaborators::offline()
    } else {
        Collaborators::online(&config)?
    };

    info!("Opening history database at {}...", config.database.path);
    let state = InteractionState::open(&config, collaborators.resolver.clone()).await?;

    let session = Session {
        state,
        collaborators,
        user_id: args.user,
        results_per_page: config.wizard.results_per_page,
    };

    let outcome = match args.command {
        Command::Repl => repl::run(&session).await,
        command => session.dispatch(command).await,
    };

    session.state.store().close().await;
    outcome
}
