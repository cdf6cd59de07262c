pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Parley CLI - operator tooling for the consultation backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Identity maintenance (password resets, email confirmation)")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Ad-hoc queries against the hosted database")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Session inspection and maintenance")]
    Sessions {
        #[command(subcommand)]
        cmd: commands::sessions::SessionCommands,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    // Same configuration and service layer the request handlers use
    let config = AppConfig::from_env()?;
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &state, output_format).await,
        Commands::Db { cmd } => commands::db::handle(cmd, &state, output_format).await,
        Commands::Sessions { cmd } => commands::sessions::handle(cmd, &state, output_format).await,
    }
}
