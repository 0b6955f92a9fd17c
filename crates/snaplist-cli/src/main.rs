//! snaplist CLI
//!
//! Command-line interface for snaplist - a todo list synced to one server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use snaplist_core::{Config, SyncClient, TodoSession};

mod commands;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "snaplist")]
#[command(about = "snaplist - A todo list saved as one snapshot on a server")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Server URL (overrides config)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Print the stored list
    #[command(alias = "ls")]
    Load,
    /// Replace the stored list
    Save {
        /// Items in order
        items: Vec<String>,
    },
    /// Append an item to the stored list
    Add {
        /// Item text
        text: String,
    },
    /// Remove an item by its position (as printed by `load`)
    #[command(alias = "rm")]
    Remove {
        /// 1-based position
        position: usize,
    },
    /// Empty the stored list
    Clear,
    /// Show server and store status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (server_url, bind, store_url, request_timeout_secs, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't talk to the server
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    let command = cli.command.unwrap_or(Commands::Tui);
    if matches!(command, Commands::Tui) {
        return tui::run(&config).await;
    }

    let client = SyncClient::from_config(&config)?;
    let mut session = TodoSession::new(client.clone());

    match command {
        Commands::Load => commands::todo::load(&mut session, &output).await,
        Commands::Save { items } => commands::todo::save(&mut session, items, &output).await,
        Commands::Add { text } => commands::todo::add(&mut session, text, &output).await,
        Commands::Remove { position } => {
            commands::todo::remove(&mut session, position, &output).await
        }
        Commands::Clear => commands::todo::clear(&mut session, &output).await,
        Commands::Status => commands::status::show(&client, &output).await,
        Commands::Tui | Commands::Config { .. } => Ok(()),
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}
