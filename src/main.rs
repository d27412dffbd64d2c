use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use granabot::config::{default_config_path, Config};

#[derive(Parser)]
#[command(name = "granabot")]
#[command(about = "Conversational personal finance assistant")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show current configuration status
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load_or_default(&config_path)?;
    let status = config.status();

    match cli.command {
        Some(Command::Config) => {
            println!("Config file: {}", config_path.display());
            println!("Telegram bot token: {}", configured(status.telegram));
            println!("Oracle API key:     {}", configured(status.oracle));
            println!("Store credentials:  {}", configured(status.store));
            println!(
                "Oracle models: {}",
                config.oracle.models.join(", ")
            );
        }
        None => {
            println!("Granabot - Conversational Finance Assistant");
            println!("===========================================\n");
            println!("Config: {}", config_path.display());
            if config.is_complete() {
                println!("All collaborators configured.\n");
            } else {
                println!("Missing credentials; run 'granabot config' for details.\n");
            }
            println!("Commands:");
            println!("  config    Show current configuration status\n");
            println!("Run 'granabot --help' for more options.");
            println!("The webhook server lives in the granabot-server binary.");
        }
    }

    Ok(())
}

fn configured(present: bool) -> &'static str {
    if present {
        "configured"
    } else {
        "missing"
    }
}
