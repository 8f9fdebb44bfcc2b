// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cardbridge - bridge WhatsApp conversations onto Trello cards.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod channels;
mod check;
mod serve;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cardbridge - bridge WhatsApp conversations onto Trello cards.
#[derive(Parser, Debug)]
#[command(name = "cardbridge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bridge.
    Serve,
    /// Validate the configuration and check adapter health.
    CheckConfig {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// List the chats and groups the WhatsApp account has joined.
    Channels,
    /// Inspect or edit the sender to ticket mapping.
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum StateAction {
    /// Show the open ticket of a sender.
    Get {
        /// Phone number or full WhatsApp address.
        sender: String,
    },
    /// Link a sender to an existing ticket.
    Set { sender: String, ticket: String },
    /// Forget the open ticket of a sender.
    Clear { sender: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => cardbridge_config::load_and_validate_path(path),
        None => cardbridge_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            cardbridge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::CheckConfig { plain }) => check::run_check(&config, plain).await,
        Some(Commands::Channels) => channels::run_channels(&config).await,
        Some(Commands::State { action }) => state::run_state(&config, action).await,
        None => {
            println!("cardbridge: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn parses_state_subcommands() {
        let cli = Cli::parse_from(["cardbridge", "state", "set", "4915", "T1"]);
        match cli.command {
            Some(Commands::State {
                action: StateAction::Set { sender, ticket },
            }) => {
                assert_eq!(sender, "4915");
                assert_eq!(ticket, "T1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["cardbridge", "check-config", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Some(Commands::CheckConfig { plain: false })));
    }
}
