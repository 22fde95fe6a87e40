//! Peer command - registrar address stored in the ledger

use anyhow::{bail, Result};
use clap::Subcommand;

use ledgerline_core::LogEvent;

use super::{get_context, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum PeerCommands {
    /// Set the registrar address (host:port)
    Set {
        address: String,
    },
    /// Show the registrar address
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: PeerCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        PeerCommands::Set { address } => {
            let address = address.trim();
            if address.is_empty() {
                bail!("Peer address must not be empty");
            }
            ctx.set_peer_address(address)?;
            log_event(&get_logger(), LogEvent::new("peer_address_set").with_command("peer"));
            output::success(&format!("Registrar peer set to {}", address));
        }
        PeerCommands::Show { json } => {
            let address = ctx.peer_address()?;
            if json {
                println!("{}", serde_json::json!({ "peer_address": address }));
            } else {
                match address {
                    Some(address) => println!("{}", address),
                    None => output::info("No registrar peer configured. Use `ll peer set <host:port>`."),
                }
            }
        }
    }

    Ok(())
}
