//! Command-line interface definition for hotspot-connect
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to run a hotspot session and to query the
//! individual services it depends on.

use clap::{ArgGroup, Parser, Subcommand};

/// hotspot-connect - chat-driven, time-bounded Wi-Fi hotspot
///
/// Listens in a chat room for an activation command, enables a hotspot
/// SSID on the controller serving the requester, and disables it again
/// once the requested time is up.
#[derive(Parser, Debug, Clone)]
#[command(name = "hotspot-connect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a hotspot session driven from the chat room
    Run {
        /// Keep serving sessions back-to-back instead of stopping after one
        #[arg(long)]
        repeat: bool,

        /// Delete the chat room when done, without asking
        #[arg(long, conflicts_with = "keep_room")]
        delete_room: bool,

        /// Keep the chat room when done, without asking
        #[arg(long)]
        keep_room: bool,

        /// Print each completed session report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the wireless controller currently serving a client
    #[command(group(ArgGroup::new("client").required(true).args(["username", "mac"])))]
    Locate {
        /// Username (email) the client authenticated with
        #[arg(short, long)]
        username: Option<String>,

        /// MAC address of the client device
        #[arg(short, long)]
        mac: Option<String>,
    },

    /// Show how many clients the location service currently sees
    Clients,

    /// List the MAC addresses of all active wireless clients
    Macs,

    /// Manage the chat room
    Room {
        /// Room subcommand
        #[command(subcommand)]
        command: RoomCommand,
    },
}

/// Chat room subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RoomCommand {
    /// Print the id of the configured room, creating it if needed
    Find,

    /// Delete the configured room
    Delete,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Run {
                repeat: false,
                delete_room: false,
                keep_room: false,
                json: false,
            },
        }
    }
}
