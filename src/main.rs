//! hotspot-connect - chat-driven Wi-Fi hotspot provisioning
//!
#![doc = "Main entry point for the hotspot-connect application."]

use anyhow::Result;

use hotspot_connect::cli::{Cli, Commands};
use hotspot_connect::commands::{self, RoomDisposition};
use hotspot_connect::config::Config;
use hotspot_connect::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    init_logging(&config.logging)?;

    config.validate()?;

    match cli.command {
        Commands::Run {
            repeat,
            delete_room,
            keep_room,
            json,
        } => {
            tracing::info!(room = %config.chat.room_name, "Starting hotspot orchestrator");
            let disposition = RoomDisposition::from_flags(delete_room, keep_room);
            commands::run::run_hotspot(config, repeat, disposition, json).await
        }
        Commands::Locate { username, mac } => {
            commands::locate::locate_client(&config, username, mac).await
        }
        Commands::Clients => commands::locate::client_count(&config).await,
        Commands::Macs => commands::locate::active_macs(&config).await,
        Commands::Room { command } => commands::room::handle_room(&config, command).await,
    }
}
