//! Command handlers for hotspot-connect
//!
//! Each CLI subcommand gets its own module. Handlers build the HTTP clients
//! from configuration and hand them to the orchestrator or call them
//! directly.

use std::sync::Arc;

use colored::Colorize;

use crate::clients::{ChatClient, DeployerClient, DirectoryClient, PresenceClient, TicketClient};
use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::{Collaborators, Orchestrator};

/// Build every collaborator from configuration
///
/// # Errors
///
/// Returns an error if any HTTP client cannot be created.
pub fn build_collaborators(config: &Config) -> Result<Collaborators> {
    let http = &config.http;
    Ok(Collaborators {
        chat: Arc::new(ChatClient::new(&config.chat, http)?),
        tickets: Arc::new(TicketClient::new(&config.network_controller, http)?),
        presence: Arc::new(PresenceClient::new(&config.location, http)?),
        directory: Arc::new(DirectoryClient::new(
            &config.network_controller,
            &config.infrastructure,
            http,
        )?),
        deployer: Arc::new(DeployerClient::new(&config.infrastructure, http)?),
    })
}

/// Build an orchestrator wired to the real services
///
/// # Errors
///
/// Returns an error if any HTTP client cannot be created.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let collaborators = build_collaborators(config)?;
    Ok(
        Orchestrator::new(
            collaborators,
            config.hotspot.clone(),
            config.chat.room_name.clone(),
        )
        .with_invitees(config.chat.invite_emails.clone()),
    )
}

/// What to do with the chat room after the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomDisposition {
    /// Delete without asking
    Delete,
    /// Keep without asking
    Keep,
    /// Ask the operator on the terminal
    Ask,
}

impl RoomDisposition {
    /// Map the `run` flags onto a disposition
    pub fn from_flags(delete_room: bool, keep_room: bool) -> Self {
        match (delete_room, keep_room) {
            (true, _) => Self::Delete,
            (false, true) => Self::Keep,
            (false, false) => Self::Ask,
        }
    }
}

/// Interpret the answer to the delete-room question
pub fn confirms_deletion(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Hotspot session runner
pub mod run {
    use super::*;
    use crate::orchestrator::RunOutcome;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Run one or more hotspot sessions, then deal with the chat room.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `repeat` - Keep serving sessions until an idle timeout passes
    /// * `disposition` - Whether to delete the room afterwards
    /// * `json` - Print session reports as JSON
    pub async fn run_hotspot(
        config: Config,
        repeat: bool,
        disposition: RoomDisposition,
        json: bool,
    ) -> Result<()> {
        let mut orchestrator = build_orchestrator(&config)?;

        loop {
            match orchestrator.run_once().await? {
                RunOutcome::Completed(session) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&session)?);
                    } else {
                        let status = session
                            .enable_job
                            .as_ref()
                            .and_then(|job| job.status.as_ref())
                            .map(|s| s.to_string())
                            .unwrap_or_default();
                        println!(
                            "{}",
                            format!(
                                "Session {} for {} finished (controller {}, enable status {})",
                                session.id,
                                session.requester,
                                session.controller_hostname.as_deref().unwrap_or("?"),
                                status
                            )
                            .green()
                        );
                    }
                    if !repeat {
                        break;
                    }
                }
                RunOutcome::NoActivation => {
                    println!("{}", "No activation command received.".yellow());
                    break;
                }
            }
        }

        let delete = match disposition {
            RoomDisposition::Delete => true,
            RoomDisposition::Keep => false,
            RoomDisposition::Ask => {
                let mut rl = DefaultEditor::new()?;
                let prompt = format!(
                    "Do you want to delete the {} room? (y/n) ",
                    config.chat.room_name
                );
                match rl.readline(&prompt) {
                    Ok(answer) => confirms_deletion(&answer),
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => false,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        if delete {
            orchestrator.close_room().await?;
            println!("{}", format!("Deleted room {}", config.chat.room_name).green());
        }

        println!("\nEnd of application run!");
        Ok(())
    }
}

/// Presence lookups
pub mod locate {
    use super::*;
    use crate::clients::PresenceLocator;

    /// Print the controller serving a username or MAC address.
    pub async fn locate_client(
        config: &Config,
        username: Option<String>,
        mac: Option<String>,
    ) -> Result<()> {
        let presence = PresenceClient::new(&config.location, &config.http)?;
        let (label, controller) = match (username, mac) {
            (Some(username), _) => {
                let found = presence.locate_presence(&username).await?;
                (username, found)
            }
            (None, Some(mac)) => {
                let found = presence.locate_mac(&mac).await?;
                (mac, found)
            }
            (None, None) => {
                return Err(crate::error::HotspotError::Config(
                    "either a username or a MAC address is required".to_string(),
                )
                .into())
            }
        };

        match controller {
            Some(address) => println!("{} is served by controller {}", label, address.green()),
            None => println!("{} is {}", label, "not connected (unknown)".yellow()),
        }
        Ok(())
    }

    /// Print the number of clients the location service tracks.
    pub async fn client_count(config: &Config) -> Result<()> {
        let presence = PresenceClient::new(&config.location, &config.http)?;
        let count = presence.client_count().await?;
        println!("Active wireless clients: {}", count.to_string().bold());
        Ok(())
    }

    /// Print the MAC address of every active client, one per line.
    pub async fn active_macs(config: &Config) -> Result<()> {
        let presence = PresenceClient::new(&config.location, &config.http)?;
        let macs = presence.active_client_macs().await?;
        if macs.is_empty() {
            println!("{}", "No active wireless clients".yellow());
        }
        for mac in macs {
            println!("{}", mac);
        }
        Ok(())
    }
}

/// Chat room management
pub mod room {
    use super::*;
    use crate::clients::ChatChannel;
    use crate::cli::RoomCommand;

    /// Handle `room find` / `room delete`.
    pub async fn handle_room(config: &Config, command: RoomCommand) -> Result<()> {
        let chat = ChatClient::new(&config.chat, &config.http)?;
        let name = &config.chat.room_name;

        match command {
            RoomCommand::Find => {
                let id = chat.find_or_create_room(name).await?;
                println!("{}: {}", name, id);
            }
            RoomCommand::Delete => match chat.find_room(name).await? {
                Some(id) => {
                    chat.delete_room(&id).await?;
                    println!("{}", format!("Deleted room {}", name).green());
                }
                None => println!("{}", format!("No room named {}", name).yellow()),
            },
        }
        Ok(())
    }
}
