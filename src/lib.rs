//! hotspot-connect - chat-driven Wi-Fi hotspot provisioning
//!
//! An operator types `/E` into a chat room; the orchestrator asks how long
//! the hotspot is needed, finds the wireless controller serving that
//! operator, deploys a template that enables the hotspot SSID, and deploys
//! the matching disable template once the time is up.
//!
//! # Architecture
//!
//! - `orchestrator`: the session state machine and its timing
//! - `clients`: collaborator traits, HTTP implementations and test fakes
//! - `config`: configuration management and validation
//! - `commands`: CLI command handlers
//! - `cli`: command-line interface definition
//! - `logging`: tracing subscriber setup
//! - `error`: error types and result alias

pub mod cli;
pub mod clients;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;

// Re-export commonly used types
pub use config::Config;
pub use error::{HotspotError, Result};
pub use orchestrator::{Orchestrator, RunOutcome, Session, SessionState};
