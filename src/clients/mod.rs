//! Collaborator abstractions and their HTTP implementations
//!
//! The orchestrator only ever talks to the outside world through the five
//! traits defined here. Concrete implementations live in submodules:
//!
//! - [`chat::ChatClient`] -- REST chat rooms and messages
//! - [`ticket::TicketClient`] -- auth tickets from the network controller manager
//! - [`presence::PresenceClient`] -- user/device location lookups
//! - [`directory::DirectoryClient`] -- controller hostname and inventory ids
//! - [`deployer::DeployerClient`] -- WLAN template jobs
//! - [`fake`] -- in-memory fakes used by tests
//!
//! Every call is awaited to completion before the next one starts; none of
//! the implementations retry on their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub mod chat;
pub mod deployer;
pub mod directory;
pub mod fake;
pub mod http;
pub mod presence;
pub mod ticket;

pub use chat::ChatClient;
pub use deployer::DeployerClient;
pub use directory::DirectoryClient;
pub use presence::PresenceClient;
pub use ticket::TicketClient;

/// The most recent message in a chat room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message body
    pub text: String,
    /// Email or username of whoever posted it
    pub author: String,
}

impl ChatMessage {
    /// Create a message
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

/// Opaque credential issued by the network controller manager
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTicket(String);

impl AuthTicket {
    /// Wrap a raw ticket value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value sent in request headers
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tickets are credentials; keep them out of logs.
impl fmt::Debug for AuthTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthTicket(***)")
    }
}

/// Coarse classification of a deployment job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatusKind {
    /// Scheduled or still running
    Pending,
    /// Finished successfully
    Success,
    /// Finished with errors
    Failure,
    /// Anything the deployer reported that we do not recognize
    Unknown,
}

impl JobStatusKind {
    /// Whether the job will not change status any more
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

/// A job status exactly as the deployer reported it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    raw: String,
}

impl JobStatus {
    /// Wrap a raw status string
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The status string, verbatim
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Classify the raw status
    pub fn kind(&self) -> JobStatusKind {
        match self.raw.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "COMPLETED" => JobStatusKind::Success,
            "FAILURE" | "FAILED" | "PARTIAL_FAILURE" | "PARTIAL_SUCCESS" => {
                JobStatusKind::Failure
            }
            "" | "PENDING" | "SCHEDULED" | "RUNNING" | "IN_PROGRESS" => JobStatusKind::Pending,
            _ => JobStatusKind::Unknown,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A configuration job started on the deployer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentJob {
    /// Name the deployer assigned to the job
    pub job_name: String,
    /// Last status observed, if it was queried
    pub status: Option<JobStatus>,
}

/// Chat room operations used by the orchestrator
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Return the id of the room titled `name`, creating it if none exists.
    ///
    /// Repeated calls with the same name return the same id.
    async fn find_or_create_room(&self, name: &str) -> Result<String>;

    /// Invite `email` into the room as a moderator.
    ///
    /// Inviting someone who is already a member is not an error.
    async fn add_member(&self, room_id: &str, email: &str) -> Result<()>;

    /// Post a plain-text message.
    async fn post_message(&self, room_id: &str, text: &str) -> Result<()>;

    /// Fetch the most recent message in the room.
    ///
    /// Only meaningful once at least one message has been posted.
    async fn latest_message(&self, room_id: &str) -> Result<ChatMessage>;

    /// Delete the room.
    async fn delete_room(&self, room_id: &str) -> Result<()>;
}

/// Issues tickets for the device directory
#[async_trait]
pub trait AuthTicketProvider: Send + Sync {
    /// Exchange the configured credentials for a fresh ticket.
    async fn issue_ticket(&self) -> Result<AuthTicket>;
}

/// Finds which wireless controller serves a user
#[async_trait]
pub trait PresenceLocator: Send + Sync {
    /// Controller address serving `identity`, or `None` when the user is
    /// not currently seen on the wireless network.
    async fn locate_presence(&self, identity: &str) -> Result<Option<String>>;
}

/// Resolves controllers to hostnames and inventory ids
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Canonical hostname of the controller at `controller_address`.
    ///
    /// Fails with [`crate::error::HotspotError::TicketRejected`] when the
    /// ticket is no longer accepted.
    async fn resolve_hostname(&self, controller_address: &str, ticket: &AuthTicket)
        -> Result<String>;

    /// Inventory id of the device named `hostname`.
    async fn resolve_device_id(&self, hostname: &str) -> Result<String>;
}

/// Starts configuration jobs and reports on them
#[async_trait]
pub trait TemplateDeployer: Send + Sync {
    /// Deploy `template_name` to `device` and return the job name.
    async fn deploy_template(&self, device: &str, template_name: &str) -> Result<String>;

    /// Current status of the job called `job_name`.
    async fn job_status(&self, job_name: &str) -> Result<JobStatus>;
}
