//! In-memory fakes for every collaborator
//!
//! These replace network calls in tests. Each fake records the calls it
//! receives so tests can assert on what the orchestrator did.
//!
//! [`FakeChat`] simulates an operator through a script: every call to
//! `latest_message` first consumes one [`OperatorTurn`], which either adds
//! a new message to the room or leaves it untouched. That mirrors the real
//! polling protocol, where a human may or may not have typed something
//! between two reads.
//!
//! # Example
//!
//! ```
//! use hotspot_connect::clients::fake::{FakeChat, OperatorTurn};
//! use hotspot_connect::clients::ChatChannel;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let chat = FakeChat::new("bot@example.com")
//!     .with_script([OperatorTurn::silent(), OperatorTurn::say("/E", "ops@example.com")]);
//! let room = chat.find_or_create_room("Lab").await.unwrap();
//! chat.post_message(&room, "Ready for input!").await.unwrap();
//!
//! assert_eq!(chat.latest_message(&room).await.unwrap().text, "Ready for input!");
//! assert_eq!(chat.latest_message(&room).await.unwrap().text, "/E");
//! # }
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{
    AuthTicket, AuthTicketProvider, ChatChannel, ChatMessage, DeviceDirectory, JobStatus,
    PresenceLocator, TemplateDeployer,
};
use crate::error::{HotspotError, Result};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One step of scripted operator behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorTurn {
    /// The operator did not type anything
    Silent,
    /// The operator posted a message
    Say(ChatMessage),
}

impl OperatorTurn {
    /// Nothing new in the room
    pub fn silent() -> Self {
        Self::Silent
    }

    /// `author` posts `text`
    pub fn say(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self::Say(ChatMessage::new(text, author))
    }
}

#[derive(Debug, Default)]
struct ChatState {
    rooms: HashMap<String, String>,
    messages: HashMap<String, Vec<ChatMessage>>,
    members: HashMap<String, Vec<String>>,
    script: VecDeque<OperatorTurn>,
    deleted: Vec<String>,
    next_id: usize,
    message_calls: usize,
    fail_after: Option<usize>,
}

impl ChatState {
    /// Count a post/fetch call; fails once the allowed number is used up
    fn message_call(&mut self) -> Result<()> {
        self.message_calls += 1;
        match self.fail_after {
            Some(limit) if self.message_calls > limit => Err(HotspotError::Api {
                service: "chat",
                status: 503,
                message: "service unavailable".to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

/// In-memory chat rooms with a scripted operator
#[derive(Debug)]
pub struct FakeChat {
    bot: String,
    state: Mutex<ChatState>,
}

impl FakeChat {
    /// Create an empty fake; messages posted through it are authored by `bot`
    pub fn new(bot: impl Into<String>) -> Self {
        Self {
            bot: bot.into(),
            state: Mutex::new(ChatState::default()),
        }
    }

    /// Append operator turns to the script
    pub fn with_script(self, turns: impl IntoIterator<Item = OperatorTurn>) -> Self {
        lock(&self.state).script.extend(turns);
        self
    }

    /// Pre-create a room so `find_or_create_room` finds it
    pub fn with_room(self, name: &str, id: &str) -> Self {
        {
            let mut state = lock(&self.state);
            state.rooms.insert(name.to_string(), id.to_string());
            state.messages.entry(id.to_string()).or_default();
        }
        self
    }

    /// Let `calls` message posts/fetches succeed, then fail every later one
    /// with a 503
    pub fn failing_after(self, calls: usize) -> Self {
        lock(&self.state).fail_after = Some(calls);
        self
    }

    /// Bring the chat service back after [`FakeChat::failing_after`]
    pub fn recover(&self) {
        lock(&self.state).fail_after = None;
    }

    /// Everything the bot has posted to `room_id`, oldest first
    pub fn posted(&self, room_id: &str) -> Vec<String> {
        lock(&self.state)
            .messages
            .get(room_id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|m| m.author == self.bot)
                    .map(|m| m.text.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Members invited into `room_id`
    pub fn members(&self, room_id: &str) -> Vec<String> {
        lock(&self.state)
            .members
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Ids of deleted rooms
    pub fn deleted_rooms(&self) -> Vec<String> {
        lock(&self.state).deleted.clone()
    }

    /// Operator turns not yet consumed
    pub fn remaining_script(&self) -> usize {
        lock(&self.state).script.len()
    }
}

#[async_trait]
impl ChatChannel for FakeChat {
    async fn find_or_create_room(&self, name: &str) -> Result<String> {
        let mut state = lock(&self.state);
        if let Some(id) = state.rooms.get(name) {
            return Ok(id.clone());
        }
        state.next_id += 1;
        let id = format!("room-{}", state.next_id);
        state.rooms.insert(name.to_string(), id.clone());
        state.messages.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn add_member(&self, room_id: &str, email: &str) -> Result<()> {
        let mut state = lock(&self.state);
        let members = state.members.entry(room_id.to_string()).or_default();
        if !members.iter().any(|m| m == email) {
            members.push(email.to_string());
        }
        Ok(())
    }

    async fn post_message(&self, room_id: &str, text: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.message_call()?;
        let messages = state
            .messages
            .get_mut(room_id)
            .ok_or_else(|| HotspotError::NotFound(format!("room {}", room_id)))?;
        messages.push(ChatMessage::new(text, self.bot.clone()));
        Ok(())
    }

    async fn latest_message(&self, room_id: &str) -> Result<ChatMessage> {
        let mut state = lock(&self.state);
        state.message_call()?;
        let turn = state.script.pop_front();
        let messages = state
            .messages
            .get_mut(room_id)
            .ok_or_else(|| HotspotError::NotFound(format!("room {}", room_id)))?;
        if let Some(OperatorTurn::Say(message)) = turn {
            messages.push(message);
        }
        messages
            .last()
            .cloned()
            .ok_or_else(|| HotspotError::NotFound(format!("no messages in room {}", room_id)).into())
    }

    async fn delete_room(&self, room_id: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.rooms.retain(|_, id| id != room_id);
        state.messages.remove(room_id);
        state.deleted.push(room_id.to_string());
        Ok(())
    }
}

/// Hands out numbered tickets
#[derive(Debug, Default)]
pub struct FakeTicketIssuer {
    issued: Mutex<usize>,
}

impl FakeTicketIssuer {
    /// Create an issuer that has issued nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// How many tickets were issued
    pub fn issued(&self) -> usize {
        *lock(&self.issued)
    }
}

#[async_trait]
impl AuthTicketProvider for FakeTicketIssuer {
    async fn issue_ticket(&self) -> Result<AuthTicket> {
        let mut issued = lock(&self.issued);
        *issued += 1;
        Ok(AuthTicket::new(format!("ticket-{}", *issued)))
    }
}

/// Presence lookups answered from a fixed table
#[derive(Debug, Default)]
pub struct FakePresence {
    controllers: HashMap<String, String>,
    queries: Mutex<Vec<String>>,
}

impl FakePresence {
    /// Nobody is connected
    pub fn new() -> Self {
        Self::default()
    }

    /// `identity` is served by `controller`
    pub fn with_client(mut self, identity: &str, controller: &str) -> Self {
        self.controllers
            .insert(identity.to_string(), controller.to_string());
        self
    }

    /// Identities that were looked up
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl PresenceLocator for FakePresence {
    async fn locate_presence(&self, identity: &str) -> Result<Option<String>> {
        lock(&self.queries).push(identity.to_string());
        Ok(self.controllers.get(identity).cloned())
    }
}

/// Directory lookups answered from fixed tables
#[derive(Debug, Default)]
pub struct FakeDirectory {
    hostnames: HashMap<String, String>,
    device_ids: HashMap<String, String>,
    rejected_tickets: Vec<String>,
    hostname_calls: Mutex<Vec<(String, String)>>,
}

impl FakeDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller at `address` is called `hostname` and has inventory id `device_id`
    pub fn with_device(mut self, address: &str, hostname: &str, device_id: &str) -> Self {
        self.hostnames
            .insert(address.to_string(), hostname.to_string());
        self.device_ids
            .insert(hostname.to_string(), device_id.to_string());
        self
    }

    /// Treat `ticket` as expired
    pub fn rejecting_ticket(mut self, ticket: &str) -> Self {
        self.rejected_tickets.push(ticket.to_string());
        self
    }

    /// `(address, ticket)` pairs passed to `resolve_hostname`
    pub fn hostname_calls(&self) -> Vec<(String, String)> {
        lock(&self.hostname_calls).clone()
    }
}

#[async_trait]
impl DeviceDirectory for FakeDirectory {
    async fn resolve_hostname(
        &self,
        controller_address: &str,
        ticket: &AuthTicket,
    ) -> Result<String> {
        lock(&self.hostname_calls).push((
            controller_address.to_string(),
            ticket.as_str().to_string(),
        ));
        if self.rejected_tickets.iter().any(|t| t == ticket.as_str()) {
            return Err(HotspotError::TicketRejected(format!("{} expired", ticket.as_str())).into());
        }
        self.hostnames
            .get(controller_address)
            .cloned()
            .ok_or_else(|| {
                HotspotError::NotFound(format!("no device with address {}", controller_address))
                    .into()
            })
    }

    async fn resolve_device_id(&self, hostname: &str) -> Result<String> {
        self.device_ids.get(hostname).cloned().ok_or_else(|| {
            HotspotError::NotFound(format!("no inventory device named {}", hostname)).into()
        })
    }
}

/// A deploy call the fake received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Device the template was deployed to
    pub device: String,
    /// Template name
    pub template: String,
    /// Job name handed back
    pub job_name: String,
}

#[derive(Debug, Default)]
struct DeployerState {
    deployments: Vec<Deployment>,
    statuses: HashMap<String, VecDeque<String>>,
    status_queries: Vec<String>,
}

/// Deployer that names jobs `J1`, `J2`, ... and replays scripted statuses
#[derive(Debug, Default)]
pub struct FakeDeployer {
    state: Mutex<DeployerState>,
}

impl FakeDeployer {
    /// Deployer with no scripted statuses
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses returned for `job_name`, one per query; the last one repeats
    pub fn with_statuses(self, job_name: &str, statuses: &[&str]) -> Self {
        lock(&self.state).statuses.insert(
            job_name.to_string(),
            statuses.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Deploy calls in order
    pub fn deployments(&self) -> Vec<Deployment> {
        lock(&self.state).deployments.clone()
    }

    /// Job names whose status was queried, in order
    pub fn status_queries(&self) -> Vec<String> {
        lock(&self.state).status_queries.clone()
    }
}

#[async_trait]
impl TemplateDeployer for FakeDeployer {
    async fn deploy_template(&self, device: &str, template_name: &str) -> Result<String> {
        let mut state = lock(&self.state);
        let job_name = format!("J{}", state.deployments.len() + 1);
        state.deployments.push(Deployment {
            device: device.to_string(),
            template: template_name.to_string(),
            job_name: job_name.clone(),
        });
        Ok(job_name)
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatus> {
        let mut state = lock(&self.state);
        state.status_queries.push(job_name.to_string());
        let queue = state
            .statuses
            .get_mut(job_name)
            .ok_or_else(|| HotspotError::NotFound(format!("no job named {}", job_name)))?;
        let status = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(JobStatus::new(status))
    }
}
