//! Hotspot orchestrator
//!
//! The orchestrator is a single sequential loop. It polls the chat room for
//! an activation command, asks how long the hotspot should stay up, finds
//! the wireless controller serving the requester, enables the hotspot SSID
//! through a template job, waits out the requested time and disables the
//! SSID again. Every collaborator call and every wait is awaited before the
//! next one starts, so at most one call is ever in flight.
//!
//! Recoverable situations are handled locally:
//!
//! - unknown input while idle re-posts the instructions and keeps waiting
//! - a missing or malformed duration falls back to the configured default
//! - a requester who cannot be located is served by the fallback controller
//! - a rejected auth ticket is re-issued once
//!
//! Anything else (transport failures, API errors) is returned to the caller
//! unchanged and ends the run; the session is discarded first so the
//! orchestrator is idle again.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hotspot_connect::clients::fake::*;
//! use hotspot_connect::config::HotspotConfig;
//! use hotspot_connect::orchestrator::{Collaborators, ManualClock, Orchestrator, RunOutcome};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let chat = Arc::new(FakeChat::new("bot@example.com").with_script([
//!     OperatorTurn::say("/E", "ops@example.com"),
//!     OperatorTurn::say("5", "ops@example.com"),
//! ]));
//! let collaborators = Collaborators {
//!     chat: chat.clone(),
//!     tickets: Arc::new(FakeTicketIssuer::new()),
//!     presence: Arc::new(FakePresence::new().with_client("ops@example.com", "10.1.1.1")),
//!     directory: Arc::new(FakeDirectory::new().with_device("10.1.1.1", "WLC-1", "D100")),
//!     deployer: Arc::new(FakeDeployer::new().with_statuses("J1", &["SUCCESS"])),
//! };
//!
//! let mut orchestrator = Orchestrator::new(collaborators, HotspotConfig::default(), "Lab")
//!     .with_clock(Arc::new(ManualClock::default()));
//!
//! match orchestrator.run_once().await? {
//!     RunOutcome::Completed(session) => assert_eq!(session.duration_seconds(), Some(300)),
//!     RunOutcome::NoActivation => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::clients::{
    AuthTicket, AuthTicketProvider, ChatChannel, DeploymentJob, DeviceDirectory, JobStatus,
    PresenceLocator, TemplateDeployer,
};
use crate::config::HotspotConfig;
use crate::error::{is_ticket_rejected, HotspotError, Result};

pub mod clock;
pub mod command;
pub mod messages;
pub mod session;

pub use clock::{Clock, ManualClock, TokioClock};
pub use command::{ChatCommand, DurationSource, HotspotDuration, MAX_DURATION_MINUTES};
pub use session::{Session, SessionState};

/// The external systems the orchestrator sequences
#[derive(Clone)]
pub struct Collaborators {
    /// Chat room the operator talks through
    pub chat: Arc<dyn ChatChannel>,
    /// Ticket issuer for the device directory
    pub tickets: Arc<dyn AuthTicketProvider>,
    /// Finds the controller serving the requester
    pub presence: Arc<dyn PresenceLocator>,
    /// Controller hostnames and inventory ids
    pub directory: Arc<dyn DeviceDirectory>,
    /// Template jobs
    pub deployer: Arc<dyn TemplateDeployer>,
}

/// How a call to [`Orchestrator::run_once`] ended
#[derive(Debug)]
pub enum RunOutcome {
    /// A session went through the full cycle
    Completed(Box<Session>),
    /// Nobody activated the hotspot before the idle timeout
    NoActivation,
}

/// Drives hotspot sessions from the chat room
pub struct Orchestrator {
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
    settings: HotspotConfig,
    room_name: String,
    invitees: Vec<String>,
    room_id: Option<String>,
    ticket: Option<AuthTicket>,
    session: Option<Session>,
}

impl Orchestrator {
    /// Create an orchestrator that listens in the room called `room_name`
    pub fn new(
        collaborators: Collaborators,
        settings: HotspotConfig,
        room_name: impl Into<String>,
    ) -> Self {
        Self {
            collaborators,
            clock: Arc::new(TokioClock),
            settings,
            room_name: room_name.into(),
            invitees: Vec::new(),
            room_id: None,
            ticket: None,
            session: None,
        }
    }

    /// Use `clock` for all waits and timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Invite these accounts whenever the room is opened
    pub fn with_invitees(mut self, emails: Vec<String>) -> Self {
        self.invitees = emails;
        self
    }

    /// Current state; `Idle` when no session is running
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(Session::state)
            .unwrap_or(SessionState::Idle)
    }

    /// Session in progress, if any
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Id of the chat room, once opened
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Find or create the chat room and invite the configured members.
    pub async fn open_room(&mut self) -> Result<String> {
        if let Some(id) = &self.room_id {
            return Ok(id.clone());
        }

        let chat = &self.collaborators.chat;
        let id = chat.find_or_create_room(&self.room_name).await?;
        for email in &self.invitees {
            chat.add_member(&id, email).await?;
        }

        info!(room = %self.room_name, room_id = %id, "Chat room ready");
        self.room_id = Some(id.clone());
        Ok(id)
    }

    /// Delete the chat room, if it was opened.
    pub async fn close_room(&mut self) -> Result<()> {
        if let Some(id) = self.room_id.take() {
            self.collaborators.chat.delete_room(&id).await?;
            info!(room = %self.room_name, room_id = %id, "Chat room deleted");
        }
        Ok(())
    }

    /// Start a session for `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::SessionInProgress`] while another session is
    /// in any state other than `Idle`, and [`HotspotError::Config`] if the
    /// room has not been opened.
    pub fn activate(&mut self, requester: &str) -> Result<&Session> {
        if let Some(current) = &self.session {
            if !current.is_finished() {
                warn!(
                    session_id = %current.id,
                    state = %current.state(),
                    requester = %requester,
                    "Activation ignored, a session is already running"
                );
                return Err(HotspotError::SessionInProgress(current.state().to_string()).into());
            }
        }

        let room_id = self
            .room_id
            .clone()
            .ok_or_else(|| HotspotError::Config("chat room has not been opened".to_string()))?;

        // Tickets are not carried over from a previous session
        self.ticket = None;

        let session = Session::activate(room_id, requester, self.clock.now());
        info!(session_id = %session.id, requester = %requester, "Hotspot session activated");
        Ok(self.session.insert(session))
    }

    /// Run one session from the ready prompt back to idle.
    ///
    /// Returns [`RunOutcome::NoActivation`] if the idle timeout passes
    /// without an activation command. When any step fails the session and
    /// its ticket are discarded before the error is returned, so the
    /// orchestrator is back in `Idle` and can serve the next activation.
    pub async fn run_once(&mut self) -> Result<RunOutcome> {
        let room_id = self.open_room().await?;

        let Some(requester) = self.wait_for_activation(&room_id).await? else {
            return Ok(RunOutcome::NoActivation);
        };
        self.activate(&requester)?;

        match self.run_session(&room_id).await {
            Ok(session) => {
                info!(session_id = %session.id, "Hotspot session finished");
                Ok(RunOutcome::Completed(Box::new(session)))
            }
            Err(err) => {
                if let Some(session) = self.session.take() {
                    error!(
                        session_id = %session.id,
                        state = %session.state(),
                        "Hotspot session aborted: {:#}",
                        err
                    );
                }
                self.ticket = None;
                Err(err)
            }
        }
    }

    async fn run_session(&mut self, room_id: &str) -> Result<Session> {
        let duration = self.await_duration(room_id).await?;
        self.current_mut()?.duration = Some(duration);
        self.advance(SessionState::Provisioning)?;

        self.provision(room_id).await?;
        self.advance(SessionState::Active)?;

        self.hold(room_id, duration).await?;
        self.advance(SessionState::Deprovisioning)?;

        self.deprovision(room_id).await?;
        self.advance(SessionState::Idle)?;

        self.session
            .take()
            .ok_or_else(|| HotspotError::NotFound("no session in progress".to_string()).into())
    }

    fn current_mut(&mut self) -> Result<&mut Session> {
        self.session
            .as_mut()
            .ok_or_else(|| HotspotError::NotFound("no session in progress".to_string()).into())
    }

    fn current(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| HotspotError::NotFound("no session in progress".to_string()).into())
    }

    fn advance(&mut self, to: SessionState) -> Result<()> {
        self.current_mut()?.advance(to)
    }

    async fn post(&self, room_id: &str, text: &str) -> Result<()> {
        self.collaborators.chat.post_message(room_id, text).await
    }

    async fn post_ready_prompt(&self, room_id: &str) -> Result<()> {
        self.post(room_id, messages::INSTRUCTIONS).await?;
        self.post(room_id, messages::READY).await
    }

    /// Poll until someone sends the activation command; returns their identity.
    async fn wait_for_activation(&self, room_id: &str) -> Result<Option<String>> {
        self.post_ready_prompt(room_id).await?;

        let max_polls = self.settings.idle_polls();
        for poll in 1..=max_polls {
            self.clock.sleep(self.settings.poll_interval()).await;
            let latest = self.collaborators.chat.latest_message(room_id).await?;

            match ChatCommand::parse(&latest.text) {
                ChatCommand::Waiting => continue,
                ChatCommand::Activate => {
                    info!(requester = %latest.author, poll, "Activation command received");
                    return Ok(Some(latest.author));
                }
                ChatCommand::Unrecognized(text) => {
                    warn!(author = %latest.author, poll, "Unrecognized input: {}", text);
                    self.post(room_id, messages::NOT_UNDERSTOOD).await?;
                    self.post_ready_prompt(room_id).await?;
                }
            }
        }

        warn!(
            timeout_secs = self.settings.idle_timeout_secs,
            "No activation command before the idle timeout"
        );
        Ok(None)
    }

    async fn await_duration(&self, room_id: &str) -> Result<HotspotDuration> {
        self.post(room_id, messages::DURATION_PROMPT).await?;

        let mut reply = None;
        for _ in 0..self.settings.duration_polls() {
            self.clock.sleep(self.settings.poll_interval()).await;
            let latest = self.collaborators.chat.latest_message(room_id).await?;
            if latest.text.trim() != messages::DURATION_PROMPT.trim() {
                reply = Some(latest.text);
                break;
            }
        }

        let duration =
            HotspotDuration::from_reply(reply.as_deref(), self.settings.default_duration_minutes);
        match duration.source {
            DurationSource::Operator => {
                info!(minutes = duration.minutes, "Hotspot duration received")
            }
            DurationSource::NoAnswer => {
                info!(minutes = duration.minutes, "No duration given, using default")
            }
            DurationSource::Malformed => warn!(
                minutes = duration.minutes,
                "Unusable duration {:?}, using default",
                reply.unwrap_or_default()
            ),
        }
        Ok(duration)
    }

    async fn provision(&mut self, room_id: &str) -> Result<()> {
        let requester = self.current()?.requester.clone();

        let located = self
            .collaborators
            .presence
            .locate_presence(&requester)
            .await?;
        let used_fallback = located.is_none();
        let controller = match located {
            Some(address) => {
                info!(requester = %requester, controller = %address, "Requester located");
                address
            }
            None => {
                warn!(
                    requester = %requester,
                    fallback = %self.settings.fallback_controller,
                    "Requester not located, using fallback controller"
                );
                self.post(room_id, messages::NOT_CONNECTED).await?;
                self.settings.fallback_controller.clone()
            }
        };

        let hostname = self.resolve_hostname(&controller).await?;
        let device_id = self
            .collaborators
            .directory
            .resolve_device_id(&hostname)
            .await?;

        let job_name = self
            .collaborators
            .deployer
            .deploy_template(&hostname, &self.settings.enable_template)
            .await?;
        info!(hostname = %hostname, device_id = %device_id, job_name = %job_name, "Enable job issued");

        let status = self.await_job_status(&job_name).await?;

        let session = self.current_mut()?;
        session.controller_address = Some(controller);
        session.used_fallback_controller = used_fallback;
        session.controller_hostname = Some(hostname);
        session.device_id = Some(device_id);
        session.enable_job = Some(DeploymentJob {
            job_name,
            status: Some(status.clone()),
        });

        self.post(room_id, &messages::job_status(status.as_str()))
            .await
    }

    async fn ticket(&mut self) -> Result<AuthTicket> {
        if let Some(ticket) = &self.ticket {
            return Ok(ticket.clone());
        }
        let ticket = self.collaborators.tickets.issue_ticket().await?;
        self.ticket = Some(ticket.clone());
        Ok(ticket)
    }

    async fn resolve_hostname(&mut self, controller: &str) -> Result<String> {
        let ticket = self.ticket().await?;
        let resolved = self
            .collaborators
            .directory
            .resolve_hostname(controller, &ticket)
            .await;
        match resolved {
            Err(err) if is_ticket_rejected(&err) => {
                warn!("Auth ticket rejected, issuing a new one: {}", err);
                self.ticket = None;
                let ticket = self.ticket().await?;
                self.collaborators
                    .directory
                    .resolve_hostname(controller, &ticket)
                    .await
            }
            other => other,
        }
    }

    /// Wait for the deployer to pick the job up, then read its status.
    ///
    /// Queries once by default; with `status_poll_attempts > 1` keeps
    /// querying until the status is terminal or attempts run out.
    async fn await_job_status(&self, job_name: &str) -> Result<JobStatus> {
        let attempts = self.settings.status_poll_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.clock.sleep(self.settings.settle_wait()).await;
            let status = self.collaborators.deployer.job_status(job_name).await?;
            debug!(job_name = %job_name, attempt, status = %status, "Enable job status");

            if attempt >= attempts || status.kind().is_terminal() {
                return Ok(status);
            }
        }
    }

    async fn hold(&mut self, room_id: &str, duration: HotspotDuration) -> Result<()> {
        self.post(room_id, &messages::availability(duration.minutes))
            .await?;
        self.post(room_id, messages::THUMBS_UP).await?;

        let window = Duration::from_secs(duration.seconds());
        let expires_at = chrono::Duration::from_std(window)
            .ok()
            .and_then(|delta| self.clock.now().checked_add_signed(delta));
        let session = self.current_mut()?;
        session.expires_at = expires_at;
        info!(
            session_id = %session.id,
            minutes = duration.minutes,
            default_duration = duration.is_default(),
            expires_at = ?expires_at,
            "Hotspot active"
        );

        self.clock.sleep(window).await;
        Ok(())
    }

    async fn deprovision(&mut self, room_id: &str) -> Result<()> {
        let hostname = self
            .current()?
            .controller_hostname
            .clone()
            .ok_or_else(|| HotspotError::NotFound("controller hostname".to_string()))?;

        let job_name = self
            .collaborators
            .deployer
            .deploy_template(&hostname, &self.settings.disable_template)
            .await?;
        info!(hostname = %hostname, job_name = %job_name, "Disable job issued");
        self.current_mut()?.disable_job = Some(job_name);

        self.post(room_id, messages::DISABLED).await?;
        self.post(room_id, messages::FAREWELL).await
    }
}
