//! Hotspot session and its state machine
//!
//! A session walks `Idle -> AwaitingDuration -> Provisioning -> Active ->
//! Deprovisioning -> Idle`, in that order and without skipping. Every
//! change goes through [`Session::advance`], which refuses anything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::command::HotspotDuration;
use crate::clients::DeploymentJob;
use crate::error::{HotspotError, Result};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for an activation command
    Idle,
    /// Activated; waiting for the operator to say how long
    AwaitingDuration,
    /// Resolving the controller and enabling the hotspot
    Provisioning,
    /// Hotspot is up; the timer is running
    Active,
    /// Timer expired; disabling the hotspot
    Deprovisioning,
}

impl SessionState {
    /// The only state that may follow `self`
    pub fn next(self) -> SessionState {
        match self {
            Self::Idle => Self::AwaitingDuration,
            Self::AwaitingDuration => Self::Provisioning,
            Self::Provisioning => Self::Active,
            Self::Active => Self::Deprovisioning,
            Self::Deprovisioning => Self::Idle,
        }
    }

    /// Whether moving from `self` to `to` is allowed
    pub fn can_transition_to(self, to: SessionState) -> bool {
        self.next() == to
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingDuration => "awaiting_duration",
            Self::Provisioning => "provisioning",
            Self::Active => "active",
            Self::Deprovisioning => "deprovisioning",
        };
        f.write_str(name)
    }
}

/// The single provisioning attempt in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique id, for logs
    pub id: Uuid,
    /// Chat room the session is driven from
    pub channel_id: String,
    /// Who sent the activation command
    pub requester: String,
    /// When the activation command was seen
    pub started_at: DateTime<Utc>,
    /// Requested hotspot duration
    pub duration: Option<HotspotDuration>,
    /// Controller serving the requester (or the fallback)
    pub controller_address: Option<String>,
    /// True when the fallback controller was used
    pub used_fallback_controller: bool,
    /// Canonical controller hostname
    pub controller_hostname: Option<String>,
    /// Inventory id of the controller
    pub device_id: Option<String>,
    /// Job that enabled the hotspot
    pub enable_job: Option<DeploymentJob>,
    /// When the hotspot is scheduled to be disabled
    pub expires_at: Option<DateTime<Utc>>,
    /// Job that disabled the hotspot
    pub disable_job: Option<String>,
    state: SessionState,
    visited: Vec<SessionState>,
}

impl Session {
    /// A session that has just been activated
    pub fn activate(
        channel_id: impl Into<String>,
        requester: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id: channel_id.into(),
            requester: requester.into(),
            started_at,
            duration: None,
            controller_address: None,
            used_fallback_controller: false,
            controller_hostname: None,
            device_id: None,
            enable_job: None,
            expires_at: None,
            disable_job: None,
            state: SessionState::AwaitingDuration,
            visited: vec![SessionState::Idle, SessionState::AwaitingDuration],
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// States visited so far, starting with `Idle`
    pub fn visited(&self) -> &[SessionState] {
        &self.visited
    }

    /// Duration in seconds, once resolved
    pub fn duration_seconds(&self) -> Option<u64> {
        self.duration.map(|d| d.seconds())
    }

    /// Move to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::InvalidTransition`] for anything but the
    /// next state in the cycle.
    pub fn advance(&mut self, to: SessionState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(HotspotError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        tracing::info!(session_id = %self.id, from = %self.state, to = %to, "Session state change");
        self.state = to;
        self.visited.push(to);
        Ok(())
    }

    /// Whether the session has completed the full cycle
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Idle
    }
}
