//! Interpretation of operator messages

use serde::{Deserialize, Serialize};

use super::messages::{ACTIVATE_COMMAND, READY};

/// What a message seen while idle means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Nothing new: the latest message is still the ready sentinel
    Waiting,
    /// Start a session
    Activate,
    /// Anything else
    Unrecognized(String),
}

impl ChatCommand {
    /// Classify the latest message text; commands match exactly.
    pub fn parse(text: &str) -> Self {
        match text {
            READY => Self::Waiting,
            ACTIVATE_COMMAND => Self::Activate,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// Where a session's duration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    /// The operator answered with a number of minutes
    Operator,
    /// No answer arrived in time
    NoAnswer,
    /// The answer was not a whole number between 1 and the maximum
    Malformed,
}

/// Longest hotspot window an operator can ask for (one week)
pub const MAX_DURATION_MINUTES: u64 = 7 * 24 * 60;

/// How long the hotspot stays enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotDuration {
    /// Requested minutes
    pub minutes: u64,
    /// How the value was obtained
    pub source: DurationSource,
}

impl HotspotDuration {
    /// Interpret the operator's answer, falling back to `default_minutes`.
    ///
    /// Answers above [`MAX_DURATION_MINUTES`] count as malformed.
    pub fn from_reply(reply: Option<&str>, default_minutes: u64) -> Self {
        match reply {
            None => Self {
                minutes: default_minutes,
                source: DurationSource::NoAnswer,
            },
            Some(text) => match text.trim().parse::<u64>() {
                Ok(minutes) if (1..=MAX_DURATION_MINUTES).contains(&minutes) => Self {
                    minutes,
                    source: DurationSource::Operator,
                },
                _ => Self {
                    minutes: default_minutes,
                    source: DurationSource::Malformed,
                },
            },
        }
    }

    /// Duration in seconds
    pub fn seconds(&self) -> u64 {
        self.minutes.saturating_mul(60)
    }

    /// True when the default was used
    pub fn is_default(&self) -> bool {
        self.source != DurationSource::Operator
    }
}
