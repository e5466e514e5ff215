//! Error types for hotspot-connect
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for hotspot-connect operations
///
/// Covers configuration problems, failures reported by any of the external
/// services the orchestrator talks to, and violations of the session state
/// machine.
#[derive(Error, Debug)]
pub enum HotspotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A service answered with a non-success HTTP status
    #[error("{service} API error ({status}): {message}")]
    Api {
        /// Which collaborator produced the error (chat, location, ...)
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body or summary
        message: String,
    },

    /// The network controller refused the auth ticket (expired or invalid)
    #[error("Auth ticket rejected: {0}")]
    TicketRejected(String),

    /// A lookup returned no result
    #[error("Not found: {0}")]
    NotFound(String),

    /// A service answered successfully but the payload lacked expected fields
    #[error("Unexpected {service} response: {detail}")]
    UnexpectedResponse {
        /// Which collaborator produced the response
        service: &'static str,
        /// What was missing or malformed
        detail: String,
    },

    /// An activation was attempted while another session is still running
    #[error("A hotspot session is already in progress (state: {0})")]
    SessionInProgress(String),

    /// A state change outside the allowed transition table
    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition {
        /// State the session was in
        from: String,
        /// State that was requested
        to: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for hotspot-connect operations
///
/// Uses `anyhow::Error` so context can be attached while propagating;
/// callers that need to branch on a specific failure downcast to
/// [`HotspotError`].
pub type Result<T> = anyhow::Result<T>;

/// Returns true when `err` carries a [`HotspotError::TicketRejected`].
pub fn is_ticket_rejected(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<HotspotError>(),
        Some(HotspotError::TicketRejected(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = HotspotError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_api_error_display() {
        let error = HotspotError::Api {
            service: "chat",
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(error.to_string(), "chat API error (502): bad gateway");
    }

    #[test]
    fn test_session_in_progress_display() {
        let error = HotspotError::SessionInProgress("active".to_string());
        assert!(error.to_string().contains("already in progress"));
        assert!(error.to_string().contains("active"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = HotspotError::InvalidTransition {
            from: "idle".to_string(),
            to: "active".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid session transition: idle -> active");
    }

    #[test]
    fn test_unexpected_response_display() {
        let error = HotspotError::UnexpectedResponse {
            service: "deployer",
            detail: "missing jobName".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unexpected deployer response: missing jobName"
        );
    }

    #[test]
    fn test_ticket_rejected_detection() {
        let err: anyhow::Error = HotspotError::TicketRejected("expired".to_string()).into();
        assert!(is_ticket_rejected(&err));

        let other: anyhow::Error = HotspotError::NotFound("room".to_string()).into();
        assert!(!is_ticket_rejected(&other));
    }

    #[test]
    fn test_ticket_rejected_survives_context() {
        let err = anyhow::Error::from(HotspotError::TicketRejected("expired".to_string()))
            .context("resolving hostname");
        assert!(is_ticket_rejected(&err));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: HotspotError = io_error.into();
        assert!(matches!(error, HotspotError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: HotspotError = yaml_error.into();
        assert!(matches!(error, HotspotError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HotspotError>();
    }
}
