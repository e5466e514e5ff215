//! Shared HTTP plumbing for the service clients

use reqwest::{Client, Response};
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{HotspotError, Result};

/// Build the reqwest client every service client uses.
///
/// # Errors
///
/// Returns [`HotspotError::Config`] if the TLS backend cannot be initialized.
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .user_agent(concat!("hotspot-connect/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HotspotError::Config(format!("Failed to create HTTP client: {}", e)))?;
    Ok(client)
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turn a non-success response into [`HotspotError::Api`].
pub async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(service, status = status.as_u16(), "Service returned error: {}", body);
    Err(HotspotError::Api {
        service,
        status: status.as_u16(),
        message: body,
    }
    .into())
}
