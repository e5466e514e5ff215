//! Auth ticket issuer for the network controller manager

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::http::{build_http_client, ensure_success, join_url};
use super::{AuthTicket, AuthTicketProvider};
use crate::config::{HttpConfig, ServiceConfig};
use crate::error::{HotspotError, Result};

const SERVICE: &str = "network controller";

#[derive(Debug, Serialize)]
struct TicketRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TicketEnvelope {
    response: TicketBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketBody {
    #[serde(default)]
    service_ticket: Option<String>,
}

/// Exchanges account credentials for a service ticket
pub struct TicketClient {
    client: Client,
    config: ServiceConfig,
}

impl TicketClient {
    /// Create a ticket client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ServiceConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(http)?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl AuthTicketProvider for TicketClient {
    async fn issue_ticket(&self) -> Result<AuthTicket> {
        let response = self
            .client
            .post(join_url(&self.config.api_url, "ticket"))
            .json(&TicketRequest {
                username: &self.config.username,
                password: &self.config.password,
            })
            .send()
            .await?;

        let envelope: TicketEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        let ticket = envelope
            .response
            .service_ticket
            .filter(|t| !t.is_empty())
            .ok_or_else(|| HotspotError::UnexpectedResponse {
                service: SERVICE,
                detail: "ticket response has no serviceTicket".to_string(),
            })?;

        info!("Issued network controller ticket");
        Ok(AuthTicket::new(ticket))
    }
}
