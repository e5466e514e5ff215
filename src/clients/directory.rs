//! Device directory client
//!
//! Hostnames come from the network controller manager (ticket
//! authenticated); inventory ids come from the infrastructure manager
//! (basic auth).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::info;

use super::http::{build_http_client, ensure_success, join_url};
use super::{AuthTicket, DeviceDirectory};
use crate::config::{HttpConfig, ServiceConfig};
use crate::error::{HotspotError, Result};

const CONTROLLER_SERVICE: &str = "network controller";
const INFRASTRUCTURE_SERVICE: &str = "infrastructure";

pub(crate) const DEVICES_PATH: &str = "webacs/api/v1/data/Devices";

#[derive(Debug, Deserialize)]
struct DeviceEnvelope {
    response: DeviceBody,
}

#[derive(Debug, Deserialize)]
struct DeviceBody {
    #[serde(default)]
    hostname: Option<String>,
}

/// `queryResponse` wrapper used by the infrastructure manager's data API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryEnvelope<T> {
    pub(crate) query_response: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntityIdList {
    #[serde(default)]
    pub(crate) entity_id: Vec<EntityId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityId {
    #[serde(rename = "$")]
    pub(crate) value: String,
}

impl EntityIdList {
    pub(crate) fn first(self) -> Option<String> {
        self.entity_id.into_iter().next().map(|id| id.value)
    }
}

/// Device directory backed by the controller and infrastructure managers
pub struct DirectoryClient {
    client: Client,
    controller: ServiceConfig,
    infrastructure: ServiceConfig,
}

impl DirectoryClient {
    /// Create a directory client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        controller: &ServiceConfig,
        infrastructure: &ServiceConfig,
        http: &HttpConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client(http)?,
            controller: controller.clone(),
            infrastructure: infrastructure.clone(),
        })
    }
}

#[async_trait]
impl DeviceDirectory for DirectoryClient {
    async fn resolve_hostname(
        &self,
        controller_address: &str,
        ticket: &AuthTicket,
    ) -> Result<String> {
        let url = join_url(
            &self.controller.api_url,
            &format!("network-device/ip-address/{}", controller_address),
        );
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Auth-Token", ticket.as_str())
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            let body = response.text().await.unwrap_or_default();
            return Err(HotspotError::TicketRejected(body).into());
        }

        let device: DeviceEnvelope = ensure_success(CONTROLLER_SERVICE, response)
            .await?
            .json()
            .await?;
        let hostname = device
            .response
            .hostname
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                HotspotError::NotFound(format!("no device with address {}", controller_address))
            })?;

        info!(controller = %controller_address, hostname = %hostname, "Resolved controller hostname");
        Ok(hostname)
    }

    async fn resolve_device_id(&self, hostname: &str) -> Result<String> {
        let response = self
            .client
            .get(join_url(&self.infrastructure.api_url, DEVICES_PATH))
            .basic_auth(&self.infrastructure.username, Some(&self.infrastructure.password))
            .header("Accept", "application/json")
            .query(&[("deviceName", hostname)])
            .send()
            .await?;

        let envelope: QueryEnvelope<EntityIdList> =
            ensure_success(INFRASTRUCTURE_SERVICE, response)
                .await?
                .json()
                .await?;
        let device_id = envelope
            .query_response
            .first()
            .ok_or_else(|| HotspotError::NotFound(format!("no inventory device named {}", hostname)))?;

        info!(hostname = %hostname, device_id = %device_id, "Resolved inventory device id");
        Ok(device_id)
    }
}
