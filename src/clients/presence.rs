//! Location service client
//!
//! Answers "which wireless controller is this client attached to?" either
//! by the username the client authenticated with or by its MAC address.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info};

use super::http::{build_http_client, ensure_success, join_url};
use super::PresenceLocator;
use crate::config::{HttpConfig, ServiceConfig};
use crate::error::Result;

const SERVICE: &str = "location";
const CLIENTS_PATH: &str = "api/location/v2/clients/";
const COUNT_PATH: &str = "api/location/v2/clients/count";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocatedClient {
    #[serde(default)]
    mac_address: Option<String>,
    #[serde(default)]
    detecting_controllers: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientCount {
    count: u64,
}

/// Location service client
pub struct PresenceClient {
    client: Client,
    config: ServiceConfig,
}

impl PresenceClient {
    /// Create a location client
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

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(join_url(&self.config.api_url, path))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
    }

    async fn locate_by(&self, key: &str, value: &str) -> Result<Option<String>> {
        let response = self.get(CLIENTS_PATH).query(&[(key, value)]).send().await?;
        let clients: Vec<LocatedClient> = ensure_success(SERVICE, response).await?.json().await?;

        let controller = clients
            .into_iter()
            .next()
            .and_then(|c| c.detecting_controllers)
            .filter(|c| !c.is_empty());

        match &controller {
            Some(address) => info!(%key, %value, controller = %address, "Client located"),
            None => debug!(%key, %value, "Client not seen on the wireless network"),
        }
        Ok(controller)
    }

    /// Controller serving the device with `mac_address`, if it is connected.
    pub async fn locate_mac(&self, mac_address: &str) -> Result<Option<String>> {
        self.locate_by("macAddress", mac_address).await
    }

    /// MAC addresses of every client the location service currently tracks.
    pub async fn active_client_macs(&self) -> Result<Vec<String>> {
        let response = self.get(CLIENTS_PATH).send().await?;
        let clients: Vec<LocatedClient> = ensure_success(SERVICE, response).await?.json().await?;

        let macs: Vec<String> = clients
            .into_iter()
            .filter_map(|c| c.mac_address)
            .filter(|mac| !mac.is_empty())
            .collect();
        debug!(count = macs.len(), "Listed active client MAC addresses");
        Ok(macs)
    }

    /// Number of clients the location service currently tracks.
    pub async fn client_count(&self) -> Result<u64> {
        let response = self.get(COUNT_PATH).send().await?;
        let count: ClientCount = ensure_success(SERVICE, response).await?.json().await?;
        Ok(count.count)
    }
}

#[async_trait]
impl PresenceLocator for PresenceClient {
    async fn locate_presence(&self, identity: &str) -> Result<Option<String>> {
        self.locate_by("username", identity).await
    }
}
