//! REST chat client
//!
//! Talks to a Webex-style messaging API: rooms are found by title,
//! messages are posted as plain text, and the newest message of a room is
//! read back with its author's email.
//!
//! # Example
//!
//! ```rust,no_run
//! use hotspot_connect::clients::{ChatChannel, ChatClient};
//! use hotspot_connect::config::{ChatConfig, HttpConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ChatConfig {
//!     token: "bot-token".to_string(),
//!     ..ChatConfig::default()
//! };
//! let chat = ChatClient::new(&config, &HttpConfig::default())?;
//! let room_id = chat.find_or_create_room("HotSpot-Connect").await?;
//! chat.post_message(&room_id, "Ready for input!").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::http::{build_http_client, ensure_success, join_url};
use super::{ChatChannel, ChatMessage};
use crate::config::{ChatConfig, HttpConfig};
use crate::error::{HotspotError, Result};

const SERVICE: &str = "chat";

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Room {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Serialize)]
struct CreateRoomRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMembershipRequest<'a> {
    room_id: &'a str,
    person_email: &'a str,
    is_moderator: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessageRequest<'a> {
    room_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    #[serde(default)]
    text: String,
    #[serde(default)]
    person_email: String,
}

/// Chat API client
pub struct ChatClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ChatClient {
    /// Create a chat client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ChatConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(http)?,
            base_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, join_url(&self.base_url, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    /// Look up a room by exact title.
    pub async fn find_room(&self, name: &str) -> Result<Option<String>> {
        let response = self.request(Method::GET, "rooms").send().await?;
        let rooms: ItemList<Room> = ensure_success(SERVICE, response).await?.json().await?;

        let found = rooms
            .items
            .into_iter()
            .find(|room| room.title == name)
            .map(|room| room.id);
        debug!(room = %name, found = found.is_some(), "Looked up chat room");
        Ok(found)
    }

    /// Create a room titled `name` and return its id.
    pub async fn create_room(&self, name: &str) -> Result<String> {
        let response = self
            .request(Method::POST, "rooms")
            .json(&CreateRoomRequest { title: name })
            .send()
            .await?;
        let room: Room = ensure_success(SERVICE, response).await?.json().await?;
        info!(room = %name, room_id = %room.id, "Created chat room");
        Ok(room.id)
    }
}

#[async_trait]
impl ChatChannel for ChatClient {
    async fn find_or_create_room(&self, name: &str) -> Result<String> {
        match self.find_room(name).await? {
            Some(id) => {
                info!(room = %name, room_id = %id, "Existing chat room found");
                Ok(id)
            }
            None => self.create_room(name).await,
        }
    }

    async fn add_member(&self, room_id: &str, email: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "memberships")
            .json(&CreateMembershipRequest {
                room_id,
                person_email: email,
                is_moderator: true,
            })
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            debug!(email = %email, "Already a member of the room");
            return Ok(());
        }
        ensure_success(SERVICE, response).await?;
        info!(email = %email, "Invitation sent");
        Ok(())
    }

    async fn post_message(&self, room_id: &str, text: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "messages")
            .json(&CreateMessageRequest { room_id, text })
            .send()
            .await?;
        ensure_success(SERVICE, response).await?;
        debug!(room_id = %room_id, "Message posted: {}", text);
        Ok(())
    }

    async fn latest_message(&self, room_id: &str) -> Result<ChatMessage> {
        let response = self
            .request(Method::GET, "messages")
            .query(&[("roomId", room_id), ("max", "1")])
            .send()
            .await?;
        let messages: ItemList<Message> = ensure_success(SERVICE, response).await?.json().await?;

        let latest = messages
            .items
            .into_iter()
            .next()
            .ok_or_else(|| HotspotError::NotFound(format!("no messages in room {}", room_id)))?;
        debug!(author = %latest.person_email, "Latest room message: {}", latest.text);
        Ok(ChatMessage::new(latest.text, latest.person_email))
    }

    async fn delete_room(&self, room_id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("rooms/{}", room_id))
            .send()
            .await?;
        ensure_success(SERVICE, response).await?;
        info!(room_id = %room_id, "Deleted chat room");
        Ok(())
    }
}
