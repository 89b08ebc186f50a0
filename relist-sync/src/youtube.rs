//! YouTube playlist storage implementation.
//!
//! Uses the YouTube Data API v3 `playlistItems` and `playlists` resources.
//! Obtaining the OAuth access token is left to the caller; see
//! [`YouTubeStore::set_access_token`].

use crate::error::{SyncError, SyncResult};
use crate::store::{ContainerStore, ContainerSummary};
use async_trait::async_trait;
use relist_types::{ContainerId, ContentId, Entry, Sequence, SlotId};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Largest `maxResults` the list endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 50;

/// YouTube specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Base URL for the YouTube Data API (e.g. `https://www.googleapis.com`).
    pub api_base_url: String,
    /// Items requested per list page. Clamped to `1..=50` by
    /// [`YouTubeStore::new`].
    pub page_size: u32,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com".to_string(),
            page_size: 50,
            timeout_secs: 60,
        }
    }
}

/// YouTube API response structures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemList {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    id: String,
    snippet: ItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSnippet {
    #[serde(default)]
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    kind: String,
    #[serde(default)]
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistList {
    #[serde(default)]
    items: Vec<Playlist>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Playlist {
    id: String,
    #[serde(default)]
    snippet: PlaylistSnippet,
    #[serde(default)]
    content_details: PlaylistContentDetails,
}

#[derive(Debug, Default, Deserialize)]
struct PlaylistSnippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistContentDetails {
    #[serde(default)]
    item_count: usize,
}

impl Playlist {
    fn into_summary(self) -> ContainerSummary {
        ContainerSummary {
            container_id: ContainerId::new(self.id),
            title: self.snippet.title,
            item_count: self.content_details.item_count,
        }
    }
}

/// Request body for `playlistItems.insert` / `playlistItems.update`.
#[derive(Debug, Serialize)]
struct PlaylistItemWrite<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    snippet: SnippetWrite<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnippetWrite<'a> {
    playlist_id: &'a str,
    position: usize,
    resource_id: ResourceId,
}

impl<'a> PlaylistItemWrite<'a> {
    fn new(
        slot: Option<&'a SlotId>,
        container: &'a ContainerId,
        content: &ContentId,
        position: usize,
    ) -> Self {
        Self {
            id: slot.map(SlotId::as_str),
            snippet: SnippetWrite {
                playlist_id: container.as_str(),
                position,
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: content.to_string(),
                },
            },
        }
    }
}

impl PlaylistItem {
    fn into_entry(self) -> Entry {
        Entry {
            slot_id: SlotId::new(self.id),
            content_id: ContentId::new(self.snippet.resource_id.video_id),
            title: self.snippet.title,
        }
    }
}

/// YouTube playlist store.
pub struct YouTubeStore {
    config: YouTubeConfig,
    client: Client,
    access_token: RwLock<Option<String>>,
}

impl YouTubeStore {
    /// Creates a new YouTube store.
    pub fn new(mut config: YouTubeConfig) -> SyncResult<Self> {
        let page_size = config.page_size.clamp(1, MAX_PAGE_SIZE);
        if page_size != config.page_size {
            warn!(
                "YouTube page_size {} out of range, using {}",
                config.page_size, page_size
            );
            config.page_size = page_size;
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            access_token: RwLock::new(None),
        })
    }

    /// Sets the OAuth access token used for every call.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        *self.access_token.write().await = Some(token.into());
    }

    /// Returns the configuration.
    pub fn config(&self) -> &YouTubeConfig {
        &self.config
    }

    async fn access_token(&self) -> SyncResult<String> {
        self.access_token
            .read()
            .await
            .clone()
            .ok_or_else(|| SyncError::Auth("not authenticated".to_string()))
    }

    fn items_url(&self) -> String {
        format!("{}/youtube/v3/playlistItems", self.config.api_base_url)
    }

    fn playlists_url(&self) -> String {
        format!("{}/youtube/v3/playlists", self.config.api_base_url)
    }
}

/// Maps non-success responses to [`SyncError`].
async fn check(response: Response, what: &str) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => SyncError::Auth(format!("{what} failed: {message}")),
        404 => SyncError::NotFound(format!("{what}: {message}")),
        code => SyncError::Api {
            status: code,
            message: format!("{what} failed: {message}"),
        },
    })
}

#[async_trait]
impl ContainerStore for YouTubeStore {
    fn provider_name(&self) -> &'static str {
        "YouTube"
    }

    async fn containers(&self, owner: Option<&str>) -> SyncResult<Vec<ContainerSummary>> {
        let access_token = self.access_token().await?;
        let page_size = self.config.page_size.to_string();

        let mut summaries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.playlists_url())
                .bearer_auth(&access_token)
                .query(&[
                    ("part", "snippet,contentDetails"),
                    ("maxResults", page_size.as_str()),
                ]);

            request = match owner {
                Some(channel) => request.query(&[("channelId", channel)]),
                None => request.query(&[("mine", "true")]),
            };
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SyncError::Network(format!("playlists list failed: {e}")))?;
            let page: PlaylistList = check(response, "playlists list")
                .await?
                .json()
                .await
                .map_err(|e| SyncError::Protocol(format!("failed to parse playlists page: {e}")))?;

            summaries.extend(page.items.into_iter().map(Playlist::into_summary));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!("Listed {} playlist(s)", summaries.len());
        Ok(summaries)
    }

    async fn list(&self, container: &ContainerId) -> SyncResult<Sequence> {
        let access_token = self.access_token().await?;
        let page_size = self.config.page_size.to_string();

        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.items_url())
                .bearer_auth(&access_token)
                .query(&[
                    ("part", "snippet"),
                    ("playlistId", container.as_str()),
                    ("maxResults", page_size.as_str()),
                ]);

            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SyncError::Network(format!("playlist list failed: {e}")))?;
            let page: PlaylistItemList = check(response, "playlist list")
                .await?
                .json()
                .await
                .map_err(|e| SyncError::Protocol(format!("failed to parse playlist page: {e}")))?;

            entries.extend(page.items.into_iter().map(PlaylistItem::into_entry));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!("Listed {} item(s) from playlist {}", entries.len(), container);
        Sequence::new(container.clone(), entries).map_err(|e| SyncError::Protocol(e.to_string()))
    }

    async fn delete(&self, slot: &SlotId) -> SyncResult<()> {
        let access_token = self.access_token().await?;

        let response = self
            .client
            .delete(self.items_url())
            .bearer_auth(&access_token)
            .query(&[("id", slot.as_str())])
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("playlist delete failed: {e}")))?;
        check(response, "playlist delete").await?;

        info!("Deleted playlist item {}", slot);
        Ok(())
    }

    async fn insert_at(
        &self,
        container: &ContainerId,
        content: &ContentId,
        position: usize,
    ) -> SyncResult<Entry> {
        let access_token = self.access_token().await?;
        let body = PlaylistItemWrite::new(None, container, content, position);

        let response = self
            .client
            .post(self.items_url())
            .bearer_auth(&access_token)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("playlist insert failed: {e}")))?;
        let item: PlaylistItem = check(response, "playlist insert")
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Protocol(format!("failed to parse inserted item: {e}")))?;

        let entry = item.into_entry();
        info!("Inserted {} at {} in {} (item {})", content, position, container, entry.slot_id);
        Ok(entry)
    }

    async fn update_position(
        &self,
        slot: &SlotId,
        container: &ContainerId,
        content: &ContentId,
        position: usize,
    ) -> SyncResult<()> {
        let access_token = self.access_token().await?;
        let body = PlaylistItemWrite::new(Some(slot), container, content, position);

        let response = self
            .client
            .put(self.items_url())
            .bearer_auth(&access_token)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("playlist update failed: {e}")))?;
        check(response, "playlist update").await?;

        info!("Moved playlist item {} to {}", slot, position);
        Ok(())
    }
}
