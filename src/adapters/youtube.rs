//! YouTube Data API v3 client.
//!
//! Two endpoints are consumed: `search` for the channel's most recent video
//! ids (ordered by publish date) and `videos` for the batch snippet lookup.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::MetadataSource;

const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Errors talking to the metadata API. Any of these aborts the sync stage.
#[derive(Debug, Error)]
pub enum MetadataFetchError {
    #[error("metadata request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("metadata API returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Title and description for one video, as returned by the detail lookup.
#[derive(Debug, Clone)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// YouTube Data API client
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Create a client against the public API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, API_BASE_URL)
    }

    /// Create a client against a custom base URL (for tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MetadataFetchError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MetadataFetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MetadataSource for YouTubeClient {
    async fn recent_video_ids(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>, MetadataFetchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let max_results = max_results.to_string();
        let response: SearchResponse = self
            .get_json(
                &self.endpoint("search"),
                &[
                    ("key", self.api_key.as_str()),
                    ("channelId", channel_id),
                    ("part", "snippet"),
                    ("order", "date"),
                    ("maxResults", max_results.as_str()),
                    ("type", "video"),
                ],
            )
            .await?;

        // Search occasionally returns non-video entries without a videoId;
        // those are dropped rather than treated as errors.
        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetails>, MetadataFetchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let response: VideosResponse = self
            .get_json(
                &self.endpoint("videos"),
                &[
                    ("key", self.api_key.as_str()),
                    ("id", joined.as_str()),
                    ("part", "snippet"),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| VideoDetails {
                id: item.id,
                title: item.snippet.title,
                description: item.snippet.description,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let raw = r#"{
            "kind": "youtube#searchListResponse",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc123"}},
                {"id": {"kind": "youtube#channel"}},
                {"id": {"kind": "youtube#video", "videoId": "def456"}}
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        let ids: Vec<_> = response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        assert_eq!(ids, vec!["abc123", "def456"]);
    }

    #[test]
    fn test_parse_videos_response() {
        let raw = r#"{
            "items": [
                {
                    "id": "abc123",
                    "snippet": {
                        "title": "A Title",
                        "description": "Some text",
                        "publishedAt": "2024-01-01T00:00:00Z"
                    }
                }
            ]
        }"#;

        let response: VideosResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].id, "abc123");
        assert_eq!(response.items[0].snippet.title, "A Title");
        assert_eq!(response.items[0].snippet.description, "Some text");
    }

    #[test]
    fn test_parse_empty_search_response() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.items.is_empty());
    }
}
