//! SponsorBlock REST client
//!
//! Implements segment lookup, voting and skip-count reporting against a
//! SponsorBlock compatible server.

use crate::api::{ApiError, SegmentProvider, VoteApi};
use crate::core::{ContentId, Segment};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_SERVER: &str = "https://sponsor.ajay.app";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Segment as returned by `/api/skipSegments`
#[derive(Debug, Clone, Deserialize)]
pub struct RawSegment {
    pub segment: [f64; 2],
    #[serde(rename = "UUID")]
    pub uuid: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "sponsor".to_string()
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        Segment::new(raw.segment[0], raw.segment[1], raw.uuid, raw.category)
    }
}

/// Parse a `/api/skipSegments` response body
pub fn parse_segments(body: &str) -> Result<Vec<Segment>, ApiError> {
    let raw: Vec<RawSegment> = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(raw.into_iter().map(Segment::from).collect())
}

/// Client for the SponsorBlock API
pub struct SponsorBlockClient {
    server: String,
    user_id: String,
    categories: Vec<String>,
    client: Client,
}

impl SponsorBlockClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `server` - Base URL, e.g. `https://sponsor.ajay.app`
    /// * `user_id` - Private id votes are attributed to
    /// * `categories` - Segment categories to request
    pub fn new(server: &str, user_id: &str, categories: Vec<String>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            server: server.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            categories,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.server, path)
    }

    fn categories_param(&self) -> String {
        serde_json::to_string(&self.categories).unwrap_or_else(|_| "[\"sponsor\"]".to_string())
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SegmentProvider for SponsorBlockClient {
    async fn lookup(&self, content_id: &ContentId) -> Result<Vec<Segment>, ApiError> {
        debug!("looking up segments for {}", content_id);
        let categories = self.categories_param();
        let response = self
            .client
            .get(self.endpoint("skipSegments"))
            .query(&[("videoID", content_id.as_str()), ("categories", categories.as_str())])
            .send()
            .await?;

        let body = Self::check_status(response).await?.text().await?;
        parse_segments(&body)
    }
}

#[async_trait]
impl VoteApi for SponsorBlockClient {
    async fn vote(&self, segment: &Segment, upvote: bool) -> Result<(), ApiError> {
        let vote_type = if upvote { "1" } else { "0" };
        let response = self
            .client
            .post(self.endpoint("voteOnSponsorTime"))
            .query(&[
                ("UUID", segment.uuid.as_str()),
                ("userID", self.user_id.as_str()),
                ("type", vote_type),
            ])
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn viewed(&self, segment: &Segment) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("viewedVideoSponsorTime"))
            .query(&[("UUID", segment.uuid.as_str())])
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let body = r#"[
            {"category":"sponsor","actionType":"skip","segment":[12.5,40.0],"UUID":"abc","votes":3},
            {"segment":[100.0,110.0],"UUID":"def"}
        ]"#;
        let segments = parse_segments(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], Segment::new(12.5, 40.0, "abc", "sponsor"));
        assert_eq!(segments[1].category, "sponsor");
        assert_eq!(segments[1].uuid, "def");
    }

    #[test]
    fn test_parse_segments_rejects_garbage() {
        assert!(matches!(parse_segments("<html>"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_endpoints() {
        let client = SponsorBlockClient::new("https://example.org/", "user", vec!["sponsor".into(), "intro".into()]).unwrap();
        assert_eq!(client.endpoint("skipSegments"), "https://example.org/api/skipSegments");
        assert_eq!(client.categories_param(), r#"["sponsor","intro"]"#);
    }
}
