pub mod resolver;
pub mod sponsorblock;

pub use resolver::YoutubeResolver;
pub use sponsorblock::SponsorBlockClient;

use crate::core::{ContentId, Segment};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from the remote segment/vote service
#[derive(Debug, Error)]
pub enum ApiError {
    /// The content has no segments; expected for most videos
    #[error("no segments found")]
    NotFound,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Maps a playable item to the identifier segments are keyed by
pub trait ContentResolver: Send + Sync {
    fn resolve(&self, file_path: &str) -> Option<ContentId>;
}

/// Source of candidate segments for a piece of content
#[async_trait]
pub trait SegmentProvider: Send + Sync {
    /// Fetch segments in whatever order the source keeps them
    ///
    /// Content without segments yields [`ApiError::NotFound`].
    async fn lookup(&self, content_id: &ContentId) -> Result<Vec<Segment>, ApiError>;
}

/// Voting and telemetry endpoint
#[async_trait]
pub trait VoteApi: Send + Sync {
    /// Vote on whether a segment is correct
    async fn vote(&self, segment: &Segment, upvote: bool) -> Result<(), ApiError>;

    /// Report that a segment was skipped
    async fn viewed(&self, segment: &Segment) -> Result<(), ApiError>;
}
