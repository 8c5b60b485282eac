use crate::api::VoteApi;
use crate::core::Segment;
use crate::notify::{Notification, Notifier};
use std::sync::Arc;
use tracing::{debug, error, info};

/// What triggered a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOrigin {
    /// The user asked for it; outcomes are shown to them
    User,
    /// Automatic upvote on expiry; outcomes are only logged
    Expiry,
}

/// Sends votes and skip telemetry, containing every failure
#[derive(Clone)]
pub struct VoteReporter {
    api: Arc<dyn VoteApi>,
    notifier: Arc<dyn Notifier>,
}

impl VoteReporter {
    pub fn new(api: Arc<dyn VoteApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Vote on a segment, returns whether the server accepted it
    pub async fn vote(&self, segment: &Segment, upvote: bool, origin: VoteOrigin) -> bool {
        match self.api.vote(segment, upvote).await {
            Ok(()) => {
                info!("voted {} on segment {}", if upvote { "up" } else { "down" }, segment);
                if origin == VoteOrigin::User {
                    self.notifier.notify(Notification::VoteSubmitted {
                        segment: segment.clone(),
                        upvote,
                    });
                }
                true
            }
            Err(e) => {
                error!("failed to vote on segment {}: {}", segment, e);
                if origin == VoteOrigin::User {
                    self.notifier.notify(Notification::VoteFailed {
                        segment: segment.clone(),
                        reason: e.to_string(),
                    });
                }
                false
            }
        }
    }

    /// Report a skip to the view counter; failures are only logged
    pub async fn viewed(&self, segment: &Segment) {
        debug!("reporting segment skipped {}", segment);
        if let Err(e) = self.api.viewed(segment).await {
            error!("failed to report segment skipped {}: {}", segment, e);
        }
    }

    /// Fire-and-forget variant of [`viewed`](Self::viewed)
    pub fn dispatch_viewed(&self, segment: Segment) {
        let reporter = self.clone();
        tokio::spawn(async move {
            reporter.viewed(&segment).await;
        });
    }
}
