//! In-memory collaborators for tests

use crate::api::{ApiError, SegmentProvider, VoteApi};
use crate::config::SkipConfig;
use crate::core::{ContentId, Segment};
use crate::notify::{DecisionPrompt, Notification, Notifier, PromptRequest};
use crate::player::Player;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Let spawned tasks run to completion
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Player that records every seek
pub struct MockPlayer {
    position: Mutex<f64>,
    seeks: Mutex<Vec<f64>>,
}

impl MockPlayer {
    pub fn new(position: f64) -> Self {
        Self {
            position: Mutex::new(position),
            seeks: Mutex::new(Vec::new()),
        }
    }

    pub fn set_position(&self, position: f64) {
        *self.position.lock().unwrap() = position;
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.seeks.lock().unwrap().clone()
    }
}

impl Player for MockPlayer {
    fn current_position(&self) -> f64 {
        *self.position.lock().unwrap()
    }

    fn seek(&self, to: f64) {
        self.seeks.lock().unwrap().push(to);
        *self.position.lock().unwrap() = to;
    }
}

/// Vote API recording attempts and accepted calls
#[derive(Default)]
pub struct MockVoteApi {
    failing: AtomicBool,
    delay: Mutex<Duration>,
    vote_attempts: AtomicUsize,
    view_attempts: AtomicUsize,
    votes: Mutex<Vec<(String, bool)>>,
    viewed: Mutex<Vec<String>>,
}

impl MockVoteApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every vote take this long to answer
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn vote_attempts(&self) -> usize {
        self.vote_attempts.load(Ordering::SeqCst)
    }

    pub fn view_attempts(&self) -> usize {
        self.view_attempts.load(Ordering::SeqCst)
    }

    /// Accepted votes as (uuid, upvote)
    pub fn votes(&self) -> Vec<(String, bool)> {
        self.votes.lock().unwrap().clone()
    }

    /// Accepted view reports by uuid
    pub fn viewed(&self) -> Vec<String> {
        self.viewed.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoteApi for MockVoteApi {
    async fn vote(&self, segment: &Segment, upvote: bool) -> Result<(), ApiError> {
        self.vote_attempts.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "mock failure".to_string(),
            });
        }
        self.votes.lock().unwrap().push((segment.uuid.clone(), upvote));
        Ok(())
    }

    async fn viewed(&self, segment: &Segment) -> Result<(), ApiError> {
        self.view_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                message: "mock failure".to_string(),
            });
        }
        self.viewed.lock().unwrap().push(segment.uuid.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Prompt that only remembers what it was asked to show
#[derive(Default)]
pub struct MockPrompt {
    requests: Mutex<Vec<PromptRequest>>,
}

impl MockPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DecisionPrompt for MockPrompt {
    fn show(&self, request: PromptRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

/// Switchable flags; dialog and skip tracking on, auto upvote off
pub struct MockConfig {
    show_dialog: AtomicBool,
    auto_upvote: AtomicBool,
    skip_tracking: AtomicBool,
}

impl MockConfig {
    pub fn new() -> Self {
        Self {
            show_dialog: AtomicBool::new(true),
            auto_upvote: AtomicBool::new(false),
            skip_tracking: AtomicBool::new(true),
        }
    }

    pub fn set_show_dialog(&self, enabled: bool) {
        self.show_dialog.store(enabled, Ordering::SeqCst);
    }

    pub fn set_auto_upvote(&self, enabled: bool) {
        self.auto_upvote.store(enabled, Ordering::SeqCst);
    }

    pub fn set_skip_tracking(&self, enabled: bool) {
        self.skip_tracking.store(enabled, Ordering::SeqCst);
    }
}

impl SkipConfig for MockConfig {
    fn show_skipped_dialog(&self) -> bool {
        self.show_dialog.load(Ordering::SeqCst)
    }

    fn auto_upvote(&self) -> bool {
        self.auto_upvote.load(Ordering::SeqCst)
    }

    fn skip_count_tracking(&self) -> bool {
        self.skip_tracking.load(Ordering::SeqCst)
    }
}

/// Segment source keyed by video id
#[derive(Default)]
pub struct MockProvider {
    segments: Mutex<HashMap<String, Vec<Segment>>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, video_id: &str, segments: Vec<Segment>) {
        self.segments.lock().unwrap().insert(video_id.to_string(), segments);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SegmentProvider for MockProvider {
    async fn lookup(&self, content_id: &ContentId) -> Result<Vec<Segment>, ApiError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        self.segments
            .lock()
            .unwrap()
            .get(content_id.as_str())
            .cloned()
            .ok_or(ApiError::NotFound)
    }
}
