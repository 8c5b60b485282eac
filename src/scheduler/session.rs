//! Event loop tying the scheduler to its collaborators
//!
//! The session consumes [`SessionEvent`]s one at a time, so the scheduler
//! never sees two events concurrently. Segment lookups run on their own tasks
//! and come back as `SegmentsLoaded`; results from an earlier item are
//! recognised by their generation and dropped.

use crate::api::{ApiError, ContentResolver, SegmentProvider};
use crate::core::{ContentId, Segment, SegmentSet};
use crate::scheduler::{
    CheckpointScheduler, Collaborators, SchedulerState, SchedulerTiming, SessionEvent, SessionReceiver,
    SessionSender,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct SkipSession {
    scheduler: CheckpointScheduler,
    resolver: Arc<dyn ContentResolver>,
    provider: Arc<dyn SegmentProvider>,
    events_tx: SessionSender,
    events_rx: SessionReceiver,
    /// Bumped on every start/stop so stale lookups can be ignored
    generation: u64,
}

impl SkipSession {
    pub fn new(
        collaborators: Collaborators,
        resolver: Arc<dyn ContentResolver>,
        provider: Arc<dyn SegmentProvider>,
        timing: SchedulerTiming,
        channel: (SessionSender, SessionReceiver),
    ) -> Self {
        let (events_tx, events_rx) = channel;
        Self {
            scheduler: CheckpointScheduler::new(collaborators, timing, events_tx.clone()),
            resolver,
            provider,
            events_tx,
            events_rx,
            generation: 0,
        }
    }

    /// Sender for the host's playback events
    pub fn sender(&self) -> SessionSender {
        self.events_tx.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Process events until `Shutdown`
    pub async fn run(mut self) {
        while let Some(event) = self.events_rx.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        debug!("session finished while {:?}", self.state());
        self.scheduler.on_stopped();
    }

    /// Process every event that is already queued, without waiting
    pub fn drain(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            if !self.handle(event) {
                break;
            }
        }
    }

    /// Handle one event, returns false once the session should end
    pub fn handle(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Started { file_path } => self.on_started(&file_path),
            SessionEvent::Seeked { position } => self.scheduler.on_seeked(position),
            SessionEvent::Position { position } => self.scheduler.on_position_report(position),
            SessionEvent::Stopped => {
                self.generation += 1;
                self.scheduler.on_stopped();
            }
            SessionEvent::SegmentsLoaded {
                generation,
                content_id,
                result,
            } => self.on_segments_loaded(generation, &content_id, result),
            SessionEvent::WindowResolved { window_id } => self.scheduler.on_window_resolved(window_id),
            SessionEvent::Shutdown => return false,
        }
        true
    }

    fn on_started(&mut self, file_path: &str) {
        self.generation += 1;
        self.scheduler.on_stopped();

        let Some(content_id) = self.resolver.resolve(file_path) else {
            debug!("no content id for {}", file_path);
            return;
        };

        let generation = self.generation;
        let provider = self.provider.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = provider.lookup(&content_id).await;
            let _ = events.send(SessionEvent::SegmentsLoaded {
                generation,
                content_id,
                result,
            });
        });
    }

    fn on_segments_loaded(&mut self, generation: u64, content_id: &ContentId, result: Result<Vec<Segment>, ApiError>) {
        if generation != self.generation {
            debug!("dropping stale segments for {}", content_id);
            return;
        }

        let segments = match result {
            Ok(segments) => segments,
            Err(ApiError::NotFound) => {
                info!("video {} has no sponsor segments", content_id);
                return;
            }
            Err(e) => {
                error!("failed to get sponsor segments for {}: {:?}", content_id, e);
                return;
            }
        };

        if segments.is_empty() {
            warn!("received empty list of sponsor segments for video {}", content_id);
            return;
        }

        debug!("got segments {:?}", segments);
        match SegmentSet::build(segments) {
            Ok(set) => self.scheduler.on_started(set),
            Err(e) => error!("rejecting segments for {}: {}", content_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::YoutubeResolver;
    use crate::decision::VoteReporter;
    use crate::mock::{settle, MockConfig, MockNotifier, MockPlayer, MockPrompt, MockProvider, MockVoteApi};
    use crate::scheduler::session_channel;

    const VIDEO: &str = "plugin://plugin.video.youtube/play/?video_id=dQw4w9WgXcQ";
    const OTHER_VIDEO: &str = "https://youtu.be/aaaaaaaaaaa";

    struct Fixture {
        session: SkipSession,
        player: Arc<MockPlayer>,
        provider: Arc<MockProvider>,
    }

    fn fixture() -> Fixture {
        let player = Arc::new(MockPlayer::new(0.0));
        let provider = Arc::new(MockProvider::new());
        let config = Arc::new(MockConfig::new());
        config.set_show_dialog(false);
        let collaborators = Collaborators {
            player: player.clone(),
            prompt: Arc::new(MockPrompt::new()),
            config,
            reporter: VoteReporter::new(Arc::new(MockVoteApi::new()), Arc::new(MockNotifier::new())),
        };
        let session = SkipSession::new(
            collaborators,
            Arc::new(YoutubeResolver::new()),
            provider.clone(),
            SchedulerTiming::default(),
            session_channel(),
        );
        Fixture {
            session,
            player,
            provider,
        }
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new(50.0, 60.0, "b", "sponsor"),
            Segment::new(10.0, 20.0, "a", "sponsor"),
        ]
    }

    async fn start(fx: &mut Fixture, path: &str) {
        fx.session.handle(SessionEvent::Started {
            file_path: path.to_string(),
        });
        settle().await;
        fx.session.drain();
    }

    #[tokio::test]
    async fn test_lookup_arms_scheduler() {
        let mut fx = fixture();
        fx.provider.insert("dQw4w9WgXcQ", segments());

        start(&mut fx, VIDEO).await;
        assert_eq!(fx.session.state(), SchedulerState::Armed);

        fx.session.handle(SessionEvent::Position { position: 10.0 });
        assert_eq!(fx.player.seeks(), vec![20.0]);
    }

    #[tokio::test]
    async fn test_unresolvable_item_stays_idle() {
        let mut fx = fixture();
        start(&mut fx, "/media/movies/film.mkv").await;
        assert_eq!(fx.session.state(), SchedulerState::Idle);
        assert_eq!(fx.provider.lookups(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failures_stay_idle() {
        let mut fx = fixture();

        // not found
        start(&mut fx, VIDEO).await;
        assert_eq!(fx.session.state(), SchedulerState::Idle);

        // empty
        fx.provider.insert("dQw4w9WgXcQ", vec![]);
        start(&mut fx, VIDEO).await;
        assert_eq!(fx.session.state(), SchedulerState::Idle);

        // transport error
        fx.provider.set_failing(true);
        start(&mut fx, VIDEO).await;
        assert_eq!(fx.session.state(), SchedulerState::Idle);

        fx.session.handle(SessionEvent::Position { position: 10.0 });
        assert!(fx.player.seeks().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_segments_disable_scheduling() {
        let mut fx = fixture();
        fx.provider.insert(
            "dQw4w9WgXcQ",
            vec![
                Segment::new(10.0, 20.0, "a", "sponsor"),
                Segment::new(30.0, 30.05, "noise", "sponsor"),
            ],
        );
        start(&mut fx, VIDEO).await;
        assert_eq!(fx.session.state(), SchedulerState::Idle);

        fx.session.handle(SessionEvent::Position { position: 10.0 });
        assert!(fx.player.seeks().is_empty());
    }

    #[tokio::test]
    async fn test_stale_lookup_is_dropped() {
        let mut fx = fixture();
        fx.provider.insert("dQw4w9WgXcQ", segments());

        fx.session.handle(SessionEvent::Started {
            file_path: VIDEO.to_string(),
        });
        fx.session.handle(SessionEvent::Stopped);
        settle().await;
        fx.session.drain();
        assert_eq!(fx.session.state(), SchedulerState::Idle);

        // a new item starts before the first lookup lands
        fx.session.handle(SessionEvent::Started {
            file_path: VIDEO.to_string(),
        });
        fx.session.handle(SessionEvent::Started {
            file_path: OTHER_VIDEO.to_string(),
        });
        settle().await;
        fx.session.drain();
        assert_eq!(fx.session.state(), SchedulerState::Idle);
        assert_eq!(fx.provider.lookups(), 3);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let fx = fixture();
        fx.provider.insert("dQw4w9WgXcQ", segments());
        let sender = fx.session.sender();
        let task = tokio::spawn(fx.session.run());

        sender
            .send(SessionEvent::Started {
                file_path: VIDEO.to_string(),
            })
            .unwrap();
        settle().await;
        sender.send(SessionEvent::Position { position: 10.2 }).unwrap();
        settle().await;
        sender.send(SessionEvent::Shutdown).unwrap();

        task.await.unwrap();
        assert_eq!(fx.player.seeks(), vec![20.0]);
    }
}
