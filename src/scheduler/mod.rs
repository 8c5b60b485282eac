pub mod checkpoint;
pub mod session;

pub use checkpoint::CheckpointScheduler;
pub use session::SkipSession;

use crate::api::ApiError;
use crate::config::{Settings, SkipConfig};
use crate::core::{ContentId, Segment};
use crate::decision::VoteReporter;
use crate::notify::DecisionPrompt;
use crate::player::Player;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No segments for the current item
    Idle,
    /// Waiting for the next checkpoint (possibly none left)
    Armed,
    /// A skip happened and its decision window is still open
    SkipPending,
}

/// Everything that drives a playback session, in arrival order
#[derive(Debug)]
pub enum SessionEvent {
    /// Playback of a new item started
    Started { file_path: String },
    /// The player jumped to a new position
    Seeked { position: f64 },
    /// Periodic position report during playback
    Position { position: f64 },
    /// Playback stopped
    Stopped,
    /// A segment lookup finished
    SegmentsLoaded {
        generation: u64,
        content_id: ContentId,
        result: Result<Vec<Segment>, ApiError>,
    },
    /// A decision window settled
    WindowResolved { window_id: u64 },
    /// Stop processing events
    Shutdown,
}

pub type SessionSender = mpsc::UnboundedSender<SessionEvent>;
pub type SessionReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create the channel a session and its event sources share
pub fn session_channel() -> (SessionSender, SessionReceiver) {
    mpsc::unbounded_channel()
}

/// Narrow interfaces the scheduler acts through
#[derive(Clone)]
pub struct Collaborators {
    pub player: Arc<dyn Player>,
    pub prompt: Arc<dyn DecisionPrompt>,
    pub config: Arc<dyn SkipConfig>,
    pub reporter: VoteReporter,
}

/// Timing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerTiming {
    /// How far past a checkpoint a position report may land and still trigger it
    pub reach_tolerance: f64,
    /// Largest distance playback may cover between two consecutive reports
    pub report_step: f64,
    /// How long a decision window stays open
    pub window_duration: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            reach_tolerance: 1.0,
            report_step: 1.0,
            window_duration: Duration::from_secs(15),
        }
    }
}

impl From<&Settings> for SchedulerTiming {
    fn from(settings: &Settings) -> Self {
        Self {
            reach_tolerance: settings.reach_tolerance_secs.max(0.0),
            report_step: settings.reach_tolerance_secs.max(0.0),
            window_duration: settings.skipped_dialog_duration(),
        }
    }
}

impl SchedulerTiming {
    /// Widen the report step to what playback covers between two reports
    ///
    /// Leaves room for one late tick.
    pub fn with_report_rate(mut self, interval: Duration, speed: f64) -> Self {
        self.report_step = self.report_step.max(interval.as_secs_f64() * speed * 2.0);
        self
    }
}
