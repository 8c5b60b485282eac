pub mod simulated;

pub use simulated::SimulatedPlayer;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    pub speed: f64, // 1.0 = real-time, 2.0 = 2x speed
    pub duration: f64,
}

/// The host playback engine as seen by the scheduler
///
/// Start/seek/stop notifications travel the other way, as
/// [`SessionEvent`](crate::scheduler::SessionEvent)s posted by the host.
pub trait Player: Send + Sync {
    /// Current playback position in seconds
    fn current_position(&self) -> f64;

    /// Jump to a position in seconds
    fn seek(&self, to: f64);
}
