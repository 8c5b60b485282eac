pub mod reporter;
pub mod window;

pub use reporter::{VoteOrigin, VoteReporter};
pub use window::{DecisionWindow, WindowHandle};

use crate::config::SkipConfig;
use crate::player::Player;
use std::sync::Arc;

/// How a decision window was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Seek back to the segment start, no vote
    Undo,
    /// Downvote the segment, then seek back
    Report,
    /// Deadline passed without user action
    Expire,
}

/// Observable state of a decision window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    Open,
    Resolved(Resolution),
    /// Abandoned by a stop or a newer skip; no resolution ran
    Cancelled,
}

/// Collaborators a resolution acts through
#[derive(Clone)]
pub struct WindowActions {
    pub player: Arc<dyn Player>,
    pub reporter: VoteReporter,
    pub config: Arc<dyn SkipConfig>,
}
