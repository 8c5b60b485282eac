pub mod console;

pub use console::{ConsoleNotifier, ConsolePrompt};

use crate::core::Segment;
use crate::decision::WindowHandle;
use std::time::Duration;

/// User-visible notifications
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// An explicit vote reached the server
    VoteSubmitted { segment: Segment, upvote: bool },
    /// An explicit vote could not be submitted
    VoteFailed { segment: Segment, reason: String },
}

/// Surface for short, non-interactive notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Everything a prompt needs to present a decision window
#[derive(Clone)]
pub struct PromptRequest {
    pub segment: Segment,
    /// How long until the window expires on its own
    pub deadline: Duration,
    /// Resolve the window through this handle
    pub handle: WindowHandle,
}

/// Surface for the interactive undo/report prompt shown after a skip
///
/// The prompt resolves the window with [`WindowHandle::undo`] or
/// [`WindowHandle::report`]; expiry is handled by the window itself.
pub trait DecisionPrompt: Send + Sync {
    fn show(&self, request: PromptRequest);
}
