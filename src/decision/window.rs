//! Post-skip decision window
//!
//! A window is opened after every skip and settles exactly once: the user
//! undoes or reports the skip, or the deadline passes. All transitions go
//! through a single compare-and-set on the window state, so a click racing
//! the expiry timer (or a stop) always has one winner and the loser is a
//! no-op.

use crate::core::Segment;
use crate::decision::{Resolution, VoteOrigin, WindowActions, WindowOutcome};
use crate::scheduler::{SessionEvent, SessionSender};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

const OPEN: u8 = 0;
const UNDONE: u8 = 1;
const REPORTED: u8 = 2;
const EXPIRED: u8 = 3;
const CANCELLED: u8 = 4;

impl Resolution {
    fn state_code(self) -> u8 {
        match self {
            Resolution::Undo => UNDONE,
            Resolution::Report => REPORTED,
            Resolution::Expire => EXPIRED,
        }
    }
}

struct WindowInner {
    id: u64,
    segment: Segment,
    state: AtomicU8,
    actions: WindowActions,
    events: SessionSender,
    runtime: Handle,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Task running the winning resolution
    action: Mutex<Option<JoinHandle<()>>>,
    /// Set once the session that opened the window is gone
    abandoned: AtomicBool,
}

impl WindowInner {
    async fn perform(&self, resolution: Resolution) {
        let seg = &self.segment;
        match resolution {
            Resolution::Undo => {
                debug!("unskipping segment {}", seg);
                self.seek_back();
            }
            Resolution::Report => {
                debug!("reporting segment {}", seg);
                self.actions.reporter.vote(seg, false, VoteOrigin::User).await;
                self.seek_back();
            }
            Resolution::Expire => {
                if !self.actions.config.auto_upvote() {
                    return;
                }
                debug!("automatically upvoting {}", seg);
                self.actions.reporter.vote(seg, true, VoteOrigin::Expiry).await;
            }
        }
    }

    fn seek_back(&self) {
        if self.is_abandoned() {
            debug!("window {} abandoned, not seeking back", self.id);
            return;
        }
        self.actions.player.seek(self.segment.start);
    }

    fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }

    fn abort_timer(&self) {
        if let Some(timer) = self.timer.lock().unwrap_or_else(|p| p.into_inner()).take() {
            timer.abort();
        }
    }

    fn abort_action(&self) {
        if let Some(action) = self.action.lock().unwrap_or_else(|p| p.into_inner()).take() {
            action.abort();
        }
    }
}

/// Opens decision windows
pub struct DecisionWindow;

impl DecisionWindow {
    /// Open a window for a skipped segment and start its expiry timer
    ///
    /// Must be called from within a tokio runtime; the returned handle may be
    /// resolved from any thread afterwards.
    pub fn open(
        id: u64,
        segment: Segment,
        duration: Duration,
        actions: WindowActions,
        events: SessionSender,
    ) -> WindowHandle {
        let runtime = Handle::current();
        let handle = WindowHandle {
            inner: Arc::new(WindowInner {
                id,
                segment,
                state: AtomicU8::new(OPEN),
                actions,
                events,
                runtime: runtime.clone(),
                timer: Mutex::new(None),
                action: Mutex::new(None),
                abandoned: AtomicBool::new(false),
            }),
        };

        let expiring = handle.clone();
        let timer = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            expiring.expire();
        });
        *handle.inner.timer.lock().unwrap_or_else(|p| p.into_inner()) = Some(timer);

        handle
    }
}

/// Shared handle to an open decision window
#[derive(Clone)]
pub struct WindowHandle {
    inner: Arc<WindowInner>,
}

impl WindowHandle {
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == OPEN
    }

    pub fn outcome(&self) -> WindowOutcome {
        match self.inner.state.load(Ordering::Acquire) {
            UNDONE => WindowOutcome::Resolved(Resolution::Undo),
            REPORTED => WindowOutcome::Resolved(Resolution::Report),
            EXPIRED => WindowOutcome::Resolved(Resolution::Expire),
            CANCELLED => WindowOutcome::Cancelled,
            _ => WindowOutcome::Open,
        }
    }

    /// Seek back to the segment start
    pub fn undo(&self) -> bool {
        self.resolve(Resolution::Undo)
    }

    /// Downvote the segment and seek back
    pub fn report(&self) -> bool {
        self.resolve(Resolution::Report)
    }

    /// Settle as if the deadline had passed
    pub fn expire(&self) -> bool {
        self.resolve(Resolution::Expire)
    }

    /// Settle the window, returns false if it was already settled
    ///
    /// The winning resolution runs on a background task and then reports
    /// back to the session with `WindowResolved`.
    pub fn resolve(&self, resolution: Resolution) -> bool {
        if self
            .inner
            .state
            .compare_exchange(OPEN, resolution.state_code(), Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("window {} already settled, ignoring {:?}", self.inner.id, resolution);
            return false;
        }

        if resolution != Resolution::Expire {
            self.inner.abort_timer();
        }

        let inner = self.inner.clone();
        let action = self.inner.runtime.spawn(async move {
            inner.perform(resolution).await;
            if !inner.is_abandoned() {
                let _ = inner.events.send(SessionEvent::WindowResolved { window_id: inner.id });
            }
        });
        *self.inner.action.lock().unwrap_or_else(|p| p.into_inner()) = Some(action);

        // abandoned while the task was being spawned
        if self.inner.is_abandoned() {
            self.inner.abort_action();
        }
        true
    }

    /// Abandon the window without running any resolution
    pub fn cancel(&self) -> bool {
        if self
            .inner
            .state
            .compare_exchange(OPEN, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        debug!("window {} cancelled", self.inner.id);
        self.inner.abort_timer();
        true
    }

    /// Drop the window along with its session
    ///
    /// An open window is cancelled. A resolution that is still running (a
    /// report waiting on its vote) is aborted and never seeks or reports back.
    pub fn abandon(&self) {
        self.inner.abandoned.store(true, Ordering::Release);
        if !self.cancel() {
            self.inner.abort_action();
        }
    }
}
