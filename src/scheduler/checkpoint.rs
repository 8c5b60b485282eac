use crate::core::{select_next, Segment, SegmentSet};
use crate::decision::{DecisionWindow, WindowActions, WindowHandle};
use crate::notify::PromptRequest;
use crate::scheduler::{Collaborators, SchedulerState, SchedulerTiming, SessionSender};
use tracing::{debug, info};

/// Checkpoint scheduler for one playback session
///
/// Owns the segment set and the armed checkpoint. Every event re-selects the
/// checkpoint from scratch, so arbitrary seeks need no special handling.
/// Must be driven from within a tokio runtime, since skips open decision
/// windows with their own timers.
pub struct CheckpointScheduler {
    segments: Option<SegmentSet>,
    next_segment: Option<Segment>,
    /// Last position established by a start, seek, report or skip
    last_position: f64,
    window: Option<WindowHandle>,
    next_window_id: u64,
    collaborators: Collaborators,
    timing: SchedulerTiming,
    events: SessionSender,
}

impl CheckpointScheduler {
    pub fn new(collaborators: Collaborators, timing: SchedulerTiming, events: SessionSender) -> Self {
        Self {
            segments: None,
            next_segment: None,
            last_position: 0.0,
            window: None,
            next_window_id: 0,
            collaborators,
            timing,
            events,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.segments.is_none() {
            SchedulerState::Idle
        } else if self.window.as_ref().is_some_and(|w| w.is_open()) {
            SchedulerState::SkipPending
        } else {
            SchedulerState::Armed
        }
    }

    /// The segment the scheduler is waiting for
    pub fn next_segment(&self) -> Option<&Segment> {
        self.next_segment.as_ref()
    }

    /// Playback started with a validated segment set
    pub fn on_started(&mut self, segments: SegmentSet) {
        self.on_stopped();
        self.next_segment = select_next(0.0, &segments).cloned();
        info!(
            "scheduling {} segments, first checkpoint {:?}",
            segments.len(),
            self.next_segment.as_ref().map(|s| s.start)
        );
        self.segments = Some(segments);
    }

    /// The player jumped somewhere
    pub fn on_seeked(&mut self, position: f64) {
        self.last_position = position;
        self.select_next_checkpoint(position);
    }

    /// Periodic position report
    ///
    /// The armed segment is reached when the report lands just past its start,
    /// or when playback crossed the start since the previous report by no more
    /// than one report step.
    pub fn on_position_report(&mut self, position: f64) {
        let previous = std::mem::replace(&mut self.last_position, position);
        let timing = self.timing;
        let reached = self.next_segment.as_ref().is_some_and(|seg| {
            position >= seg.start
                && (position - seg.start <= timing.reach_tolerance
                    || (previous < seg.start && position - previous <= timing.report_step))
        });

        if reached {
            self.reached_checkpoint();
        } else {
            if let Some(seg) = self.next_segment.as_ref().filter(|seg| seg.contains(position)) {
                debug!("jumped into {} past its start, not skipping", seg);
            }
            // also covers jumps the player never announced
            self.select_next_checkpoint(position);
        }
    }

    /// Playback stopped or the item changed: drop everything from this session
    pub fn on_stopped(&mut self) {
        if let Some(window) = self.window.take() {
            window.abandon();
        }
        if self.segments.take().is_some() {
            debug!("segments discarded");
        }
        self.next_segment = None;
        self.last_position = 0.0;
    }

    /// A decision window settled; continue from wherever playback is now
    pub fn on_window_resolved(&mut self, window_id: u64) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            debug!("ignoring resolution of superseded window {}", window_id);
            return;
        }
        self.window = None;
        let position = self.collaborators.player.current_position();
        self.last_position = position;
        self.select_next_checkpoint(position);
    }

    fn select_next_checkpoint(&mut self, position: f64) {
        let Some(segments) = &self.segments else {
            return;
        };
        let next = select_next(position, segments).cloned();
        if next != self.next_segment {
            debug!("next checkpoint after {:.2}s: {:?}", position, next.as_ref().map(|s| s.start));
        }
        self.next_segment = next;
    }

    fn reached_checkpoint(&mut self) {
        // the seek event will select the following checkpoint
        let Some(seg) = self.next_segment.take() else {
            return;
        };

        info!("skipping segment {}", seg);
        self.collaborators.player.seek(seg.end);
        self.last_position = seg.end;

        let config = &self.collaborators.config;
        if config.skip_count_tracking() {
            self.collaborators.reporter.dispatch_viewed(seg.clone());
        }

        if !config.show_skipped_dialog() {
            self.select_next_checkpoint(seg.end);
            return;
        }

        if let Some(previous) = self.window.take() {
            previous.cancel();
        }

        self.next_window_id += 1;
        let actions = WindowActions {
            player: self.collaborators.player.clone(),
            reporter: self.collaborators.reporter.clone(),
            config: self.collaborators.config.clone(),
        };
        let handle = DecisionWindow::open(
            self.next_window_id,
            seg.clone(),
            self.timing.window_duration,
            actions,
            self.events.clone(),
        );

        self.collaborators.prompt.show(PromptRequest {
            segment: seg,
            deadline: self.timing.window_duration,
            handle: handle.clone(),
        });
        self.window = Some(handle);
    }
}
