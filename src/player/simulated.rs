use crate::player::{PlaybackConfig, PlaybackState, Player};
use crate::scheduler::{SessionEvent, SessionSender};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::debug;

/// Wall-clock driven player used by the command line runner
///
/// Every seek is echoed back to the session as a `Seeked` event, the way a
/// real player would announce it.
pub struct SimulatedPlayer {
    clock: Mutex<PlayerClock>,
    events: SessionSender,
}

struct PlayerClock {
    config: PlaybackConfig,
    state: PlaybackState,
    /// Position at the last anchor point
    position: f64,
    /// When playback last (re)started from `position`
    anchor: Option<Instant>,
}

impl PlayerClock {
    fn position_now(&self) -> f64 {
        match (self.state, self.anchor) {
            (PlaybackState::Playing, Some(anchor)) => {
                let elapsed = anchor.elapsed().as_secs_f64() * self.config.speed;
                (self.position + elapsed).min(self.config.duration)
            }
            _ => self.position,
        }
    }

    /// Fold elapsed time into `position` and restart the anchor
    fn settle(&mut self) {
        self.position = self.position_now();
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
    }
}

impl SimulatedPlayer {
    pub fn new(duration: f64, events: SessionSender) -> Self {
        Self {
            clock: Mutex::new(PlayerClock {
                config: PlaybackConfig {
                    speed: 1.0,
                    duration: duration.max(0.0),
                },
                state: PlaybackState::Stopped,
                position: 0.0,
                anchor: None,
            }),
            events,
        }
    }

    fn clock(&self) -> MutexGuard<'_, PlayerClock> {
        self.clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get current playback state
    pub fn state(&self) -> PlaybackState {
        self.clock().state
    }

    /// Set playback speed
    pub fn set_speed(&self, speed: f64) {
        let mut clock = self.clock();
        clock.settle();
        clock.config.speed = speed.clamp(0.1, 10.0);
    }

    /// Get current playback speed
    pub fn speed(&self) -> f64 {
        self.clock().config.speed
    }

    /// Start/resume playback
    pub fn play(&self) {
        let mut clock = self.clock();
        if clock.position >= clock.config.duration {
            return; // At end
        }
        clock.state = PlaybackState::Playing;
        clock.anchor = Some(Instant::now());
    }

    /// Stop playback and reset
    pub fn stop(&self) {
        let mut clock = self.clock();
        clock.state = PlaybackState::Stopped;
        clock.position = 0.0;
        clock.anchor = None;
    }

    /// Update playback state (call each tick), returns the current position
    pub fn update(&self) -> f64 {
        let mut clock = self.clock();
        clock.settle();

        // Check if we've reached the end
        if clock.state == PlaybackState::Playing && clock.position >= clock.config.duration {
            clock.state = PlaybackState::Stopped;
            clock.anchor = None;
        }
        clock.position
    }
}

impl Player for SimulatedPlayer {
    fn current_position(&self) -> f64 {
        self.clock().position_now()
    }

    fn seek(&self, to: f64) {
        let position = {
            let mut clock = self.clock();
            clock.position = to.clamp(0.0, clock.config.duration);
            if clock.anchor.is_some() {
                clock.anchor = Some(Instant::now());
            }
            clock.position
        };

        debug!("seeked to {:.2}s", position);
        let _ = self.events.send(SessionEvent::Seeked { position });
    }
}
