//! Score Animator — ramps a displayed counter from 0 up to an extracted score.
//!
//! `ScoreAnimator` is the pure stepping state machine. `ScoreAnimation` drives one on a
//! tokio interval and publishes frames through a `watch` channel; starting a new ramp on
//! the same instance aborts the previous task first, so two timers never write the same
//! counter.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

pub const DEFAULT_STEP: u32 = 2;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnimationFrameState {
    pub current: u32,
    pub target: u32,
}

impl AnimationFrameState {
    pub fn is_finished(&self) -> bool {
        self.current >= self.target
    }
}

/// Counter that climbs by `step` per call until it reaches `target`, never overshooting.
#[derive(Debug, Clone)]
pub struct ScoreAnimator {
    state: AnimationFrameState,
    step: u32,
}

impl ScoreAnimator {
    /// A zero step is treated as 1 so the ramp always terminates.
    pub fn new(target: u32, step: u32) -> Self {
        Self {
            state: AnimationFrameState { current: 0, target },
            step: step.max(1),
        }
    }

    /// Starts over from 0 toward a new target.
    pub fn restart(&mut self, target: u32) {
        self.state = AnimationFrameState { current: 0, target };
    }

    pub fn state(&self) -> AnimationFrameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Advances one frame and returns the new value, or `None` once the target is reached.
    pub fn step(&mut self) -> Option<u32> {
        if self.is_finished() {
            return None;
        }
        self.state.current = self
            .state
            .current
            .saturating_add(self.step)
            .min(self.state.target);
        Some(self.state.current)
    }
}

impl Iterator for ScoreAnimator {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.step()
    }
}

/// Every frame value a ramp to `target` produces, in order. Empty for a target of 0.
pub fn plan_frames(target: u32, step: u32) -> Vec<u32> {
    ScoreAnimator::new(target, step).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Timed driver
// ────────────────────────────────────────────────────────────────────────────

/// One animated counter. Must be used from within a tokio runtime.
pub struct ScoreAnimation {
    step: u32,
    interval: Duration,
    frames: Arc<watch::Sender<AnimationFrameState>>,
    task: Option<JoinHandle<()>>,
}

impl ScoreAnimation {
    pub fn new(step: u32, interval: Duration) -> Self {
        let (frames, _) = watch::channel(AnimationFrameState::default());
        Self {
            step,
            interval,
            frames: Arc::new(frames),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AnimationFrameState> {
        self.frames.subscribe()
    }

    pub fn current(&self) -> AnimationFrameState {
        *self.frames.borrow()
    }

    /// Cancels any ramp in flight, resets the counter to 0 and starts ramping to `target`.
    pub fn start(&mut self, target: u32) {
        self.cancel();
        self.frames
            .send_replace(AnimationFrameState { current: 0, target });

        let mut animator = ScoreAnimator::new(target, self.step);
        let frames = Arc::clone(&self.frames);
        let period = self.interval;

        debug!("Starting score animation toward {target}");
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; frames start one period after start.
            ticker.tick().await;

            while !animator.is_finished() {
                ticker.tick().await;
                if animator.step().is_some() {
                    frames.send_replace(animator.state());
                }
            }
            debug!("Score animation reached {target}");
        }));
    }

    /// Stops the ramp in flight, leaving the last published frame in place.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Default for ScoreAnimation {
    fn default() -> Self {
        Self::new(DEFAULT_STEP, DEFAULT_INTERVAL)
    }
}

impl Drop for ScoreAnimation {
    fn drop(&mut self) {
        self.cancel();
    }
}
