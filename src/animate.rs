//! Counter animation.
//!
//! A [`Tween`] maps elapsed time to an integer between `start` and `end`
//! along a cubic ease-out curve. [`animate`] drives a tween from a frame
//! clock, emitting one value per tick until the end value has been shown.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// `1 - (1 - t)^3`: fast at first, settling into the target.
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// One sampled value of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub value: i64,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tween {
    pub start: i64,
    pub end: i64,
    pub duration: Duration,
}

impl Tween {
    pub fn new(start: i64, end: i64, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
        }
    }

    /// Normalized progress in `[0, 1]`. A zero duration is already complete.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn frame(&self, elapsed: Duration) -> Frame {
        let progress = self.progress(elapsed);
        if progress >= 1.0 {
            return Frame {
                value: self.end,
                done: true,
            };
        }
        // Subtracting in f64 keeps full-width ranges from overflowing.
        let range = self.end as f64 - self.start as f64;
        let value = (self.start as f64 + range * ease_out_cubic(progress)).round() as i64;
        Frame { value, done: false }
    }

    /// Samples the tween every `step` of elapsed time, starting at zero.
    ///
    /// The sequence is finite and its last value is `end`. A zero step
    /// yields the end value alone.
    pub fn frames(&self, step: Duration) -> Frames {
        Frames {
            tween: *self,
            step,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }
}

/// Iterator returned by [`Tween::frames`].
#[derive(Debug, Clone)]
pub struct Frames {
    tween: Tween,
    step: Duration,
    elapsed: Duration,
    finished: bool,
}

impl Iterator for Frames {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.finished {
            return None;
        }
        if self.step.is_zero() {
            self.finished = true;
            return Some(self.tween.end);
        }

        let frame = self.tween.frame(self.elapsed);
        self.finished = frame.done;
        self.elapsed += self.step;
        Some(frame.value)
    }
}

/// Source of timestamps for an animation.
pub trait FrameClock {
    fn now(&self) -> Instant;
}

/// Reads tokio's clock, which tests can pause and advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl FrameClock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Shortest delay between ticks; `tokio::time::interval` rejects zero.
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct AnimatorConfig {
    /// Delay between ticks (default: 16ms, one 60Hz display refresh).
    pub frame_interval: Duration,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl AnimatorConfig {
    /// Builds a config ticking `fps` times per second. Zero falls back to the
    /// default; rates above 1000 are capped at one tick per millisecond.
    pub fn with_fps(fps: u32) -> Self {
        if fps == 0 {
            return Self::default();
        }
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / fps as f64).max(MIN_FRAME_INTERVAL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The end value was emitted.
    Completed,
    /// The token was cancelled before the end value was reached.
    Cancelled,
}

/// Runs `tween` against `clock`, calling `on_frame` once per tick.
///
/// The first tick fires immediately. Emission stops after the end value or
/// as soon as `cancel` is triggered, whichever comes first.
pub async fn animate<C, F>(
    tween: Tween,
    clock: &C,
    config: &AnimatorConfig,
    cancel: &CancellationToken,
    mut on_frame: F,
) -> Outcome
where
    C: FrameClock + ?Sized,
    F: FnMut(i64),
{
    let started = clock.now();
    let mut ticker = interval(config.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!(
        start = tween.start,
        end = tween.end,
        duration_ms = tween.duration.as_millis() as u64,
        "animation started"
    );

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(ticks, "animation cancelled");
                return Outcome::Cancelled;
            }
            _ = ticker.tick() => {
                let elapsed = clock.now().saturating_duration_since(started);
                let frame = tween.frame(elapsed);
                ticks += 1;
                trace!(value = frame.value, elapsed_ms = elapsed.as_millis() as u64, "frame");
                on_frame(frame.value);
                if frame.done {
                    debug!(ticks, end = tween.end, "animation completed");
                    return Outcome::Completed;
                }
            }
        }
    }
}
