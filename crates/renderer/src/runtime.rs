use std::time::{Duration, Instant};

/// Snapshot of the time state supplied to the frame uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed time in seconds since the source was (re)started.
    pub seconds: f32,
    /// Seconds since the previous sample; zero for the first one.
    pub delta: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, delta: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            delta,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    last: Option<Instant>,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            last: None,
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.last = None;
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let now = Instant::now();
        let delta = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        let sample = TimeSample::new(
            now.duration_since(self.origin).as_secs_f32(),
            delta,
            self.frame,
        );
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that advances by a fixed step per frame.
#[derive(Debug, Clone, Copy)]
pub struct SteppedTimeSource {
    step: f32,
    frame: u64,
}

impl SteppedTimeSource {
    pub fn new(step: f32) -> Self {
        Self { step, frame: 0 }
    }
}

impl TimeSource for SteppedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let delta = if self.frame == 0 { 0.0 } else { self.step };
        let sample = TimeSample::new(self.frame as f32 * self.step, delta, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Decides when the event loop should request the next redraw.
///
/// Without a target FPS every wake-up is a frame; with one, frames are spaced
/// at least `1 / fps` apart.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    /// Non-positive or non-finite targets mean uncapped.
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    /// When the next capped frame becomes due, if a cap is active.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None);
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn capped_scheduler_spaces_frames() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let start = Instant::now();
        assert!(scheduler.ready_for_frame(start));
        scheduler.mark_rendered(start);
        assert!(!scheduler.ready_for_frame(start + Duration::from_millis(50)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(100)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(start + Duration::from_secs_f32(0.1))
        );
        scheduler.reset();
        assert!(scheduler.ready_for_frame(start));
    }

    #[test]
    fn zero_fps_means_uncapped() {
        assert_eq!(FrameScheduler::new(Some(0.0)).interval(), None);
        assert_eq!(FrameScheduler::new(Some(f32::INFINITY)).interval(), None);
    }

    #[test]
    fn stepped_source_reports_deltas() {
        let mut source = SteppedTimeSource::new(0.5);
        assert_eq!(source.sample(), TimeSample::new(0.0, 0.0, 0));
        assert_eq!(source.sample(), TimeSample::new(0.5, 0.5, 1));
        source.reset();
        assert_eq!(source.sample().frame_index, 0);
    }
}
