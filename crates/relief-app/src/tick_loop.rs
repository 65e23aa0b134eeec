//! Fixed-rate host tick source.
//!
//! Wall-clock time is fed into an accumulator and drained in whole tick
//! steps, so a slow frame produces several ticks back to back instead of
//! stretching the schedule. Frame time is clamped so a long stall cannot
//! queue an unbounded burst.

use std::time::{Duration, Instant};

use tracing::warn;

/// Ticks per second when none is configured.
pub const DEFAULT_TPS: u32 = 20;

/// Longest frame time fed into the accumulator at once.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

/// Drives a tick callback at a fixed rate until it asks to stop.
pub struct TickLoop {
    step: Duration,
    accumulator: Duration,
    tick_count: u64,
}

impl TickLoop {
    /// A loop running `ticks_per_second` ticks; zero is treated as one.
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / ticks_per_second.max(1),
            accumulator: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Duration of one tick.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Feed `frame_time` and run every whole tick it covers.
    ///
    /// `tick_fn` receives the 1-based tick number and returns whether the loop
    /// should keep going. Returns `false` as soon as it does not.
    pub fn advance(
        &mut self,
        frame_time: Duration,
        tick_fn: &mut impl FnMut(u64) -> bool,
    ) -> bool {
        let frame_time = if frame_time > MAX_FRAME_TIME {
            warn!(
                frame_ms = frame_time.as_millis() as u64,
                "frame time exceeds maximum, clamping to {}ms",
                MAX_FRAME_TIME.as_millis()
            );
            MAX_FRAME_TIME
        } else {
            frame_time
        };

        self.accumulator += frame_time;

        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            self.tick_count += 1;
            if !tick_fn(self.tick_count) {
                return false;
            }
        }
        true
    }

    /// Block the calling thread, ticking at the fixed rate until `tick_fn`
    /// returns `false`.
    pub fn run(&mut self, mut tick_fn: impl FnMut(u64) -> bool) {
        let mut previous = Instant::now();
        loop {
            let now = Instant::now();
            let frame_time = now.duration_since(previous);
            previous = now;

            if !self.advance(frame_time, &mut tick_fn) {
                break;
            }
            std::thread::sleep(self.step.saturating_sub(self.accumulator));
        }
    }
}

impl Default for TickLoop {
    fn default() -> Self {
        Self::new(DEFAULT_TPS)
    }
}
