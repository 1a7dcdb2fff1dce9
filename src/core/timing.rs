use std::time::{Duration, Instant};

/// Per-frame timing handed to the renderer, all values in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTiming {
    /// Timestamp of the previous frame, absent on the first frame of a loop
    pub prev: Option<f64>,
    /// Timestamp of this frame
    pub curr: f64,
    /// `curr - prev`, or 0 on the first frame
    pub delta: f64,
}

impl RenderTiming {
    /// Compute timing from the previous and current frame timestamps
    pub fn between(prev: Option<Duration>, curr: Duration) -> Self {
        let prev = prev.map(|ts| ts.as_secs_f64());
        let curr = curr.as_secs_f64();
        let delta = prev.map_or(0.0, |prev| curr - prev);
        Self { prev, curr, delta }
    }

    pub fn is_first_frame(&self) -> bool {
        self.prev.is_none()
    }
}

/// Monotonic frame clock - stamps frame callbacks relative to its origin
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Time elapsed since the clock was created
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
