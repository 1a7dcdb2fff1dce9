use std::time::Duration;

use super::host::HostEnvironment;
use super::timing::RenderTiming;

/// Render loop lifecycle; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Drives the continuous sequence of frame callbacks for one surface
///
/// Exactly one frame request is outstanding while running. Detaching does not retract that
/// request: the callback still runs once, renders, and then stops the loop instead of
/// requesting another frame.
#[derive(Debug, Default)]
pub struct RenderLoopScheduler {
    state: LoopState,
    frame_pending: bool,
    frames_run: u64,
}

impl RenderLoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Whether a requested frame callback has not arrived yet
    pub fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Number of frame callbacks accepted so far
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Idle -> Running, requesting the first frame; returns false if the loop already started
    pub fn start(&mut self, host: &dyn HostEnvironment) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Running;
        self.request(host);
        true
    }

    /// Accept a frame callback from the host
    ///
    /// Callbacks we never asked for (or that arrive after the loop stopped) are rejected.
    pub fn begin_frame(&mut self) -> bool {
        if self.state != LoopState::Running || !self.frame_pending {
            return false;
        }
        self.frame_pending = false;
        self.frames_run += 1;
        true
    }

    /// Finish the current callback: keep the loop going while active, stop otherwise
    pub fn end_frame(&mut self, is_active: bool, host: &dyn HostEnvironment) {
        if is_active {
            self.request(host);
        } else {
            self.state = LoopState::Stopped;
        }
    }

    fn request(&mut self, host: &dyn HostEnvironment) {
        self.frame_pending = true;
        host.request_frame();
    }
}

/// Compute timing for a frame stamped `ts` and record it in `last`
///
/// A timestamp older than the previous one is clamped so recorded time never runs backwards.
pub fn advance_timestamp(last: &mut Option<Duration>, ts: Duration) -> RenderTiming {
    let curr = match *last {
        Some(prev) if ts < prev => prev,
        _ => ts,
    };
    let timing = RenderTiming::between(*last, curr);
    *last = Some(curr);
    timing
}
