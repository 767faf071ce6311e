//! Frame timing statistics for the run loop

use std::time::Duration;

use emubridge_shared::GameStats;

/// Weight of the newest sample in the smoothed timings.
const SMOOTHING: f64 = 0.1;

/// Counters and smoothed timings for the current run loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub frames_submitted: u64,
    pub frames_presented: u64,
    pub recoverable_errors: u64,
    /// Smoothed wall time per frame, in seconds
    frame_time: f64,
    /// Smoothed time spent in frame submission, in seconds
    submit_time: f64,
}

impl RenderStats {
    /// Record one completed frame.
    pub(crate) fn record_frame(&mut self, frame: Duration, submit: Duration, presented: bool) {
        let frame = frame.as_secs_f64();
        let submit = submit.as_secs_f64();

        if self.frames_submitted == 0 {
            self.frame_time = frame;
            self.submit_time = submit;
        } else {
            self.frame_time += (frame - self.frame_time) * SMOOTHING;
            self.submit_time += (submit - self.submit_time) * SMOOTHING;
        }

        self.frames_submitted += 1;
        if presented {
            self.frames_presented += 1;
        }
    }

    pub(crate) fn record_recoverable_error(&mut self) {
        self.recoverable_errors += 1;
    }

    /// Smoothed frame time
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(self.frame_time)
    }

    /// Frames per second derived from the smoothed frame time
    pub fn game_fps(&self) -> f64 {
        if self.frame_time > 0.0 {
            1.0 / self.frame_time
        } else {
            0.0
        }
    }

    /// Percentage of each frame spent inside the core's submission
    pub fn fifo_percent(&self) -> f64 {
        if self.frame_time > 0.0 {
            (self.submit_time / self.frame_time * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}

impl From<RenderStats> for GameStats {
    fn from(stats: RenderStats) -> Self {
        Self {
            fifo: stats.fifo_percent(),
            game_fps: stats.game_fps(),
            game_time: stats.frame_time * 1000.0,
        }
    }
}
