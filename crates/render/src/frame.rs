use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Statistics over the frames drawn so far.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    /// Total frames drawn since startup.
    pub frames: u64,
    /// Average frame-to-frame interval over the recent window.
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
}

/// Drives the draw cadence: each `tick` performs exactly one draw.
///
/// The tick interval is whatever the platform's redraw scheduling yields;
/// nothing here throttles or skips. Intervals between consecutive ticks are
/// kept for a recent window so the effect of the display rate stays
/// observable.
#[derive(Debug)]
pub struct FrameLoop {
    history: VecDeque<Duration>,
    window: usize,
    frames: u64,
    last_tick: Option<Instant>,
}

impl FrameLoop {
    /// Tracks timing over the last 120 frames.
    pub fn new() -> Self {
        Self::with_window(120)
    }

    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            history: VecDeque::with_capacity(window),
            window,
            frames: 0,
            last_tick: None,
        }
    }

    /// Run one frame. Calls `draw` exactly once and returns its output.
    pub fn tick<T>(&mut self, draw: impl FnOnce() -> T) -> T {
        let now = Instant::now();
        if let Some(last) = self.last_tick.replace(now) {
            self.push_interval(now - last);
        }
        self.frames += 1;
        let out = draw();
        tracing::trace!(frame = self.frames, "frame drawn");
        out
    }

    fn push_interval(&mut self, dt: Duration) {
        if self.history.len() >= self.window {
            self.history.pop_front();
        }
        self.history.push_back(dt);
    }

    /// Total frames drawn since startup.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stats(&self) -> FrameStats {
        let count = self.history.len() as u32;
        if count == 0 {
            return FrameStats {
                frames: self.frames,
                average: Duration::ZERO,
                min: Duration::ZERO,
                max: Duration::ZERO,
            };
        }
        let total: Duration = self.history.iter().sum();
        FrameStats {
            frames: self.frames,
            average: total / count,
            min: self.history.iter().copied().min().unwrap_or(Duration::ZERO),
            max: self.history.iter().copied().max().unwrap_or(Duration::ZERO),
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
