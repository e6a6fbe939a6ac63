//! Converts display-refresh timestamps into simulation time steps.

/// Tracks the timestamp of the previous frame.
///
/// The first frame after construction or [`SimulationClock::reset`] only
/// records its timestamp, so resuming after a pause never produces one huge
/// step covering the paused interval.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationClock {
    previous_ms: Option<f64>,
}

impl SimulationClock {
    /// Creates a clock that has not observed any frame yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { previous_ms: None }
    }

    /// Records a frame timestamp in milliseconds and returns the elapsed
    /// seconds since the previous frame.
    pub fn advance(&mut self, timestamp_ms: f64) -> Option<f32> {
        let previous = self.previous_ms.replace(timestamp_ms)?;
        let elapsed = (timestamp_ms - previous) / 1_000.0;
        (elapsed.is_finite() && elapsed >= 0.0).then_some(elapsed as f32)
    }

    /// Forgets the previous frame.
    pub fn reset(&mut self) {
        self.previous_ms = None;
    }
}
