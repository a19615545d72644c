//! Frame timing

use std::time::Instant;

/// Largest delta a single frame is allowed to report, in seconds.
///
/// A stall (debugger break, window drag) would otherwise produce one huge
/// step that teleports every moving node.
pub const MAX_DELTA_TIME: f32 = 0.25;

/// High-precision frame timer
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the timer; call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_time = elapsed.min(MAX_DELTA_TIME);
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total accumulated time since creation in seconds
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// FPS of the last frame
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_accumulates() {
        let mut timer = Timer::new();
        assert_eq!(timer.frame_count(), 0);

        timer.tick();
        timer.tick();

        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_time() >= 0.0);
        assert!(timer.total_time() >= timer.delta_time());
    }

    #[test]
    fn delta_is_clamped() {
        let mut timer = Timer::new();
        timer.last_frame = Instant::now() - std::time::Duration::from_secs(5);
        timer.tick();
        assert!(timer.delta_time() <= MAX_DELTA_TIME);
    }
}
