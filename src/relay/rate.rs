//! Windowed frame rate counter

use std::time::{Duration, Instant};

/// Counts frames and publishes a frames-per-second value once per window.
///
/// Time is passed in by the caller rather than read internally, so a fixed
/// tick interval produces a deterministic rate. One counter belongs to one
/// thread; producer and consumer sides each own their own.
#[derive(Debug)]
pub struct RateCounter {
    window: Duration,
    window_start: Instant,
    frames: u32,
    current: f64,
}

impl RateCounter {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            frames: 0,
            current: 0.0,
        }
    }

    /// Count one frame. Returns the new rate when a full window has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        self.current = f64::from(self.frames) / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(self.current)
    }

    /// Rate over the last completed window; 0.0 before the first one.
    pub fn fps(&self) -> f64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_the_tick_rate() {
        let start = Instant::now();
        let dt = Duration::from_millis(10);
        let mut rate = RateCounter::new(Duration::from_secs(1), start);

        let mut published = None;
        for i in 1..=150u32 {
            if let Some(fps) = rate.tick(start + dt * i) {
                published = Some(fps);
            }
        }

        let fps = published.expect("a window completed");
        assert!((fps - 100.0).abs() < 1.0, "fps was {fps}");
        assert!((rate.fps() - 100.0).abs() < 1.0);
    }

    #[test]
    fn publishes_once_per_window() {
        let start = Instant::now();
        let dt = Duration::from_millis(100);
        let mut rate = RateCounter::new(Duration::from_secs(1), start);

        let published = (1..=25u32)
            .filter(|&i| rate.tick(start + dt * i).is_some())
            .count();
        assert_eq!(published, 2);
    }

    #[test]
    fn zero_before_the_first_window() {
        let start = Instant::now();
        let mut rate = RateCounter::new(Duration::from_secs(1), start);
        rate.tick(start + Duration::from_millis(10));
        assert_eq!(rate.fps(), 0.0);
    }
}
