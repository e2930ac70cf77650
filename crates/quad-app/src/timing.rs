use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// FrameLimiter — fixed frame rate pacing
// ---------------------------------------------------------------------------

/// Lets a frame through once `1 / target_fps` has elapsed since the last one.
pub struct FrameLimiter {
    frame_time: Duration,
    last_frame: Instant,
}

impl FrameLimiter {
    /// A non-positive or non-finite `target_fps` disables pacing.
    pub fn new(target_fps: f64, now: Instant) -> Self {
        let frame_time = if target_fps.is_finite() && target_fps > 0.0 {
            Duration::from_secs_f64(1.0 / target_fps)
        } else {
            Duration::ZERO
        };
        Self {
            frame_time,
            last_frame: now,
        }
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_frame) >= self.frame_time
    }

    /// When the next frame becomes due.
    pub fn next_frame_at(&self) -> Instant {
        self.last_frame + self.frame_time
    }

    /// Record a frame starting at `now` and return the time since the last.
    pub fn begin_frame(&mut self, now: Instant) -> Duration {
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        delta
    }
}

// ---------------------------------------------------------------------------
// Simple FPS counter — logs to console once per second
// ---------------------------------------------------------------------------

pub struct FpsCounter {
    frames: u32,
    last_report: Instant,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            last_report: now,
        }
    }

    /// Increment the frame count.  Returns the FPS value if a full second has
    /// elapsed since the last report (so the caller can log it).
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.last_report).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.last_report = now;
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn sixty_fps_frame_time() {
        let limiter = FrameLimiter::new(60.0, Instant::now());
        let expected = Duration::from_secs_f64(1.0 / 60.0);
        assert_eq!(limiter.frame_time(), expected);
    }

    #[test]
    fn frame_not_due_before_frame_time() {
        let t0 = Instant::now();
        let limiter = FrameLimiter::new(50.0, t0);
        assert!(!limiter.is_due(t0 + ms(10)));
        assert!(limiter.is_due(t0 + ms(20)));
        assert!(limiter.is_due(t0 + ms(35)));
    }

    #[test]
    fn begin_frame_resets_the_clock() {
        let t0 = Instant::now();
        let mut limiter = FrameLimiter::new(50.0, t0);
        assert_eq!(limiter.begin_frame(t0 + ms(25)), ms(25));
        assert!(!limiter.is_due(t0 + ms(30)));
        assert_eq!(limiter.next_frame_at(), t0 + ms(45));
    }

    #[test]
    fn zero_fps_never_waits() {
        let t0 = Instant::now();
        let limiter = FrameLimiter::new(0.0, t0);
        assert!(limiter.is_due(t0));
        assert_eq!(limiter.next_frame_at(), t0);
    }

    #[test]
    fn fps_reported_once_per_second() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        for i in 1..30 {
            assert_eq!(fps.tick(t0 + ms(i * 33)), None);
        }
        let report = fps.tick(t0 + ms(1000)).expect("no report after a second");
        assert!((report - 30.0).abs() < 1e-3, "fps {report}");
        assert_eq!(fps.tick(t0 + ms(1010)), None);
    }
}
