pub use std::time::Instant;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum Clock {
    Real { start: Instant, last: Instant },
    Fixed { step: Duration },
}

/// Frame clock handing out the scene time in milliseconds. A fixed-step
/// timer advances by the same amount every tick regardless of wall time.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    clock: Clock,
    elapsed: Duration,
    delta: Duration,
    frames: u64,
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self::with_clock(Clock::Real {
            start: now,
            last: now,
        })
    }

    pub fn fixed(step: Duration) -> Self {
        Self::with_clock(Clock::Fixed { step })
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frames: 0,
        }
    }

    /// Advances to the next frame and returns the time since the last one.
    pub fn tick(&mut self) -> Duration {
        match &mut self.clock {
            Clock::Real { start, last } => {
                let now = Instant::now();
                self.delta = now.duration_since(*last);
                self.elapsed = now.duration_since(*start);
                *last = now;
            }
            Clock::Fixed { step } => {
                self.delta = *step;
                self.elapsed += *step;
            }
        }
        self.frames += 1;
        self.delta
    }

    /// Scene time; wraps after roughly 49 days.
    pub fn time_ms(&self) -> u32 {
        self.elapsed.as_millis() as u32
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> f32 {
        let secs = self.delta.as_secs_f32();
        if secs > 0.0 {
            1.0 / secs
        } else {
            0.0
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_timer_steps_evenly() {
        let mut timer = FrameTimer::fixed(Duration::from_millis(16));
        assert_eq!(timer.time_ms(), 0);
        timer.tick();
        timer.tick();
        assert_eq!(timer.time_ms(), 32);
        assert_eq!(timer.frames(), 2);
        assert!((timer.fps() - 62.5).abs() < 1e-3);
    }

    #[test]
    fn real_timer_is_monotonic() {
        let mut timer = FrameTimer::new();
        timer.tick();
        let first = timer.time_ms();
        timer.tick();
        assert!(timer.time_ms() >= first);
    }
}
