use std::thread;
use std::time::{Duration, Instant};

/// Monotonic elapsed-time source for the simulation log timestamps.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Timer {
        Timer {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.start.elapsed().as_secs_f32() * 1000.0
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Timed wait for one instruction's duration. A scheduler-yielding
/// sleep rather than the reference's busy-wait; elapsed-time accounting
/// stays accurate to millisecond granularity either way.
pub fn wait_ms(duration_ms: f32) {
    if duration_ms > 0.0 {
        thread::sleep(Duration::from_secs_f32(duration_ms / 1000.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_is_monotonic() {
        let timer = Timer::start();
        let first = timer.elapsed_ms();
        let second = timer.elapsed_ms();
        assert!(second >= first);
    }

    #[test]
    fn test_wait_ms_waits_at_least_duration() {
        let timer = Timer::start();
        wait_ms(5.0);
        assert!(timer.elapsed_ms() >= 5.0);
    }

    #[test]
    fn test_wait_ms_zero_returns_immediately() {
        wait_ms(0.0);
    }
}
