// ============================================
// TIMING UTILITY
// ============================================
// Usage:
//   let result = timed("operation_name", || { /* code */ });
//   let timer = Timer::start("name"); ... let elapsed = timer.stop();
// ============================================

use std::time::{Duration, Instant};
use tracing::info;

/// Measures one operation and logs it when stopped or dropped.
pub struct Timer {
    name: String,
    start: Instant,
    threshold_ms: u128,
    logged: bool,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self::start_with_threshold(name, 0)
    }

    /// Only logs if execution reaches `threshold_ms`.
    pub fn start_with_threshold(name: impl Into<String>, threshold_ms: u128) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            threshold_ms,
            logged: false,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Stop the timer and log the result.
    pub fn stop(mut self) -> Duration {
        let duration = self.start.elapsed();
        self.log_duration(duration);
        duration
    }

    fn log_duration(&mut self, duration: Duration) {
        if self.logged {
            return;
        }
        self.logged = true;

        let ms = duration.as_millis();
        if ms < self.threshold_ms {
            return;
        }
        info!(
            operation = %self.name,
            elapsed_ms = ms as u64,
            speed = speed_label(ms),
            "timed"
        );
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.log_duration(duration);
    }
}

fn speed_label(ms: u128) -> &'static str {
    match ms {
        0..=100 => "very fast",
        101..=500 => "fast",
        501..=1000 => "acceptable",
        1001..=5000 => "slow",
        _ => "very slow",
    }
}

/// Time a synchronous closure.
pub fn timed<F, R>(name: impl Into<String>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let timer = Timer::start(name);
    let result = f();
    timer.stop();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_closure_value() {
        assert_eq!(timed("sum", || (1..=4).sum::<i32>()), 10);
    }

    #[test]
    fn test_speed_labels() {
        assert_eq!(speed_label(5), "very fast");
        assert_eq!(speed_label(700), "acceptable");
        assert_eq!(speed_label(9000), "very slow");
    }

    #[test]
    fn test_stop_reports_elapsed() {
        let timer = Timer::start_with_threshold("noop", u128::MAX);
        assert!(timer.stop() < Duration::from_secs(5));
    }
}
