//! Linear backoff schedule.

use std::time::Duration;

/// Delay before retrying after `attempt` failed, or `None` once the schedule is spent.
///
/// Attempts are 1-based: the first retry uses `linear_backoff(1, ..)`.
/// Growth is `step × attempt`, never multiplicative.
pub fn linear_backoff(attempt: u32, step: Duration, max_attempts: u32) -> Option<Duration> {
    if attempt == 0 || attempt > max_attempts {
        return None;
    }

    Some(step.saturating_mul(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(200);

    #[test]
    fn test_backoff_calculation() {
        assert_eq!(linear_backoff(1, STEP, 10), Some(Duration::from_millis(200)));
        assert_eq!(linear_backoff(2, STEP, 10), Some(Duration::from_millis(400)));
        assert_eq!(linear_backoff(3, STEP, 10), Some(Duration::from_millis(600)));
        assert_eq!(linear_backoff(10, STEP, 10), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn test_schedule_ends_after_max_attempts() {
        assert_eq!(linear_backoff(11, STEP, 10), None);
        assert_eq!(linear_backoff(0, STEP, 10), None);
        assert_eq!(linear_backoff(1, STEP, 0), None);
    }

    #[test]
    fn test_large_attempts_saturate() {
        let delay = linear_backoff(u32::MAX, Duration::from_secs(u64::MAX / 2), u32::MAX);
        assert_eq!(delay, Some(Duration::MAX));
    }
}
