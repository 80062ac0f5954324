//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Hard ceiling for any retry delay.
pub const MAX_DELAY_MS: u64 = 30_000;

/// Delay before retry number `attempt + 1`, without jitter.
///
/// `attempt` is zero-based: the delay after the first failure uses `attempt = 0`
/// and equals `base_ms`.
pub fn exponential_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(max_ms)
}

/// Calculate exponential backoff delay with jitter.
///
/// The jitter is drawn uniformly from `0..=jitter_ms` and added before the cap
/// is applied, so the result never exceeds `max_ms`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, jitter_ms: u64) -> Duration {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor);

    let jitter = if jitter_ms > 0 {
        rand::thread_rng().gen_range(0..=jitter_ms)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter).min(max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delay_without_jitter() {
        assert_eq!(exponential_delay_ms(0, 1000, MAX_DELAY_MS), 1000);
        assert_eq!(exponential_delay_ms(1, 1000, MAX_DELAY_MS), 2000);
        assert_eq!(exponential_delay_ms(3, 1000, MAX_DELAY_MS), 8000);
        assert_eq!(exponential_delay_ms(5, 1000, MAX_DELAY_MS), MAX_DELAY_MS);
        assert_eq!(exponential_delay_ms(200, 1000, MAX_DELAY_MS), MAX_DELAY_MS);
    }

    #[test]
    fn test_backoff_calculation() {
        for attempt in 0..4 {
            let expected = exponential_delay_ms(attempt, 100, MAX_DELAY_MS) as u128;
            let delay = calculate_backoff(attempt, 100, MAX_DELAY_MS, 1000).as_millis();
            assert!(delay >= expected);
            assert!(delay <= expected + 1000);
        }
    }

    #[test]
    fn test_backoff_is_capped_including_jitter() {
        for _ in 0..50 {
            let delay = calculate_backoff(20, 1000, MAX_DELAY_MS, 1000);
            assert_eq!(delay.as_millis(), MAX_DELAY_MS as u128);
        }
    }

    #[test]
    fn test_zero_jitter_is_deterministic() {
        assert_eq!(calculate_backoff(2, 250, MAX_DELAY_MS, 0), Duration::from_millis(1000));
    }
}
