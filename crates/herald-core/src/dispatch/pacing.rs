//! Randomized delays: inter-task pacing and retry backoff.

use std::time::Duration;

use rand::Rng;

/// A delay drawn uniformly from `[base, base + variance)`, millisecond grain.
///
/// The messaging transport rate-limits (and may flag as spam) perfectly
/// regular bursts, so every send is preceded by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    pub base: Duration,
    pub variance: Duration,
}

impl Jitter {
    pub const fn new(base: Duration, variance: Duration) -> Self {
        Self { base, variance }
    }

    /// 10s + [0, 3s) between two sends.
    pub const fn inter_task_default() -> Self {
        Self::new(Duration::from_millis(10_000), Duration::from_millis(3_000))
    }

    /// 2s + [0, 1s) before retrying a failed send.
    pub const fn retry_backoff_default() -> Self {
        Self::new(Duration::from_millis(2_000), Duration::from_millis(1_000))
    }

    /// No delay at all.
    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let spread_ms = u64::try_from(self.variance.as_millis()).unwrap_or(u64::MAX);
        if spread_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rng.gen_range(0..spread_ms))
    }

    /// Largest value `sample` can return.
    pub fn upper_bound(&self) -> Duration {
        self.base + self.variance
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::inter_task_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    #[case::pacing(Jitter::inter_task_default())]
    #[case::backoff(Jitter::retry_backoff_default())]
    #[case::tiny(Jitter::new(Duration::from_millis(5), Duration::from_millis(1)))]
    fn samples_stay_in_half_open_range(#[case] jitter: Jitter) {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let d = jitter.sample_with(&mut rng);
            assert!(d >= jitter.base, "{d:?} below base");
            assert!(d < jitter.upper_bound(), "{d:?} not below upper bound");
        }
    }

    #[test]
    fn zero_variance_is_exactly_base() {
        let jitter = Jitter::new(Duration::from_millis(250), Duration::ZERO);
        assert_eq!(jitter.sample(), Duration::from_millis(250));
        assert_eq!(Jitter::none().sample(), Duration::ZERO);
    }

    #[test]
    fn samples_actually_vary() {
        let jitter = Jitter::inter_task_default();
        let mut rng = StdRng::seed_from_u64(1);
        let first = jitter.sample_with(&mut rng);
        let differs = (0..50).any(|_| jitter.sample_with(&mut rng) != first);
        assert!(differs);
    }
}
