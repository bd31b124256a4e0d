//! Request arrival schedule
//!
//! The arrival process hands out prompts in input order. With an infinite
//! rate every prompt is available immediately (open-loop burst). With a
//! finite rate λ the gap between consecutive hand-outs is drawn from
//! Exp(λ), which makes the launch times a Poisson process. The gap is
//! served between yields: the first prompt is never delayed.

use crate::config::{ConfigError, RequestRate};
use crate::request::ScheduledRequest;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use std::time::Duration;

/// Inter-arrival delay generator
#[derive(Debug, Clone)]
pub struct ArrivalDelays {
    distribution: Option<Exp<f64>>,
    rng: StdRng,
}

impl ArrivalDelays {
    /// Create a generator for `rate`, optionally seeded
    pub fn new(rate: RequestRate, seed: Option<u64>) -> Result<Self, ConfigError> {
        rate.validate()?;
        let distribution = match rate {
            RequestRate::Infinite => None,
            RequestRate::PerSecond(rps) => Some(
                Exp::new(rps)
                    .map_err(|e| ConfigError::InvalidRate(format!("{rps}: {e}")))?,
            ),
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { distribution, rng })
    }

    /// Sample the next gap
    ///
    /// Gaps too long for a `Duration` saturate at `Duration::MAX`.
    pub fn next_delay(&mut self) -> Duration {
        match &self.distribution {
            None => Duration::ZERO,
            Some(exp) => Duration::try_from_secs_f64(exp.sample(&mut self.rng))
                .unwrap_or(Duration::MAX),
        }
    }
}

/// Lazy, single-pass schedule of `(id, prompt)` pairs
#[derive(Debug)]
pub struct ArrivalProcess {
    prompts: std::vec::IntoIter<String>,
    next_id: u64,
    total: usize,
    delays: ArrivalDelays,
}

impl ArrivalProcess {
    /// Schedule `prompts` at `rate`
    ///
    /// Fails with a configuration error for a zero, negative or NaN rate.
    pub fn new(
        prompts: Vec<String>,
        rate: RequestRate,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let total = prompts.len();
        Ok(Self {
            prompts: prompts.into_iter(),
            next_id: 0,
            total,
            delays: ArrivalDelays::new(rate, seed)?,
        })
    }

    /// Number of prompts in the schedule
    pub fn len(&self) -> usize {
        self.total
    }

    /// Whether the schedule holds no prompts
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of prompts already handed out
    pub fn yielded(&self) -> u64 {
        self.next_id
    }

    /// Wait out the arrival gap and hand out the next prompt
    ///
    /// Returns `None` once the input is exhausted; no gap is served after
    /// the last prompt.
    pub async fn next_request(&mut self) -> Option<ScheduledRequest> {
        if self.next_id as usize >= self.total {
            return None;
        }
        if self.next_id > 0 {
            let delay = self.delays.next_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        let prompt = self.prompts.next()?;
        let request = ScheduledRequest::new(self.next_id, prompt);
        self.next_id += 1;
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestId;
    use tokio::time::Instant;

    fn prompts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("prompt {i}")).collect()
    }

    #[test]
    fn test_zero_rate_is_config_error() {
        let result = ArrivalProcess::new(prompts(3), RequestRate::PerSecond(0.0), None);
        assert!(matches!(result, Err(ConfigError::InvalidRate(_))));
    }

    #[test]
    fn test_infinite_rate_has_zero_delay() {
        let mut delays = ArrivalDelays::new(RequestRate::Infinite, None).unwrap();
        for _ in 0..100 {
            assert_eq!(delays.next_delay(), Duration::ZERO);
        }
    }

    #[test]
    fn test_exponential_mean_converges() {
        let rate = 4.0;
        let mut delays = ArrivalDelays::new(RequestRate::PerSecond(rate), Some(42)).unwrap();
        let samples = 20_000;
        let total: f64 = (0..samples)
            .map(|_| delays.next_delay().as_secs_f64())
            .sum();
        let mean = total / samples as f64;

        // standard error of the mean is 0.25 / sqrt(20000) ≈ 0.0018
        assert!((mean - 1.0 / rate).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn test_seeded_delays_are_reproducible() {
        let mut a = ArrivalDelays::new(RequestRate::PerSecond(10.0), Some(9)).unwrap();
        let mut b = ArrivalDelays::new(RequestRate::PerSecond(10.0), Some(9)).unwrap();
        for _ in 0..10 {
            assert_eq!(a.next_delay(), b.next_delay());
        }
    }

    #[test]
    fn test_tiny_rate_saturates_instead_of_panicking() {
        let rate: RequestRate = "1e-30".parse().unwrap();
        assert!(rate.validate().is_ok());

        let mut delays = ArrivalDelays::new(rate, Some(1)).unwrap();
        for _ in 0..10 {
            assert_eq!(delays.next_delay(), Duration::MAX);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_infinite_rate_yields_in_order_without_waiting() {
        let mut arrivals = ArrivalProcess::new(prompts(1000), RequestRate::Infinite, None).unwrap();
        assert_eq!(arrivals.len(), 1000);

        let start = Instant::now();
        let mut ids = Vec::new();
        while let Some(request) = arrivals.next_request().await {
            assert_eq!(request.prompt, format!("prompt {}", request.id.0));
            ids.push(request.id);
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().enumerate().all(|(i, id)| *id == RequestId(i as u64)));
        assert_eq!(arrivals.yielded(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let mut arrivals =
            ArrivalProcess::new(prompts(2), RequestRate::PerSecond(0.001), Some(1)).unwrap();

        let start = Instant::now();
        let first = arrivals.next_request().await.unwrap();
        assert_eq!(first.id, RequestId(0));
        assert_eq!(start.elapsed(), Duration::ZERO);

        // the second hand-out waits for a sampled gap
        let second = arrivals.next_request().await.unwrap();
        assert_eq!(second.id, RequestId(1));
        assert!(start.elapsed() > Duration::ZERO);

        assert!(arrivals.next_request().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finite_rate_schedule_matches_sampled_gaps() {
        let rate = RequestRate::PerSecond(2.0);
        let mut expected = ArrivalDelays::new(rate, Some(5)).unwrap();
        let mut arrivals = ArrivalProcess::new(prompts(5), rate, Some(5)).unwrap();

        let start = Instant::now();
        arrivals.next_request().await.unwrap();
        let mut total = Duration::ZERO;
        while arrivals.next_request().await.is_some() {
            total += expected.next_delay();
        }

        // the timer wheel rounds each sleep up to the next millisecond
        let elapsed = start.elapsed();
        assert!(elapsed >= total, "elapsed {elapsed:?} vs {total:?}");
        assert!(
            elapsed - total < Duration::from_millis(10),
            "elapsed {elapsed:?} vs {total:?}"
        );
    }

    #[tokio::test]
    async fn test_empty_schedule() {
        let mut arrivals = ArrivalProcess::new(Vec::new(), RequestRate::Infinite, None).unwrap();
        assert!(arrivals.is_empty());
        assert!(arrivals.next_request().await.is_none());
    }
}
