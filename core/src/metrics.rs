//! Statistics over a completed run
//!
//! All means are unweighted arithmetic means over every result record.
//! Throughput figures divide by the wall-clock time of the whole run, not
//! by the sum of request latencies.

use crate::response::ResultRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Aggregate figures for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BenchmarkSummary {
    /// Number of result records
    pub request_count: usize,

    /// Wall-clock duration of the run in seconds
    pub total_duration_secs: f64,

    /// Requests completed per second of wall-clock time
    pub requests_per_second: f64,

    /// Mean request latency in seconds
    pub mean_latency_secs: f64,

    /// Mean prompt length in characters
    pub mean_prompt_chars: f64,

    /// Mean output length in characters
    pub mean_output_chars: f64,

    /// Mean prompt tokens
    pub mean_input_tokens: f64,

    /// Mean generated tokens
    pub mean_output_tokens: f64,

    /// Mean of `latency / (prompt_chars + output_chars)`
    pub mean_latency_per_char_secs: f64,

    /// Mean of `latency / output_chars`
    pub mean_latency_per_output_char_secs: f64,

    /// `(mean_input_tokens + mean_output_tokens) * request_count / duration`
    pub tokens_per_second: f64,

    /// `mean_output_tokens * request_count / duration`
    pub output_tokens_per_second: f64,

    /// Request latency distribution in seconds
    pub latency: LatencyPercentiles,
}

impl BenchmarkSummary {
    /// Reduce `records` over a run that took `elapsed`
    ///
    /// Output lengths below one character count as one.
    pub fn from_records(records: &[ResultRecord], elapsed: Duration) -> Self {
        let request_count = records.len();
        if request_count == 0 {
            return Self {
                total_duration_secs: elapsed.as_secs_f64(),
                ..Self::default()
            };
        }

        let mean_latency_secs = mean(records.iter().map(|r| r.latency_seconds));
        let mean_prompt_chars = mean(records.iter().map(|r| r.prompt_char_len as f64));
        let mean_output_chars = mean(records.iter().map(|r| r.effective_output_chars() as f64));
        let mean_input_tokens = mean(records.iter().map(|r| r.input_token_count as f64));
        let mean_output_tokens = mean(records.iter().map(|r| r.output_token_count as f64));

        let mean_latency_per_char_secs = mean(records.iter().map(|r| {
            r.latency_seconds / (r.prompt_char_len + r.effective_output_chars()) as f64
        }));
        let mean_latency_per_output_char_secs = mean(
            records
                .iter()
                .map(|r| r.latency_seconds / r.effective_output_chars() as f64),
        );

        let duration_secs = elapsed.as_secs_f64();
        let per_second = |total: f64| {
            if duration_secs > 0.0 {
                total / duration_secs
            } else {
                0.0
            }
        };
        let count = request_count as f64;

        Self {
            request_count,
            total_duration_secs: duration_secs,
            requests_per_second: per_second(count),
            mean_latency_secs,
            mean_prompt_chars,
            mean_output_chars,
            mean_input_tokens,
            mean_output_tokens,
            mean_latency_per_char_secs,
            mean_latency_per_output_char_secs,
            tokens_per_second: per_second((mean_input_tokens + mean_output_tokens) * count),
            output_tokens_per_second: per_second(mean_output_tokens * count),
            latency: LatencyPercentiles::from_latencies(
                records.iter().map(|r| r.latency_seconds).collect(),
            ),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Spread of request latency in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LatencyPercentiles {
    /// Fastest request
    pub min: f64,
    /// Median
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
    /// Slowest request
    pub max: f64,
    /// Sample standard deviation
    pub stddev: f64,
}

impl LatencyPercentiles {
    /// Summarize `latencies`; an empty list gives all zeros
    pub fn from_latencies(mut latencies: Vec<f64>) -> Self {
        latencies.sort_by(f64::total_cmp);
        let (Some(&min), Some(&max)) = (latencies.first(), latencies.last()) else {
            return Self::default();
        };

        let at = |q: f64| interpolate(&latencies, q);
        Self {
            min,
            p50: at(0.50),
            p90: at(0.90),
            p95: at(0.95),
            p99: at(0.99),
            max,
            stddev: sample_stddev(&latencies),
        }
    }
}

/// Value at quantile `q` of non-empty `sorted`, interpolated between neighbours
fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let last = sorted.len() - 1;
    let rank = q * last as f64;
    let below = (rank.floor() as usize).min(last);
    let above = (below + 1).min(last);
    let weight = rank - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * weight
}

fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values.iter().copied());
    let squares: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}
