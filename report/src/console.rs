//! Console summary

use std::fmt::{self, Write};

use servebench_core::{BenchmarkSummary, DispatchStats};

const RULE_WIDTH: usize = 70;

/// Render the run summary as printed at the end of a run
pub fn render_summary(summary: &BenchmarkSummary, stats: &DispatchStats) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_summary(&mut out, summary, stats);
    out
}

fn write_summary(
    out: &mut impl Write,
    summary: &BenchmarkSummary,
    stats: &DispatchStats,
) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "   Benchmark Results")?;
    writeln!(out, "{rule}")?;
    writeln!(out)?;

    writeln!(out, "Overall:")?;
    writeln!(out, "  Requests:                 {}", summary.request_count)?;
    writeln!(out, "  Launched:                 {}", stats.launched)?;
    writeln!(out, "  Total time:               {:.2} s", summary.total_duration_secs)?;
    writeln!(
        out,
        "  Throughput:               {:.2} requests/s",
        summary.requests_per_second
    )?;
    writeln!(out)?;

    writeln!(out, "Latency:")?;
    writeln!(out, "  Average:                  {:.2} s", summary.mean_latency_secs)?;
    writeln!(out, "  Median (P50):             {:.2} s", summary.latency.p50)?;
    writeln!(out, "  90th Percentile:          {:.2} s", summary.latency.p90)?;
    writeln!(out, "  95th Percentile:          {:.2} s", summary.latency.p95)?;
    writeln!(out, "  99th Percentile:          {:.2} s", summary.latency.p99)?;
    writeln!(
        out,
        "  Min / Max:                {:.2} s / {:.2} s",
        summary.latency.min, summary.latency.max
    )?;
    writeln!(out, "  Std dev:                  {:.2} s", summary.latency.stddev)?;
    writeln!(
        out,
        "  Per char:                 {:.4} s",
        summary.mean_latency_per_char_secs
    )?;
    writeln!(
        out,
        "  Per output char:          {:.4} s",
        summary.mean_latency_per_output_char_secs
    )?;
    writeln!(out)?;

    writeln!(out, "Lengths:")?;
    writeln!(out, "  Average input:            {:.2} chars", summary.mean_prompt_chars)?;
    writeln!(out, "  Average output:           {:.2} chars", summary.mean_output_chars)?;
    writeln!(out, "  Average input:            {:.2} tokens", summary.mean_input_tokens)?;
    writeln!(out, "  Average output:           {:.2} tokens", summary.mean_output_tokens)?;
    writeln!(out)?;

    writeln!(out, "Token throughput:")?;
    writeln!(out, "  Tokens/s:                 {:.2}", summary.tokens_per_second)?;
    writeln!(
        out,
        "  Output tokens/s:          {:.2}",
        summary.output_tokens_per_second
    )?;
    writeln!(out)?;
    writeln!(out, "{rule}")
}

/// Print the run summary to stdout
pub fn print_summary(summary: &BenchmarkSummary, stats: &DispatchStats) {
    println!();
    print!("{}", render_summary(summary, stats));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use servebench_core::LatencyPercentiles;

    #[test]
    fn test_render_contains_figures() {
        let summary = BenchmarkSummary {
            request_count: 12,
            total_duration_secs: 4.0,
            requests_per_second: 3.0,
            mean_latency_secs: 1.25,
            mean_output_tokens: 42.0,
            tokens_per_second: 150.5,
            latency: LatencyPercentiles {
                min: 0.5,
                p95: 2.75,
                max: 3.0,
                ..LatencyPercentiles::default()
            },
            ..BenchmarkSummary::default()
        };
        let mut stats = DispatchStats::new();
        stats.launched = 12;

        let text = render_summary(&summary, &stats);

        assert!(text.contains("Benchmark Results"));
        assert!(text.contains("Requests:                 12"));
        assert!(text.contains("3.00 requests/s"));
        assert!(text.contains("Average:                  1.25 s"));
        assert!(text.contains("42.00 tokens"));
        assert!(text.contains("Tokens/s:                 150.50"));
        assert!(text.contains("95th Percentile:          2.75 s"));
        assert!(text.contains("Min / Max:                0.50 s / 3.00 s"));
    }
}
