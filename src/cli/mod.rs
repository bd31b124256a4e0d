//! CLI argument parsing and run wiring

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use servebench_core::{
    DispatchMode, DispatcherBuilder, PromptSource, RequestId, RequestRate, RetryPolicy, RunConfig,
    SamplingParams,
};
use servebench_report::{print_summary, CsvOutputSink, RunReport};
use servebench_samplers::{adjust_prompt_count, CsvPromptSource, PromptTemplate};
use servebench_vendors::{Backend, EndpointConfig, HttpExecutor};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Dispatch discipline as named on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Launch requests on schedule without waiting for earlier ones
    Async,
    /// One request at a time
    Sync,
}

impl From<Mode> for DispatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Async => DispatchMode::Concurrent,
            Mode::Sync => DispatchMode::Sequential,
        }
    }
}

/// servebench - throughput and latency benchmark for text-generation servers
#[derive(Parser, Debug)]
#[command(name = "servebench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, default_value_t = 8888)]
    pub port: u16,

    /// Serving backend (ksana, trt-llm, vllm, evart, ksana-server, vllm-server)
    #[arg(short, long, default_value = "ksana")]
    pub backend: Backend,

    /// CSV file holding one prompt per row
    #[arg(short, long, default_value = "benchmark_input.csv")]
    pub input_csv: PathBuf,

    /// Treat the first CSV row as a prompt instead of a header
    #[arg(long)]
    pub keep_header: bool,

    /// CSV column holding the prompt
    #[arg(long, default_value_t = 0)]
    pub column: usize,

    /// Write generated texts here, one row per prompt
    #[arg(short, long)]
    pub output_csv: Option<PathBuf>,

    /// Write the run summary here as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Requests per second. "inf" sends everything at time 0, otherwise
    /// arrivals follow a Poisson process
    #[arg(short, long, default_value = "inf")]
    pub request_rate: RequestRate,

    /// Dispatch mode
    #[arg(short, long, value_enum, default_value_t = Mode::Async)]
    pub mode: Mode,

    /// Number of prompts to send (0 keeps the file as is)
    #[arg(long, default_value_t = 0)]
    pub prompt_num: usize,

    /// Prompt template of the served model
    #[arg(long, default_value = "llama")]
    pub model_type: PromptTemplate,

    /// Cap on generated tokens per request
    #[arg(long, default_value_t = 1024)]
    pub max_new_tokens: u32,

    /// Retries of a request whose response reports an error
    #[arg(long, default_value_t = 8)]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub retry_backoff_ms: u64,

    /// Upper bound on any retry delay, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    pub max_retry_backoff_ms: u64,

    /// Cap on simultaneously executing requests (async mode)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Seed for the arrival schedule
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Dispatcher configuration from the arguments
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            mode: self.mode.into(),
            request_rate: self.request_rate,
            max_in_flight: self.max_in_flight,
            seed: self.seed,
        }
    }

    /// Retry policy from the arguments
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_initial_backoff(Duration::from_millis(self.retry_backoff_ms))
            .with_max_backoff(Duration::from_millis(self.max_retry_backoff_ms))
    }

    /// Sampling parameters sent with every request
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams::with_max_new_tokens(self.max_new_tokens)
    }

    /// Endpoint configuration from the arguments
    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(self.backend)
            .with_host(&self.host)
            .with_port(self.port)
    }

    /// Run the benchmark based on CLI arguments
    pub async fn run(&self) -> Result<()> {
        let run_config = self.run_config();
        run_config
            .validate()
            .context("Invalid run configuration")?;

        // 1. Load and shape prompts
        let source = CsvPromptSource::new(&self.input_csv)
            .with_column(self.column)
            .with_header(!self.keep_header);
        let prompts = source
            .load()
            .with_context(|| format!("Failed to load prompts from: {}", self.input_csv.display()))?;
        let prompts = adjust_prompt_count(prompts, self.prompt_num)
            .with_context(|| format!("Invalid --prompt-num {}", self.prompt_num))?;
        let prompts = self.model_type.apply_all(prompts);

        // 2. Create executor
        let endpoint = self.endpoint();
        let url = endpoint.url(self.backend.adapter().path());
        let executor = HttpExecutor::new(endpoint, self.retry_policy())
            .context("Failed to create HTTP executor")?
            .with_sampling(self.sampling());

        tracing::info!(
            backend = %self.backend,
            url = %url,
            prompts = prompts.len(),
            mode = %run_config.mode,
            request_rate = %run_config.request_rate,
            template = %self.model_type,
            "Starting benchmark"
        );

        // 3. Dispatch
        let mut builder = DispatcherBuilder::new()
            .config(run_config.clone())
            .executor(Arc::new(executor));
        let progress = if self.no_progress {
            None
        } else {
            let (tx, rx) = mpsc::unbounded_channel();
            builder = builder.progress(tx);
            Some(spawn_progress(rx, prompts.len()))
        };

        let outcome = {
            let dispatcher = builder.build()?;
            dispatcher.run(prompts).await
        };

        // the dispatcher and every task holding a sender are gone by now
        if let Some(handle) = progress {
            handle.await.context("Progress task failed")?;
        }

        let outcome = outcome.context("Benchmark run failed")?;
        let summary = outcome.summary();

        // 4. Report
        print_summary(&summary, &outcome.stats);

        if let Some(path) = &self.output_csv {
            CsvOutputSink::new(path)
                .export(&outcome.records)
                .with_context(|| format!("Failed to export outputs to: {}", path.display()))?;
            println!("Outputs written to: {}", path.display());
        }

        if let Some(path) = &self.summary_json {
            RunReport::new(self.backend.id(), url, run_config, &outcome.stats, summary)
                .export(path)
                .with_context(|| format!("Failed to export summary to: {}", path.display()))?;
            println!("Summary written to: {}", path.display());
        }

        Ok(())
    }
}

/// Render completed request ids as a progress bar until the channel closes
fn spawn_progress(mut rx: mpsc::UnboundedReceiver<RequestId>, total: usize) -> JoinHandle<()> {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);

    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            pb.inc(1);
        }
        if pb.position() == total as u64 {
            pb.finish();
        } else {
            pb.abandon();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["servebench"]).unwrap();

        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.port, 8888);
        assert_eq!(cli.backend, Backend::Ksana);
        assert_eq!(cli.request_rate, RequestRate::Infinite);
        assert_eq!(cli.mode, Mode::Async);
        assert_eq!(cli.prompt_num, 0);
        assert_eq!(cli.model_type, PromptTemplate::Llama);
        assert!(cli.output_csv.is_none());

        let config = cli.run_config();
        assert_eq!(config.mode, DispatchMode::Concurrent);
        assert!(config.max_in_flight.is_none());

        assert_eq!(cli.retry_policy(), RetryPolicy::default());
        assert_eq!(cli.sampling(), SamplingParams::greedy());
    }

    #[test]
    fn test_full_argument_set() {
        let cli = Cli::try_parse_from([
            "servebench",
            "--host",
            "10.0.0.2",
            "--port",
            "9000",
            "--backend",
            "trt-llm",
            "--request-rate",
            "2.5",
            "--mode",
            "sync",
            "--prompt-num",
            "64",
            "--model-type",
            "qwen",
            "--max-retries",
            "3",
            "--retry-backoff-ms",
            "100",
            "--max-in-flight",
            "16",
            "--seed",
            "42",
            "--max-new-tokens",
            "256",
            "--output-csv",
            "out.csv",
        ])
        .unwrap();

        assert_eq!(cli.backend, Backend::TrtLlm);
        assert_eq!(cli.request_rate, RequestRate::PerSecond(2.5));
        assert_eq!(cli.model_type, PromptTemplate::Qwen);

        let config = cli.run_config();
        assert_eq!(config.mode, DispatchMode::Sequential);
        assert_eq!(config.max_in_flight, Some(16));
        assert_eq!(config.seed, Some(42));

        let retry = cli.retry_policy();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.initial_backoff, Duration::from_millis(100));

        let sampling = cli.sampling();
        assert_eq!(sampling.max_new_tokens, 256);
        assert_eq!(sampling.top_k, 1);

        assert_eq!(
            cli.endpoint().url("/v2/models/ensemble/generate"),
            "http://10.0.0.2:9000/v2/models/ensemble/generate"
        );
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["servebench", "--backend", "openai"]).is_err());
    }

    #[test]
    fn test_zero_rate_parses_but_fails_validation() {
        let cli = Cli::try_parse_from(["servebench", "--request-rate", "0"]).unwrap();
        assert!(cli.run_config().validate().is_err());
    }

    #[tokio::test]
    async fn test_invalid_prompt_num_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(&input, "prompt\na\nb\nc\n").unwrap();

        let cli = Cli::try_parse_from([
            "servebench",
            "--input-csv",
            input.to_str().unwrap(),
            "--prompt-num",
            "4",
            "--port",
            "1",
        ])
        .unwrap();

        let err = cli.run().await.unwrap_err();
        assert!(format!("{err:#}").contains("--prompt-num 4"));
    }
}
