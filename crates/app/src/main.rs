//! apicheck - Contract check runner entry point
//!
//! Loads settings and a suite, runs every check against the configured API
//! and prints the summary on stdout. Logs go to stderr.
//!
//! Exit status: 0 when every check passed, 1 when any check failed, 2 when
//! settings or the suite could not be loaded.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use apicheck_application::{ExecuteCheck, RunSuite, validate_suite};
use apicheck_domain::{CheckSuite, RunnerSettings};
use apicheck_infrastructure::{
    JsonAssertionEvaluator, ReportFormat, ReqwestHttpClient, SystemClock, builtin_suite,
    load_settings, load_suite,
};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when a check failed.
const EXIT_CHECK_FAILED: u8 = 1;
/// Exit status when settings or the suite are unusable.
const EXIT_SETUP_FAILED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "apicheck")]
#[command(about = "Run scripted HTTP contract checks against the reqres API")]
#[command(version)]
struct Args {
    /// Settings file (YAML, JSON or TOML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suite file; the built-in reqres suite when omitted.
    #[arg(short, long, value_name = "FILE")]
    suite: Option<PathBuf>,

    /// Override the base URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the per-request timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Maximum number of batches in flight at once.
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Stop evaluating a check's assertions at its first failure.
    /// `--stop-on-failure=false` overrides an enabled setting.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    stop_on_failure: Option<bool>,

    /// Summary format on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the suite's checks without running them.
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

impl Args {
    /// Applies command-line overrides, the highest-precedence settings layer.
    fn apply_overrides(&self, mut settings: RunnerSettings) -> anyhow::Result<RunnerSettings> {
        if let Some(base_url) = &self.base_url {
            settings.base_url.clone_from(base_url);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(stop) = self.stop_on_failure {
            settings.stop_on_failure = stop;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn load(args: &Args) -> anyhow::Result<(RunnerSettings, CheckSuite)> {
    let settings = load_settings(args.config.as_deref()).context("loading settings")?;
    let settings = args.apply_overrides(settings)?;

    let suite = match &args.suite {
        Some(path) => load_suite(path)
            .await
            .with_context(|| format!("loading suite {}", path.display()))?,
        None => builtin_suite().context("loading built-in suite")?,
    };
    validate_suite(&suite)?;
    Ok((settings, suite))
}

fn list_checks(suite: &CheckSuite) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "suite {} ({} checks)", suite.name, suite.len());
    for batch in &suite.batches {
        let _ = writeln!(out, "  batch {}", batch.name);
        for check in &batch.checks {
            let _ = writeln!(
                out,
                "    {}  [{}] {} assertion(s)",
                check.name,
                check.request.label(),
                check.assertions.len()
            );
        }
    }
    out
}

async fn run(
    settings: &RunnerSettings,
    suite: &CheckSuite,
    format: ReportFormat,
) -> anyhow::Result<bool> {
    let client = Arc::new(ReqwestHttpClient::from_settings(settings)?);
    let execute = ExecuteCheck::new(client, Arc::new(JsonAssertionEvaluator::new()))
        .with_stop_on_failure(settings.stop_on_failure);
    let runner = RunSuite::new(execute, Arc::new(SystemClock::new()))
        .with_concurrency(settings.concurrency);

    info!(base_url = %settings.base_url, "apicheck v{}", env!("CARGO_PKG_VERSION"));
    let summary = runner.run(suite).await;
    print!("{}", format.render(&summary)?);
    Ok(summary.all_passed())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let (settings, suite) = match load(&args).await {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    if args.list {
        print!("{}", list_checks(&suite));
        return ExitCode::SUCCESS;
    }

    match run(&settings, &suite, args.format.into()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_CHECK_FAILED),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_SETUP_FAILED)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["apicheck"]).unwrap();
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.suite.is_none());
        assert!(!args.list);
    }

    #[test]
    fn test_overrides_win() {
        let args = Args::try_parse_from([
            "apicheck",
            "--base-url",
            "http://localhost:8080/api",
            "--concurrency",
            "3",
            "--timeout-ms",
            "1500",
            "--stop-on-failure",
            "--format",
            "json",
        ])
        .unwrap();

        let settings = args.apply_overrides(RunnerSettings::default()).unwrap();
        assert_eq!(settings.base_url, "http://localhost:8080/api");
        assert_eq!(settings.concurrency, 3);
        assert_eq!(settings.timeout_ms, 1500);
        assert!(settings.stop_on_failure);
        assert_eq!(ReportFormat::from(args.format), ReportFormat::Json);
    }

    #[test]
    fn test_stop_on_failure_can_be_switched_off() {
        let enabled = RunnerSettings {
            stop_on_failure: true,
            ..RunnerSettings::default()
        };

        let args = Args::try_parse_from(["apicheck", "--stop-on-failure=false"]).unwrap();
        assert!(!args.apply_overrides(enabled.clone()).unwrap().stop_on_failure);

        let args = Args::try_parse_from(["apicheck"]).unwrap();
        assert!(args.apply_overrides(enabled).unwrap().stop_on_failure);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::try_parse_from(["apicheck", "--concurrency", "0"]).unwrap();
        assert!(args.apply_overrides(RunnerSettings::default()).is_err());
    }

    #[test]
    fn test_list_shows_batches() {
        let listing = list_checks(&builtin_suite().unwrap());
        assert!(listing.starts_with("suite reqres (15 checks)\n"));
        assert!(listing.contains("  batch user mutations\n"));
        assert!(listing.contains("    delete user  [DELETE /users/2] 2 assertion(s)\n"));
    }
}
