mod presenter;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};
use vigil_ai::{
    create_provider, AiConfig, ConfigError, ScreenClassifier, VerdictClassifier, VisionProvider,
};
use vigil_capture::create_capturer;
use vigil_core::config::{DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_PENALTY_SECS};
use vigil_core::{Guard, GuardConfig, PenaltyEnforcer, SessionReport};

use presenter::TakeoverPresenter;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "AI-supervised focus monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a monitoring session (stop with Ctrl-C)
    Run {
        /// Seconds between screen checks
        #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL_SECS)]
        interval: u64,
        /// Penalty duration in seconds
        #[arg(long, default_value_t = DEFAULT_PENALTY_SECS)]
        penalty: u64,
        /// Vision model provider (google, openai)
        #[arg(long, default_value = "google")]
        provider: String,
        /// Override the provider's default model
        #[arg(long)]
        model: Option<String>,
        /// Video played full screen during penalties (requires mpv)
        #[arg(long)]
        penalty_video: Option<PathBuf>,
        /// Print the final report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Capture and classify the screen once, then exit
    Check {
        /// Vision model provider (google, openai)
        #[arg(long, default_value = "google")]
        provider: String,
        /// Override the provider's default model
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            interval,
            penalty,
            provider,
            model,
            penalty_video,
            json,
        } => run_session(interval, penalty, &provider, model, penalty_video, json).await,
        Commands::Check { provider, model } => check_once(&provider, model).await,
    }
}

async fn run_session(
    interval: u64,
    penalty: u64,
    provider: &str,
    model: Option<String>,
    penalty_video: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let classifier = Arc::new(build_classifier(provider, model)?);
    let capturer = create_capturer()?;
    let config = GuardConfig::new(interval, penalty);
    let enforcer = Arc::new(PenaltyEnforcer::new(
        Arc::new(TakeoverPresenter::new(penalty_video)),
        config.penalty_duration,
    ));

    print_banner(&config, classifier.model_name());

    let started = Local::now();
    let mut guard = Guard::new(config, capturer, classifier, enforcer);
    let report = guard.run_with_signals().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, started);
    }
    Ok(())
}

async fn check_once(provider: &str, model: Option<String>) -> Result<()> {
    let classifier = build_classifier(provider, model)?;
    let capturer = create_capturer()?;

    println!("Capturing screen...");
    let image = capturer.capture().await?;
    println!("Asking {}...", classifier.model_name());
    let verdict = classifier.classify(&image).await?;
    println!("Verdict: {verdict}");
    Ok(())
}

/// Resolve provider and credentials. A missing API key is the one fatal
/// startup error, reported with remediation steps.
fn build_classifier(provider: &str, model: Option<String>) -> Result<ScreenClassifier> {
    let provider: VisionProvider = provider.parse()?;
    let config = match AiConfig::from_env(provider, model) {
        Ok(config) => config,
        Err(ConfigError::MissingApiKey { var }) => {
            eprintln!("ERROR: the {var} environment variable is not set.");
            eprintln!();
            eprintln!("    export {var}=\"your-api-key\"");
            eprintln!();
            match provider {
                VisionProvider::Google => {
                    eprintln!("Get a free key at https://aistudio.google.com/apikey");
                }
                VisionProvider::OpenAi => {
                    eprintln!("Create a key at https://platform.openai.com/api-keys");
                }
            }
            bail!("missing API key for {provider:?}");
        }
        Err(e) => return Err(e.into()),
    };
    Ok(ScreenClassifier::new(create_provider(&config)))
}

fn print_banner(config: &GuardConfig, model: &str) {
    println!("VIGIL - focus monitor");
    println!("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}");
    println!("Model:          {model}");
    println!("Check interval: {}s", config.check_interval.as_secs());
    println!("Penalty:        {}s", config.penalty_duration.as_secs());
    println!();
    println!("Press Ctrl-C to stop and print the session report.");
    println!();
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_report(report: &SessionReport, started: DateTime<Local>) {
    let rows = vec![
        ReportRow {
            metric: "Session duration",
            value: format_duration(Local::now() - started),
        },
        ReportRow {
            metric: "Total checks",
            value: report.total_checks.to_string(),
        },
        ReportRow {
            metric: "Productive checks",
            value: report.safe_checks.to_string(),
        },
        ReportRow {
            metric: "Distraction events",
            value: report.distracted_checks.to_string(),
        },
        ReportRow {
            metric: "Focus rate",
            value: format!("{:.1}%", report.focus_rate),
        },
        ReportRow {
            metric: "Time in penalty",
            value: format!("{}s", report.total_penalty_seconds),
        },
        ReportRow {
            metric: "Longest focus streak",
            value: format!("{} checks", report.longest_focus_streak),
        },
        ReportRow {
            metric: "Average focus streak",
            value: format!("{:.1} checks", report.average_focus_streak),
        },
    ];

    println!("\nSession Report");
    println!("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}");
    println!("{}", Table::new(rows));
}

fn format_duration(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_render_with_the_right_units() {
        assert_eq!(format_duration(chrono::Duration::seconds(59)), "0m 59s");
        assert_eq!(format_duration(chrono::Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(chrono::Duration::seconds(3725)), "1h 2m 5s");
    }

    #[test]
    fn negative_elapsed_time_clamps_to_zero() {
        assert_eq!(format_duration(chrono::Duration::seconds(-5)), "0m 0s");
    }
}
