//! factcheck: verify a claim from the command line.
//!
//! # Subcommands
//! - `check <CLAIM>...`: run the pipeline and print the report
//! - `validate <REPORT>`: check a saved JSON report against the schema
//!
//! Keys come from the environment (`GROQ_API_KEY`, optional `SEARCH_API_KEY`);
//! a `.env` file in the working directory is loaded first.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

use factcheck_core::{FactCheckReport, ReportStatus};
use factcheck_runtime::{ClaimVerifier, RuntimeConfig};

mod render;

#[derive(Debug, Parser)]
#[command(name = "factcheck", version, about = "Verify factual claims against web evidence")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fact-check a claim
    Check {
        /// Claim to verify; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        claim: Vec<String>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a saved JSON report
    Validate {
        /// Report file
        report: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean report.
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    match cli.command {
        Commands::Check {
            claim,
            config,
            format,
            output,
        } => {
            let status = check(&claim.join(" "), config, format, output).await?;
            if status == ReportStatus::Error {
                std::process::exit(1);
            }
        }
        Commands::Validate { report } => validate(&report)?,
    }

    Ok(())
}

async fn check(
    claim: &str,
    config: Option<PathBuf>,
    format: Format,
    output: Option<PathBuf>,
) -> Result<ReportStatus> {
    let config = match &config {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    let verifier = ClaimVerifier::from_config(config).context("Failed to build verifier")?;
    let report = verifier.verify(claim).await;

    let rendered = match format {
        Format::Text => render::render_text(&report),
        Format::Json => report.to_json_pretty()? + "\n",
        Format::Yaml => serde_yaml::to_string(&report)?,
    };

    match &output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => print!("{rendered}"),
    }

    let usage = verifier.usage();
    tracing::info!(
        llm_calls = usage.total.llm_calls,
        total_tokens = usage.total.total_tokens,
        "Model usage"
    );

    Ok(report.status())
}

fn validate(path: &Path) -> Result<()> {
    let report = FactCheckReport::from_json_file(path)
        .with_context(|| format!("{} is not a valid report", path.display()))?;

    let status = match report.status() {
        ReportStatus::Success => "success",
        ReportStatus::Error => "error",
    };
    println!("✓ {} is a valid {status} report", path.display());
    Ok(())
}
