//! Compass Server
//!
//! Command-line entry point and HTTP API around the counseling pipeline.

mod api;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use compass_core::config::CounselorConfig;
use compass_core::orchestrator::{Coordinator, PipelineEvent, PipelineEventKind};
use compass_core::state::{validate_profile, UserProfileInput};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, sync::mpsc};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Clone)]
#[command(author, version, about = "Compass - Multi-stage career counselor")]
struct Args {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Run the pipeline on a profile file and print the result
    Run {
        /// Path to a JSON profile
        profile: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Report)]
        format: OutputFormat,
    },
    /// Start the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// List the pipeline stages
    Stages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full Context as JSON
    Json,
    /// Formatted report text
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = CounselorConfig::load().await?;

    match args.command {
        CliCommand::Run { profile, format } => run_profile(&config, profile, format).await,
        CliCommand::Serve { port } => serve(&config, port).await,
        CliCommand::Stages => {
            let coordinator = Coordinator::new(&config)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&coordinator.stage_descriptors())?
            );
            Ok(())
        }
    }
}

async fn run_profile(
    config: &CounselorConfig,
    path: PathBuf,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read profile: {:?}", path))?;
    let input: UserProfileInput = serde_json::from_str(&content)
        .with_context(|| format!("Malformed profile: {:?}", path))?;

    if let Err(issues) = validate_profile(&input) {
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        anyhow::bail!("Profile has {} invalid field(s)", issues.len());
    }

    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(32);
    let progress = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event.kind {
                PipelineEventKind::StageFellBack => {
                    eprintln!("  {} used its fallback result", event.stage.display_name())
                }
                PipelineEventKind::StageStarted => {
                    eprintln!("  {}...", event.stage.display_name())
                }
                _ => {}
            }
        }
    });

    let coordinator = Coordinator::new(config)?.with_event_channel(event_tx);
    let context = coordinator.process_input(input).await;
    drop(coordinator);
    let _ = progress.await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&context)?),
        OutputFormat::Report => {
            let output = context
                .formatted_output()
                .context("Pipeline returned no formatted output")?;
            println!("{}", output.to_report());
        }
    }
    Ok(())
}

async fn serve(config: &CounselorConfig, port: u16) -> anyhow::Result<()> {
    let state = api::AppState {
        coordinator: Arc::new(Coordinator::new(config)?),
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Compass API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
