//! Binary entrypoint for the signage player.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use signage_player::config::Configuration;
use signage_player::engine::PlaybackEngine;
use signage_player::tasks::{carousel, playlist, presenter, probe};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "signage-player", about = "Kiosk digital-signage slideshow player")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Override per-image hold duration (ms) for every carousel
    #[arg(long, value_name = "MILLIS")]
    hold_ms: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("signage_player={}", level).parse()?)
        .add_directive("notify=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(ms) = cli.hold_ms {
        for carousel in &mut cfg.carousels {
            carousel.options.hold = Duration::from_millis(ms);
        }
    }
    let cfg = cfg.validated().context("validating configuration")?;
    info!(carousels = cfg.carousels.len(), "configuration loaded");

    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    for carousel_cfg in cfg.carousels.clone() {
        let name = carousel_cfg.name.clone();
        let options = carousel_cfg.options.clone();

        let (sequence_tx, sequence_rx) = mpsc::channel(4);
        let (probe_tx, probe_rx) = mpsc::channel(4);
        let (ready_tx, ready_rx) = mpsc::channel(4);
        let (host_tx, host_rx) = mpsc::channel(8);
        let (frames_tx, frames_rx) = mpsc::channel(8);

        let engine = PlaybackEngine::new(options.clone(), cfg.viewport_height);

        tasks.spawn(playlist::run(carousel_cfg, sequence_tx, cancel.clone()));
        tasks.spawn(probe::run(
            probe_rx,
            ready_tx,
            cancel.clone(),
            options.max_concurrent_probes,
        ));
        tasks.spawn(carousel::run(
            name.clone(),
            engine,
            sequence_rx,
            ready_rx,
            host_rx,
            probe_tx,
            frames_tx,
            cancel.clone(),
        ));
        tasks.spawn(presenter::run(
            name,
            frames_rx,
            host_tx,
            options.video_runtime,
            cancel.clone(),
        ));
    }

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received");
    cancel.cancel();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(%err, "task exited with error"),
            Err(err) => warn!(%err, "task panicked"),
        }
    }
    Ok(())
}
