mod api;
mod cli;
mod clients;
mod exporter;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shiftwatch_compute::{BaselineStore, MetricAggregator, Scheduler, SchedulerConfig, ShiftMonitor};
use shiftwatch_core::{BaselineUpdate, Config, ShiftStatus};

use crate::cli::{BaselineAction, Cli, Command};
use crate::exporter::Exporter;

fn load_config() -> Config {
    shiftwatch_core::config::load_dotenv();
    Config::from_env()
}

fn build_monitor(config: &Config) -> anyhow::Result<Arc<ShiftMonitor>> {
    let store = BaselineStore::open(&config.monitor.baseline_path)
        .with_context(|| format!("opening baseline at {}", config.monitor.baseline_path.display()))?;

    Ok(Arc::new(ShiftMonitor::new(
        clients::log_source_from_config(config),
        MetricAggregator::new(clients::scorer_from_config(config)),
        Arc::new(store),
        config.monitor.clone(),
    )))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();

    let monitor = build_monitor(&config)?;
    let scheduler = Arc::new(Scheduler::new(SchedulerConfig::from(&config.monitor), Arc::clone(&monitor)));
    let exporter = Exporter::new().context("registering Prometheus metrics")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(state::AppState {
        config,
        monitor,
        scheduler: Arc::clone(&scheduler),
        exporter,
    });
    let app = router::build_router(state);

    let scheduler_task = Arc::clone(&scheduler).spawn();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler_task.await.context("scheduler task panicked")?;
    info!("shiftwatch exited cleanly");
    Ok(())
}

async fn check(config: &Config, lookback_minutes: Option<u32>) -> anyhow::Result<()> {
    let monitor = build_monitor(config)?;
    let report = monitor
        .check_once(lookback_minutes.unwrap_or(config.monitor.lookback_minutes))
        .await;

    println!("{}", serde_json::to_string_pretty(&*report)?);
    if report.status == ShiftStatus::Error {
        anyhow::bail!(
            "check ended in error: {}",
            report.message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn baseline(config: &Config, action: BaselineAction) -> anyhow::Result<()> {
    let store = BaselineStore::open(&config.monitor.baseline_path)?;
    match action {
        BaselineAction::Show => {
            println!("{}", serde_json::to_string_pretty(&*store.get())?);
        }
        BaselineAction::Set { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let update: BaselineUpdate =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;
            let baseline = store.replace(update.into_baseline(Utc::now())?)?;
            info!(path = %store.path().display(), "baseline replaced from {}", file.display());
            println!("{}", serde_json::to_string_pretty(&*baseline)?);
        }
    }
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await?,
        Command::Check { lookback_minutes } => check(&config, lookback_minutes).await?,
        Command::Baseline { action } => baseline(&config, action)?,
    }

    Ok(())
}
