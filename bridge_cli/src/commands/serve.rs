use crate::commands::check::probe_tables;
use crate::settings::{build_source, load_config, Overrides};
use anyhow::{Context, Result};
use bridge_metrics::{exporters::ProcessMetrics, ExpositionServer, MetricRegistry};
use bridge_refresh::{Refresher, Scheduler};
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub async fn execute(config_file: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = load_config(config_file.as_deref(), &overrides).await?;
    let source = build_source(&config.source)?;

    info!("Checking source store at {}", config.source.url);
    for (table, e) in probe_tables(source.as_ref(), &config.source).await {
        // Only an unreachable store is fatal; a failing query is retried every cycle.
        if e.is_unavailable() {
            return Err(e)
                .with_context(|| format!("{} table is not accessible", table.description()));
        }
        warn!(
            table = table.label(),
            "{} table probe failed, will retry on refresh: {}",
            table.description(),
            e
        );
    }
    info!("Source store reachable");

    let registry = MetricRegistry::new();
    let mut server = ExpositionServer::bind(config.exposition.listen, registry.clone()).await?;
    if config.exposition.process_metrics {
        server = server.with_process_metrics(ProcessMetrics::new()?);
    }

    let shutdown = CancellationToken::new();
    let refresher = Refresher::new(source, registry, config.source.clone());
    let scheduler = Scheduler::new(refresher, config.refresh.interval, shutdown.child_token())?
        .with_shutdown_grace(config.refresh.shutdown_grace);

    let mut server_task = tokio::spawn(
        server.serve(shutdown.child_token(), config.exposition.drain_timeout),
    );
    let scheduler_task = tokio::spawn(scheduler.run());

    let server_result = tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
        result = &mut server_task => Some(result),
    };

    shutdown.cancel();

    let summary = scheduler_task.await?;
    info!(
        "Completed {} refresh cycle(s){}",
        summary.cycles,
        if summary.abandoned_cycle { ", last one abandoned" } else { "" }
    );

    let server_result = match server_result {
        Some(result) => {
            warn!("Exposition server exited before shutdown was requested");
            result
        }
        None => server_task.await,
    };
    server_result??;

    info!("Metrics bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
