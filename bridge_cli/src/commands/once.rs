use crate::settings::{build_source, load_config, Overrides};
use anyhow::Result;
use bridge_metrics::{MetricRegistry, PrometheusExporter};
use bridge_refresh::Refresher;
use std::path::PathBuf;

pub async fn execute(config_file: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = load_config(config_file.as_deref(), &overrides).await?;
    let source = build_source(&config.source)?;

    let registry = MetricRegistry::new();
    let refresher = Refresher::new(source, registry.clone(), config.source.clone());
    let report = refresher.run_cycle().await;

    print!("{}", PrometheusExporter::format(&registry.snapshot().await));

    if report.outcomes.iter().all(|(_, outcome)| outcome.is_failed()) {
        return Err(anyhow::anyhow!("Every source table failed to refresh"));
    }

    Ok(())
}
