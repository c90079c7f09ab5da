use crate::settings::{build_source, load_config, Overrides};
use crate::ui;
use anyhow::Result;
use bridge_core::{SourceClient, Table};
use bridge_refresh::SourceConfig;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tabled::{settings::Style, Tabled};

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Probes every source table, returning the failures as `(table, cause)`.
pub async fn probe_tables(
    source: &dyn SourceClient,
    config: &SourceConfig,
) -> Vec<(Table, bridge_core::BridgeError)> {
    let mut failures = Vec::new();
    for table in Table::ALL {
        if let Err(e) = source.probe(config.table_name(table)).await {
            failures.push((table, e));
        }
    }
    failures
}

pub async fn execute(config_file: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = load_config(config_file.as_deref(), &overrides).await?;
    let source = build_source(&config.source)?;

    ui::print_header("Source Check");
    println!("Store: {}", config.source.url);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Probing tables...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let failures = probe_tables(source.as_ref(), &config.source).await;
    spinner.finish_and_clear();

    let rows: Vec<ProbeRow> = Table::ALL
        .iter()
        .map(|table| {
            let status = match failures.iter().find(|(t, _)| t == table) {
                Some((_, e)) => format!("{} {}", "✗".red(), e),
                None => format!("{}", "✓ reachable".green()),
            };
            ProbeRow {
                source: table.description().to_string(),
                table: config.source.table_name(*table).to_string(),
                status,
            }
        })
        .collect();

    println!("\n{}", tabled::Table::new(rows).with(Style::rounded()));

    if failures.is_empty() {
        ui::print_success("All source tables are reachable");
        Ok(())
    } else {
        ui::print_error(&format!("{} of {} tables unreachable", failures.len(), Table::ALL.len()));
        Err(anyhow::anyhow!("Source check failed"))
    }
}
