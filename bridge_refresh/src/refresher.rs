use crate::config::SourceConfig;
use bridge_core::{BridgeError, DynSourceClient, FetchRequest, SourceRecord, Table};
use bridge_metrics::{gauges_for, MetricRegistry};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one table during a refresh cycle.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A row was found and its gauges were written.
    Updated { values: Vec<(&'static str, f64)> },
    /// The table has no rows yet.
    Skipped,
    /// The fetch or the row was unusable; previous values stay exposed.
    Failed(BridgeError),
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RefreshOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub outcomes: Vec<(Table, RefreshOutcome)>,
    pub duration: Duration,
}

impl CycleReport {
    pub fn outcome(&self, table: Table) -> Option<&RefreshOutcome> {
        self.outcomes
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, outcome)| outcome)
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_updated()).count()
    }
}

/// Runs one refresh pass over both source tables.
pub struct Refresher {
    source: DynSourceClient,
    registry: MetricRegistry,
    config: SourceConfig,
}

impl Refresher {
    pub fn new(source: DynSourceClient, registry: MetricRegistry, config: SourceConfig) -> Self {
        Self {
            source,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Refreshes every table and bumps the cycle counter exactly once.
    /// Per-table failures are logged and reported, never returned as errors.
    pub async fn run_cycle(&self) -> CycleReport {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(Table::ALL.len());

        for table in Table::ALL {
            let outcome = self.refresh_table(table).await;
            self.log_outcome(table, &outcome);
            outcomes.push((table, outcome));
        }

        let cycle = self.registry.record_cycle().await;
        let report = CycleReport {
            cycle,
            outcomes,
            duration: start.elapsed(),
        };

        info!(
            "Refresh cycle {} finished in {:?}: {}/{} tables updated",
            report.cycle,
            report.duration,
            report.updated_count(),
            Table::ALL.len()
        );

        report
    }

    async fn refresh_table(&self, table: Table) -> RefreshOutcome {
        let table_name = self.config.table_name(table);
        let request = FetchRequest::latest(table_name, &self.config.order_column);

        let rows = match tokio::time::timeout(
            self.config.fetch_timeout,
            self.source.fetch_latest(&request),
        )
        .await
        {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => return RefreshOutcome::Failed(e),
            Err(_) => {
                return RefreshOutcome::Failed(BridgeError::query_failed(
                    table_name,
                    format!("timed out after {:?}", self.config.fetch_timeout),
                ))
            }
        };

        let Some(record) = rows.into_iter().next() else {
            return RefreshOutcome::Skipped;
        };

        match extract_values(table, table_name, &record) {
            Ok(values) => {
                self.registry.set_batch(values.iter().copied()).await;
                RefreshOutcome::Updated { values }
            }
            Err(e) => RefreshOutcome::Failed(e),
        }
    }

    fn log_outcome(&self, table: Table, outcome: &RefreshOutcome) {
        match outcome {
            RefreshOutcome::Updated { values } => {
                debug!("{} metrics updated: {:?}", table.description(), values);
            }
            RefreshOutcome::Skipped => {
                info!(
                    "No rows in '{}', keeping {} metrics as they are",
                    self.config.table_name(table),
                    table.description()
                );
            }
            RefreshOutcome::Failed(e) => {
                warn!(
                    table = table.label(),
                    "Failed to refresh {} metrics: {}",
                    table.description(),
                    e
                );
            }
        }
    }
}

/// Maps a row onto the table's gauges. All of them must be present and
/// numeric, otherwise nothing is written for the table.
fn extract_values(
    table: Table,
    table_name: &str,
    record: &SourceRecord,
) -> Result<Vec<(&'static str, f64)>, BridgeError> {
    gauges_for(table)
        .map(|gauge| {
            record
                .numeric(gauge.field)
                .map(|value| (gauge.name, value))
                .map_err(|problem| BridgeError::InvalidRecord {
                    table: table_name.to_string(),
                    field: gauge.field.to_string(),
                    reason: problem.to_string(),
                })
        })
        .collect()
}
