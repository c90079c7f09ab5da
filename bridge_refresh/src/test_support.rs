use async_trait::async_trait;
use bridge_core::{BridgeError, FetchRequest, Result, SourceClient, SourceRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Step {
    Rows(Vec<SourceRecord>),
    Fail(String),
    Unavailable(String),
    Delay(Duration, Vec<SourceRecord>),
    Hang,
}

/// In-memory source that replays a per-table script of responses.
/// Once a table's script runs out it keeps answering with its fallback step.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    fallbacks: Mutex<HashMap<String, Step>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(self, table: &str, step: Step) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push_back(step);
        self
    }

    pub fn fallback(self, table: &str, step: Step) -> Self {
        self.fallbacks.lock().unwrap().insert(table.to_string(), step);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_step(&self, table: &str) -> Step {
        if let Some(step) = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(table)
            .and_then(|queue| queue.pop_front())
        {
            return step;
        }
        self.fallbacks
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or(Step::Rows(Vec::new()))
    }
}

#[async_trait]
impl SourceClient for ScriptedSource {
    async fn fetch_latest(&self, request: &FetchRequest) -> Result<Vec<SourceRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.next_step(&request.table) {
            Step::Rows(rows) => Ok(rows),
            Step::Fail(reason) => Err(BridgeError::query_failed(&request.table, reason)),
            Step::Unavailable(reason) => Err(BridgeError::SourceUnavailable(reason)),
            Step::Delay(delay, rows) => {
                tokio::time::sleep(delay).await;
                Ok(rows)
            }
            Step::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}

pub fn lake_record(space_used_gb: f64, access_count: u64, access_time_ms: f64) -> SourceRecord {
    SourceRecord::new()
        .with_field("timestamp", "2024-05-01T10:00:00")
        .with_field("space_used_gb", space_used_gb)
        .with_field("access_count", access_count)
        .with_field("access_time_ms", access_time_ms)
}

pub fn warehouse_record(response_time_ms: f64, records_processed: u64) -> SourceRecord {
    SourceRecord::new()
        .with_field("timestamp", "2024-05-01T10:00:00")
        .with_field("response_time_ms", response_time_ms)
        .with_field("records_processed", records_processed)
}
