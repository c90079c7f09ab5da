use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Point-in-time copy of every metric that has been set so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub values: BTreeMap<String, f64>,
    pub updates_total: u64,
}

impl Snapshot {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.updates_total == 0
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    values: BTreeMap<String, f64>,
    updates_total: u64,
}

/// Latest-wins store for the exposed metrics.
///
/// Every operation takes the lock for a single map update or copy and never
/// across an await point, so scrapes are never held up by a refresh cycle
/// that is waiting on the source store.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, name: impl Into<String>, value: f64) {
        self.state.write().await.values.insert(name.into(), value);
    }

    /// Writes all pairs under one lock so readers see either none or all of them.
    pub async fn set_batch<I, K>(&self, values: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let values: Vec<(String, f64)> = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let mut state = self.state.write().await;
        for (name, value) in values {
            state.values.insert(name, value);
        }
    }

    pub async fn get(&self, name: &str) -> Option<f64> {
        self.state.read().await.values.get(name).copied()
    }

    /// Marks one refresh cycle as completed.
    pub async fn record_cycle(&self) -> u64 {
        let mut state = self.state.write().await;
        state.updates_total += 1;
        state.updates_total
    }

    pub async fn updates_total(&self) -> u64 {
        self.state.read().await.updates_total
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            values: state.values.clone(),
            updates_total: state.updates_total,
        }
    }
}
