use bridge_core::Table;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub source: SourceConfig,
    pub exposition: ExpositionConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub lake_table: String,
    pub warehouse_table: String,
    pub order_column: String,
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpositionConfig {
    pub listen: SocketAddr,
    #[serde(with = "humantime_serde")]
    pub drain_timeout: Duration,
    /// Also expose CPU/memory/fd metrics of the bridge process.
    pub process_metrics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// How long shutdown waits for a cycle that is still running.
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            lake_table: Table::Lake.default_table_name().to_string(),
            warehouse_table: Table::Warehouse.default_table_name().to_string(),
            order_column: "timestamp".to_string(),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for ExpositionConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8000)),
            drain_timeout: Duration::from_secs(10),
            process_metrics: false,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl SourceConfig {
    pub fn table_name(&self, table: Table) -> &str {
        match table {
            Table::Lake => &self.lake_table,
            Table::Warehouse => &self.warehouse_table,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("Source URL cannot be empty (set source.url or SUPABASE_URL)".to_string());
        }

        if self.api_key.trim().is_empty() {
            return Err("Source API key cannot be empty (set SUPABASE_KEY)".to_string());
        }

        for table in Table::ALL {
            if self.table_name(table).trim().is_empty() {
                return Err(format!("{} table name cannot be empty", table.description()));
            }
        }

        if self.lake_table == self.warehouse_table {
            return Err("Lake and warehouse tables must be different".to_string());
        }

        if self.order_column.trim().is_empty() {
            return Err("Order column cannot be empty".to_string());
        }

        if self.fetch_timeout.is_zero() {
            return Err("Fetch timeout must be > 0".to_string());
        }

        Ok(())
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()?;

        if self.refresh.interval.is_zero() {
            return Err("Refresh interval must be > 0".to_string());
        }

        if self.exposition.drain_timeout.is_zero() {
            return Err("Drain timeout must be > 0".to_string());
        }

        Ok(())
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
