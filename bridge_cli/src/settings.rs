use anyhow::{Context, Result};
use bridge_core::{DynSourceClient, SupabaseClient};
use bridge_refresh::{parse_config_from_file, BridgeConfig, SourceConfig};
use clap::Args;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Settings that take precedence over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub url: Option<String>,

    /// Supabase API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Address to serve metrics on
    #[arg(short, long, env = "BRIDGE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Refresh interval (e.g. 60s, 5m)
    #[arg(short, long, env = "BRIDGE_INTERVAL", value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

impl Overrides {
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(url) = &self.url {
            config.source.url = url.clone();
        }
        if let Some(key) = &self.key {
            config.source.api_key = key.clone();
        }
        if let Some(listen) = self.listen {
            config.exposition.listen = listen;
        }
        if let Some(interval) = self.interval {
            config.refresh.interval = interval;
        }
    }
}

pub async fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<BridgeConfig> {
    let mut config = match path {
        Some(path) => parse_config_from_file(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    overrides.apply(&mut config);
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}

pub fn build_source(config: &SourceConfig) -> Result<DynSourceClient> {
    let client = SupabaseClient::with_timeout(&config.url, &config.api_key, config.fetch_timeout)?;
    Ok(Arc::new(client))
}
