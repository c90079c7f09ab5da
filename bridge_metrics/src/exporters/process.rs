use prometheus::{Encoder, Registry, TextEncoder};
use tracing::warn;

/// CPU, memory and file-descriptor metrics for the bridge process itself.
pub struct ProcessMetrics {
    registry: Registry,
}

impl ProcessMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self { registry })
    }

    pub fn render(&self) -> String {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&families, &mut buffer) {
            warn!("Failed to encode process metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
