pub mod process;
pub mod prometheus;

pub use self::prometheus::{PrometheusExporter, CONTENT_TYPE};
pub use process::ProcessMetrics;
