pub mod catalogue;
pub mod exporters;
pub mod registry;
pub mod server;

pub use catalogue::{gauges_for, GaugeSpec, ValueKind, GAUGES, UPDATES_TOTAL};
pub use exporters::PrometheusExporter;
pub use registry::{MetricRegistry, Snapshot};
pub use server::{router, ExpositionServer, HealthStatus};
