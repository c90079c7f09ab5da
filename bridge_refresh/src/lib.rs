pub mod config;
pub mod parser;
pub mod refresher;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{BridgeConfig, ExpositionConfig, RefreshConfig, SourceConfig};
pub use parser::{parse_config_from_file, parse_config_from_str};
pub use refresher::{CycleReport, RefreshOutcome, Refresher};
pub use scheduler::{Scheduler, SchedulerState, SchedulerSummary};
