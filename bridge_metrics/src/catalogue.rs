use bridge_core::Table;

/// How a gauge's samples are written in the exposition text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Whole-number tallies, written without a fractional part (`120`).
    Count,
    /// Measured quantities, always written with one (`45.0`).
    Measurement,
}

/// A gauge fed from one field of one source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub table: Table,
    pub field: &'static str,
    pub kind: ValueKind,
}

/// Exposed gauges, in exposition order.
pub const GAUGES: [GaugeSpec; 5] = [
    GaugeSpec {
        name: "lake_space_used_gb",
        help: "Space used in the Data Lake in GB",
        table: Table::Lake,
        field: "space_used_gb",
        kind: ValueKind::Measurement,
    },
    GaugeSpec {
        name: "lake_access_count",
        help: "Number of accesses to the Data Lake",
        table: Table::Lake,
        field: "access_count",
        kind: ValueKind::Count,
    },
    GaugeSpec {
        name: "lake_access_time_ms",
        help: "Average Data Lake access time in ms",
        table: Table::Lake,
        field: "access_time_ms",
        kind: ValueKind::Measurement,
    },
    GaugeSpec {
        name: "warehouse_response_time_ms",
        help: "Data Warehouse response time in ms",
        table: Table::Warehouse,
        field: "response_time_ms",
        kind: ValueKind::Measurement,
    },
    GaugeSpec {
        name: "warehouse_records_processed",
        help: "Number of records processed by the Data Warehouse",
        table: Table::Warehouse,
        field: "records_processed",
        kind: ValueKind::Count,
    },
];

pub const UPDATES_TOTAL: &str = "telemetry_updates_total";
pub const UPDATES_TOTAL_HELP: &str = "Total number of metric updates";

pub fn gauges_for(table: Table) -> impl Iterator<Item = &'static GaugeSpec> {
    GAUGES.iter().filter(move |gauge| gauge.table == table)
}

pub fn find(name: &str) -> Option<&'static GaugeSpec> {
    GAUGES.iter().find(|gauge| gauge.name == name)
}
