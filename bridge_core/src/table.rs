use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical source tables the bridge reads from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Data Lake storage and access metrics
    Lake,

    /// Data Warehouse query metrics
    Warehouse,
}

impl Table {
    pub const ALL: [Table; 2] = [Table::Lake, Table::Warehouse];

    pub fn label(&self) -> &'static str {
        match self {
            Table::Lake => "lake",
            Table::Warehouse => "warehouse",
        }
    }

    pub fn default_table_name(&self) -> &'static str {
        match self {
            Table::Lake => "data_lake_metrics",
            Table::Warehouse => "data_warehouse_metrics",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Table::Lake => "Data Lake",
            Table::Warehouse => "Data Warehouse",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
