pub mod error;
pub mod source;
pub mod supabase;
pub mod table;

pub use error::{BridgeError, Result};
pub use source::{DynSourceClient, FetchRequest, SourceClient, SourceRecord};
pub use supabase::SupabaseClient;
pub use table::Table;

// Re-export commonly used types
pub use async_trait::async_trait;
