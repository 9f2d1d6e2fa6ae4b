//! Settings: environment-driven runtime configuration.

mod settings;
pub use settings::{validate_schema_name, Settings, StoreKind};
