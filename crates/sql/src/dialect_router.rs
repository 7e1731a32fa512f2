//! Maps backend names to dialect configurations.
//!
//! HeavyDB has been published as MapD, OmniSciDB and HeavyDB; all of these names
//! route to the same dialect.

use std::sync::Arc;

use crate::sql_generator::dialect::DialectConfig;

/// Routes a backend name to its dialect, or `None` when this crate cannot compile for it.
pub fn route_dialect(backend: &str) -> Option<Arc<DialectConfig>> {
    match backend.to_lowercase().as_str() {
        "heavydb" | "heavyai" | "omnisci" | "omniscidb" | "mapd" => {
            Some(Arc::new(DialectConfig::heavydb()))
        }
        _ => {
            tracing::warn!(
                target: "sql_generator",
                backend = %backend,
                "No dialect available for backend"
            );
            None
        }
    }
}
