//! # Error Contexts
//!
//! Structured metadata attached to errors so callers can react without parsing messages.

use serde::{Deserialize, Serialize};

/// Structured context for coded errors.
///
/// Each variant provides the fields relevant to that error type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    /// Context for HEAVYAI-2002 (FieldNotFound)
    FieldNotFound {
        field: String,
        table: Option<String>,
        available_fields: Vec<String>,
    },

    /// Context for HEAVYAI-2003 (TableNotFound)
    TableNotFound {
        table: String,
        database: Option<String>,
        available_tables: Vec<String>,
    },

    /// Context for HEAVYAI-2005/2006 (unsupported type or operator)
    Unsupported {
        token: String,
        dialect: String,
    },

    /// Context for HEAVYAI-2009 (ArityMismatch)
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Context for HEAVYAI-2010 (ExecutionFailed)
    Execution { sql: String },

    /// Context for connection errors (HEAVYAI-1001, 1002, 1003)
    Connection {
        host: Option<String>,
        port: Option<u16>,
        protocol: Option<String>,
        database: Option<String>,
    },

    /// Context for HEAVYAI-3001/3002 (config errors)
    Config {
        file_path: Option<String>,
        field: Option<String>,
    },

    /// Generic key-value context for extensibility
    Generic {
        #[serde(flatten)]
        data: std::collections::HashMap<String, serde_json::Value>,
    },
}
