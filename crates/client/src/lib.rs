//! Async HeavyDB backend.
//!
//! Ties the SQL compiler to a server connection:
//! - **Driver**: the pluggable wire client and connection parameters (`driver`).
//! - **Backend**: execution, introspection and data loading (`backend`), with DDL text
//!   built in `ddl`.
//! - **UDFs**: remote compilation and registration of elementwise functions (`udf`).
pub mod backend;
pub mod ddl;
pub mod driver;
pub mod error;
pub mod udf;

pub use backend::Backend;
pub use ddl::{ColumnSpec, CreateTableOptions};
pub use driver::{
    ColumnDetails, ConnectParams, ConnectTarget, DriverConnector, ExecutionMode, HeavyDbDriver,
    LoadMethod, QueryResult,
};
pub use error::ClientError;
pub use udf::{ElementwiseUdf, RemoteCompiler, UdfRegistry, UdfSource};
