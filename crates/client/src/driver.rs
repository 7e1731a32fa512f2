//! The boundary to the HeavyDB wire client.
//!
//! The backend never speaks Thrift or HTTP itself. It drives an implementation of
//! [`HeavyDbDriver`] obtained from a [`DriverConnector`], which keeps the transport
//! pluggable and lets tests substitute an in-memory server.

use crate::error::ClientError;
use anyhow::Result;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use heavyai_common::config::{ConnectionConfig, Protocol};
use heavyai_sql::{DataType, DialectType, Field, Schema, SqlGenError};
use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How result sets are transferred back from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Cursor,
    Ipc,
    GpuIpc { device: u32 },
}

impl ExecutionMode {
    /// Pick the mode for a connection. A GPU device always implies IPC, so asking
    /// for a GPU with `ipc` explicitly disabled is an error.
    pub fn resolve(ipc: Option<bool>, gpu_device: Option<u32>) -> Result<Self, ClientError> {
        match (ipc, gpu_device) {
            (Some(false), Some(_)) => Err(ClientError::InvalidExecutionType),
            (_, Some(device)) => Ok(ExecutionMode::GpuIpc { device }),
            (Some(true), None) => Ok(ExecutionMode::Ipc),
            (_, None) => Ok(ExecutionMode::Cursor),
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, ExecutionMode::GpuIpc { .. })
    }
}

/// Column metadata as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDetails {
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
    pub precision: u8,
    pub scale: u8,
    pub comp_param: u32,
    pub encoding: String,
}

impl ColumnDetails {
    pub fn dialect_type(&self) -> Result<DialectType, SqlGenError> {
        DialectType::new(&self.type_name, self.nullable)
    }

    pub fn data_type(&self) -> Result<DataType, SqlGenError> {
        Ok(self
            .dialect_type()?
            .to_data_type_with(self.precision, self.scale))
    }

    pub fn to_field(&self) -> Result<Field, SqlGenError> {
        Ok(Field::new(self.name.clone(), self.data_type()?, self.nullable))
    }
}

/// Map server-side column details onto a host schema.
pub fn schema_from_details(details: &[ColumnDetails]) -> Result<Schema, SqlGenError> {
    details
        .iter()
        .map(ColumnDetails::to_field)
        .collect::<Result<Vec<_>, _>>()
        .map(Schema::new)
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub batches: Vec<RecordBatch>,
    pub columns: Vec<ColumnDetails>,
}

impl QueryResult {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Strategy used to push a batch of data into a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMethod {
    Rows,
    Columnar,
    Arrow,
    #[default]
    Infer,
}

impl LoadMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadMethod::Rows => "rows",
            LoadMethod::Columnar => "columnar",
            LoadMethod::Arrow => "arrow",
            LoadMethod::Infer => "infer",
        }
    }
}

impl FromStr for LoadMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rows" => Ok(LoadMethod::Rows),
            "columnar" => Ok(LoadMethod::Columnar),
            "arrow" => Ok(LoadMethod::Arrow),
            "infer" => Ok(LoadMethod::Infer),
            other => Err(ClientError::Config(format!(
                "Unknown load method '{}', expected one of rows, columnar, arrow, infer",
                other
            ))),
        }
    }
}

impl fmt::Display for LoadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open session on a HeavyDB server.
#[async_trait]
pub trait HeavyDbDriver: Send + Sync {
    async fn execute(&self, sql: &str, mode: ExecutionMode) -> Result<QueryResult>;

    /// Column descriptions of the result of `sql`, without running it.
    async fn sql_validate(&self, sql: &str) -> Result<Vec<ColumnDetails>>;

    async fn get_table_details(&self, table: &str) -> Result<Vec<ColumnDetails>>;

    async fn get_tables(&self) -> Result<Vec<String>>;

    async fn get_databases(&self) -> Result<Vec<String>>;

    async fn current_database(&self) -> Result<String>;

    async fn load_table(&self, table: &str, batch: &RecordBatch, method: LoadMethod) -> Result<()>;

    async fn server_version(&self) -> Result<String>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait DriverConnector: Send + Sync {
    async fn connect(&self, params: &ConnectParams) -> Result<Arc<dyn HeavyDbDriver>>;
}

/// What identifies the caller to the server.
#[derive(Debug, Clone)]
pub enum ConnectTarget {
    Session(String),
    Uri(String),
    Credentials {
        user: String,
        password: SecretString,
        database: String,
    },
}

#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub target: ConnectTarget,
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub database: Option<String>,
}

const MISSING_CREDENTIALS: &str = "If `session_id` is not provided, then the connection `uri` or all `user`, `password` and `database` must be provided.";

impl ConnectParams {
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, ClientError> {
        let target = if let Some(session) = &config.session_id {
            ConnectTarget::Session(session.clone())
        } else if let Some(uri) = &config.uri {
            ConnectTarget::Uri(uri.clone())
        } else {
            match (&config.user, &config.password, &config.database) {
                (Some(user), Some(password), Some(database)) => ConnectTarget::Credentials {
                    user: user.clone(),
                    password: password.clone(),
                    database: database.clone(),
                },
                _ => {
                    return Err(ClientError::InvalidConnectionParams(
                        MISSING_CREDENTIALS.to_string(),
                    ))
                }
            }
        };

        Ok(Self {
            target,
            host: config.host.clone(),
            port: config.port,
            protocol: config.protocol,
            database: config.database.clone(),
        })
    }

    /// Same parameters, pointed at another database.
    pub fn with_database(&self, name: &str) -> Self {
        let target = match &self.target {
            ConnectTarget::Credentials { user, password, .. } => ConnectTarget::Credentials {
                user: user.clone(),
                password: password.clone(),
                database: name.to_string(),
            },
            other => other.clone(),
        };
        Self {
            target,
            database: Some(name.to_string()),
            ..self.clone()
        }
    }

    pub fn target_kind(&self) -> &'static str {
        match self.target {
            ConnectTarget::Session(_) => "session",
            ConnectTarget::Uri(_) => "uri",
            ConnectTarget::Credentials { .. } => "credentials",
        }
    }
}
