use heavyai_error::{ErrorCode, ErrorContext, HeavyAiError};
use heavyai_sql::SqlGenError;
use thiserror::Error;

/// Errors raised by the HeavyDB backend.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Translation(#[from] SqlGenError),

    #[error("Could not connect to {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: anyhow::Error,
    },

    #[error("Driver error: {0}")]
    Driver(#[source] anyhow::Error),

    /// A statement the server rejected, with the SQL that was sent.
    #[error("{source}\n\n{sql}")]
    Execution {
        #[source]
        source: anyhow::Error,
        sql: String,
    },

    #[error("{0}")]
    InvalidConnectionParams(String),

    #[error("If a GPU device is provided, `ipc` must be true or unset")]
    InvalidExecutionType,

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Remote compilation of UDF '{name}' failed: {source}")]
    RemoteCompile {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0} is not implemented yet")]
    NotImplemented(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn to_heavyai_error(&self) -> HeavyAiError {
        match self {
            ClientError::Translation(e) => e.clone().to_heavyai_error("heavydb"),
            ClientError::Connection { host, port, .. } => {
                HeavyAiError::new(ErrorCode::ConnectionFailed, self.to_string()).with_context(
                    ErrorContext::Connection {
                        host: Some(host.clone()),
                        port: Some(*port),
                        protocol: None,
                        database: None,
                    },
                )
            }
            ClientError::Driver(_) => HeavyAiError::new(ErrorCode::DriverInternal, self.to_string()),
            ClientError::Execution { source, sql } => {
                HeavyAiError::new(ErrorCode::ExecutionFailed, source.to_string())
                    .with_context(ErrorContext::Execution { sql: sql.clone() })
            }
            ClientError::InvalidConnectionParams(_) => {
                HeavyAiError::new(ErrorCode::MissingRequiredField, self.to_string())
                    .with_hint("Set `session_id`, `uri`, or `user`, `password` and `database`")
            }
            ClientError::InvalidExecutionType => {
                HeavyAiError::new(ErrorCode::InvalidExecutionType, self.to_string())
            }
            ClientError::UnsupportedType(_) => {
                HeavyAiError::new(ErrorCode::UnsupportedType, self.to_string())
            }
            ClientError::InvalidQuery(_) => HeavyAiError::new(ErrorCode::SyntaxError, self.to_string()),
            ClientError::RemoteCompile { .. } => {
                HeavyAiError::new(ErrorCode::RemoteCompilationFailed, self.to_string())
            }
            ClientError::NotImplemented(_) => {
                HeavyAiError::new(ErrorCode::NotImplemented, self.to_string())
            }
            ClientError::Config(_) => HeavyAiError::new(ErrorCode::InvalidConfig, self.to_string()),
        }
    }
}

impl From<ClientError> for HeavyAiError {
    fn from(err: ClientError) -> Self {
        err.to_heavyai_error()
    }
}
