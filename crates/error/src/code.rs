use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following the HEAVYAI-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Connection errors
/// - **2000-2999**: Query and translation errors
/// - **3000-3999**: Configuration errors
/// - **5000-5999**: Internal/System errors
///
/// Codes are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Connection Errors (1000-1999) ===
    /// HEAVYAI-1001: Could not open a session
    ConnectionFailed = 1001,
    /// HEAVYAI-1002: Network connection timeout
    ConnectionTimeout = 1002,
    /// HEAVYAI-1003: Session closed or expired
    SessionClosed = 1003,

    // === Query Errors (2000-2999) ===
    /// HEAVYAI-2001: SQL syntax error
    SyntaxError = 2001,
    /// HEAVYAI-2002: Field/column not found
    FieldNotFound = 2002,
    /// HEAVYAI-2003: Table not found
    TableNotFound = 2003,
    /// HEAVYAI-2004: Ambiguous column reference
    AmbiguousColumn = 2004,
    /// HEAVYAI-2005: Type has no dialect mapping
    UnsupportedType = 2005,
    /// HEAVYAI-2006: Operator has no registry entry
    UnsupportedOperator = 2006,
    /// HEAVYAI-2007: Statement shape rejected by the backend
    UnsupportedStatement = 2007,
    /// HEAVYAI-2008: Non-equality join predicate
    NonEquiJoin = 2008,
    /// HEAVYAI-2009: Function called with the wrong number of arguments
    ArityMismatch = 2009,
    /// HEAVYAI-2010: Statement failed on the server
    ExecutionFailed = 2010,

    // === Configuration Errors (3000-3999) ===
    /// HEAVYAI-3001: Configuration file could not be read or parsed
    InvalidConfig = 3001,
    /// HEAVYAI-3002: Missing required connection parameter
    MissingRequiredField = 3002,
    /// HEAVYAI-3003: Incompatible execution options
    InvalidExecutionType = 3003,

    // === Internal Errors (5000-5999) ===
    /// HEAVYAI-5001: Driver reported an internal failure
    DriverInternal = 5001,
    /// HEAVYAI-5002: Serialization/deserialization failed
    SerializationFailed = 5002,
    /// HEAVYAI-5003: Unexpected internal state
    InternalPanic = 5003,
    /// HEAVYAI-5004: Feature not implemented
    NotImplemented = 5004,
    /// HEAVYAI-5005: Remote UDF compilation failed
    RemoteCompilationFailed = 5005,

    /// HEAVYAI-9999: Unknown/unclassified error
    Unknown = 9999,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "HEAVYAI-2002")
    pub fn as_str(&self) -> String {
        format!("HEAVYAI-{:04}", self.as_u16())
    }

    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Connection,
            2000..=2999 => ErrorCategory::Query,
            3000..=3999 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("HEAVYAI-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::ConnectionFailed),
            1002 => Ok(Self::ConnectionTimeout),
            1003 => Ok(Self::SessionClosed),
            2001 => Ok(Self::SyntaxError),
            2002 => Ok(Self::FieldNotFound),
            2003 => Ok(Self::TableNotFound),
            2004 => Ok(Self::AmbiguousColumn),
            2005 => Ok(Self::UnsupportedType),
            2006 => Ok(Self::UnsupportedOperator),
            2007 => Ok(Self::UnsupportedStatement),
            2008 => Ok(Self::NonEquiJoin),
            2009 => Ok(Self::ArityMismatch),
            2010 => Ok(Self::ExecutionFailed),
            3001 => Ok(Self::InvalidConfig),
            3002 => Ok(Self::MissingRequiredField),
            3003 => Ok(Self::InvalidExecutionType),
            5001 => Ok(Self::DriverInternal),
            5002 => Ok(Self::SerializationFailed),
            5003 => Ok(Self::InternalPanic),
            5004 => Ok(Self::NotImplemented),
            5005 => Ok(Self::RemoteCompilationFailed),
            9999 => Ok(Self::Unknown),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level error category, used to pick an exception class in bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Connection,
    Query,
    Config,
    Internal,
}
