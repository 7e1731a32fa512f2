use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Default constants
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6274;
pub const DEFAULT_DIALECT: &str = "heavydb";
pub const DEFAULT_MAX_DEPTH: usize = 256;
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 60000;

pub const ENV_PREFIX: &str = "HEAVYAI";

// Custom Serde logic for SecretString
fn serialize_secret<S>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secret {
        Some(_) => serializer.serialize_str("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(SecretString::from))
}

/// Transport used to reach the server.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Binary,
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Binary => "binary",
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct ConnectionConfig {
    #[serde(default)]
    #[validate(custom(function = "validate_uri"))]
    pub uri: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub password: Option<SecretString>,

    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub protocol: Protocol,

    #[serde(default)]
    pub session_id: Option<String>,

    /// Fetch results through shared memory instead of a cursor. Unset means
    /// IPC exactly when a GPU device is given.
    #[serde(default)]
    pub ipc: Option<bool>,

    /// GPU used for execution; requires `ipc`.
    #[serde(default)]
    pub gpu_device: Option<u32>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: None,
            user: None,
            password: None,
            host: default_host(),
            port: default_port(),
            database: None,
            protocol: Protocol::default(),
            session_id: None,
            ipc: None,
            gpu_device: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn validate_uri(uri: &str) -> Result<(), validator::ValidationError> {
    match url::Url::parse(uri) {
        Ok(_) => Ok(()),
        Err(_) => Err(validator::ValidationError::new("invalid_uri")),
    }
}

/// Options handed to the SQL compiler.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CompilerSettings {
    #[serde(default = "default_dialect")]
    #[validate(length(min = 1))]
    pub dialect: String,

    #[serde(default = "default_true")]
    pub non_equijoin_supported: bool,

    #[serde(default)]
    pub always_alias: bool,

    #[serde(default = "default_max_depth")]
    #[validate(range(min = 1))]
    pub max_depth: usize,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            non_equijoin_supported: true,
            always_alias: false,
            max_depth: default_max_depth(),
        }
    }
}

fn default_dialect() -> String {
    DEFAULT_DIALECT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Validate)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1))]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    #[validate(nested)]
    pub compiler: CompilerSettings,
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(config::File::with_name(path))
        } else {
            builder
        };

        Self::finish(builder)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml));
        Self::finish(builder)
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        // HEAVYAI_CONNECTION__PORT maps to connection.port, etc.
        let builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;

        let app_config: AppConfig = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {:?}", e))?;

        tracing::debug!(
            host = %app_config.connection.host,
            port = app_config.connection.port,
            protocol = app_config.connection.protocol.as_str(),
            dialect = %app_config.compiler.dialect,
            "Loaded configuration"
        );
        Ok(app_config)
    }
}
