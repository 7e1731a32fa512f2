//! Common utilities and configuration shared across the HeavyDB backend crates.
//!
//! - **Configuration**: Strongly typed application configuration (`config`).
//! - **Logging**: Subscriber setup for `tracing` (`telemetry`).
//! - **Resilience**: Retries with exponential backoff (`retry`).
pub mod config;
pub mod retry;
pub mod telemetry;

pub use config::{AppConfig, CompilerSettings, ConnectionConfig, LoggingSettings, Protocol, RetrySettings};
