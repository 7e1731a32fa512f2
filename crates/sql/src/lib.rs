//! Core SQL logic for the HeavyDB backend.
//!
//! This crate compiles relational expression trees into HeavyDB SQL text:
//! - **Types**: the mapping between host value types and HeavyDB type names (`types`).
//! - **Expressions**: the tree model and its builder API (`ir`).
//! - **Dialect**: the operator registry and HeavyDB-only functions (`dialects`).
//! - **Rewrites**: replacements for operations HeavyDB cannot spell (`optimizer`).
//! - **Generation**: select planning, scoping and clause formatting (`sql_generator`, `sql_gen`).
pub mod dialect_router;
pub mod dialects;
pub mod ir;
pub mod optimizer;
pub mod sql_gen;
pub mod sql_generator;
pub mod types;

pub use sql_gen::Compiler;
pub use sql_generator::dialect::DialectConfig;
pub use sql_generator::error::SqlGenError;
pub use sql_generator::sanitize::quote_identifier;
pub use types::{DataType, DialectType, Field, Schema, TypeName};
