
pub use heavyai_sql::ir::{self, lit, Expr, JoinKind, TableExpr, WindowSpec};
pub use heavyai_sql::{Compiler, DialectConfig, SqlGenError};
pub use std::sync::Arc;
