//! SQL Generation for HeavyDB.
//!
//! Compiles relational expression trees to HeavyDB SQL text. Each call runs the select
//! builder, a fresh query context, the expression translator and the clause formatters.

use std::sync::Arc;

use heavyai_error::HeavyAiError;

use crate::ir::{Expr, Literal, Relation, TableExpr};
use crate::sql_generator::dialect::DialectConfig;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::expr::ExprTranslator;
use crate::sql_generator::{QueryContext, SqlGenerator};

/// Stateless compiler front end; safe to share between threads.
#[derive(Debug, Clone)]
pub struct Compiler {
    dialect: Arc<DialectConfig>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::heavydb()
    }
}

impl Compiler {
    pub fn new(dialect: Arc<DialectConfig>) -> Self {
        Self { dialect }
    }

    pub fn heavydb() -> Self {
        Self::new(Arc::new(DialectConfig::heavydb()))
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    pub fn compile(&self, expr: &TableExpr) -> Result<String, SqlGenError> {
        self.compile_relation(expr.relation())
    }

    pub fn compile_relation(&self, relation: &Arc<Relation>) -> Result<String, SqlGenError> {
        if !self.dialect.supports_union && relation.contains_union() {
            return Err(SqlGenError::union_unsupported());
        }

        let mut generator = SqlGenerator::new(self.dialect.clone());
        let sql = generator.relation_to_sql(relation)?;
        tracing::debug!(target: "sql_generator", sql = %sql, "Compiled relation");
        Ok(sql)
    }

    /// A literal as it would appear inside a query, e.g. for a column `DEFAULT`.
    pub fn literal(&self, value: &Literal) -> Result<String, SqlGenError> {
        let context = QueryContext::new(self.dialect.always_alias);
        ExprTranslator::new(&context, &self.dialect).translate(&Expr::Literal(value.clone()))
    }

    /// Same as [`compile`](Self::compile), with errors mapped to coded [`HeavyAiError`]s.
    pub fn generate(&self, expr: &TableExpr) -> Result<String, HeavyAiError> {
        self.compile(expr)
            .map_err(|e| e.to_heavyai_error(self.dialect.name))
    }
}
