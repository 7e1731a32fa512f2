use crate::ir::Relation;
use crate::sql_generator::builder::{SelectBuilder, SelectPlan};
use crate::sql_generator::context::QueryContext;
use crate::sql_generator::dialect::DialectConfig;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::expr::ExprTranslator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) mod aggregate;
pub(crate) mod join;
pub(crate) mod projection;
pub(crate) mod scan;
pub(crate) mod set_ops;
pub(crate) mod sort;

pub struct SqlGenerator {
    pub context: QueryContext,
    pub dialect: Arc<DialectConfig>,
    pub(crate) recursion_level: Arc<AtomicUsize>,
}

impl SqlGenerator {
    pub fn new(dialect: Arc<DialectConfig>) -> Self {
        Self {
            context: QueryContext::new(dialect.always_alias),
            dialect,
            recursion_level: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn translator(&self) -> ExprTranslator<'_> {
        ExprTranslator::new(&self.context, &self.dialect)
    }

    pub fn relation_to_sql(&mut self, relation: &Arc<Relation>) -> Result<String, SqlGenError> {
        let _guard = RecursionGuard::new(self.recursion_level.clone(), self.dialect.max_depth)?;

        tracing::trace!(
            target: "sql_generator",
            node = relation.kind_name(),
            depth = self.recursion_level.load(Ordering::SeqCst),
            "Translating relation"
        );

        let plan = SelectBuilder::build(relation)?;
        self.render_select(&plan)
    }

    /// Render one SELECT statement. The FROM scope pushed here is gone afterwards,
    /// whether rendering succeeded or not.
    pub(crate) fn render_select(&mut self, plan: &SelectPlan) -> Result<String, SqlGenError> {
        let checkpoint = self.context.checkpoint();
        let result = self.render_clauses(plan);
        self.context.rollback(checkpoint);
        result
    }

    fn render_clauses(&mut self, plan: &SelectPlan) -> Result<String, SqlGenError> {
        // The table set goes first: it defines the aliases every other clause uses.
        let from = scan::format_table_set(self, plan)?;

        let mut clauses = vec![projection::format_select(self, plan)?, from];
        clauses.extend(projection::format_where(self, plan)?);
        clauses.extend(aggregate::format_group_by(self, plan)?);
        clauses.extend(sort::format_order_by(self, plan)?);
        clauses.extend(set_ops::format_limit(plan));

        Ok(clauses.join("\n"))
    }

    /// Prefix every line of `text` with `levels` indentation steps.
    pub(crate) fn indent(&self, text: &str, levels: usize) -> String {
        let pad = " ".repeat(self.dialect.indent * levels);
        text.lines()
            .map(|line| format!("{}{}", pad, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct RecursionGuard {
    level: Arc<AtomicUsize>,
}

impl RecursionGuard {
    fn new(level: Arc<AtomicUsize>, max_depth: usize) -> Result<Self, SqlGenError> {
        let current = level.fetch_add(1, Ordering::SeqCst);
        if current > max_depth {
            level.fetch_sub(1, Ordering::SeqCst);
            return Err(SqlGenError::MaxRecursion(max_depth));
        }
        Ok(Self { level })
    }
}

impl Drop for RecursionGuard {
    fn drop(&mut self) {
        self.level.fetch_sub(1, Ordering::SeqCst);
    }
}
