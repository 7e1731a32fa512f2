//! Partitions a relational tree into SELECT statements without rendering anything.

use crate::ir::{Expr, Relation, SortKey};
use crate::sql_generator::error::SqlGenError;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitSpec {
    pub n: u64,
    pub offset: u64,
}

/// One SELECT statement.
#[derive(Debug, Clone)]
pub struct SelectPlan {
    /// Relation rendered in the FROM clause: a table, a join tree, raw SQL, or any
    /// other relation (rendered as a derived table).
    pub table_set: Arc<Relation>,
    /// Empty means `*`.
    pub select_list: Vec<Expr>,
    pub distinct: bool,
    pub predicates: Vec<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Vec<Expr>,
    pub order_by: Vec<SortKey>,
    pub limit: Option<LimitSpec>,
    /// Filter-only selections folded into the table set.
    pub fused: Vec<Arc<Relation>>,
    /// Relation whose columns are this statement's select list, so later clauses can
    /// refer to them by output name.
    pub output_relation: Option<Arc<Relation>>,
}

impl SelectPlan {
    fn over(table_set: Arc<Relation>) -> Self {
        Self {
            table_set,
            select_list: vec![],
            distinct: false,
            predicates: vec![],
            group_by: vec![],
            having: vec![],
            order_by: vec![],
            limit: None,
            fused: vec![],
            output_relation: None,
        }
    }

    /// A plan with only a table set and filters; new clauses can be merged into it.
    fn is_simple(&self) -> bool {
        self.select_list.is_empty()
            && self.group_by.is_empty()
            && self.having.is_empty()
            && self.limit.is_none()
            && !self.distinct
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty() || !self.having.is_empty()
    }
}

/// Identity pass: group keys are emitted by output name, so nothing needs remapping.
pub fn convert_group_by(by: &[Expr]) -> Vec<Expr> {
    by.to_vec()
}

pub struct SelectBuilder;

impl SelectBuilder {
    pub fn build(relation: &Arc<Relation>) -> Result<SelectPlan, SqlGenError> {
        match relation.as_ref() {
            Relation::Table { .. }
            | Relation::SelfReference { .. }
            | Relation::SqlQuery { .. }
            | Relation::Join { .. } => Ok(SelectPlan::over(relation.clone())),

            Relation::Selection {
                input,
                projections,
                predicates,
                sort_keys,
            } => {
                let mut plan = Self::build(input)?;

                // Sorting alone can follow anything that is not limited or deduplicated.
                let sort_only = projections.is_empty() && predicates.is_empty();
                if sort_only && plan.limit.is_none() && !plan.distinct {
                    if !sort_keys.is_empty() {
                        plan.order_by = sort_keys.clone();
                    }
                    plan.fused.push(relation.clone());
                    return Ok(plan);
                }

                if !plan.is_simple() {
                    plan = SelectPlan::over(input.clone());
                }
                plan.select_list = projections.clone();
                plan.predicates.extend(predicates.iter().cloned());
                if !sort_keys.is_empty() {
                    plan.order_by = sort_keys.clone();
                }
                if projections.is_empty() {
                    plan.fused.push(relation.clone());
                } else {
                    plan.output_relation = Some(relation.clone());
                }
                Ok(plan)
            }

            Relation::Aggregation {
                input,
                by,
                metrics,
                having,
            } => {
                let mut plan = Self::build(input)?;
                if !plan.is_simple() {
                    plan = SelectPlan::over(input.clone());
                }
                // Row order does not survive grouping.
                plan.order_by.clear();
                plan.select_list = by.iter().chain(metrics.iter()).cloned().collect();
                plan.group_by = convert_group_by(by);
                plan.having = having.clone();
                plan.output_relation = Some(relation.clone());
                Ok(plan)
            }

            Relation::Limit { input, n, offset } => {
                let mut plan = Self::build(input)?;
                if plan.limit.is_some() {
                    plan = SelectPlan::over(input.clone());
                }
                plan.limit = Some(LimitSpec {
                    n: *n,
                    offset: *offset,
                });
                Ok(plan)
            }

            Relation::Distinct { input } => {
                let mut plan = Self::build(input)?;
                if plan.limit.is_some() || plan.distinct {
                    plan = SelectPlan::over(input.clone());
                }
                plan.distinct = true;
                Ok(plan)
            }

            Relation::Union { .. } => Err(SqlGenError::union_unsupported()),
        }
    }
}
