use super::{join, SqlGenerator};
use crate::ir::Relation;
use crate::sql_generator::builder::SelectPlan;
use crate::sql_generator::context::{Scope, ScopeEntry};
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::safe_ident;
use std::sync::Arc;

/// Tables that can be named directly in FROM; everything else is a derived table.
fn is_base_table(relation: &Relation) -> bool {
    match relation {
        Relation::Table { .. } => true,
        Relation::SelfReference { table } => is_base_table(table),
        _ => false,
    }
}

/// Render the FROM clause and push the scope that the other clauses resolve against.
pub(crate) fn format_table_set(
    gen: &mut SqlGenerator,
    plan: &SelectPlan,
) -> Result<String, SqlGenError> {
    let walk = match plan.table_set.as_ref() {
        Relation::Join { .. } => Some(join::walk_join_tree(gen, &plan.table_set)?),
        _ => None,
    };
    let leaves = match &walk {
        Some(walk) => walk.tables.clone(),
        None => vec![plan.table_set.clone()],
    };
    let qualify = walk.is_some() || gen.context.always_alias();

    let mut entries = Vec::with_capacity(leaves.len());
    let mut rendered = Vec::with_capacity(leaves.len());
    for leaf in &leaves {
        let alias = (qualify || !is_base_table(leaf)).then(|| gen.context.next_alias());
        rendered.push(format_table(gen, leaf, alias.as_deref())?);
        entries.push(ScopeEntry {
            relation: leaf.clone(),
            alias,
            columns: leaf.column_names(),
        });
    }

    let mut pass_through = plan.fused.clone();
    pass_through.push(plan.table_set.clone());
    let outputs = plan.output_relation.as_ref().map(|r| (r.clone(), r.column_names()));
    gen.context.push_scope(Scope {
        entries,
        qualify,
        pass_through,
        outputs,
    });

    let first = rendered
        .first()
        .ok_or_else(|| SqlGenError::UnsupportedExpr("empty table set".to_string()))?;
    let mut from = format!("FROM {}", first);
    if let Some(walk) = &walk {
        from.push_str(&join::format_joins(gen, walk, &rendered)?);
    }
    Ok(from)
}

/// A single FROM item: a quoted table name or a parenthesised derived table, followed
/// by its alias when it has one.
pub(crate) fn format_table(
    gen: &mut SqlGenerator,
    relation: &Arc<Relation>,
    alias: Option<&str>,
) -> Result<String, SqlGenError> {
    let body = match relation.as_ref() {
        Relation::Table { name, .. } => safe_ident(name)?,
        Relation::SelfReference { table } => match table.as_ref() {
            Relation::Table { name, .. } => safe_ident(name)?,
            _ => derived(gen, table)?,
        },
        Relation::SqlQuery { query, .. } => format!("(\n{}\n)", gen.indent(query.trim(), 1)),
        _ => derived(gen, relation)?,
    };

    match alias {
        Some(alias) => Ok(format!("{} {}", body, alias)),
        None => Ok(body),
    }
}

fn derived(gen: &mut SqlGenerator, relation: &Arc<Relation>) -> Result<String, SqlGenError> {
    tracing::trace!(target: "sql_generator", node = relation.kind_name(), "Rendering derived table");
    let inner = gen.relation_to_sql(relation)?;
    Ok(format!("(\n{}\n)", gen.indent(&inner, 1)))
}
