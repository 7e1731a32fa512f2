use super::SqlGenerator;
use crate::ir::{Expr, JoinKind, Op, Relation};
use crate::sql_generator::error::SqlGenError;
use std::sync::Arc;

/// Tables, join kinds and predicates of a join tree, read off left to right.
///
/// `tables.len() == kinds.len() + 1 == predicates.len() + 1`
#[derive(Debug, Default)]
pub(crate) struct JoinWalk {
    pub tables: Vec<Arc<Relation>>,
    pub kinds: Vec<JoinKind>,
    pub predicates: Vec<Vec<Expr>>,
}

pub(crate) fn walk_join_tree(
    gen: &SqlGenerator,
    relation: &Arc<Relation>,
) -> Result<JoinWalk, SqlGenError> {
    let mut walk = JoinWalk::default();
    visit(gen, relation, &mut walk)?;
    tracing::trace!(target: "sql_generator", tables = walk.tables.len(), "Walked join tree");
    Ok(walk)
}

fn visit(gen: &SqlGenerator, relation: &Arc<Relation>, walk: &mut JoinWalk) -> Result<(), SqlGenError> {
    let Relation::Join {
        kind,
        left,
        right,
        predicates,
    } = relation.as_ref()
    else {
        walk.tables.push(relation.clone());
        return Ok(());
    };

    // A flat FROM chain only grows to the right.
    if matches!(right.as_ref(), Relation::Join { .. }) {
        return Err(SqlGenError::UnsupportedExpr(
            "joins on the right side of a join are not supported".to_string(),
        ));
    }

    validate_join_predicates(gen, predicates)?;
    if gen.dialect.join_label(*kind).is_none() {
        return Err(SqlGenError::UnsupportedOperator {
            operator: format!("{} join", kind.as_str()),
            dialect: gen.dialect.display_name.to_string(),
        });
    }
    if *kind == JoinKind::LeftSemi
        && !matches!(
            right.as_ref(),
            Relation::Aggregation { .. } | Relation::Distinct { .. }
        )
    {
        tracing::warn!(
            target: "sql_generator",
            "Semi join emitted as an inner join; duplicate keys on the right side will duplicate rows"
        );
    }

    if matches!(left.as_ref(), Relation::Join { .. }) {
        visit(gen, left, walk)?;
    } else {
        walk.tables.push(left.clone());
    }
    walk.tables.push(right.clone());
    walk.kinds.push(*kind);
    walk.predicates.push(predicates.clone());
    Ok(())
}

fn validate_join_predicates(gen: &SqlGenerator, predicates: &[Expr]) -> Result<(), SqlGenError> {
    if gen.dialect.non_equijoin_supported {
        return Ok(());
    }
    for predicate in predicates {
        let inner = match predicate {
            Expr::Alias { expr, .. } => expr.as_ref(),
            other => other,
        };
        if !matches!(inner, Expr::Call { op: Op::Equals, .. }) {
            let description = match inner {
                Expr::Call { op, .. } => op.to_string(),
                other => format!("{:?}", other),
            };
            return Err(SqlGenError::NonEquiJoin {
                predicate: description,
            });
        }
    }
    Ok(())
}

/// Everything after the first table: one `<KIND> <table>` line and one `ON ...` line
/// per join.
pub(crate) fn format_joins(
    gen: &SqlGenerator,
    walk: &JoinWalk,
    rendered_tables: &[String],
) -> Result<String, SqlGenError> {
    let translator = gen.translator();
    let mut out = String::new();

    for ((kind, predicates), table) in walk
        .kinds
        .iter()
        .zip(&walk.predicates)
        .zip(rendered_tables.iter().skip(1))
    {
        let label = gen
            .dialect
            .join_label(*kind)
            .ok_or_else(|| SqlGenError::UnsupportedOperator {
                operator: format!("{} join", kind.as_str()),
                dialect: gen.dialect.display_name.to_string(),
            })?;

        let translated = predicates
            .iter()
            .map(|p| translator.translate(p))
            .collect::<Result<Vec<_>, _>>()?;
        let on = match translated.as_slice() {
            [] => "ON TRUE".to_string(),
            [single] => format!("ON {}", single),
            many => format!(
                "ON {}",
                many.iter()
                    .map(|p| format!("({})", p))
                    .collect::<Vec<_>>()
                    .join(" AND\n   ")
            ),
        };

        out.push('\n');
        out.push_str(&gen.indent(&format!("{} {}", label, table), 1));
        out.push('\n');
        out.push_str(&gen.indent(&on, 2));
    }

    Ok(out)
}
