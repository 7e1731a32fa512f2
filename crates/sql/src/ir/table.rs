use super::{ColumnRef, Expr, SortKey};
use crate::types::Schema;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
    LeftSemi,
    LeftAnti,
    Cross,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Outer => "outer",
            JoinKind::LeftSemi => "left_semi",
            JoinKind::LeftAnti => "left_anti",
            JoinKind::Cross => "cross",
        }
    }
}

/// A node of the relational tree.
#[derive(Debug)]
pub enum Relation {
    Table {
        name: String,
        schema: Schema,
    },
    /// A second, independent reference to a table, used for self-joins.
    SelfReference {
        table: Arc<Relation>,
    },
    /// Opaque SQL whose result schema was obtained from the server.
    SqlQuery {
        query: String,
        schema: Schema,
    },
    Selection {
        input: Arc<Relation>,
        projections: Vec<Expr>,
        predicates: Vec<Expr>,
        sort_keys: Vec<SortKey>,
    },
    Aggregation {
        input: Arc<Relation>,
        by: Vec<Expr>,
        metrics: Vec<Expr>,
        having: Vec<Expr>,
    },
    Join {
        kind: JoinKind,
        left: Arc<Relation>,
        right: Arc<Relation>,
        predicates: Vec<Expr>,
    },
    Limit {
        input: Arc<Relation>,
        n: u64,
        offset: u64,
    },
    Distinct {
        input: Arc<Relation>,
    },
    Union {
        left: Arc<Relation>,
        right: Arc<Relation>,
        distinct: bool,
    },
}

impl Relation {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Relation::Table { .. } => "Table",
            Relation::SelfReference { .. } => "SelfReference",
            Relation::SqlQuery { .. } => "SqlQuery",
            Relation::Selection { .. } => "Selection",
            Relation::Aggregation { .. } => "Aggregation",
            Relation::Join { .. } => "Join",
            Relation::Limit { .. } => "Limit",
            Relation::Distinct { .. } => "Distinct",
            Relation::Union { .. } => "Union",
        }
    }

    pub fn inputs(&self) -> Vec<&Arc<Relation>> {
        match self {
            Relation::Table { .. } | Relation::SqlQuery { .. } => vec![],
            Relation::SelfReference { table } => vec![table],
            Relation::Selection { input, .. }
            | Relation::Aggregation { input, .. }
            | Relation::Limit { input, .. }
            | Relation::Distinct { input } => vec![input],
            Relation::Join { left, right, .. } | Relation::Union { left, right, .. } => {
                vec![left, right]
            }
        }
    }

    /// Names of the columns this relation produces, in order.
    pub fn column_names(&self) -> Vec<String> {
        match self {
            Relation::Table { schema, .. } | Relation::SqlQuery { schema, .. } => schema.names(),
            Relation::SelfReference { table } => table.column_names(),
            Relation::Selection {
                input, projections, ..
            } => {
                if projections.is_empty() {
                    input.column_names()
                } else {
                    projections.iter().filter_map(Expr::output_name).collect()
                }
            }
            Relation::Aggregation { by, metrics, .. } => by
                .iter()
                .chain(metrics.iter())
                .filter_map(Expr::output_name)
                .collect(),
            Relation::Join { left, right, .. } => {
                let mut names = left.column_names();
                names.extend(right.column_names());
                names
            }
            Relation::Limit { input, .. } | Relation::Distinct { input } => input.column_names(),
            Relation::Union { left, .. } => left.column_names(),
        }
    }

    pub fn contains_union(&self) -> bool {
        matches!(self, Relation::Union { .. })
            || self.inputs().into_iter().any(|r| r.contains_union())
    }

    /// True if `other` is this relation or one of its descendants (by identity).
    ///
    /// A self-reference hides the table it points to: columns of the original table
    /// never resolve to the view.
    pub fn contains(self: &Arc<Self>, other: &Arc<Relation>) -> bool {
        if Arc::ptr_eq(self, other) {
            return true;
        }
        match self.as_ref() {
            Relation::SelfReference { .. } => false,
            rel => rel.inputs().into_iter().any(|r| r.contains(other)),
        }
    }
}

/// Builder handle over a shared relation node.
#[derive(Debug, Clone)]
pub struct TableExpr(Arc<Relation>);

impl TableExpr {
    pub fn table(name: impl Into<String>, schema: Schema) -> Self {
        Self(Arc::new(Relation::Table {
            name: name.into(),
            schema,
        }))
    }

    pub fn sql(query: impl Into<String>, schema: Schema) -> Self {
        Self(Arc::new(Relation::SqlQuery {
            query: query.into(),
            schema,
        }))
    }

    pub fn from_relation(relation: Arc<Relation>) -> Self {
        Self(relation)
    }

    pub fn relation(&self) -> &Arc<Relation> {
        &self.0
    }

    pub fn columns(&self) -> Vec<String> {
        self.0.column_names()
    }

    pub fn col(&self, name: impl Into<String>) -> Expr {
        Expr::Column(ColumnRef {
            relation: self.0.clone(),
            name: name.into(),
        })
    }

    /// An independent reference to the same table, so it can be joined with itself.
    pub fn view(&self) -> Self {
        Self(Arc::new(Relation::SelfReference {
            table: self.0.clone(),
        }))
    }

    pub fn filter(&self, predicates: Vec<Expr>) -> Self {
        Self(Arc::new(Relation::Selection {
            input: self.0.clone(),
            projections: vec![],
            predicates,
            sort_keys: vec![],
        }))
    }

    pub fn select(&self, projections: Vec<Expr>) -> Self {
        Self(Arc::new(Relation::Selection {
            input: self.0.clone(),
            projections,
            predicates: vec![],
            sort_keys: vec![],
        }))
    }

    pub fn order_by<K: Into<SortKey>>(&self, keys: Vec<K>) -> Self {
        Self(Arc::new(Relation::Selection {
            input: self.0.clone(),
            projections: vec![],
            predicates: vec![],
            sort_keys: keys.into_iter().map(Into::into).collect(),
        }))
    }

    pub fn group_by(&self, by: Vec<Expr>) -> GroupedTable {
        GroupedTable {
            input: self.0.clone(),
            by,
            having: vec![],
        }
    }

    /// Aggregate the whole table without grouping keys.
    pub fn aggregate(&self, metrics: Vec<Expr>) -> Self {
        self.group_by(vec![]).aggregate(metrics)
    }

    /// `COUNT(*)` over the whole table, projected as `count`.
    pub fn count(&self) -> Self {
        self.aggregate(vec![super::count_star()])
    }

    pub fn join(&self, right: &TableExpr, predicates: Vec<Expr>, kind: JoinKind) -> Self {
        Self(Arc::new(Relation::Join {
            kind,
            left: self.0.clone(),
            right: right.0.clone(),
            predicates,
        }))
    }

    pub fn inner_join(&self, right: &TableExpr, predicates: Vec<Expr>) -> Self {
        self.join(right, predicates, JoinKind::Inner)
    }

    pub fn left_join(&self, right: &TableExpr, predicates: Vec<Expr>) -> Self {
        self.join(right, predicates, JoinKind::Left)
    }

    pub fn semi_join(&self, right: &TableExpr, predicates: Vec<Expr>) -> Self {
        self.join(right, predicates, JoinKind::LeftSemi)
    }

    pub fn cross_join(&self, right: &TableExpr) -> Self {
        self.join(right, vec![], JoinKind::Cross)
    }

    pub fn limit(&self, n: u64, offset: u64) -> Self {
        Self(Arc::new(Relation::Limit {
            input: self.0.clone(),
            n,
            offset,
        }))
    }

    pub fn distinct(&self) -> Self {
        Self(Arc::new(Relation::Distinct {
            input: self.0.clone(),
        }))
    }

    pub fn union(&self, other: &TableExpr, distinct: bool) -> Self {
        Self(Arc::new(Relation::Union {
            left: self.0.clone(),
            right: other.0.clone(),
            distinct,
        }))
    }
}

/// Intermediate state of `table.group_by(..).having(..).aggregate(..)`.
#[derive(Debug, Clone)]
pub struct GroupedTable {
    input: Arc<Relation>,
    by: Vec<Expr>,
    having: Vec<Expr>,
}

impl GroupedTable {
    pub fn having(mut self, predicates: Vec<Expr>) -> Self {
        self.having.extend(predicates);
        self
    }

    pub fn aggregate(self, metrics: Vec<Expr>) -> TableExpr {
        TableExpr(Arc::new(Relation::Aggregation {
            input: self.input,
            by: self.by,
            metrics,
            having: self.having,
        }))
    }
}
