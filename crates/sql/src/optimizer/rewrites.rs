//! Expression rewrites applied before translation.
//!
//! HeavyDB has no spelling for a few host operations. Each rule replaces such a node by
//! an equivalent tree built from supported operations. The pass runs once, bottom-up,
//! and registration refuses any rule whose output would feed another rule.

use crate::dialects::registry::Arity;
use crate::ir::{lit, Expr, Literal, Op};
use crate::sql_generator::error::SqlGenError;
use std::collections::HashMap;

pub type RewriteFn = fn(&[Expr]) -> Expr;

#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub name: &'static str,
    pub target: Op,
    pub arity: Arity,
    pub rewrite: RewriteFn,
}

impl RewriteRule {
    /// Output of the rule over placeholder operands, used to inspect what it produces.
    fn sample_call(&self) -> Expr {
        let n = match self.arity {
            Arity::Exact(k) | Arity::Range(k, _) | Arity::AtLeast(k) => k,
        };
        (self.rewrite)(&vec![Expr::Literal(Literal::Null); n])
    }
}

fn floor_divide(args: &[Expr]) -> Expr {
    Expr::call(Op::Floor, vec![Expr::call(Op::Divide, args.to_vec())])
}

/// `MIN/MAX(CASE WHEN x THEN 1 ELSE 0 END) = 1`
fn boolean_reduction(reduction: Op, args: &[Expr]) -> Expr {
    let flags = Expr::call(Op::IfElse, [args, &[lit(1), lit(0)]].concat());
    Expr::call(Op::Equals, vec![Expr::call(reduction, vec![flags]), lit(1)])
}

fn all(args: &[Expr]) -> Expr {
    boolean_reduction(Op::Min, args)
}

fn any(args: &[Expr]) -> Expr {
    boolean_reduction(Op::Max, args)
}

fn notall(args: &[Expr]) -> Expr {
    Expr::call(Op::Not, vec![all(args)])
}

fn notany(args: &[Expr]) -> Expr {
    Expr::call(Op::Not, vec![any(args)])
}

#[derive(Debug, Clone, Default)]
pub struct RewriteSet {
    rules: HashMap<Op, RewriteRule>,
}

impl RewriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules HeavyDB needs.
    pub fn heavydb() -> Self {
        let rules = [
            RewriteRule {
                name: "floor_divide",
                target: Op::FloorDivide,
                arity: Arity::Exact(2),
                rewrite: floor_divide,
            },
            RewriteRule {
                name: "all",
                target: Op::All,
                arity: Arity::Exact(1),
                rewrite: all,
            },
            RewriteRule {
                name: "any",
                target: Op::Any,
                arity: Arity::Exact(1),
                rewrite: any,
            },
            RewriteRule {
                name: "notall",
                target: Op::NotAll,
                arity: Arity::Exact(1),
                rewrite: notall,
            },
            RewriteRule {
                name: "notany",
                target: Op::NotAny,
                arity: Arity::Exact(1),
                rewrite: notany,
            },
        ];
        Self {
            rules: rules.into_iter().map(|r| (r.target, r)).collect(),
        }
    }

    /// Register a rule, rejecting any that would let one rewrite trigger another.
    pub fn with_rule(mut self, rule: RewriteRule) -> Result<Self, SqlGenError> {
        let target = rule.target;
        let output = rule.sample_call();
        let retriggers = |op: Op| output.any_node(&|e| matches!(e, Expr::Call { op: o, .. } if *o == op));

        if retriggers(target) {
            return Err(SqlGenError::InvalidRewrite {
                rule: rule.name.to_string(),
                reason: format!("output contains its own target {}", target),
            });
        }
        if let Some(existing) = self.rules.keys().copied().find(|op| retriggers(*op)) {
            return Err(SqlGenError::InvalidRewrite {
                rule: rule.name.to_string(),
                reason: format!("output contains rewrite target {}", existing),
            });
        }
        if let Some(existing) = self.rules.values().find(|r| {
            r.target != target
                && r.sample_call()
                    .any_node(&|e| matches!(e, Expr::Call { op, .. } if *op == target))
        }) {
            return Err(SqlGenError::InvalidRewrite {
                rule: rule.name.to_string(),
                reason: format!("target is produced by rule '{}'", existing.name),
            });
        }

        self.rules.insert(target, rule);
        Ok(self)
    }

    /// Rewrite every matching node, children first.
    pub fn apply(&self, expr: &Expr) -> Expr {
        if self.rules.is_empty() {
            return expr.clone();
        }
        expr.transform_up(&mut |node| match &node {
            Expr::Call { op, args } => match self.rules.get(op) {
                Some(rule) if rule.arity.accepts(args.len()) => {
                    tracing::trace!(target: "sql_generator", rule = rule.name, "Applying rewrite");
                    (rule.rewrite)(args)
                }
                _ => node,
            },
            _ => node,
        })
    }
}
