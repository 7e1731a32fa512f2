use heavyai_sql::ir::{lit, Expr, Op, TableExpr};
use heavyai_sql::optimizer::{RewriteRule, RewriteSet};
use heavyai_sql::dialects::Arity;
use heavyai_sql::{DataType, Schema, SqlGenError};
use proptest::prelude::*;

fn table() -> TableExpr {
    TableExpr::table(
        "t",
        Schema::from_pairs([("x", DataType::Int64), ("flag", DataType::Boolean)]),
    )
}

fn contains_op(expr: &Expr, op: Op) -> bool {
    expr.any_node(&|e| matches!(e, Expr::Call { op: o, .. } if *o == op))
}

#[test]
fn test_nested_targets_are_all_replaced() {
    let t = table();
    let rewrites = RewriteSet::heavydb();
    let expr = (t.col("x").floor_div(2) + t.col("x").floor_div(3)).floor_div(4);

    let rewritten = rewrites.apply(&expr);
    assert!(!contains_op(&rewritten, Op::FloorDivide));
    assert!(contains_op(&rewritten, Op::Floor));
}

#[test]
fn test_rewrite_keeps_alias() {
    let t = table();
    let rewritten = RewriteSet::heavydb().apply(&t.col("flag").notany().name("none_set"));
    assert_eq!(rewritten.output_name().as_deref(), Some("none_set"));
    assert!(!contains_op(&rewritten, Op::NotAny));
}

#[test]
fn test_custom_rule_that_retriggers_is_refused() {
    fn loops(args: &[Expr]) -> Expr {
        Expr::call(Op::Abs, vec![Expr::call(Op::FloorDivide, args.to_vec())])
    }
    let err = RewriteSet::heavydb()
        .with_rule(RewriteRule {
            name: "abs_floor_div",
            target: Op::Abs,
            arity: Arity::Exact(1),
            rewrite: loops,
        })
        .unwrap_err();
    assert!(matches!(err, SqlGenError::InvalidRewrite { .. }));
}

proptest! {
    #[test]
    fn prop_rewrites_are_idempotent(depth in 1usize..6, divisor in 1i64..100) {
        let t = table();
        let mut expr = t.col("x");
        for _ in 0..depth {
            expr = expr.floor_div(divisor) + lit(1);
        }
        let rewrites = RewriteSet::heavydb();
        let once = rewrites.apply(&expr);
        prop_assert_eq!(rewrites.apply(&once), once.clone());
        prop_assert!(!contains_op(&once, Op::FloorDivide));
    }
}
