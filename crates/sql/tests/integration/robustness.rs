use crate::common::*;
use crate::fixtures::*;
use heavyai_sql::ir::Op;
use heavyai_sql::{DataType, Schema};
use proptest::prelude::*;

const UNION_MESSAGE: &str = "HeavyDB backend doesn't support Union operation";

#[test]
fn test_union_is_rejected_anywhere_in_tree() {
    let t = simple();
    let u = users();
    let o = orders();
    let unioned = u.union(&u, true);

    with_compiler!(compiler, {
        for expr in [
            t.union(&t, false),
            t.union(&t, false).limit(5, 0),
            unioned.inner_join(&o, vec![u.col("id").equals(o.col("user_id"))]),
        ] {
            assert_eq!(
                compiler.compile(&expr).unwrap_err(),
                SqlGenError::UnsupportedStatement(UNION_MESSAGE.to_string())
            );
        }
    });
}

#[test]
fn test_arity_mismatch() {
    let t = simple();
    let expr = t.select(vec![Expr::call(Op::Abs, vec![]).name("x")]);

    with_compiler!(compiler, {
        assert_eq!(
            compiler.compile(&expr).unwrap_err(),
            SqlGenError::ArityMismatch {
                function: "Abs".to_string(),
                expected: "1".to_string(),
                actual: 0,
            }
        );
    });
}

#[test]
fn test_unknown_column() {
    let t = simple();
    with_compiler!(compiler, {
        match compiler.compile(&t.select(vec![t.col("missing")])) {
            Err(SqlGenError::ColumnNotFound { column, available }) => {
                assert_eq!(column, "missing");
                assert_eq!(available, vec!["a", "b"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    });
}

#[test]
fn test_foreign_column_with_shared_name_is_ambiguous() {
    let u = users();
    let o = orders();
    let stranger = TableExpr::table("x", Schema::from_pairs([("id", DataType::Int64)]));
    let expr = u
        .inner_join(&o, vec![u.col("id").equals(o.col("user_id"))])
        .select(vec![stranger.col("id")]);

    with_compiler!(compiler, {
        match compiler.compile(&expr) {
            Err(SqlGenError::AmbiguousColumn { name, .. }) => assert_eq!(name, "id"),
            other => panic!("unexpected result: {other:?}"),
        }
    });
}

#[test]
fn test_analytic_function_needs_window() {
    let t = simple();
    with_compiler!(compiler, {
        assert!(matches!(
            compiler.compile(&t.select(vec![ir::row_number().name("rn")])),
            Err(SqlGenError::UnsupportedExpr(_))
        ));
    });
}

#[test]
fn test_non_finite_literal_is_rejected() {
    let t = simple();
    with_compiler!(compiler, {
        assert!(matches!(
            compiler.compile(&t.filter(vec![t.col("a").gt(f64::INFINITY)])),
            Err(SqlGenError::UnsupportedExpr(_))
        ));
    });
}

#[test]
fn test_recursion_limit_from_config() {
    let mut nested = simple();
    for _ in 0..10 {
        nested = nested.limit(100, 0).distinct();
    }

    with_compiler!(compiler, |dialect| dialect.with_max_depth(4), {
        assert_eq!(
            compiler.compile(&nested).unwrap_err(),
            SqlGenError::MaxRecursion(4)
        );
    });
    with_compiler!(compiler, {
        assert!(compiler.compile(&nested).is_ok());
    });
}

#[tokio::test]
async fn test_shared_compiler_across_tasks() {
    let compiler = Arc::new(Compiler::heavydb());
    let u = users();
    let o = orders();
    let expr = u
        .inner_join(&o, vec![u.col("id").equals(o.col("user_id"))])
        .group_by(vec![u.col("city")])
        .aggregate(vec![o.col("amount").mean().name("avg_amount")]);
    let expected = compiler.compile(&expr).unwrap();

    let mut tasks = vec![];
    for _ in 0..32 {
        let compiler = compiler.clone();
        let expr = expr.clone();
        tasks.push(tokio::spawn(async move { compiler.compile(&expr) }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), expected);
    }
}

proptest! {
    #[test]
    fn prop_compilation_is_deterministic(
        threshold in -1000i64..1000,
        n in 1u64..500,
        offset in 0u64..50,
        distinct in any::<bool>(),
        grouped in any::<bool>(),
    ) {
        let t = users();
        let mut expr = t.filter(vec![t.col("age").gt(threshold)]);
        if grouped {
            expr = expr
                .group_by(vec![t.col("city")])
                .aggregate(vec![t.col("age").max().name("oldest")]);
        }
        if distinct {
            expr = expr.distinct();
        }
        let expr = expr.limit(n, offset);

        let first = Compiler::heavydb().compile(&expr).unwrap();
        let second = Compiler::heavydb().compile(&expr).unwrap();
        prop_assert_eq!(&first, &second);
        let expected_limit = if offset == 0 {
            format!("LIMIT {}", n)
        } else {
            format!("LIMIT {}, {}", n, offset)
        };
        prop_assert!(first.ends_with(&expected_limit));
    }
}
