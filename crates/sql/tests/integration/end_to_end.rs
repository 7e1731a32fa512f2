use crate::common::*;
use crate::fixtures::*;

#[test]
fn test_filter_group_limit() {
    let t = simple();
    let expr = t
        .filter(vec![t.col("a").gt(5)])
        .group_by(vec![t.col("b")])
        .aggregate(vec![ir::count_star()])
        .limit(10, 0);

    with_compiler!(compiler, {
        let sql = assert_sql!(
            compiler,
            expr,
            "SELECT b, COUNT(*) AS \"count\"\nFROM t\nWHERE a > 5\nGROUP BY b\nLIMIT 10"
        );
        assert_parses(&sql);
    });
}

#[test]
fn test_table_scan() {
    with_compiler!(compiler, {
        assert_sql!(compiler, simple(), "SELECT *\nFROM t");
    });
}

#[test]
fn test_projection_with_expressions() {
    let t = users();
    let expr = t.select(vec![
        t.col("id"),
        (t.col("age") + 1).name("next_age"),
        t.col("name").lower().name("lname"),
    ]);

    with_compiler!(compiler, {
        let sql = assert_sql!(
            compiler,
            expr,
            "SELECT id, age + 1 AS next_age, LOWER(name) AS lname\nFROM users"
        );
        assert_parses(&sql);
    });
}

#[test]
fn test_multiple_predicates_are_parenthesised() {
    let t = users();
    let expr = t.filter(vec![t.col("age").ge(18), t.col("city").equals("Paris")]);

    with_compiler!(compiler, {
        assert_sql!(
            compiler,
            expr,
            "SELECT *\nFROM users\nWHERE (age >= 18) AND\n      (city = 'Paris')"
        );
    });
}

#[test]
fn test_limit_with_offset() {
    let t = simple();
    with_compiler!(compiler, {
        assert_sql!(compiler, t.limit(10, 5), "SELECT *\nFROM t\nLIMIT 10, 5");
        assert_sql!(compiler, t.limit(10, 0), "SELECT *\nFROM t\nLIMIT 10");
    });
}

#[test]
fn test_having_and_order_by_metric() {
    let t = simple();
    let agg = t
        .group_by(vec![t.col("b")])
        .having(vec![t.col("a").sum().gt(10)])
        .aggregate(vec![t.col("a").sum().name("total")]);
    let expr = agg.order_by(vec![agg.col("total").desc()]);

    with_compiler!(compiler, {
        let sql = assert_sql!(
            compiler,
            expr,
            "SELECT b, SUM(a) AS total\nFROM t\nGROUP BY b\nHAVING SUM(a) > 10\nORDER BY total DESC"
        );
        assert_parses(&sql);
    });
}

#[test]
fn test_having_without_group_keys_is_rejected() {
    let t = simple();
    let expr = t
        .group_by(vec![])
        .having(vec![t.col("a").sum().gt(10)])
        .aggregate(vec![t.col("a").sum().name("total")]);

    with_compiler!(compiler, {
        assert_eq!(
            compiler.compile(&expr).unwrap_err(),
            SqlGenError::UnsupportedExpr("HAVING requires at least one group key".to_string())
        );
    });

    // Without a HAVING predicate a keyless aggregate is fine.
    let plain = t.aggregate(vec![t.col("a").sum().name("total")]);
    with_compiler!(compiler, {
        assert_sql!(compiler, plain, "SELECT SUM(a) AS total\nFROM t");
    });
}

#[test]
fn test_filter_over_aggregate_becomes_derived_table() {
    let t = simple();
    let agg = t
        .group_by(vec![t.col("b")])
        .aggregate(vec![t.col("a").sum().name("total")]);
    let expr = agg.filter(vec![agg.col("total").gt(100)]);

    with_compiler!(compiler, {
        let sql = assert_sql!(
            compiler,
            expr,
            "SELECT *\nFROM (\n  SELECT b, SUM(a) AS total\n  FROM t\n  GROUP BY b\n) t0\nWHERE total > 100"
        );
        assert_parses(&sql);
    });
}

#[test]
fn test_nested_limits() {
    let t = simple();
    with_compiler!(compiler, {
        assert_sql!(
            compiler,
            t.limit(10, 0).limit(5, 0),
            "SELECT *\nFROM (\n  SELECT *\n  FROM t\n  LIMIT 10\n) t0\nLIMIT 5"
        );
    });
}

#[test]
fn test_distinct() {
    let t = users();
    with_compiler!(compiler, {
        assert_sql!(
            compiler,
            t.select(vec![t.col("city")]).distinct(),
            "SELECT DISTINCT city\nFROM users"
        );
    });
}

#[test]
fn test_raw_sql_source() {
    let q = TableExpr::sql(
        "SELECT a FROM t",
        heavyai_sql::Schema::from_pairs([("a", heavyai_sql::DataType::Int64)]),
    );
    let expr = q.filter(vec![q.col("a").gt(1)]);

    with_compiler!(compiler, {
        assert_sql!(
            compiler,
            expr,
            "SELECT *\nFROM (\n  SELECT a FROM t\n) t0\nWHERE a > 1"
        );
    });
}

#[test]
fn test_window_rank_is_zero_based() {
    let t = simple();
    let expr = t.select(vec![
        t.col("a"),
        ir::row_number()
            .over(WindowSpec::new().order_by(vec![t.col("a")]))
            .name("rn"),
        ir::rank()
            .over(
                WindowSpec::new()
                    .partition_by(vec![t.col("b")])
                    .order_by(vec![t.col("a").desc()]),
            )
            .name("r"),
    ]);

    with_compiler!(compiler, {
        assert_sql!(
            compiler,
            expr,
            "SELECT a, (ROW_NUMBER() OVER (ORDER BY a) - 1) AS rn,\n       (RANK() OVER (PARTITION BY b ORDER BY a DESC) - 1) AS r\nFROM t"
        );
    });
}

#[test]
fn test_rewrites_apply_inside_queries() {
    let t = orders();
    let expr = t.aggregate(vec![
        t.col("flag").all().name("all_flag"),
        t.col("amount").floor_div(2).sum().name("halves"),
    ]);

    with_compiler!(compiler, {
        assert_sql!(
            compiler,
            expr,
            "SELECT MIN(CASE WHEN flag THEN 1 ELSE 0 END) = 1 AS all_flag,\n       SUM(FLOOR(amount / 2)) AS halves\nFROM orders"
        );
    });
}

#[test]
fn test_always_alias() {
    let t = simple();
    with_compiler!(compiler, |dialect| dialect.with_always_alias(true), {
        assert_sql!(
            compiler,
            t.select(vec![t.col("a")]),
            "SELECT t0.a AS a\nFROM t t0"
        );
    });
}

#[test]
fn test_long_select_list_wraps() {
    let t = TableExpr::table(
        "wide",
        heavyai_sql::Schema::from_pairs(
            (0..8).map(|i| (format!("a_fairly_long_column_name_{i}"), heavyai_sql::DataType::Int64)),
        ),
    );
    let expr = t.select(t.columns().into_iter().map(|c| t.col(c)).collect());

    with_compiler!(compiler, {
        let sql = compiler.compile(&expr).unwrap();
        let select = sql.split("\nFROM").next().unwrap();
        assert!(select.contains(",\n       a_fairly_long_column_name_"));
        for line in select.lines() {
            assert!(line.len() <= 70, "line too long: {line}");
        }
        assert_parses(&sql);
    });
}

#[test]
fn test_reserved_names_are_quoted() {
    let t = TableExpr::table(
        "select",
        heavyai_sql::Schema::from_pairs([("from", heavyai_sql::DataType::Int64)]),
    );
    with_compiler!(compiler, {
        assert_sql!(
            compiler,
            t.select(vec![t.col("from").name("user")]),
            "SELECT \"from\" AS \"user\"\nFROM \"select\""
        );
    });
}

#[test]
fn test_generate_maps_to_coded_error() {
    let t = simple();
    let err = Compiler::heavydb()
        .generate(&t.union(&t, false))
        .unwrap_err();
    assert_eq!(err.code, heavyai_error::ErrorCode::UnsupportedStatement);
    assert!(err.message.contains("Union"));
}
