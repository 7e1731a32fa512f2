use heavyai_sql::dialects::HeavyDbExprExt;
use heavyai_sql::ir::{lit, TableExpr, TemporalUnit};
use heavyai_sql::{Compiler, DataType, Schema};

fn points() -> TableExpr {
    TableExpr::table(
        "points",
        Schema::from_pairs([
            ("lon", DataType::Float64),
            ("lat", DataType::Float64),
            ("ts", DataType::Timestamp),
            ("label", DataType::String),
        ]),
    )
}

fn select_sql(exprs: Vec<heavyai_sql::ir::Expr>) -> String {
    let t = points();
    let sql = Compiler::heavydb().compile(&t.select(exprs)).unwrap();
    sql.strip_prefix("SELECT ")
        .and_then(|s| s.strip_suffix("\nFROM points"))
        .unwrap()
        .to_string()
}

#[test]
fn test_web_mercator_conversion() {
    let t = points();
    assert_eq!(
        select_sql(vec![
            t.col("lon").conv_4326_900913_x().name("mx"),
            t.col("lat").conv_4326_900913_y().name("my"),
        ]),
        "conv_4326_900913_x(lon) AS mx, conv_4326_900913_y(lat) AS my"
    );
}

#[test]
fn test_temporal_functions() {
    let t = points();
    assert_eq!(
        select_sql(vec![t.col("ts").date_truncate(TemporalUnit::Day).name("day")]),
        "DATE_TRUNC(DAY, ts) AS \"day\""
    );
    assert_eq!(
        select_sql(vec![t.col("ts").epoch_seconds().name("epoch")]),
        "CAST(EXTRACT(EPOCH FROM ts) AS INT) AS epoch"
    );
    assert_eq!(
        select_sql(vec![t.col("ts").year().name("y")]),
        "EXTRACT(YEAR FROM ts) AS y"
    );
}

#[test]
fn test_numeric_and_string_functions() {
    let t = points();
    assert_eq!(
        select_sql(vec![t.col("lon").truncate(2).name("lon2")]),
        "TRUNCATE(lon, 2) AS lon2"
    );
    assert_eq!(
        select_sql(vec![t.col("lat").log(Some(lit(2))).name("l")]),
        "LN(lat) / LN(2) AS l"
    );
    assert_eq!(
        select_sql(vec![t.col("label").substr(0, Some(lit(3))).name("prefix")]),
        "SUBSTRING(label, 1, 3) AS prefix"
    );
    assert_eq!(
        select_sql(vec![t.col("label").byte_length().name("bytes")]),
        "LENGTH(label) AS bytes"
    );
}

#[test]
fn test_membership_and_case() {
    let t = points();
    assert_eq!(
        select_sql(vec![t
            .col("label")
            .isin(vec![lit("a"), lit("b")])
            .name("known")]),
        "label IN ('a', 'b') AS known"
    );
    assert_eq!(
        select_sql(vec![t
            .col("lat")
            .gt(0)
            .if_else("north", "south")
            .name("hemisphere")]),
        "CASE WHEN lat > 0 THEN 'north' ELSE 'south' END AS hemisphere"
    );
}

#[test]
fn test_negating_negative_operand_avoids_line_comment() {
    let t = points();
    let sql = select_sql(vec![
        (-lit(-5)).name("x"),
        (-(t.col("lat"))).name("y"),
        (-(-(t.col("lon")))).name("z"),
    ]);
    assert!(!sql.contains("--"));
    assert_eq!(sql, "-(-5) AS x, -lat AS y, -(-lon) AS z");
}
