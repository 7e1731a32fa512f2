use heavyai_sql::ir::TableExpr;
use heavyai_sql::{DataType, Schema};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

#[allow(dead_code)]
pub fn users() -> TableExpr {
    TableExpr::table(
        "users",
        Schema::from_pairs([
            ("id", DataType::Int64),
            ("name", DataType::String),
            ("city", DataType::String),
            ("age", DataType::Int32),
        ]),
    )
}

#[allow(dead_code)]
pub fn orders() -> TableExpr {
    TableExpr::table(
        "orders",
        Schema::from_pairs([
            ("id", DataType::Int64),
            ("user_id", DataType::Int64),
            ("amount", DataType::Float64),
            ("flag", DataType::Boolean),
        ]),
    )
}

/// Single table `t(a BIGINT, b TEXT)`.
#[allow(dead_code)]
pub fn simple() -> TableExpr {
    TableExpr::table(
        "t",
        Schema::from_pairs([("a", DataType::Int64), ("b", DataType::String)]),
    )
}

/// Panics unless `sql` is a single statement a generic SQL parser accepts.
#[allow(dead_code)]
pub fn assert_parses(sql: &str) {
    let statements = Parser::parse_sql(&GenericDialect {}, sql)
        .unwrap_or_else(|e| panic!("generated SQL does not parse: {e}\n{sql}"));
    assert_eq!(statements.len(), 1, "expected one statement:\n{sql}");
}
