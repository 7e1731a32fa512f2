//! HeavyDB Dialect
//!
//! Operator rules for HeavyDB (formerly OmniSciDB / MapD), plus the value methods
//! that only exist in this dialect.

use super::registry::{operand, Arity, OperatorRegistry};
use crate::ir::{Expr, Op};
use std::sync::{Arc, OnceLock};

/// Shared, lazily built HeavyDB registry.
pub fn heavydb_registry() -> Arc<OperatorRegistry> {
    static REGISTRY: OnceLock<Arc<OperatorRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| Arc::new(heavydb_operator_rules()))
        .clone()
}

fn extract(field: &'static str) -> impl Fn(&[String]) -> String + Send + Sync + 'static {
    move |args| format!("EXTRACT({} FROM {})", field, operand(args, 0))
}

/// `'DAY'` as rendered by the literal formatter becomes the bare keyword `DAY`.
fn unit_keyword(rendered: &str) -> String {
    rendered.trim_matches('\'').to_ascii_uppercase()
}

/// HeavyDB expects 1-based substring positions.
fn one_based(start: &str) -> String {
    match start.parse::<i64>().ok().and_then(|n| n.checked_add(1)) {
        Some(n) => n.to_string(),
        None => format!("({} + 1)", start),
    }
}

/// `-` directly before a negative operand would open a `--` line comment.
fn negate(args: &[String]) -> String {
    let x = operand(args, 0);
    if x.starts_with('-') {
        format!("-({})", x)
    } else {
        format!("-{}", x)
    }
}

/// Comprehensive HeavyDB operator rules
pub fn heavydb_operator_rules() -> OperatorRegistry {
    OperatorRegistry::new()
        // ========================================
        // Arithmetic
        // ========================================
        .infix(Op::Add, "+")
        .infix(Op::Subtract, "-")
        .infix(Op::Multiply, "*")
        .infix(Op::Divide, "/")
        .infix(Op::Modulus, "%")
        .transform_operands(Op::Negate, Arity::Exact(1), negate)
        .function(Op::Power, "POWER", Arity::Exact(2))
        // ========================================
        // Comparison
        // ========================================
        .infix(Op::Equals, "=")
        .infix(Op::NotEquals, "<>")
        .infix(Op::Greater, ">")
        .infix(Op::GreaterEqual, ">=")
        .infix(Op::Less, "<")
        .infix(Op::LessEqual, "<=")
        .transform_operands(Op::Between, Arity::Exact(3), |args| {
            format!(
                "{} BETWEEN {} AND {}",
                operand(args, 0),
                operand(args, 1),
                operand(args, 2)
            )
        })
        .transform_operands(Op::InList, Arity::AtLeast(2), |args| {
            format!("{} IN ({})", operand(args, 0), args[1..].join(", "))
        })
        .transform_operands(Op::NotInList, Arity::AtLeast(2), |args| {
            format!("{} NOT IN ({})", operand(args, 0), args[1..].join(", "))
        })
        .postfix(Op::IsNull, " IS NULL")
        .postfix(Op::NotNull, " IS NOT NULL")
        // ========================================
        // Logical
        // ========================================
        .infix(Op::And, "AND")
        .infix(Op::Or, "OR")
        .prefix(Op::Not, "NOT ")
        // ========================================
        // Conditionals
        // ========================================
        .transform(Op::IfElse, Arity::Exact(3), |args| {
            format!(
                "CASE WHEN {} THEN {} ELSE {} END",
                operand(args, 0),
                operand(args, 1),
                operand(args, 2)
            )
        })
        .transform(Op::SearchedCase, Arity::AtLeast(2), |args| {
            let mut sql = String::from("CASE");
            let mut pairs = args.chunks_exact(2);
            for pair in pairs.by_ref() {
                sql.push_str(&format!(" WHEN {} THEN {}", pair[0], pair[1]));
            }
            if let [default] = pairs.remainder() {
                sql.push_str(&format!(" ELSE {}", default));
            }
            sql.push_str(" END");
            sql
        })
        .function(Op::Coalesce, "COALESCE", Arity::AtLeast(1))
        .function(Op::IfNull, "COALESCE", Arity::Exact(2))
        .function(Op::NullIf, "NULLIF", Arity::Exact(2))
        .function(Op::Greatest, "GREATEST", Arity::AtLeast(1))
        .function(Op::Least, "LEAST", Arity::AtLeast(1))
        // ========================================
        // Math
        // ========================================
        .rename(Op::Abs, "ABS")
        .rename(Op::Ceil, "CEIL")
        .rename(Op::Floor, "FLOOR")
        .rename(Op::Exp, "EXP")
        .rename(Op::Ln, "LN")
        .rename(Op::Log10, "LOG10")
        .rename(Op::Sqrt, "SQRT")
        .rename(Op::Sign, "SIGN")
        .rename(Op::Sin, "SIN")
        .rename(Op::Cos, "COS")
        .rename(Op::Tan, "TAN")
        .rename(Op::Asin, "ASIN")
        .rename(Op::Acos, "ACOS")
        .rename(Op::Atan, "ATAN")
        .rename(Op::Cot, "COT")
        .rename(Op::Degrees, "DEGREES")
        .rename(Op::Radians, "RADIANS")
        .function(Op::Atan2, "ATAN2", Arity::Exact(2))
        .function(Op::Round, "ROUND", Arity::Range(1, 2))
        .function(Op::Pi, "PI", Arity::Exact(0))
        .function(Op::NumericTruncate, "TRUNCATE", Arity::Exact(2))
        .transform_operands(Op::Log, Arity::Range(1, 2), |args| match args {
            [x] => format!("LN({})", x),
            _ => format!("LN({}) / LN({})", operand(args, 0), operand(args, 1)),
        })
        // ========================================
        // Strings
        // ========================================
        .rename(Op::StringLength, "CHAR_LENGTH")
        .rename(Op::ByteLength, "LENGTH")
        .rename(Op::Lowercase, "LOWER")
        .rename(Op::Uppercase, "UPPER")
        .rename(Op::Strip, "TRIM")
        .rename(Op::LStrip, "LTRIM")
        .rename(Op::RStrip, "RTRIM")
        .transform(Op::Substring, Arity::Range(2, 3), |args| match args {
            [s, start] => format!("SUBSTRING({}, {})", s, one_based(start)),
            _ => format!(
                "SUBSTRING({}, {}, {})",
                operand(args, 0),
                one_based(operand(args, 1)),
                operand(args, 2)
            ),
        })
        .infix(Op::StringConcat, "||")
        .infix(Op::Like, "LIKE")
        .infix(Op::ILike, "ILIKE")
        .function(Op::RegexSearch, "REGEXP_LIKE", Arity::Exact(2))
        // ========================================
        // Temporal
        // ========================================
        .transform(Op::ExtractYear, Arity::Exact(1), extract("YEAR"))
        .transform(Op::ExtractQuarter, Arity::Exact(1), extract("QUARTER"))
        .transform(Op::ExtractMonth, Arity::Exact(1), extract("MONTH"))
        .transform(Op::ExtractWeek, Arity::Exact(1), extract("WEEK"))
        .transform(Op::ExtractDay, Arity::Exact(1), extract("DAY"))
        .transform(Op::ExtractDayOfWeek, Arity::Exact(1), extract("DOW"))
        .transform(Op::ExtractDayOfYear, Arity::Exact(1), extract("DOY"))
        .transform(Op::ExtractHour, Arity::Exact(1), extract("HOUR"))
        .transform(Op::ExtractMinute, Arity::Exact(1), extract("MINUTE"))
        .transform(Op::ExtractSecond, Arity::Exact(1), extract("SECOND"))
        .transform(Op::ExtractMillisecond, Arity::Exact(1), extract("MILLISECOND"))
        .transform(Op::ExtractEpochSeconds, Arity::Exact(1), |args| {
            format!("CAST(EXTRACT(EPOCH FROM {}) AS INT)", operand(args, 0))
        })
        .transform(Op::DateTruncate, Arity::Exact(2), |args| {
            format!(
                "DATE_TRUNC({}, {})",
                unit_keyword(operand(args, 1)),
                operand(args, 0)
            )
        })
        .function(Op::DateDiff, "DATEDIFF", Arity::Exact(3))
        .function(Op::DateAdd, "DATEADD", Arity::Exact(3))
        .function(Op::Now, "NOW", Arity::Exact(0))
        // ========================================
        // Reductions
        // ========================================
        .rename(Op::Count, "COUNT")
        .transform(Op::CountStar, Arity::Exact(0), |_| "COUNT(*)".to_string())
        .transform(Op::CountDistinct, Arity::Exact(1), |args| {
            format!("COUNT(DISTINCT {})", operand(args, 0))
        })
        .rename(Op::ApproxCountDistinct, "APPROX_COUNT_DISTINCT")
        .rename(Op::Sum, "SUM")
        .rename(Op::Mean, "AVG")
        .rename(Op::Min, "MIN")
        .rename(Op::Max, "MAX")
        .rename(Op::StdDevSamp, "STDDEV_SAMP")
        .rename(Op::StdDevPop, "STDDEV_POP")
        .rename(Op::VarSamp, "VAR_SAMP")
        .rename(Op::VarPop, "VAR_POP")
        .function(Op::Corr, "CORR", Arity::Exact(2))
        .function(Op::CovarSamp, "COVAR_SAMP", Arity::Exact(2))
        .function(Op::CovarPop, "COVAR_POP", Arity::Exact(2))
        .rename(Op::Arbitrary, "SAMPLE")
        // ========================================
        // Analytic (rendered inside OVER)
        // ========================================
        .function(Op::RowNumber, "ROW_NUMBER", Arity::Exact(0))
        .function(Op::MinRank, "RANK", Arity::Exact(0))
        .function(Op::DenseRank, "DENSE_RANK", Arity::Exact(0))
        .function(Op::PercentRank, "PERCENT_RANK", Arity::Exact(0))
        .function(Op::CumeDist, "CUME_DIST", Arity::Exact(0))
        .rename(Op::NTile, "NTILE")
        .function(Op::Lag, "LAG", Arity::Range(1, 2))
        .function(Op::Lead, "LEAD", Arity::Range(1, 2))
        .rename(Op::FirstValue, "FIRST_VALUE")
        .rename(Op::LastValue, "LAST_VALUE")
        // ========================================
        // Web-mercator conversion
        // ========================================
        .rename(Op::Conv4326To900913X, "conv_4326_900913_x")
        .rename(Op::Conv4326To900913Y, "conv_4326_900913_y")
        // ========================================
        // Geospatial
        // ========================================
        .rename(Op::GeoArea, "ST_Area")
        .rename(Op::GeoPerimeter, "ST_Perimeter")
        .rename(Op::GeoLength, "ST_Length")
        .function(Op::GeoDistance, "ST_Distance", Arity::Exact(2))
        .function(Op::GeoMaxDistance, "ST_MaxDistance", Arity::Exact(2))
        .function(Op::GeoContains, "ST_Contains", Arity::Exact(2))
        .function(Op::GeoIntersects, "ST_Intersects", Arity::Exact(2))
        .function(Op::GeoWithin, "ST_Within", Arity::Exact(2))
        .function(Op::GeoDisjoint, "ST_Disjoint", Arity::Exact(2))
        .function(Op::GeoDWithin, "ST_DWithin", Arity::Exact(3))
        .rename(Op::GeoX, "ST_X")
        .rename(Op::GeoY, "ST_Y")
        .rename(Op::GeoXMin, "ST_XMin")
        .rename(Op::GeoXMax, "ST_XMax")
        .rename(Op::GeoYMin, "ST_YMin")
        .rename(Op::GeoYMax, "ST_YMax")
        .rename(Op::GeoStartPoint, "ST_StartPoint")
        .rename(Op::GeoEndPoint, "ST_EndPoint")
        .function(Op::GeoPointN, "ST_PointN", Arity::Exact(2))
        .rename(Op::GeoNPoints, "ST_NPoints")
        .rename(Op::GeoNRings, "ST_NRings")
        .rename(Op::GeoSrid, "ST_SRID")
        .function(Op::GeoSetSrid, "ST_SetSRID", Arity::Exact(2))
        .function(Op::GeoTransform, "ST_Transform", Arity::Exact(2))
        .function(Op::GeoPoint, "ST_Point", Arity::Exact(2))
}

/// Value methods that only HeavyDB understands.
pub trait HeavyDbExprExt {
    /// Longitude (EPSG:4326) to web-mercator x (EPSG:900913).
    fn conv_4326_900913_x(&self) -> Expr;
    /// Latitude (EPSG:4326) to web-mercator y (EPSG:900913).
    fn conv_4326_900913_y(&self) -> Expr;
    /// Truncate a number to `digits` decimal places.
    fn truncate(&self, digits: i64) -> Expr;
    /// Length in bytes rather than characters.
    fn byte_length(&self) -> Expr;
}

impl HeavyDbExprExt for Expr {
    fn conv_4326_900913_x(&self) -> Expr {
        Expr::call(Op::Conv4326To900913X, vec![self.clone()])
    }

    fn conv_4326_900913_y(&self) -> Expr {
        Expr::call(Op::Conv4326To900913Y, vec![self.clone()])
    }

    fn truncate(&self, digits: i64) -> Expr {
        Expr::call(Op::NumericTruncate, vec![self.clone(), digits.into()])
    }

    fn byte_length(&self) -> Expr {
        Expr::call(Op::ByteLength, vec![self.clone()])
    }
}

/// `ST_Point(x, y)`
pub fn st_point(x: impl Into<Expr>, y: impl Into<Expr>) -> Expr {
    Expr::call(Op::GeoPoint, vec![x.into(), y.into()])
}
