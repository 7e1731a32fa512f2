use std::fmt;

/// Every operation an expression node can carry.
///
/// Whether an operation is translatable depends on the dialect's registry; some kinds
/// (`FloorDivide`, `All`, ...) only exist to be rewritten before translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulus,
    Power,
    Negate,

    // Comparison
    Equals,
    NotEquals,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Between,
    InList,
    NotInList,
    IsNull,
    NotNull,

    // Logical
    And,
    Or,
    Not,
    Xor,

    // Conditional
    IfElse,
    SearchedCase,
    Coalesce,
    NullIf,
    IfNull,
    Greatest,
    Least,

    // Math
    Abs,
    Ceil,
    Floor,
    Exp,
    Ln,
    Log10,
    Log,
    Sqrt,
    Round,
    Sign,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Cot,
    Degrees,
    Radians,
    Pi,
    NumericTruncate,

    // Strings
    StringLength,
    ByteLength,
    Lowercase,
    Uppercase,
    Strip,
    LStrip,
    RStrip,
    Substring,
    StringConcat,
    Like,
    ILike,
    RegexSearch,
    RegexReplace,

    // Temporal
    ExtractYear,
    ExtractQuarter,
    ExtractMonth,
    ExtractWeek,
    ExtractDay,
    ExtractDayOfWeek,
    ExtractDayOfYear,
    ExtractHour,
    ExtractMinute,
    ExtractSecond,
    ExtractMillisecond,
    ExtractEpochSeconds,
    DateTruncate,
    DateDiff,
    DateAdd,
    Now,

    // Reductions
    Count,
    CountStar,
    CountDistinct,
    ApproxCountDistinct,
    Sum,
    Mean,
    Min,
    Max,
    StdDevSamp,
    StdDevPop,
    VarSamp,
    VarPop,
    Corr,
    CovarSamp,
    CovarPop,
    Arbitrary,
    All,
    Any,
    NotAll,
    NotAny,

    // Analytic
    RowNumber,
    MinRank,
    DenseRank,
    PercentRank,
    CumeDist,
    NTile,
    Lag,
    Lead,
    FirstValue,
    LastValue,

    // Web-mercator conversion
    Conv4326To900913X,
    Conv4326To900913Y,

    // Geospatial
    GeoArea,
    GeoPerimeter,
    GeoLength,
    GeoDistance,
    GeoMaxDistance,
    GeoContains,
    GeoIntersects,
    GeoWithin,
    GeoDisjoint,
    GeoDWithin,
    GeoX,
    GeoY,
    GeoXMin,
    GeoXMax,
    GeoYMin,
    GeoYMax,
    GeoStartPoint,
    GeoEndPoint,
    GeoPointN,
    GeoNPoints,
    GeoNRings,
    GeoSrid,
    GeoSetSrid,
    GeoTransform,
    GeoPoint,
}

impl Op {
    pub fn is_reduction(&self) -> bool {
        matches!(
            self,
            Op::Count
                | Op::CountStar
                | Op::CountDistinct
                | Op::ApproxCountDistinct
                | Op::Sum
                | Op::Mean
                | Op::Min
                | Op::Max
                | Op::StdDevSamp
                | Op::StdDevPop
                | Op::VarSamp
                | Op::VarPop
                | Op::Corr
                | Op::CovarSamp
                | Op::CovarPop
                | Op::Arbitrary
                | Op::All
                | Op::Any
                | Op::NotAll
                | Op::NotAny
        )
    }

    /// Operations that are only valid inside a window (`OVER (...)`).
    pub fn is_analytic(&self) -> bool {
        matches!(
            self,
            Op::RowNumber
                | Op::MinRank
                | Op::DenseRank
                | Op::PercentRank
                | Op::CumeDist
                | Op::NTile
                | Op::Lag
                | Op::Lead
                | Op::FirstValue
                | Op::LastValue
        )
    }

    /// Ranks counted from 0 on the host side but from 1 by HeavyDB.
    pub fn is_zero_based_rank(&self) -> bool {
        matches!(
            self,
            Op::RowNumber | Op::MinRank | Op::DenseRank | Op::NTile
        )
    }

    /// Output name of a call when no explicit name was given.
    ///
    /// Elementwise operations inherit their first argument's name instead.
    pub fn default_name(&self) -> Option<&'static str> {
        let name = match self {
            Op::Count | Op::CountStar => "count",
            Op::CountDistinct => "nunique",
            Op::ApproxCountDistinct => "approx_nunique",
            Op::Sum => "sum",
            Op::Mean => "mean",
            Op::Min => "min",
            Op::Max => "max",
            Op::StdDevSamp | Op::StdDevPop => "std",
            Op::VarSamp | Op::VarPop => "var",
            Op::Corr => "corr",
            Op::CovarSamp | Op::CovarPop => "cov",
            Op::Arbitrary => "arbitrary",
            Op::All => "all",
            Op::Any => "any",
            Op::NotAll => "notall",
            Op::NotAny => "notany",
            Op::RowNumber => "row_number",
            Op::MinRank => "rank",
            Op::DenseRank => "dense_rank",
            Op::PercentRank => "percent_rank",
            Op::CumeDist => "cume_dist",
            Op::NTile => "ntile",
            Op::Pi => "pi",
            Op::Now => "now",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Units accepted by truncation, difference and interval operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl TemporalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalUnit::Year => "YEAR",
            TemporalUnit::Quarter => "QUARTER",
            TemporalUnit::Month => "MONTH",
            TemporalUnit::Week => "WEEK",
            TemporalUnit::Day => "DAY",
            TemporalUnit::Hour => "HOUR",
            TemporalUnit::Minute => "MINUTE",
            TemporalUnit::Second => "SECOND",
            TemporalUnit::Millisecond => "MILLISECOND",
        }
    }
}

impl fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
