//! Relational expression trees handed to the compiler.
//!
//! Trees are immutable once built. Relations are shared through `Arc`, and a column
//! reference remembers the exact relation it was taken from, which is what the compiler
//! uses to pick the right table alias.

mod ops;
mod table;

pub use ops::{Op, TemporalUnit};
pub use table::{GroupedTable, JoinKind, Relation, TableExpr};

use crate::types::DataType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Interval { value: i64, unit: TemporalUnit },
    Geo { wkt: String, srid: Option<i32> },
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v as i64)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<NaiveDate> for Literal {
    fn from(v: NaiveDate) -> Self {
        Literal::Date(v)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(v: NaiveDateTime) -> Self {
        Literal::Timestamp(v)
    }
}

/// A named column of a specific relation.
#[derive(Clone)]
pub struct ColumnRef {
    pub relation: Arc<Relation>,
    pub name: String,
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.relation, &other.relation) && self.name == other.name
    }
}

impl fmt::Debug for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.relation.kind_name(), self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            FrameBound::Preceding(n) => write!(f, "{} PRECEDING", n),
            FrameBound::CurrentRow => write!(f, "CURRENT ROW"),
            FrameBound::Following(n) => write!(f, "{} FOLLOWING", n),
            FrameBound::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: FrameBound,
}

impl fmt::Display for WindowFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = match self.units {
            FrameUnits::Rows => "ROWS",
            FrameUnits::Range => "RANGE",
        };
        write!(f, "{} BETWEEN {} AND {}", units, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: Expr,
    pub ascending: bool,
}

impl From<Expr> for SortKey {
    fn from(expr: Expr) -> Self {
        SortKey {
            expr,
            ascending: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<SortKey>,
    pub frame: Option<WindowFrame>,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by(mut self, keys: Vec<Expr>) -> Self {
        self.partition_by = keys;
        self
    }

    pub fn order_by<K: Into<SortKey>>(mut self, keys: Vec<K>) -> Self {
        self.order_by = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn rows(mut self, start: FrameBound, end: FrameBound) -> Self {
        self.frame = Some(WindowFrame {
            units: FrameUnits::Rows,
            start,
            end,
        });
        self
    }

    pub fn range(mut self, start: FrameBound, end: FrameBound) -> Self {
        self.frame = Some(WindowFrame {
            units: FrameUnits::Range,
            start,
            end,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
    Call { op: Op, args: Vec<Expr> },
    Cast { arg: Box<Expr>, to: DataType },
    Alias { expr: Box<Expr>, name: String },
    Window { func: Box<Expr>, spec: WindowSpec },
    Udf {
        name: String,
        args: Vec<Expr>,
        output: DataType,
    },
}

macro_rules! literal_into_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(v: $ty) -> Self {
                    Expr::Literal(v.into())
                }
            }
        )*
    };
}

literal_into_expr!(bool, i32, i64, f64, &str, String, NaiveDate, NaiveDateTime, Literal);

pub fn lit(v: impl Into<Literal>) -> Expr {
    Expr::Literal(v.into())
}

pub fn null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// `COUNT(*)`, projected as `count`.
pub fn count_star() -> Expr {
    Expr::call(Op::CountStar, vec![])
}

pub fn row_number() -> Expr {
    Expr::call(Op::RowNumber, vec![])
}

pub fn rank() -> Expr {
    Expr::call(Op::MinRank, vec![])
}

pub fn dense_rank() -> Expr {
    Expr::call(Op::DenseRank, vec![])
}

pub fn percent_rank() -> Expr {
    Expr::call(Op::PercentRank, vec![])
}

pub fn cume_dist() -> Expr {
    Expr::call(Op::CumeDist, vec![])
}

pub fn ntile(buckets: i64) -> Expr {
    Expr::call(Op::NTile, vec![lit(buckets)])
}

pub fn now() -> Expr {
    Expr::call(Op::Now, vec![])
}

pub fn pi() -> Expr {
    Expr::call(Op::Pi, vec![])
}

/// `CASE WHEN c1 THEN v1 ... [ELSE default] END`.
pub fn case(branches: Vec<(Expr, Expr)>, default: Option<Expr>) -> Expr {
    let mut args: Vec<Expr> = branches
        .into_iter()
        .flat_map(|(when, then)| [when, then])
        .collect();
    args.extend(default);
    Expr::call(Op::SearchedCase, args)
}

pub fn coalesce(args: Vec<Expr>) -> Expr {
    Expr::call(Op::Coalesce, args)
}

pub fn greatest(args: Vec<Expr>) -> Expr {
    Expr::call(Op::Greatest, args)
}

pub fn least(args: Vec<Expr>) -> Expr {
    Expr::call(Op::Least, args)
}

macro_rules! unary_methods {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $name(&self) -> Expr {
                Expr::call(Op::$op, vec![self.clone()])
            }
        )*
    };
}

macro_rules! binary_methods {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $name(&self, other: impl Into<Expr>) -> Expr {
                Expr::call(Op::$op, vec![self.clone(), other.into()])
            }
        )*
    };
}

impl Expr {
    pub fn call(op: Op, args: Vec<Expr>) -> Expr {
        Expr::Call { op, args }
    }

    /// Attach an explicit output name.
    pub fn name(self, name: impl Into<String>) -> Expr {
        let expr = match self {
            Expr::Alias { expr, .. } => expr,
            other => Box::new(other),
        };
        Expr::Alias {
            expr,
            name: name.into(),
        }
    }

    pub fn cast(&self, to: DataType) -> Expr {
        Expr::Cast {
            arg: Box::new(self.clone()),
            to,
        }
    }

    pub fn over(&self, spec: WindowSpec) -> Expr {
        Expr::Window {
            func: Box::new(self.clone()),
            spec,
        }
    }

    pub fn asc(&self) -> SortKey {
        SortKey {
            expr: self.clone(),
            ascending: true,
        }
    }

    pub fn desc(&self) -> SortKey {
        SortKey {
            expr: self.clone(),
            ascending: false,
        }
    }

    binary_methods! {
        equals => Equals,
        not_equals => NotEquals,
        gt => Greater,
        ge => GreaterEqual,
        lt => Less,
        le => LessEqual,
        and => And,
        or => Or,
        xor => Xor,
        floor_div => FloorDivide,
        pow => Power,
        like => Like,
        ilike => ILike,
        re_search => RegexSearch,
        concat => StringConcat,
        nullif => NullIf,
        fill_null => IfNull,
        atan2 => Atan2,
    }

    unary_methods! {
        is_null => IsNull,
        not_null => NotNull,
        abs => Abs,
        ceil => Ceil,
        floor => Floor,
        exp => Exp,
        ln => Ln,
        log10 => Log10,
        sqrt => Sqrt,
        sign => Sign,
        sin => Sin,
        cos => Cos,
        tan => Tan,
        asin => Asin,
        acos => Acos,
        atan => Atan,
        cot => Cot,
        degrees => Degrees,
        radians => Radians,
        length => StringLength,
        lower => Lowercase,
        upper => Uppercase,
        strip => Strip,
        lstrip => LStrip,
        rstrip => RStrip,
        year => ExtractYear,
        quarter => ExtractQuarter,
        month => ExtractMonth,
        week_of_year => ExtractWeek,
        day => ExtractDay,
        day_of_week => ExtractDayOfWeek,
        day_of_year => ExtractDayOfYear,
        hour => ExtractHour,
        minute => ExtractMinute,
        second => ExtractSecond,
        millisecond => ExtractMillisecond,
        epoch_seconds => ExtractEpochSeconds,
        count => Count,
        nunique => CountDistinct,
        approx_nunique => ApproxCountDistinct,
        sum => Sum,
        mean => Mean,
        min => Min,
        max => Max,
        std => StdDevSamp,
        std_pop => StdDevPop,
        var => VarSamp,
        var_pop => VarPop,
        arbitrary => Arbitrary,
        all => All,
        any => Any,
        notall => NotAll,
        notany => NotAny,
        first => FirstValue,
        last => LastValue,
        st_area => GeoArea,
        st_perimeter => GeoPerimeter,
        st_length => GeoLength,
        st_x => GeoX,
        st_y => GeoY,
        st_xmin => GeoXMin,
        st_xmax => GeoXMax,
        st_ymin => GeoYMin,
        st_ymax => GeoYMax,
        st_startpoint => GeoStartPoint,
        st_endpoint => GeoEndPoint,
        st_npoints => GeoNPoints,
        st_nrings => GeoNRings,
        st_srid => GeoSrid,
    }

    binary_methods! {
        st_distance => GeoDistance,
        st_maxdistance => GeoMaxDistance,
        st_contains => GeoContains,
        st_intersects => GeoIntersects,
        st_within => GeoWithin,
        st_disjoint => GeoDisjoint,
        st_pointn => GeoPointN,
        st_setsrid => GeoSetSrid,
        st_transform => GeoTransform,
        corr => Corr,
        cov => CovarSamp,
    }

    pub fn st_dwithin(&self, other: impl Into<Expr>, distance: impl Into<Expr>) -> Expr {
        Expr::call(
            Op::GeoDWithin,
            vec![self.clone(), other.into(), distance.into()],
        )
    }

    pub fn between(&self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::call(Op::Between, vec![self.clone(), low.into(), high.into()])
    }

    pub fn isin(&self, values: Vec<Expr>) -> Expr {
        let mut args = vec![self.clone()];
        args.extend(values);
        Expr::call(Op::InList, args)
    }

    pub fn notin(&self, values: Vec<Expr>) -> Expr {
        let mut args = vec![self.clone()];
        args.extend(values);
        Expr::call(Op::NotInList, args)
    }

    pub fn if_else(&self, then: impl Into<Expr>, otherwise: impl Into<Expr>) -> Expr {
        Expr::call(Op::IfElse, vec![self.clone(), then.into(), otherwise.into()])
    }

    pub fn log(&self, base: Option<Expr>) -> Expr {
        let mut args = vec![self.clone()];
        args.extend(base);
        Expr::call(Op::Log, args)
    }

    pub fn round(&self, digits: Option<i64>) -> Expr {
        let mut args = vec![self.clone()];
        args.extend(digits.map(lit));
        Expr::call(Op::Round, args)
    }

    /// Substring with a 0-based `start`.
    pub fn substr(&self, start: impl Into<Expr>, length: Option<Expr>) -> Expr {
        let mut args = vec![self.clone(), start.into()];
        args.extend(length);
        Expr::call(Op::Substring, args)
    }

    pub fn date_truncate(&self, unit: TemporalUnit) -> Expr {
        Expr::call(Op::DateTruncate, vec![self.clone(), lit(unit.as_str())])
    }

    /// Difference `self - start` counted in `unit`.
    pub fn delta(&self, start: impl Into<Expr>, unit: TemporalUnit) -> Expr {
        Expr::call(
            Op::DateDiff,
            vec![lit(unit.as_str()), start.into(), self.clone()],
        )
    }

    pub fn date_add(&self, amount: impl Into<Expr>, unit: TemporalUnit) -> Expr {
        Expr::call(
            Op::DateAdd,
            vec![lit(unit.as_str()), amount.into(), self.clone()],
        )
    }

    pub fn lag(&self, offset: Option<i64>) -> Expr {
        let mut args = vec![self.clone()];
        args.extend(offset.map(lit));
        Expr::call(Op::Lag, args)
    }

    pub fn lead(&self, offset: Option<i64>) -> Expr {
        let mut args = vec![self.clone()];
        args.extend(offset.map(lit));
        Expr::call(Op::Lead, args)
    }

    /// Name this expression projects as when no explicit name was given.
    pub fn output_name(&self) -> Option<String> {
        match self {
            Expr::Column(col) => Some(col.name.clone()),
            Expr::Alias { name, .. } => Some(name.clone()),
            Expr::Call { op, args } => match op.default_name() {
                Some(name) => Some(name.to_string()),
                None => args.first().and_then(Expr::output_name),
            },
            Expr::Cast { arg, .. } => arg.output_name(),
            Expr::Window { func, .. } => func.output_name(),
            Expr::Udf { name, .. } => Some(name.clone()),
            Expr::Literal(_) => None,
        }
    }

    /// Direct sub-expressions, including window partition and order keys.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Column(_) | Expr::Literal(_) => vec![],
            Expr::Call { args, .. } | Expr::Udf { args, .. } => args.iter().collect(),
            Expr::Cast { arg, .. } => vec![arg.as_ref()],
            Expr::Alias { expr, .. } => vec![expr.as_ref()],
            Expr::Window { func, spec } => std::iter::once(func.as_ref())
                .chain(spec.partition_by.iter())
                .chain(spec.order_by.iter().map(|k| &k.expr))
                .collect(),
        }
    }

    /// True if any node of the tree satisfies `pred`.
    pub fn any_node(&self, pred: &dyn Fn(&Expr) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|c| c.any_node(pred))
    }

    /// Rebuild the tree bottom-up, applying `f` to every node after its children.
    pub fn transform_up(&self, f: &mut dyn FnMut(Expr) -> Expr) -> Expr {
        let rebuilt = match self {
            Expr::Column(_) | Expr::Literal(_) => self.clone(),
            Expr::Call { op, args } => Expr::Call {
                op: *op,
                args: args.iter().map(|a| a.transform_up(f)).collect(),
            },
            Expr::Udf { name, args, output } => Expr::Udf {
                name: name.clone(),
                args: args.iter().map(|a| a.transform_up(f)).collect(),
                output: output.clone(),
            },
            Expr::Cast { arg, to } => Expr::Cast {
                arg: Box::new(arg.transform_up(f)),
                to: to.clone(),
            },
            Expr::Alias { expr, name } => Expr::Alias {
                expr: Box::new(expr.transform_up(f)),
                name: name.clone(),
            },
            Expr::Window { func, spec } => Expr::Window {
                func: Box::new(func.transform_up(f)),
                spec: WindowSpec {
                    partition_by: spec
                        .partition_by
                        .iter()
                        .map(|p| p.transform_up(f))
                        .collect(),
                    order_by: spec
                        .order_by
                        .iter()
                        .map(|k| SortKey {
                            expr: k.expr.transform_up(f),
                            ascending: k.ascending,
                        })
                        .collect(),
                    frame: spec.frame.clone(),
                },
            },
        };
        f(rebuilt)
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:ident) => {
        impl<T: Into<Expr>> std::ops::$trait<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                Expr::call(Op::$op, vec![self, rhs.into()])
            }
        }
    };
}

binary_operator!(Add, add, Add);
binary_operator!(Sub, sub, Subtract);
binary_operator!(Mul, mul, Multiply);
binary_operator!(Div, div, Divide);
binary_operator!(Rem, rem, Modulus);

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::call(Op::Negate, vec![self])
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::call(Op::Not, vec![self])
    }
}
