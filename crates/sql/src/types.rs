//! Type mapping between host value types and HeavyDB type names.
//!
//! Two vocabularies meet here: the wire-level names reported by the server for table
//! columns (`STR`, `BOOL`, `INT`, ...) which form a bijection with [`DataType`], and the
//! DDL/CAST names (`TEXT`, `BOOLEAN`, `DECIMAL(18, 9)`, ...) produced by
//! [`DataType::sql_type`].

use crate::sql_generator::error::SqlGenError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_DECIMAL_PRECISION: u8 = 18;
pub const DEFAULT_DECIMAL_SCALE: u8 = 9;

/// Host-side value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal { precision: u8, scale: u8 },
    String,
    Date,
    Time,
    Timestamp,
    Point,
    LineString,
    Polygon,
    MultiPolygon,
    Null,
    Binary,
    Interval,
    Array(Box<DataType>),
}

impl DataType {
    pub fn decimal() -> Self {
        DataType::Decimal {
            precision: DEFAULT_DECIMAL_PRECISION,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    /// Wire-level type name, the inverse of [`TypeName::to_data_type`].
    pub fn dialect_name(&self) -> Result<&'static str, SqlGenError> {
        TypeName::from_data_type(self).map(|t| t.as_str())
    }

    /// Type name as written in `CAST` and DDL statements.
    pub fn sql_type(&self) -> Result<String, SqlGenError> {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int8 => "TINYINT",
            DataType::Int16 => "SMALLINT",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Float32 => "FLOAT",
            DataType::Float64 => "DOUBLE",
            DataType::Decimal { precision, scale } => {
                return Ok(format!("DECIMAL({}, {})", precision, scale))
            }
            DataType::String => "TEXT",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Point => "POINT",
            DataType::LineString => "LINESTRING",
            DataType::Polygon => "POLYGON",
            DataType::MultiPolygon => "MULTIPOLYGON",
            DataType::Null | DataType::Binary | DataType::Interval | DataType::Array(_) => {
                return Err(SqlGenError::UnsupportedType {
                    token: self.to_string(),
                })
            }
        };
        Ok(name.to_string())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "boolean"),
            DataType::Int8 => write!(f, "int8"),
            DataType::Int16 => write!(f, "int16"),
            DataType::Int32 => write!(f, "int32"),
            DataType::Int64 => write!(f, "int64"),
            DataType::Float32 => write!(f, "float32"),
            DataType::Float64 => write!(f, "float64"),
            DataType::Decimal { precision, scale } => write!(f, "decimal({}, {})", precision, scale),
            DataType::String => write!(f, "string"),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::Point => write!(f, "point"),
            DataType::LineString => write!(f, "linestring"),
            DataType::Polygon => write!(f, "polygon"),
            DataType::MultiPolygon => write!(f, "multipolygon"),
            DataType::Null => write!(f, "null"),
            DataType::Binary => write!(f, "binary"),
            DataType::Interval => write!(f, "interval"),
            DataType::Array(inner) => write!(f, "array<{}>", inner),
        }
    }
}

/// Closed set of wire-level type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    BigInt,
    Bool,
    Date,
    Decimal,
    Double,
    Float,
    Int,
    LineString,
    MultiPolygon,
    Null,
    Point,
    Polygon,
    SmallInt,
    Str,
    Time,
    Timestamp,
    TinyInt,
}

impl TypeName {
    pub const ALL: [TypeName; 17] = [
        TypeName::BigInt,
        TypeName::Bool,
        TypeName::Date,
        TypeName::Decimal,
        TypeName::Double,
        TypeName::Float,
        TypeName::Int,
        TypeName::LineString,
        TypeName::MultiPolygon,
        TypeName::Null,
        TypeName::Point,
        TypeName::Polygon,
        TypeName::SmallInt,
        TypeName::Str,
        TypeName::Time,
        TypeName::Timestamp,
        TypeName::TinyInt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeName::BigInt => "BIGINT",
            TypeName::Bool => "BOOL",
            TypeName::Date => "DATE",
            TypeName::Decimal => "DECIMAL",
            TypeName::Double => "DOUBLE",
            TypeName::Float => "FLOAT",
            TypeName::Int => "INT",
            TypeName::LineString => "LINESTRING",
            TypeName::MultiPolygon => "MULTIPOLYGON",
            TypeName::Null => "NULL",
            TypeName::Point => "POINT",
            TypeName::Polygon => "POLYGON",
            TypeName::SmallInt => "SMALLINT",
            TypeName::Str => "STR",
            TypeName::Time => "TIME",
            TypeName::Timestamp => "TIMESTAMP",
            TypeName::TinyInt => "TINYINT",
        }
    }

    /// Resolve a type name reported by the server or written by a user.
    ///
    /// Accepts the canonical names plus the common SQL spellings
    /// (`NUMERIC`, `BOOLEAN`, `INTEGER`, `REAL`, `TEXT`, `VARCHAR`, `CHAR`).
    pub fn parse(name: &str) -> Result<Self, SqlGenError> {
        let upper = name.trim().to_ascii_uppercase();
        let typename = match upper.as_str() {
            "BIGINT" => TypeName::BigInt,
            "BOOL" | "BOOLEAN" => TypeName::Bool,
            "DATE" => TypeName::Date,
            "DECIMAL" | "NUMERIC" => TypeName::Decimal,
            "DOUBLE" => TypeName::Double,
            "FLOAT" | "REAL" => TypeName::Float,
            "INT" | "INTEGER" => TypeName::Int,
            "LINESTRING" => TypeName::LineString,
            "MULTIPOLYGON" => TypeName::MultiPolygon,
            "NULL" => TypeName::Null,
            "POINT" => TypeName::Point,
            "POLYGON" => TypeName::Polygon,
            "SMALLINT" => TypeName::SmallInt,
            "STR" | "TEXT" | "VARCHAR" | "CHAR" => TypeName::Str,
            "TIME" => TypeName::Time,
            "TIMESTAMP" => TypeName::Timestamp,
            "TINYINT" => TypeName::TinyInt,
            _ => {
                return Err(SqlGenError::UnsupportedType {
                    token: name.to_string(),
                })
            }
        };
        Ok(typename)
    }

    pub fn to_data_type(&self) -> DataType {
        match self {
            TypeName::BigInt => DataType::Int64,
            TypeName::Bool => DataType::Boolean,
            TypeName::Date => DataType::Date,
            TypeName::Decimal => DataType::decimal(),
            TypeName::Double => DataType::Float64,
            TypeName::Float => DataType::Float32,
            TypeName::Int => DataType::Int32,
            TypeName::LineString => DataType::LineString,
            TypeName::MultiPolygon => DataType::MultiPolygon,
            TypeName::Null => DataType::Null,
            TypeName::Point => DataType::Point,
            TypeName::Polygon => DataType::Polygon,
            TypeName::SmallInt => DataType::Int16,
            TypeName::Str => DataType::String,
            TypeName::Time => DataType::Time,
            TypeName::Timestamp => DataType::Timestamp,
            TypeName::TinyInt => DataType::Int8,
        }
    }

    pub fn from_data_type(data_type: &DataType) -> Result<Self, SqlGenError> {
        let typename = match data_type {
            DataType::Int64 => TypeName::BigInt,
            DataType::Boolean => TypeName::Bool,
            DataType::Date => TypeName::Date,
            DataType::Decimal { .. } => TypeName::Decimal,
            DataType::Float64 => TypeName::Double,
            DataType::Float32 => TypeName::Float,
            DataType::Int32 => TypeName::Int,
            DataType::LineString => TypeName::LineString,
            DataType::MultiPolygon => TypeName::MultiPolygon,
            DataType::Null => TypeName::Null,
            DataType::Point => TypeName::Point,
            DataType::Polygon => TypeName::Polygon,
            DataType::Int16 => TypeName::SmallInt,
            DataType::String => TypeName::Str,
            DataType::Time => TypeName::Time,
            DataType::Timestamp => TypeName::Timestamp,
            DataType::Int8 => TypeName::TinyInt,
            DataType::Binary | DataType::Interval | DataType::Array(_) => {
                return Err(SqlGenError::UnsupportedType {
                    token: data_type.to_string(),
                })
            }
        };
        Ok(typename)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column or value type in HeavyDB vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialectType {
    typename: TypeName,
    nullable: bool,
}

impl DialectType {
    pub fn new(typename: &str, nullable: bool) -> Result<Self, SqlGenError> {
        Ok(Self {
            typename: TypeName::parse(typename)?,
            nullable,
        })
    }

    /// Nullable type from a wire-level name.
    pub fn from_name(typename: &str) -> Result<Self, SqlGenError> {
        Self::new(typename, true)
    }

    /// Canonical wire-level name, without nullability.
    pub fn to_name(&self) -> &'static str {
        self.typename.as_str()
    }

    /// Parse the display form, either `INT` or `Nullable(INT)`.
    pub fn parse(spec: &str) -> Result<Self, SqlGenError> {
        let spec = spec.trim();
        match spec
            .strip_prefix("Nullable(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => Self::new(inner, true),
            None => Self::new(spec, false),
        }
    }

    pub fn from_data_type(data_type: &DataType, nullable: bool) -> Result<Self, SqlGenError> {
        Ok(Self {
            typename: TypeName::from_data_type(data_type)?,
            nullable,
        })
    }

    pub fn typename(&self) -> TypeName {
        self.typename
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn to_data_type(&self) -> DataType {
        self.typename.to_data_type()
    }

    /// Like [`to_data_type`](Self::to_data_type), with decimal precision and scale taken
    /// from server-side column details when they are set.
    pub fn to_data_type_with(&self, precision: u8, scale: u8) -> DataType {
        match self.typename {
            TypeName::Decimal if precision > 0 => DataType::Decimal { precision, scale },
            _ => self.to_data_type(),
        }
    }

    pub fn to_field(&self, name: impl Into<String>) -> Field {
        Field::new(name, self.to_data_type(), self.nullable)
    }
}

impl fmt::Display for DialectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Nullable({})", self.typename)
        } else {
            write!(f, "{}", self.typename)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Ordered list of named, typed columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Build a schema of nullable columns from `(name, type)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, data_type)| Field::new(name, data_type, true))
                .collect(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
