//! DDL statement text.

use crate::error::ClientError;
use heavyai_sql::ir::Literal;
use heavyai_sql::sql_generator::sanitize::safe_ident;
use heavyai_sql::{Compiler, DataType, Schema};
use regex::Regex;
use std::sync::OnceLock;

pub const GPU_FRAGMENT_SIZE: u64 = 32_000_000;
pub const CPU_FRAGMENT_SIZE: u64 = 5_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateTableOptions {
    /// Rows per fragment. Defaults by execution mode when unset.
    pub fragment_size: Option<u64>,
    /// Cap on the row count; the oldest fragment is dropped when it is reached.
    pub max_rows: Option<u64>,
    pub temporary: bool,
}

impl CreateTableOptions {
    pub fn with_fragment_size(mut self, fragment_size: u64) -> Self {
        self.fragment_size = Some(fragment_size);
        self
    }

    pub fn with_max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }
}

/// A column added to an existing table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub default: Option<Literal>,
    /// Storage encoding such as `DICT(16)` or `FIXED(32)`.
    pub encoding: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: None,
            encoding: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<Literal>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

fn column_type(data_type: &DataType) -> Result<String, ClientError> {
    data_type
        .sql_type()
        .map_err(|_| ClientError::UnsupportedType(data_type.to_string()))
}

fn encoding_keyword(encoding: &str) -> Result<String, ClientError> {
    static ENCODING: OnceLock<Regex> = OnceLock::new();
    let re = ENCODING.get_or_init(|| Regex::new(r"^[A-Za-z]+(\(\d+\))?$").unwrap());
    if !re.is_match(encoding) {
        return Err(ClientError::InvalidQuery(format!(
            "Invalid column encoding '{}'",
            encoding
        )));
    }
    Ok(encoding.to_ascii_uppercase())
}

pub fn create_table(
    name: &str,
    schema: &Schema,
    options: &CreateTableOptions,
    gpu: bool,
) -> Result<String, ClientError> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let ty = column_type(&field.data_type)?;
            let not_null = if field.nullable { "" } else { " NOT NULL" };
            Ok(format!("  {} {}{}", safe_ident(&field.name)?, ty, not_null))
        })
        .collect::<Result<Vec<_>, ClientError>>()?;

    let fragment_size = options.fragment_size.unwrap_or(if gpu {
        GPU_FRAGMENT_SIZE
    } else {
        CPU_FRAGMENT_SIZE
    });
    let mut with = vec![];
    if let Some(max_rows) = options.max_rows {
        with.push(format!("MAX_ROWS = {}", max_rows));
    }
    with.push(format!("FRAGMENT_SIZE = {}", fragment_size));

    Ok(format!(
        "CREATE {}TABLE {} (\n{}\n) WITH ({})",
        if options.temporary { "TEMPORARY " } else { "" },
        safe_ident(name)?,
        columns.join(",\n"),
        with.join(", ")
    ))
}

/// `CREATE TABLE .. AS` over compiled `select`.
pub fn create_table_as(name: &str, select: &str) -> Result<String, ClientError> {
    Ok(format!("CREATE TABLE {} AS (\n{}\n)", safe_ident(name)?, select))
}

pub fn create_view(name: &str, select: &str) -> Result<String, ClientError> {
    Ok(format!("CREATE VIEW {} AS\n{}", safe_ident(name)?, select))
}

fn drop_object(kind: &str, name: &str, force: bool) -> Result<String, ClientError> {
    Ok(format!(
        "DROP {} {}{}",
        kind,
        if force { "IF EXISTS " } else { "" },
        safe_ident(name)?
    ))
}

pub fn drop_table(name: &str, force: bool) -> Result<String, ClientError> {
    drop_object("TABLE", name, force)
}

pub fn drop_view(name: &str, force: bool) -> Result<String, ClientError> {
    drop_object("VIEW", name, force)
}

pub fn truncate_table(name: &str) -> Result<String, ClientError> {
    Ok(format!("TRUNCATE TABLE {}", safe_ident(name)?))
}

pub fn rename_table(name: &str, new_name: &str) -> Result<String, ClientError> {
    Ok(format!(
        "ALTER TABLE {} RENAME TO {}",
        safe_ident(name)?,
        safe_ident(new_name)?
    ))
}

/// `ALTER TABLE .. ADD (..)`; defaults are rendered by `compiler`.
pub fn add_columns(
    table: &str,
    columns: &[ColumnSpec],
    compiler: &Compiler,
) -> Result<String, ClientError> {
    if columns.is_empty() {
        return Err(ClientError::InvalidQuery(
            "add_columns needs at least one column".to_string(),
        ));
    }

    let defs = columns
        .iter()
        .map(|column| {
            let mut def = format!(
                "{} {}",
                safe_ident(&column.name)?,
                column_type(&column.data_type)?
            );
            if !column.nullable {
                def.push_str(" NOT NULL");
            }
            if let Some(value) = &column.default {
                def.push_str(" DEFAULT ");
                def.push_str(&compiler.literal(value)?);
            }
            if let Some(encoding) = &column.encoding {
                def.push_str(" ENCODING ");
                def.push_str(&encoding_keyword(encoding)?);
            }
            Ok(def)
        })
        .collect::<Result<Vec<_>, ClientError>>()?;

    Ok(format!(
        "ALTER TABLE {} ADD ({})",
        safe_ident(table)?,
        defs.join(", ")
    ))
}

pub fn drop_columns(table: &str, names: &[&str]) -> Result<String, ClientError> {
    if names.is_empty() {
        return Err(ClientError::InvalidQuery(
            "drop_columns needs at least one column".to_string(),
        ));
    }
    let drops = names
        .iter()
        .map(|name| Ok(format!("DROP COLUMN {}", safe_ident(name)?)))
        .collect::<Result<Vec<_>, ClientError>>()?;
    Ok(format!("ALTER TABLE {} {}", safe_ident(table)?, drops.join(", ")))
}
