use super::error::SqlGenError;

/// Words HeavyDB's parser treats as keywords. Any identifier matching one of these
/// (case-insensitively) must be quoted.
const RESERVED_WORDS: &[&str] = &[
    "ABS", "ACCESS", "ADD", "ALL", "ALLOCATE", "ALLOW", "ALTER", "AND", "ANY", "ARCHIVE", "ARE",
    "ARRAY", "AS", "ASC", "ASENSITIVE", "ASYMMETRIC", "AT", "ATOMIC", "AUTHORIZATION", "AVG",
    "BEGIN", "BETWEEN", "BIGINT", "BINARY", "BIT", "BLOB", "BOOLEAN", "BOTH", "BY", "CALL",
    "CALLED", "CARDINALITY", "CASCADED", "CASE", "CAST", "CEIL", "CEILING", "CHAR",
    "CHARACTER", "CHARACTER_LENGTH", "CHAR_LENGTH", "CHECK", "CLOB", "CLOSE", "COALESCE",
    "COLLATE", "COLLECT", "COLUMN", "COMMIT", "CONDITION", "CONNECT", "CONSTRAINT", "CONVERT",
    "COPY", "CORR", "CORRESPONDING", "COUNT", "COVAR_POP", "COVAR_SAMP", "CREATE", "CROSS",
    "CUBE", "CUME_DIST", "CURRENT", "CURRENT_CATALOG", "CURRENT_DATE", "CURRENT_PATH",
    "CURRENT_ROLE", "CURRENT_SCHEMA", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "CURSOR", "CYCLE", "DASHBOARD", "DATABASE", "DATE", "DATETIME", "DAY", "DEALLOCATE", "DEC",
    "DECIMAL", "DECLARE", "DEFAULT", "DELETE", "DENSE_RANK", "DEREF", "DESC", "DESCRIBE",
    "DETERMINISTIC", "DISALLOW", "DISCONNECT", "DISTINCT", "DOUBLE", "DROP", "DUMP", "DYNAMIC",
    "EACH", "EDIT", "EDITOR", "ELEMENT", "ELSE", "EMPTY", "END", "ESCAPE", "EVERY", "EXCEPT",
    "EXEC", "EXECUTE", "EXISTS", "EXP", "EXPLAIN", "EXTEND", "EXTERNAL", "EXTRACT", "FALSE",
    "FETCH", "FILTER", "FIRST_VALUE", "FLOAT", "FLOOR", "FOR", "FOREIGN", "FRAME_ROW", "FREE",
    "FROM", "FULL", "FUNCTION", "FUSION", "GET", "GLOBAL", "GRANT", "GROUP", "GROUPING",
    "GROUPS", "HAVING", "HOLD", "HOUR", "IDENTITY", "IF", "ILIKE", "IMPORT", "IN", "INDICATOR",
    "INITIAL", "INNER", "INOUT", "INSENSITIVE", "INSERT", "INT", "INTEGER", "INTERSECT",
    "INTERSECTION", "INTERVAL", "INTO", "IS", "JOIN", "LAG", "LANGUAGE", "LARGE", "LAST_VALUE",
    "LATERAL", "LEAD", "LEADING", "LEFT", "LENGTH", "LIKE", "LIKE_REGEX", "LIMIT", "LN",
    "LOCAL", "LOCALTIME", "LOCALTIMESTAMP", "LOWER", "MATCH", "MATCHES", "MAX", "MEASURES",
    "MEMBER", "MERGE", "METHOD", "MIN", "MINUS", "MINUTE", "MOD", "MODIFIES", "MODULE",
    "MONTH", "MULTISET", "NATIONAL", "NATURAL", "NCHAR", "NCLOB", "NEW", "NEXT", "NO", "NONE",
    "NORMALIZE", "NOT", "NOW", "NTH_VALUE", "NTILE", "NULL", "NULLIF", "NUMERIC", "OF",
    "OFFSET", "OLD", "OMIT", "ON", "ONE", "ONLY", "OPEN", "OPTIMIZE", "OR", "ORDER", "OUT",
    "OUTER", "OVER", "OVERLAPS", "PARAMETER", "PARTITION", "PERCENT", "PERCENTILE_CONT",
    "PERCENTILE_DISC", "PERCENT_RANK", "PERIOD", "PERMUTE", "PORTION", "POSITION", "POWER",
    "PRECEDES", "PRECISION", "PREPARE", "PRIMARY", "PRIVILEGES", "PROCEDURE", "RANGE", "RANK",
    "READS", "REAL", "RECURSIVE", "REF", "REFERENCES", "REFERENCING", "RENAME", "RESET",
    "RESULT", "RETURN", "RETURNS", "REVOKE", "RIGHT", "ROLE", "ROLLBACK", "ROLLUP", "ROW",
    "ROWS", "ROW_NUMBER", "RUNNING", "SAVEPOINT", "SCHEMA", "SCOPE", "SCROLL", "SEARCH",
    "SECOND", "SEEK", "SELECT", "SENSITIVE", "SESSION_USER", "SET", "SHOW", "SIMILAR", "SKIP",
    "SMALLINT", "SOME", "SPECIFIC", "SPECIFICTYPE", "SQL", "SQLEXCEPTION", "SQLSTATE",
    "SQLWARNING", "SQRT", "START", "STATIC", "STDDEV_POP", "STDDEV_SAMP", "STREAM",
    "SUBMULTISET", "SUBSET", "SUBSTRING", "SUCCEEDS", "SUM", "SYMMETRIC", "SYSTEM",
    "SYSTEM_TIME", "SYSTEM_USER", "TABLE", "TABLESAMPLE", "TEMPORARY", "TEXT", "THEN", "TIME",
    "TIMESTAMP", "TIMEZONE_HOUR", "TIMEZONE_MINUTE", "TINYINT", "TO", "TRAILING", "TRANSLATE",
    "TRANSLATION", "TREAT", "TRIGGER", "TRIM", "TRUE", "TRUNCATE", "UESCAPE", "UNION",
    "UNIQUE", "UNKNOWN", "UNNEST", "UPDATE", "UPPER", "UPSERT", "USER", "USING", "VALUES",
    "VARBINARY", "VARCHAR", "VARYING", "VAR_POP", "VAR_SAMP", "VERSIONING", "VIEW", "WHEN",
    "WHENEVER", "WHERE", "WIDTH_BUCKET", "WINDOW", "WITH", "WITHIN", "WITHOUT", "YEAR",
];

pub fn is_reserved(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    RESERVED_WORDS.binary_search(&upper.as_str()).is_ok()
}

fn is_quoted(name: &str) -> bool {
    let Some(inner) = name
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    // Every interior quote must be part of a doubled pair.
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' && chars.next() != Some('"') {
            return false;
        }
    }
    true
}

fn needs_quotes(name: &str) -> bool {
    is_reserved(name)
        || name.starts_with(|c: char| c.is_ascii_digit())
        || name.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// Quote `name` for use in generated SQL when HeavyDB would not accept it bare.
pub fn quote_identifier(name: &str) -> String {
    if is_quoted(name) || !needs_quotes(name) {
        return name.to_string();
    }
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn validate_identifier(name: &str) -> Result<(), SqlGenError> {
    if name.is_empty() {
        return Err(SqlGenError::InvalidIdentifier("empty".to_string()));
    }
    if name.len() > 128 {
        return Err(SqlGenError::InvalidIdentifier(format!(
            "too long: {}",
            name.len()
        )));
    }
    if name.contains('\x00') {
        return Err(SqlGenError::InvalidIdentifier(format!(
            "forbidden characters in: {}",
            name.escape_debug()
        )));
    }
    Ok(())
}

pub fn safe_ident(name: &str) -> Result<String, SqlGenError> {
    validate_identifier(name)?;
    Ok(quote_identifier(name))
}
