use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlGenError {
    #[error("Type '{token}' has no HeavyDB mapping")]
    UnsupportedType { token: String },

    #[error("Operation '{operator}' is not supported by the {dialect} backend")]
    UnsupportedOperator { operator: String, dialect: String },

    #[error("{0}")]
    UnsupportedStatement(String),

    #[error("Non-equality join predicates, i.e. non-equijoins, are not supported (predicate: {predicate})")]
    NonEquiJoin { predicate: String },

    #[error("Function '{function}' takes {expected} argument(s) but {actual} were given")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("Unsupported expression: {0}")]
    UnsupportedExpr(String),

    #[error("Ambiguous column reference: {name}. Candidates: {candidates:?}")]
    AmbiguousColumn {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Column '{column}' not found. Available: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid rewrite rule '{rule}': {reason}")]
    InvalidRewrite { rule: String, reason: String },

    #[error("Maximum recursion depth ({0}) exceeded")]
    MaxRecursion(usize),
}

impl SqlGenError {
    pub(crate) fn union_unsupported() -> Self {
        SqlGenError::UnsupportedStatement("HeavyDB backend doesn't support Union operation".into())
    }

    pub fn to_heavyai_error(self, dialect_name: &str) -> heavyai_error::HeavyAiError {
        use heavyai_error::{find_closest_match, ErrorCode, ErrorContext, HeavyAiError};

        let message = self.to_string();
        match self {
            SqlGenError::UnsupportedType { token } => {
                HeavyAiError::new(ErrorCode::UnsupportedType, message)
                    .with_context(ErrorContext::Unsupported {
                        token,
                        dialect: dialect_name.to_string(),
                    })
                    .with_hint("Cast the value to a type HeavyDB can store")
            }
            SqlGenError::UnsupportedOperator { operator, dialect } => {
                HeavyAiError::new(ErrorCode::UnsupportedOperator, message)
                    .with_context(ErrorContext::Unsupported {
                        token: operator,
                        dialect,
                    })
                    .with_hint("This operation has no HeavyDB translation; compute it client-side")
            }
            SqlGenError::UnsupportedStatement(_) => {
                HeavyAiError::new(ErrorCode::UnsupportedStatement, message)
                    .with_hint("Run each side separately and combine the results")
            }
            SqlGenError::NonEquiJoin { predicate } => {
                let mut data = std::collections::HashMap::new();
                data.insert(
                    "predicate".to_string(),
                    serde_json::Value::String(predicate),
                );
                HeavyAiError::new(ErrorCode::NonEquiJoin, message)
                    .with_context(ErrorContext::Generic { data })
                    .with_hint("Rewrite the join condition using column equality")
            }
            SqlGenError::ArityMismatch {
                function,
                expected,
                actual,
            } => HeavyAiError::new(ErrorCode::ArityMismatch, message).with_context(
                ErrorContext::Arity {
                    function,
                    expected,
                    actual,
                },
            ),
            SqlGenError::UnsupportedExpr(_) => {
                HeavyAiError::new(ErrorCode::NotImplemented, message)
                    .with_hint("This expression might not have a mapping for the target dialect")
            }
            SqlGenError::AmbiguousColumn { .. } => {
                HeavyAiError::new(ErrorCode::AmbiguousColumn, message)
                    .with_hint("Try selecting the column from a specific table expression")
            }
            SqlGenError::ColumnNotFound { column, available } => {
                let hint = find_closest_match(&column, &available)
                    .map(|m| format!("Did you mean '{}'?", m));
                let mut err = HeavyAiError::new(ErrorCode::FieldNotFound, message).with_context(
                    ErrorContext::FieldNotFound {
                        field: column,
                        table: None,
                        available_fields: available,
                    },
                );
                if let Some(hint) = hint {
                    err = err.with_hint(hint);
                }
                err
            }
            SqlGenError::InvalidIdentifier(_) => HeavyAiError::new(ErrorCode::SyntaxError, message)
                .with_hint("Identifiers must be sanitized to prevent SQL injection"),
            SqlGenError::InvalidRewrite { .. } => {
                HeavyAiError::new(ErrorCode::InternalPanic, message)
            }
            SqlGenError::MaxRecursion(_) => HeavyAiError::new(ErrorCode::InternalPanic, message)
                .with_hint("This query might be too deeply nested or circular"),
        }
    }
}
