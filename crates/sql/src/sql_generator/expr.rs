use crate::ir::{Expr, Literal, SortKey, WindowSpec};
use crate::sql_generator::context::QueryContext;
use crate::sql_generator::dialect::DialectConfig;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::safe_ident;

pub struct ExprTranslator<'a> {
    context: &'a QueryContext,
    dialect: &'a DialectConfig,
}

impl<'a> ExprTranslator<'a> {
    pub fn new(context: &'a QueryContext, dialect: &'a DialectConfig) -> Self {
        Self { context, dialect }
    }

    /// Rewrite, then render an expression.
    pub fn translate(&self, expr: &Expr) -> Result<String, SqlGenError> {
        let rewritten = self.dialect.rewrites.apply(expr);
        self.expr_to_sql(&rewritten)
    }

    /// Render a select-list item, adding `AS <name>` when the aliasing policy asks for it.
    pub fn translate_named(&self, expr: &Expr) -> Result<String, SqlGenError> {
        let sql = self.translate(expr)?;
        let Some(name) = expr.output_name() else {
            return Ok(sql);
        };

        let bare_column = match expr {
            Expr::Column(_) => true,
            Expr::Alias { expr: inner, name } => {
                matches!(inner.as_ref(), Expr::Column(col) if &col.name == name)
            }
            _ => false,
        };
        if bare_column && !self.context.always_alias() {
            return Ok(sql);
        }
        Ok(format!("{} AS {}", sql, safe_ident(&name)?))
    }

    pub fn translate_sort_key(&self, key: &SortKey) -> Result<String, SqlGenError> {
        let sql = self.translate(&key.expr)?;
        if key.ascending {
            Ok(sql)
        } else {
            Ok(format!("{} DESC", sql))
        }
    }

    fn expr_to_sql(&self, expr: &Expr) -> Result<String, SqlGenError> {
        match expr {
            Expr::Column(col) => self.context.resolve_column(col),

            Expr::Literal(value) => self.translate_literal(value),

            Expr::Call { op, .. } if op.is_analytic() => Err(SqlGenError::UnsupportedExpr(
                format!("analytic function {} must be applied over a window", op),
            )),

            Expr::Call { .. } => self.translate_call(expr),

            Expr::Cast { arg, to } => Ok(format!(
                "CAST({} AS {})",
                self.expr_to_sql(arg)?,
                self.dialect.type_mapper.map_type(to)?
            )),

            // Names only matter in the select list, which handles them separately
            Expr::Alias { expr, .. } => self.expr_to_sql(expr),

            Expr::Window { func, spec } => self.translate_window(func, spec),

            Expr::Udf { name, args, .. } => {
                let args = args
                    .iter()
                    .map(|a| self.expr_to_sql(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{}({})", safe_ident(name)?, args.join(", ")))
            }
        }
    }

    fn translate_call(&self, expr: &Expr) -> Result<String, SqlGenError> {
        let Expr::Call { op, args } = expr else {
            return self.expr_to_sql(expr);
        };

        let rule = self
            .dialect
            .registry
            .lookup(*op)
            .ok_or_else(|| SqlGenError::UnsupportedOperator {
                operator: op.to_string(),
                dialect: self.dialect.display_name.to_string(),
            })?;

        if !rule.arity.accepts(args.len()) {
            return Err(SqlGenError::ArityMismatch {
                function: op.to_string(),
                expected: rule.arity.to_string(),
                actual: args.len(),
            });
        }

        let wrap = rule.is_operator_like();
        let rendered = args
            .iter()
            .map(|arg| {
                let sql = self.expr_to_sql(arg)?;
                if wrap && self.is_compound(arg) {
                    Ok(format!("({})", sql))
                } else {
                    Ok(sql)
                }
            })
            .collect::<Result<Vec<_>, SqlGenError>>()?;

        Ok(rule.render(&rendered))
    }

    /// Whether `expr` renders as an operator expression that must be parenthesised
    /// when used as an operand.
    fn is_compound(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Call { op, .. } => self
                .dialect
                .registry
                .lookup(*op)
                .map(|rule| rule.is_operator_like())
                .unwrap_or(false),
            Expr::Alias { expr, .. } => self.is_compound(expr),
            _ => false,
        }
    }

    fn translate_window(&self, func: &Expr, spec: &WindowSpec) -> Result<String, SqlGenError> {
        let (op, zero_based) = match func {
            Expr::Call { op, .. } if op.is_analytic() || op.is_reduction() => {
                (*op, op.is_zero_based_rank())
            }
            other => {
                return Err(SqlGenError::UnsupportedExpr(format!(
                    "window over non-analytic expression {:?}",
                    other
                )))
            }
        };
        tracing::trace!(target: "sql_generator", op = %op, "Translating window function");

        let func_sql = self.translate_call(func)?;

        let mut clauses = Vec::new();
        if !spec.partition_by.is_empty() {
            let keys = spec
                .partition_by
                .iter()
                .map(|e| self.translate(e))
                .collect::<Result<Vec<_>, _>>()?;
            clauses.push(format!("PARTITION BY {}", keys.join(", ")));
        }
        if !spec.order_by.is_empty() {
            let keys = spec
                .order_by
                .iter()
                .map(|k| self.translate_sort_key(k))
                .collect::<Result<Vec<_>, _>>()?;
            clauses.push(format!("ORDER BY {}", keys.join(", ")));
        }
        if let Some(frame) = &spec.frame {
            clauses.push(frame.to_string());
        }

        let sql = format!("{} OVER ({})", func_sql, clauses.join(" "));
        if zero_based {
            Ok(format!("({} - 1)", sql))
        } else {
            Ok(sql)
        }
    }

    fn translate_literal(&self, value: &Literal) -> Result<String, SqlGenError> {
        let sql = match value {
            Literal::Null => "NULL".to_string(),
            Literal::Boolean(true) => "TRUE".to_string(),
            Literal::Boolean(false) => "FALSE".to_string(),
            Literal::Int(v) => v.to_string(),
            Literal::Float(v) if !v.is_finite() => {
                return Err(SqlGenError::UnsupportedExpr(format!(
                    "non-finite float literal {}",
                    v
                )))
            }
            Literal::Float(v) => format!("{:?}", v),
            Literal::String(s) => quote_string(s),
            Literal::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
            Literal::Time(t) => format!("TIME '{}'", t.format("%H:%M:%S")),
            Literal::Timestamp(ts) => {
                format!("TIMESTAMP(0) '{}'", ts.format("%Y-%m-%d %H:%M:%S"))
            }
            Literal::Interval { value, unit } => format!("INTERVAL '{}' {}", value, unit),
            Literal::Geo { wkt, srid: None } => format!("ST_GeomFromText({})", quote_string(wkt)),
            Literal::Geo {
                wkt,
                srid: Some(srid),
            } => format!("ST_GeomFromText({}, {})", quote_string(wkt), srid),
        };
        Ok(sql)
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
