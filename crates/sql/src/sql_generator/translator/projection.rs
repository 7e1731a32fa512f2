use super::SqlGenerator;
use crate::sql_generator::builder::SelectPlan;
use crate::sql_generator::error::SqlGenError;

/// Column where select-list items start wrapping onto continuation lines.
const LINE_WIDTH: usize = 70;
/// Continuation lines line up under the first item after `SELECT `.
const CONTINUATION_INDENT: usize = 7;

pub(crate) fn format_select(gen: &SqlGenerator, plan: &SelectPlan) -> Result<String, SqlGenError> {
    let translator = gen.translator();
    let items = plan
        .select_list
        .iter()
        .map(|expr| translator.translate_named(expr))
        .collect::<Result<Vec<_>, _>>()?;

    let mut buf = String::from(if plan.distinct {
        "SELECT DISTINCT "
    } else {
        "SELECT "
    });
    if items.is_empty() {
        buf.push('*');
        return Ok(buf);
    }

    let mut line_len = buf.len();
    for (i, item) in items.iter().enumerate() {
        let first_line = item.lines().next().unwrap_or_default();
        if i > 0 {
            if line_len + 2 + first_line.len() > LINE_WIDTH {
                buf.push_str(",\n");
                buf.push_str(&" ".repeat(CONTINUATION_INDENT));
                line_len = CONTINUATION_INDENT;
            } else {
                buf.push_str(", ");
                line_len += 2;
            }
        }
        buf.push_str(item);
        line_len = match item.rfind('\n') {
            Some(pos) => item.len() - pos - 1,
            None => line_len + item.len(),
        };
    }
    Ok(buf)
}

pub(crate) fn format_where(
    gen: &SqlGenerator,
    plan: &SelectPlan,
) -> Result<Option<String>, SqlGenError> {
    let translator = gen.translator();
    let predicates = plan
        .predicates
        .iter()
        .map(|p| translator.translate(p))
        .collect::<Result<Vec<_>, _>>()?;

    let clause = match predicates.as_slice() {
        [] => return Ok(None),
        [single] => format!("WHERE {}", single),
        many => format!(
            "WHERE {}",
            many.iter()
                .map(|p| format!("({})", p))
                .collect::<Vec<_>>()
                .join(" AND\n      ")
        ),
    };
    Ok(Some(clause))
}
