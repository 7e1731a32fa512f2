use super::SqlGenerator;
use crate::sql_generator::builder::SelectPlan;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::safe_ident;

/// `GROUP BY` over the keys' output names, then `HAVING` on its own line.
pub(crate) fn format_group_by(
    gen: &SqlGenerator,
    plan: &SelectPlan,
) -> Result<Option<String>, SqlGenError> {
    if plan.group_by.is_empty() {
        if !plan.having.is_empty() {
            return Err(SqlGenError::UnsupportedExpr(
                "HAVING requires at least one group key".to_string(),
            ));
        }
        return Ok(None);
    }

    let keys = plan
        .group_by
        .iter()
        .map(|key| {
            let name = key.output_name().ok_or_else(|| {
                SqlGenError::UnsupportedExpr(format!("group key without a name: {:?}", key))
            })?;
            safe_ident(&name)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut clause = format!("GROUP BY {}", keys.join(", "));

    if !plan.having.is_empty() {
        let translator = gen.translator();
        let having = plan
            .having
            .iter()
            .map(|p| translator.translate(p))
            .collect::<Result<Vec<_>, _>>()?;
        clause.push_str("\nHAVING ");
        clause.push_str(&having.join(" AND "));
    }

    Ok(Some(clause))
}
