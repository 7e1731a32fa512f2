use super::SqlGenerator;
use crate::sql_generator::builder::SelectPlan;
use crate::sql_generator::error::SqlGenError;

pub(crate) fn format_order_by(
    gen: &SqlGenerator,
    plan: &SelectPlan,
) -> Result<Option<String>, SqlGenError> {
    if plan.order_by.is_empty() {
        return Ok(None);
    }
    let translator = gen.translator();
    let keys = plan
        .order_by
        .iter()
        .map(|key| translator.translate_sort_key(key))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(format!("ORDER BY {}", keys.join(", "))))
}
