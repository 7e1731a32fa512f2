use crate::sql_generator::builder::SelectPlan;

/// HeavyDB takes the offset after a comma: `LIMIT n, offset`.
pub(crate) fn format_limit(plan: &SelectPlan) -> Option<String> {
    let limit = plan.limit?;
    if limit.offset == 0 {
        Some(format!("LIMIT {}", limit.n))
    } else {
        Some(format!("LIMIT {}, {}", limit.n, limit.offset))
    }
}
