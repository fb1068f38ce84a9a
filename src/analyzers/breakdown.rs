use crate::analyzers::types::OperatorBreakdown;
use crate::catalogue::ServiceRecord;
use std::collections::HashMap;

/// Splits one operator's services needing attention into unpublished
/// services and published services per timeliness status.
///
/// Published rows without a timeliness status are not counted.
pub fn operator_breakdown(records: &[ServiceRecord], organisation: &str) -> OperatorBreakdown {
    let mut unpublished = 0;
    let mut by_status: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.organisation_name == organisation) {
        if record.is_unpublished() {
            unpublished += 1;
        } else if record.is_published() && record.needs_attention() {
            if let Some(status) = record.timeliness_status.as_deref() {
                *by_status.entry(status).or_default() += 1;
            }
        }
    }

    let mut timeliness: Vec<(String, usize)> = by_status
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();
    timeliness.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    OperatorBreakdown {
        organisation_name: organisation.to_string(),
        unpublished,
        timeliness,
    }
}
