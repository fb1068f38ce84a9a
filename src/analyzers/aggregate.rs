use crate::analyzers::types::{AttentionBand, OrganisationStats};
use crate::analyzers::utility::pct;
use crate::catalogue::ServiceRecord;
use std::collections::BTreeMap;

/// Groups service rows by organisation and computes attention statistics.
///
/// Organisations come back in name order.
pub fn aggregate_organisations(records: &[ServiceRecord]) -> Vec<OrganisationStats> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for record in records {
        let entry = counts.entry(record.organisation_name.as_str()).or_default();
        entry.0 += 1;
        if record.needs_attention() {
            entry.1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(name, (total, needing))| OrganisationStats {
            organisation_name: name.to_string(),
            total_services: total,
            services_needing_attention: needing,
            attention_percentage: pct(needing, total),
        })
        .collect()
}

/// Keeps the organisations that fall in `band`, preserving order.
pub fn select_band(stats: &[OrganisationStats], band: AttentionBand) -> Vec<OrganisationStats> {
    stats.iter().filter(|s| band.contains(s)).cloned().collect()
}

/// Organisations with at least one service needing attention and an
/// attention percentage of at least `min_percentage`, largest first by
/// total services, truncated to `limit`.
pub fn high_attention(
    stats: &[OrganisationStats],
    min_percentage: f64,
    limit: usize,
) -> Vec<OrganisationStats> {
    let mut selected: Vec<OrganisationStats> = stats
        .iter()
        .filter(|s| s.services_needing_attention > 0 && s.attention_percentage >= min_percentage)
        .cloned()
        .collect();
    // stable: ties keep name order
    selected.sort_by(|a, b| b.total_services.cmp(&a.total_services));
    selected.truncate(limit);
    selected
}
