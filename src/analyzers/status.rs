use crate::analyzers::types::{ServiceStatus, StatusCounts};
use crate::catalogue::{ServiceRecord, matches_ci};
use std::collections::BTreeMap;

/// Maps a row's published and staleness columns to a [`ServiceStatus`].
pub fn classify_status(record: &ServiceRecord) -> ServiceStatus {
    let staleness = record.staleness_status.as_deref();

    if record.is_unpublished() {
        ServiceStatus::Unpublished
    } else if record.is_published() && matches_ci(staleness, "Not Stale") {
        ServiceStatus::Published
    } else if matches_ci(staleness, "Stale - End date passed") {
        ServiceStatus::StaleEndDate
    } else if matches_ci(staleness, "Stale - OTC Variation") {
        ServiceStatus::StaleOtcVariation
    } else if matches_ci(staleness, "Stale - 12 months old") {
        ServiceStatus::StaleTwelveMonths
    } else {
        ServiceStatus::Unknown
    }
}

/// Counts services per status for every organisation, in name order.
pub fn status_counts(records: &[ServiceRecord]) -> Vec<StatusCounts> {
    let mut grouped: BTreeMap<&str, BTreeMap<ServiceStatus, usize>> = BTreeMap::new();

    for record in records {
        *grouped
            .entry(record.organisation_name.as_str())
            .or_default()
            .entry(classify_status(record))
            .or_default() += 1;
    }

    grouped
        .into_iter()
        .map(|(name, counts)| StatusCounts {
            organisation_name: name.to_string(),
            counts: counts.into_iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(org: &str, published: &str, staleness: &str) -> ServiceRecord {
        ServiceRecord {
            organisation_name: org.to_string(),
            published_status: Some(published.to_string()),
            staleness_status: Some(staleness.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_status() {
        let cases = [
            ("unpublished", "Not Stale", ServiceStatus::Unpublished),
            ("Published", "Not Stale", ServiceStatus::Published),
            ("published", "Stale - End date passed", ServiceStatus::StaleEndDate),
            ("Published", "Stale - OTC Variation", ServiceStatus::StaleOtcVariation),
            ("Published", "Stale - 12 months old", ServiceStatus::StaleTwelveMonths),
            ("Published", "Something else", ServiceStatus::Unknown),
        ];
        for (published, staleness, expected) in cases {
            assert_eq!(classify_status(&record("X", published, staleness)), expected);
        }
    }

    #[test]
    fn test_status_counts_groups_by_organisation() {
        let records = vec![
            record("B", "Published", "Not Stale"),
            record("A", "Unpublished", ""),
            record("B", "Published", "Not Stale"),
            record("B", "Unpublished", ""),
        ];
        let counts = status_counts(&records);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].organisation_name, "A");
        assert_eq!(counts[0].counts, vec![(ServiceStatus::Unpublished, 1)]);
        assert_eq!(
            counts[1].counts,
            vec![(ServiceStatus::Unpublished, 1), (ServiceStatus::Published, 2)]
        );
        assert_eq!(counts[1].total(), 3);
    }
}
