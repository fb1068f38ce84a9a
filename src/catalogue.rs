//! Loader for the timetables data catalogue CSV.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// A single service row from the catalogue.
///
/// Only the columns the analysis needs are read; everything else in the
/// export is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceRecord {
    #[serde(rename = "Organisation Name")]
    pub organisation_name: String,
    #[serde(rename = "Requires Attention", default)]
    pub requires_attention: Option<String>,
    #[serde(rename = "OTC Status", default)]
    pub otc_status: Option<String>,
    #[serde(rename = "Published Status", default)]
    pub published_status: Option<String>,
    #[serde(rename = "Timeliness Status", default)]
    pub timeliness_status: Option<String>,
    #[serde(rename = "Staleness Status", default)]
    pub staleness_status: Option<String>,
}

impl ServiceRecord {
    pub fn needs_attention(&self) -> bool {
        self.requires_attention
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("yes"))
    }

    pub fn is_published(&self) -> bool {
        matches_ci(self.published_status.as_deref(), "published")
    }

    pub fn is_unpublished(&self) -> bool {
        matches_ci(self.published_status.as_deref(), "unpublished")
    }
}

pub(crate) fn matches_ci(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}

/// Reads every row of the catalogue at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row fails to
/// deserialize.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_catalogue(path: &Path) -> Result<Vec<ServiceRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let records = read_catalogue(file)?;
    info!(rows = records.len(), "Catalogue loaded");
    Ok(records)
}

/// Reads catalogue rows from any reader.
pub fn read_catalogue<R: Read>(reader: R) -> Result<Vec<ServiceRecord>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: ServiceRecord = result?;
        rows.push(record);
    }

    Ok(rows)
}

/// Rows to leave out before aggregation.
#[derive(Debug, Clone, Default)]
pub struct CatalogueFilter {
    pub excluded_otc_statuses: Vec<String>,
    pub excluded_organisations: Vec<String>,
}

impl CatalogueFilter {
    /// Keeps every row.
    pub fn none() -> Self {
        Self::default()
    }

    /// Drops unregistered services and the placeholder and
    /// Greater Manchester organisations, as used for the operator rankings.
    pub fn standard() -> Self {
        Self {
            excluded_otc_statuses: vec!["Unregistered".to_string()],
            excluded_organisations: vec![
                "Organisation not yet created".to_string(),
                "Transport for Greater Manchester".to_string(),
            ],
        }
    }

    pub fn keeps(&self, record: &ServiceRecord) -> bool {
        let otc_excluded = record
            .otc_status
            .as_deref()
            .is_some_and(|status| self.excluded_otc_statuses.iter().any(|s| s == status));
        let org_excluded = self
            .excluded_organisations
            .iter()
            .any(|org| org == &record.organisation_name);
        !otc_excluded && !org_excluded
    }

    pub fn apply(&self, records: Vec<ServiceRecord>) -> Vec<ServiceRecord> {
        let before = records.len();
        let kept: Vec<ServiceRecord> = records.into_iter().filter(|r| self.keeps(r)).collect();
        debug!(before, after = kept.len(), "Catalogue filtered");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Organisation Name,Requires Attention,OTC Status,Published Status,Timeliness Status,Staleness Status,Licence Number
Acme Buses,Yes,Registered,Published,Stale - 42 day look ahead,Stale - End date passed,PB0001
Acme Buses,no,Registered,Unpublished,,,PB0001
Organisation not yet created,YES,Unregistered,Unpublished,,,
Transport for Greater Manchester,No,Registered,Published,Up to date,Not Stale,PC0002
";

    #[test]
    fn test_read_catalogue_maps_columns() {
        let rows = read_catalogue(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);

        let first = &rows[0];
        assert_eq!(first.organisation_name, "Acme Buses");
        assert!(first.needs_attention());
        assert!(first.is_published());
        assert_eq!(
            first.timeliness_status.as_deref(),
            Some("Stale - 42 day look ahead")
        );

        let second = &rows[1];
        assert!(!second.needs_attention());
        assert!(second.is_unpublished());
        assert_eq!(second.timeliness_status, None);
    }

    #[test]
    fn test_missing_optional_columns_default_to_none() {
        let csv = "Organisation Name,Requires Attention\nSolo,Yes\n";
        let rows = read_catalogue(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].otc_status, None);
        assert!(rows[0].needs_attention());
    }

    #[test]
    fn test_standard_filter_drops_excluded_rows() {
        let rows = read_catalogue(SAMPLE.as_bytes()).unwrap();
        let kept = CatalogueFilter::standard().apply(rows);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.organisation_name == "Acme Buses"));
    }

    #[test]
    fn test_none_filter_keeps_everything() {
        let rows = read_catalogue(SAMPLE.as_bytes()).unwrap();
        assert_eq!(CatalogueFilter::none().apply(rows).len(), 4);
    }

    #[test]
    fn test_load_catalogue_missing_file() {
        assert!(load_catalogue(Path::new("/nonexistent/timetables_data_catalogue.csv")).is_err());
    }
}
