use crate::analyzers::aggregate::{aggregate_organisations, high_attention, select_band};
use crate::analyzers::breakdown::operator_breakdown;
use crate::analyzers::status::status_counts;
use crate::analyzers::types::{AttentionBand, OperatorBreakdown, OrganisationStats, StatusCounts};
use crate::catalogue::{CatalogueFilter, ServiceRecord, load_catalogue};
use crate::output::write_stats;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// A filtered catalogue together with its per-organisation statistics.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub records: Vec<ServiceRecord>,
    pub organisations: Vec<OrganisationStats>,
}

impl Analysis {
    /// Loads the catalogue at `path`, applies `filter` and aggregates.
    pub fn load(path: &Path, filter: &CatalogueFilter) -> Result<Self> {
        let records = filter.apply(load_catalogue(path)?);
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<ServiceRecord>) -> Self {
        let organisations = aggregate_organisations(&records);
        info!(
            services = records.len(),
            organisations = organisations.len(),
            "Catalogue aggregated"
        );
        Self {
            records,
            organisations,
        }
    }

    pub fn band(&self, band: AttentionBand) -> Vec<OrganisationStats> {
        select_band(&self.organisations, band)
    }

    pub fn top_operators(&self, min_percentage: f64, limit: usize) -> Vec<OrganisationStats> {
        high_attention(&self.organisations, min_percentage, limit)
    }

    pub fn breakdowns(&self, operators: &[OrganisationStats]) -> Vec<OperatorBreakdown> {
        operators
            .iter()
            .map(|op| operator_breakdown(&self.records, &op.organisation_name))
            .collect()
    }

    pub fn status_counts(&self) -> Vec<StatusCounts> {
        status_counts(&self.records)
    }

    /// Writes the 0% and 100% organisations to
    /// `zero_attention_required.csv` and `full_attention_required.csv`
    /// under `dir`.
    pub fn export_extremes(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)?;
        let zero_path = dir.join("zero_attention_required.csv");
        let full_path = dir.join("full_attention_required.csv");

        let zero = self.band(AttentionBand::Zero);
        let full = self.band(AttentionBand::Full);
        write_stats(&zero_path, &zero)?;
        write_stats(&full_path, &full)?;

        info!(
            zero = zero.len(),
            full = full.len(),
            dir = %dir.display(),
            "Exported 0% and 100% attention organisations"
        );
        Ok((zero_path, full_path))
    }
}
