//! Data types produced by the aggregation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-organisation attention statistics; one row of the exported CSVs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganisationStats {
    #[serde(rename = "Organisation Name")]
    pub organisation_name: String,
    #[serde(rename = "Total Services")]
    pub total_services: usize,
    #[serde(rename = "Services Needing Attention")]
    pub services_needing_attention: usize,
    /// Share of services needing attention, 0–100.
    #[serde(rename = "Attention Percentage")]
    pub attention_percentage: f64,
}

/// Which slice of organisations a chart covers, by attention percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AttentionBand {
    /// Strictly between 0% and 100%.
    Partial,
    /// Exactly 0%.
    Zero,
    /// Exactly 100%.
    Full,
    Any,
}

impl AttentionBand {
    pub fn contains(&self, stats: &OrganisationStats) -> bool {
        if stats.total_services == 0 {
            return false;
        }
        let pct = stats.attention_percentage;
        match self {
            AttentionBand::Partial => pct > 0.0 && pct < 100.0,
            AttentionBand::Zero => pct == 0.0,
            AttentionBand::Full => pct == 100.0,
            AttentionBand::Any => true,
        }
    }

    /// Chart heading for the band.
    pub fn title(&self) -> &'static str {
        match self {
            AttentionBand::Partial => "Between 0% and 100%",
            AttentionBand::Zero => "0%",
            AttentionBand::Full => "100%",
            AttentionBand::Any => "All Organisations",
        }
    }
}

/// Services requiring attention for one operator, split by cause.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorBreakdown {
    pub organisation_name: String,
    pub unpublished: usize,
    /// Published services requiring attention, counted per timeliness
    /// status, most frequent first.
    pub timeliness: Vec<(String, usize)>,
}

impl OperatorBreakdown {
    pub fn total(&self) -> usize {
        self.unpublished + self.timeliness.iter().map(|(_, n)| n).sum::<usize>()
    }
}

/// Publication state of a service, derived from its published and
/// staleness columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceStatus {
    Unpublished,
    Published,
    StaleEndDate,
    StaleOtcVariation,
    StaleTwelveMonths,
    Unknown,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 6] = [
        ServiceStatus::Unpublished,
        ServiceStatus::Published,
        ServiceStatus::StaleEndDate,
        ServiceStatus::StaleOtcVariation,
        ServiceStatus::StaleTwelveMonths,
        ServiceStatus::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Unpublished => "Unpublished",
            ServiceStatus::Published => "Published",
            ServiceStatus::StaleEndDate => "Stale due to end date",
            ServiceStatus::StaleOtcVariation => "Stale due to OTC variation",
            ServiceStatus::StaleTwelveMonths => "Stale due to 12 months old",
            ServiceStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Service counts per status for one organisation.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCounts {
    pub organisation_name: String,
    /// Non-zero counts in [`ServiceStatus`] order.
    pub counts: Vec<(ServiceStatus, usize)>,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}
