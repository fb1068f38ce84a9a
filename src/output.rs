//! Output formatting and persistence for organisation statistics.
//!
//! Supports pretty-printing, JSON logging, and CSV export.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::OrganisationStats;
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;

/// Logs statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &[OrganisationStats]) {
    debug!("{:#?}", stats);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes [`OrganisationStats`] rows to a CSV file, replacing any existing
/// file. A header row is always written, even for an empty slice.
pub fn write_stats(path: &Path, stats: &[OrganisationStats]) -> Result<()> {
    debug!(path = %path.display(), rows = stats.len(), "Writing CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record([
        "Organisation Name",
        "Total Services",
        "Services Needing Attention",
        "Attention Percentage",
    ])?;
    for row in stats {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn sample() -> OrganisationStats {
        OrganisationStats {
            organisation_name: "Acme, Buses".to_string(),
            total_services: 4,
            services_needing_attention: 1,
            attention_percentage: 25.0,
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&[sample()]);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample()).unwrap();
    }

    #[test]
    fn test_write_stats_header_and_rows() {
        let path = temp_path("bods_attention_test_rows.csv");
        let _ = fs::remove_file(&path);

        write_stats(&path, &[sample(), sample()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Organisation Name,Total Services,Services Needing Attention,Attention Percentage"
        );
        assert_eq!(lines[1], "\"Acme, Buses\",4,1,25.0");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_stats_empty_still_has_header() {
        let path = temp_path("bods_attention_test_empty.csv");
        let _ = fs::remove_file(&path);

        write_stats(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_written_rows_read_back() {
        let path = temp_path("bods_attention_test_readback.csv");
        let _ = fs::remove_file(&path);

        write_stats(&path, &[sample()]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<OrganisationStats> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![sample()]);

        fs::remove_file(&path).unwrap();
    }
}
