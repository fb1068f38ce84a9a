//! Pulling the catalogue CSV out of the downloaded zip.

use anyhow::{Context, Result, anyhow};
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extracts the first member of `zip_bytes` whose name ends with `csv_name`
/// into `output_dir`, returning the written path.
#[tracing::instrument(skip(zip_bytes, output_dir), fields(bytes = zip_bytes.len(), output_dir = %output_dir.display()))]
pub fn extract_csv(zip_bytes: &[u8], csv_name: &str, output_dir: &Path) -> Result<PathBuf> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(zip_bytes)).context("Downloaded file is not a zip archive")?;
    debug!(members = archive.len(), "Opened archive");

    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        if member.is_dir() || !member.name().ends_with(csv_name) {
            continue;
        }
        let relative = member
            .enclosed_name()
            .ok_or_else(|| anyhow!("Unsafe path in archive: {}", member.name()))?;

        let target = output_dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        let written = std::io::copy(&mut member, &mut file)?;

        info!(member = member.name(), written, path = %target.display(), "Extracted catalogue CSV");
        return Ok(target);
    }

    Err(anyhow!("No member ending with {csv_name} in archive"))
}
