use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::PlacementError;

pub const DEFAULT_BUFFER: f64 = 0.5;
pub const DEFAULT_ITERATION_LIMIT: usize = 60;

/// Vertical spread applied across the members of one overlap group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct OffsetRange {
    pub min: f64,
    pub max: f64,
}

impl OffsetRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Offset of the `index`-th member of a group of `size` members.
    ///
    /// Members are spread evenly from `min` to `max`. Groups of one or fewer
    /// members are never moved.
    pub fn offset(&self, index: usize, size: usize) -> f64 {
        if size <= 1 {
            return 0.0;
        }
        let step = (self.max - self.min) / (size - 1) as f64;
        self.min + step * index as f64
    }
}

impl From<(f64, f64)> for OffsetRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<OffsetRange> for (f64, f64) {
    fn from(range: OffsetRange) -> Self {
        (range.min, range.max)
    }
}

/// Maps overlap-group size to the vertical spread used for that size.
///
/// Sizes without an entry use the range of the largest configured size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffsetRanges(BTreeMap<usize, OffsetRange>);

impl OffsetRanges {
    pub fn new(entries: impl IntoIterator<Item = (usize, OffsetRange)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn range_for(&self, size: usize) -> Option<OffsetRange> {
        self.0
            .get(&size)
            .or_else(|| self.0.values().next_back())
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, OffsetRange)> + '_ {
        self.0.iter().map(|(size, range)| (*size, *range))
    }

    fn validate(&self) -> Result<(), PlacementError> {
        if self.0.is_empty() {
            return Err(PlacementError::InvalidConfiguration(
                "offset range table is empty".into(),
            ));
        }
        for (size, range) in self.iter() {
            if size < 2 {
                return Err(PlacementError::InvalidConfiguration(format!(
                    "offset range keyed by group size {size}, sizes start at 2"
                )));
            }
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(PlacementError::InvalidConfiguration(format!(
                    "offset range for group size {size} is ({}, {})",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

impl Default for OffsetRanges {
    fn default() -> Self {
        Self::new([
            (2, OffsetRange::new(-0.5, 0.5)),
            (3, OffsetRange::new(-2.0, 2.0)),
            (4, OffsetRange::new(-3.0, 3.0)),
            (5, OffsetRange::new(-4.0, 4.0)),
        ])
    }
}

/// How overlapping points are collected into groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Grouping {
    /// Connected components of the overlap graph; each label moves once per pass.
    #[default]
    Partition,
    /// One group per point: itself first, then its direct neighbours. Later
    /// groups overwrite earlier assignments within a pass.
    PerPoint,
}

/// Tuning for [`super::LabelPlacer`].
///
/// Loaded from JSON with every field optional:
/// ```json
/// {
///   "buffer": 0.5,
///   "iteration_limit": 60,
///   "offset_ranges": { "2": [-0.5, 0.5], "3": [-2, 2] },
///   "grouping": "per-point",
///   "early_exit": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub buffer: f64,
    pub iteration_limit: usize,
    pub offset_ranges: OffsetRanges,
    pub grouping: Grouping,
    pub early_exit: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BUFFER,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            offset_ranges: OffsetRanges::default(),
            grouping: Grouping::default(),
            early_exit: true,
        }
    }
}

impl PlacementConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PlacementConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlacementError> {
        if !self.buffer.is_finite() || self.buffer <= 0.0 {
            return Err(PlacementError::InvalidConfiguration(format!(
                "buffer must be a positive distance, got {}",
                self.buffer
            )));
        }
        if self.iteration_limit == 0 {
            return Err(PlacementError::InvalidConfiguration(
                "iteration limit must be at least 1".into(),
            ));
        }
        self.offset_ranges.validate()
    }
}
