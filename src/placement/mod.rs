//! Label placement for scatter-plot annotations.
//!
//! Labels start on top of their points. Points that sit closer than the
//! configured buffer are collected into overlap groups, and each pass spreads
//! every group's labels vertically across the offset range configured for
//! its size. Points never move, label x coordinates stay on their point, and
//! a point with no neighbour inside the buffer keeps its label where it is.
//!
//! Passes read the previous snapshot and write a fresh one. The loop is
//! bounded by `iteration_limit` and may stop early once a pass changes
//! nothing.

mod config;
mod error;
mod group;

pub use config::{
    DEFAULT_BUFFER, DEFAULT_ITERATION_LIMIT, Grouping, OffsetRange, OffsetRanges, PlacementConfig,
};
pub use error::PlacementError;

use crate::analyzers::utility::mean;
use group::{overlapping_pairs, partition_groups, per_point_groups};
use tracing::debug;

/// A data point in chart-data space with the text drawn for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub id: String,
}

impl Point {
    pub fn new(x: f64, y: f64, id: impl Into<String>) -> Self {
        Self { x, y, id: id.into() }
    }
}

/// Where a point's text is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
}

impl Label {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Label) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<&Point> for Label {
    fn from(point: &Point) -> Self {
        Self::new(point.x, point.y)
    }
}

/// Segment from a point to its final label position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderLine {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl LeaderLine {
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }
}

/// Result of a placement run, index-aligned with the input points.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub labels: Vec<Label>,
    pub leader_lines: Vec<LeaderLine>,
    /// Passes actually run, at most the configured iteration limit.
    pub iterations: usize,
    /// `true` when no two final labels sit closer than the buffer.
    pub resolved: bool,
}

/// Runs the iterative declutter pass over a set of points.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    config: PlacementConfig,
}

impl LabelPlacer {
    /// Validates `config`; a placer always holds a valid configuration.
    pub fn new(config: PlacementConfig) -> Result<Self, PlacementError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Places labels starting from their points' own coordinates.
    pub fn place(&self, points: &[Point]) -> Placement {
        let initial: Vec<Label> = points.iter().map(Label::from).collect();
        self.run(points, initial)
    }

    /// Places labels starting from caller-provided positions.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::ArityMismatch`] if `labels` and `points`
    /// differ in length.
    pub fn place_from(
        &self,
        points: &[Point],
        labels: &[Label],
    ) -> Result<Placement, PlacementError> {
        if points.len() != labels.len() {
            return Err(PlacementError::ArityMismatch {
                points: points.len(),
                labels: labels.len(),
            });
        }
        Ok(self.run(points, labels.to_vec()))
    }

    fn run(&self, points: &[Point], mut labels: Vec<Label>) -> Placement {
        let positions: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        let pairs = overlapping_pairs(&positions, self.config.buffer);
        let groups = match self.config.grouping {
            Grouping::Partition => partition_groups(points.len(), &pairs),
            Grouping::PerPoint => per_point_groups(points.len(), &pairs),
        };
        debug!(pairs = pairs.len(), groups = groups.len(), "Overlap groups built");

        let mut iterations = 0;
        while iterations < self.config.iteration_limit {
            let next = self.pass(points, &groups, &labels);
            iterations += 1;
            let unchanged = next == labels;
            labels = next;
            if self.config.early_exit && unchanged {
                break;
            }
        }

        let label_positions: Vec<(f64, f64)> = labels.iter().map(|l| (l.x, l.y)).collect();
        let resolved = overlapping_pairs(&label_positions, self.config.buffer).is_empty();
        debug!(
            points = points.len(),
            iterations,
            resolved,
            "Label placement finished"
        );

        let leader_lines = points
            .iter()
            .zip(&labels)
            .map(|(point, label)| LeaderLine {
                from: (point.x, point.y),
                to: (label.x, label.y),
            })
            .collect();

        Placement {
            labels,
            leader_lines,
            iterations,
            resolved,
        }
    }

    /// One read-then-write pass over the previous snapshot.
    fn pass(&self, points: &[Point], groups: &[Vec<usize>], current: &[Label]) -> Vec<Label> {
        let mut next = current.to_vec();
        for group in groups {
            let size = group.len();
            let Some(range) = self.config.offset_ranges.range_for(size) else {
                continue;
            };
            for (rank, &idx) in group.iter().enumerate() {
                let point = &points[idx];
                next[idx] = Label::new(point.x, point.y + range.offset(rank, size));
            }
        }
        next
    }
}

/// Places labels for `points` with `config`.
pub fn place_labels(points: &[Point], config: &PlacementConfig) -> Result<Placement, PlacementError> {
    Ok(LabelPlacer::new(config.clone())?.place(points))
}

/// Mean Euclidean distance over every unordered pair of points. Returns 0.0
/// for fewer than two points.
pub fn mean_pairwise_distance(points: &[Point]) -> f64 {
    let mut distances = Vec::new();
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            distances.push((a.x - b.x).hypot(a.y - b.y));
        }
    }
    mean(&distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn placer() -> LabelPlacer {
        LabelPlacer::new(PlacementConfig::default()).unwrap()
    }

    #[test]
    fn test_isolated_points_are_untouched() {
        let points = vec![
            Point::new(1.0, 10.0, "A"),
            Point::new(5.0, 10.0, "B"),
            Point::new(1.0, 60.0, "C"),
        ];
        let placement = placer().place(&points);

        for (point, label) in points.iter().zip(&placement.labels) {
            assert_eq!(label, &Label::from(point));
        }
        assert!(placement.resolved);
        assert!(placement.leader_lines.iter().all(LeaderLine::is_degenerate));
    }

    #[test]
    fn test_single_point_unchanged() {
        let points = vec![Point::new(100.0, 10.0, "X")];
        let placement = placer().place(&points);

        assert_eq!(placement.labels, vec![Label::new(100.0, 10.0)]);
        assert_eq!(placement.iterations, 1);
    }

    #[test]
    fn test_two_overlapping_points_land_on_range_extremes() {
        let points = vec![Point::new(1.0, 50.0, "A"), Point::new(1.1, 50.0, "B")];
        let placement = placer().place(&points);

        let a = placement.labels[0];
        let b = placement.labels[1];
        assert!((a.y - 49.5).abs() < 1e-9);
        assert!((b.y - 50.5).abs() < 1e-9);
        assert!(((b.y - a.y) - 1.0).abs() < 1e-9);
        assert_eq!(a.x, 1.0);
        assert_eq!(b.x, 1.1);
        assert!(placement.resolved);
    }

    #[test]
    fn test_per_point_grouping_lets_the_later_group_win() {
        let config = PlacementConfig {
            grouping: Grouping::PerPoint,
            ..Default::default()
        };
        let points = vec![Point::new(1.0, 50.0, "A"), Point::new(1.1, 50.0, "B")];
        let placement = place_labels(&points, &config).unwrap();

        // B's group [B, A] is applied after A's group [A, B]
        assert!((placement.labels[0].y - 50.5).abs() < 1e-9);
        assert!((placement.labels[1].y - 49.5).abs() < 1e-9);
    }

    #[test]
    fn test_three_way_chain_uses_size_three_range() {
        // A-B and B-C overlap, A-C do not: one partition group of three.
        let points = vec![
            Point::new(0.0, 20.0, "A"),
            Point::new(0.3, 20.0, "B"),
            Point::new(0.6, 20.0, "C"),
        ];
        let placement = placer().place(&points);

        let ys: Vec<f64> = placement.labels.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![18.0, 20.0, 22.0]);
    }

    #[test]
    fn test_chain_differs_between_grouping_modes() {
        let points = vec![
            Point::new(0.0, 20.0, "A"),
            Point::new(0.3, 20.0, "B"),
            Point::new(0.6, 20.0, "C"),
        ];
        let config = PlacementConfig {
            grouping: Grouping::PerPoint,
            ..Default::default()
        };
        let placement = place_labels(&points, &config).unwrap();

        // [A, B] then [B, A, C] puts A at 0 on the three-member range;
        // [C, B] last sends C down and B up.
        let ys: Vec<f64> = placement.labels.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![20.0, 20.5, 19.5]);
        assert_eq!(placement.iterations, 2);
    }

    fn near_pair_with_bystander() -> Vec<Point> {
        // A-B overlap; C is 0.9 from B and 1.2 from A
        vec![
            Point::new(0.0, 50.0, "A"),
            Point::new(0.0, 50.3, "B"),
            Point::new(0.0, 51.2, "C"),
        ]
    }

    #[test]
    fn test_bystander_keeps_its_label_when_a_neighbour_label_drifts_close() {
        let points = near_pair_with_bystander();
        let placement = placer().place(&points);

        let ys: Vec<f64> = placement.labels.iter().map(|l| l.y).collect();
        assert!((ys[0] - 49.5).abs() < 1e-9);
        assert!((ys[1] - 50.8).abs() < 1e-9);
        assert_eq!(ys[2], 51.2);
        assert!(placement.leader_lines[2].is_degenerate());
        // B's label now sits 0.4 from C's
        assert!(!placement.resolved);
    }

    #[test]
    fn test_multi_pass_result_is_stable() {
        let points = near_pair_with_bystander();
        for grouping in [Grouping::Partition, Grouping::PerPoint] {
            let early = place_labels(&points, &PlacementConfig { grouping, ..Default::default() }).unwrap();
            let exhaustive = place_labels(
                &points,
                &PlacementConfig {
                    grouping,
                    early_exit: false,
                    ..Default::default()
                },
            )
            .unwrap();

            assert_eq!(early.iterations, 2);
            assert_eq!(exhaustive.iterations, DEFAULT_ITERATION_LIMIT);
            assert_eq!(early.labels, exhaustive.labels);
            assert_eq!(exhaustive.labels[2].y, 51.2);
        }

        let per_point = place_labels(
            &points,
            &PlacementConfig {
                grouping: Grouping::PerPoint,
                ..Default::default()
            },
        )
        .unwrap();
        let ys: Vec<f64> = per_point.labels.iter().map(|l| l.y).collect();
        assert!((ys[0] - 50.5).abs() < 1e-9);
        assert!((ys[1] - 49.8).abs() < 1e-9);
        assert_eq!(ys[2], 51.2);
    }

    #[test]
    fn test_large_group_uses_default_range() {
        let points: Vec<Point> = (0..8).map(|i| Point::new(3.0, 40.0, format!("P{i}"))).collect();
        let placement = placer().place(&points);

        let first = placement.labels.first().unwrap();
        let last = placement.labels.last().unwrap();
        assert!((first.y - 36.0).abs() < 1e-9);
        assert!((last.y - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_fully_overlapping_points_terminate() {
        let points: Vec<Point> = (0..50).map(|i| Point::new(7.0, 7.0, format!("P{i}"))).collect();
        let config = PlacementConfig {
            early_exit: false,
            ..Default::default()
        };
        let placement = place_labels(&points, &config).unwrap();

        assert_eq!(placement.iterations, config.iteration_limit);
        assert_eq!(placement.labels.len(), 50);
        assert!(!placement.resolved);
    }

    #[test]
    fn test_early_exit_stops_before_limit() {
        let points = vec![Point::new(1.0, 50.0, "A"), Point::new(1.1, 50.0, "B")];
        let placement = placer().place(&points);
        assert_eq!(placement.iterations, 2);

        let config = PlacementConfig {
            early_exit: false,
            ..Default::default()
        };
        let exhaustive = place_labels(&points, &config).unwrap();
        assert_eq!(exhaustive.iterations, DEFAULT_ITERATION_LIMIT);
        assert_eq!(exhaustive.labels, placement.labels);
    }

    #[test]
    fn test_leader_lines_connect_point_to_label() {
        let points = vec![Point::new(1.0, 50.0, "A"), Point::new(1.1, 50.0, "B")];
        let placement = placer().place(&points);

        for ((point, label), line) in points
            .iter()
            .zip(&placement.labels)
            .zip(&placement.leader_lines)
        {
            assert_eq!(line.from, (point.x, point.y));
            assert_eq!(line.to, (label.x, label.y));
        }
    }

    #[test]
    fn test_place_from_rejects_arity_mismatch() {
        let points = vec![Point::new(1.0, 1.0, "A"), Point::new(2.0, 2.0, "B")];
        let labels = vec![Label::new(1.0, 1.0)];
        let err = placer().place_from(&points, &labels).unwrap_err();
        assert_eq!(err, PlacementError::ArityMismatch { points: 2, labels: 1 });
    }

    #[test]
    fn test_invalid_config_is_rejected_before_work() {
        let config = PlacementConfig {
            buffer: 0.0,
            ..Default::default()
        };
        let err = place_labels(&[Point::new(0.0, 0.0, "A")], &config).unwrap_err();
        assert!(matches!(err, PlacementError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_mean_pairwise_distance() {
        assert_eq!(mean_pairwise_distance(&[]), 0.0);
        let points = vec![
            Point::new(0.0, 0.0, "A"),
            Point::new(3.0, 4.0, "B"),
            Point::new(0.0, 4.0, "C"),
        ];
        // 5, 4, 3
        assert!((mean_pairwise_distance(&points) - 4.0).abs() < 1e-9);
    }

    fn arb_points() -> impl Strategy<Value = Vec<Point>> {
        prop::collection::vec((0.0f64..20.0, 0.0f64..100.0), 0..40).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, (x, y))| Point::new(x, y, format!("P{i}")))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn placement_is_bounded_and_aligned(points in arb_points(), limit in 1usize..80) {
            let config = PlacementConfig { iteration_limit: limit, ..Default::default() };
            let placement = place_labels(&points, &config).unwrap();

            prop_assert!(placement.iterations <= limit);
            prop_assert_eq!(placement.labels.len(), points.len());
            prop_assert_eq!(placement.leader_lines.len(), points.len());
            for (point, label) in points.iter().zip(&placement.labels) {
                prop_assert_eq!(point.x, label.x);
            }
        }

        #[test]
        fn placement_is_deterministic(points in arb_points()) {
            let before = points.clone();
            let first = placer().place(&points);
            let second = placer().place(&points);

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(points, before);
        }

        #[test]
        fn points_without_neighbours_never_move(points in arb_points()) {
            let placement = placer().place(&points);

            for (i, (point, label)) in points.iter().zip(&placement.labels).enumerate() {
                let isolated = points.iter().enumerate().all(|(j, other)| {
                    i == j || (point.x - other.x).hypot(point.y - other.y) >= DEFAULT_BUFFER
                });
                if isolated {
                    prop_assert_eq!(Label::from(point), *label);
                }
            }
        }

        #[test]
        fn well_separated_points_never_move(count in 0usize..20, spacing in 0.6f64..10.0) {
            let points: Vec<Point> = (0..count)
                .map(|i| Point::new(i as f64 * spacing, 50.0, format!("P{i}")))
                .collect();
            let placement = placer().place(&points);

            for (point, label) in points.iter().zip(&placement.labels) {
                prop_assert_eq!(Label::from(point), *label);
            }
        }
    }
}
