//! Attention-percentage scatter plot with decluttered labels.

use crate::analyzers::types::OrganisationStats;
use crate::placement::{LabelPlacer, Placement, Point};

use super::axis::{LinearScale, LogScale, format_tick};
use super::svg::{Anchor, SvgDocument};
use super::theme::{ColorMap, Theme, normalize};

pub const SCATTER_WIDTH: f64 = 1200.0;
pub const SCATTER_HEIGHT: f64 = 800.0;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 70.0;
/// Marker area bounds, in square pixels.
const MARKER_AREA: (f64, f64) = (100.0, 1000.0);

/// A rendered scatter plot and the label layout it was drawn with.
#[derive(Debug, Clone)]
pub struct ScatterChart {
    pub svg: String,
    pub points: Vec<Point>,
    pub placement: Placement,
}

/// One point per organisation: x is total services, y is attention percentage.
pub fn scatter_points(stats: &[OrganisationStats]) -> Vec<Point> {
    stats
        .iter()
        .map(|s| {
            Point::new(
                s.total_services as f64,
                s.attention_percentage,
                s.organisation_name.clone(),
            )
        })
        .collect()
}

/// Plots `stats` on a log-x scatter, sized by total services and coloured by
/// attention percentage, with labels spread by `placer`.
pub fn render_scatter(
    stats: &[OrganisationStats],
    placer: &LabelPlacer,
    theme: &Theme,
    title: Option<&str>,
) -> ScatterChart {
    let points = scatter_points(stats);
    let placement = placer.place(&points);

    let mut doc = SvgDocument::new(SCATTER_WIDTH, SCATTER_HEIGHT, theme);
    let plot_left = MARGIN_LEFT;
    let plot_right = SCATTER_WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = SCATTER_HEIGHT - MARGIN_BOTTOM;

    let (x_min, x_max) = min_max(points.iter().map(|p| p.x)).unwrap_or((1.0, 10.0));
    let x_scale = LogScale::new(
        ((x_min / 1.5).max(0.5), (x_max * 1.5).max(2.0)),
        (plot_left, plot_right),
    );

    let label_ys = placement.labels.iter().map(|l| l.y);
    let (y_lo, y_hi) = min_max(points.iter().map(|p| p.y).chain(label_ys)).unwrap_or((0.0, 100.0));
    let y_scale = LinearScale::new(
        (y_lo.min(0.0) - 5.0, y_hi.max(100.0) + 5.0),
        (plot_bottom, plot_top),
    );

    for tick in x_scale.ticks() {
        let x = x_scale.map(tick);
        doc.line((x, plot_top), (x, plot_bottom), &theme.grid_color, 1.0);
        doc.text(x, plot_bottom + 14.0, &format_tick(tick), theme.tick_size, Anchor::Middle);
    }
    for tick in LinearScale::new((0.0, 100.0), (0.0, 1.0)).ticks(5) {
        let y = y_scale.map(tick);
        doc.line((plot_left, y), (plot_right, y), &theme.grid_color, 1.0);
        doc.text(plot_left - 8.0, y, &format_tick(tick), theme.tick_size, Anchor::End);
    }

    let cmap = ColorMap::attention();
    let (pct_min, pct_max) = min_max(points.iter().map(|p| p.y)).unwrap_or((0.0, 100.0));
    let (size_min, size_max) = (x_min, x_max);

    // largest markers first so small ones stay visible
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[b].x.total_cmp(&points[a].x));
    for idx in order {
        let point = &points[idx];
        let area = if size_max > size_min {
            MARKER_AREA.0 + normalize(point.x, size_min, size_max) * (MARKER_AREA.1 - MARKER_AREA.0)
        } else {
            (MARKER_AREA.0 + MARKER_AREA.1) / 2.0
        };
        let color = cmap.at(normalize(point.y, pct_min, pct_max));
        doc.circle(
            x_scale.map(point.x),
            y_scale.map(point.y),
            area.sqrt() / 2.0,
            &color.hex(),
        );
    }

    for line in placement.leader_lines.iter().filter(|l| !l.is_degenerate()) {
        doc.dashed_line(
            (x_scale.map(line.from.0), y_scale.map(line.from.1)),
            (x_scale.map(line.to.0), y_scale.map(line.to.1)),
            &theme.leader_color,
            0.5,
        );
    }

    for (point, label) in points.iter().zip(&placement.labels) {
        doc.text(
            x_scale.map(label.x),
            y_scale.map(label.y),
            &point.id,
            theme.annotation_size,
            Anchor::Start,
        );
    }

    doc.text(
        (plot_left + plot_right) / 2.0,
        SCATTER_HEIGHT - 25.0,
        "Total Number of Services",
        theme.axis_label_size,
        Anchor::Middle,
    );
    doc.vertical_text(
        22.0,
        (plot_top + plot_bottom) / 2.0,
        "Percentage of Services Needing Attention",
        theme.axis_label_size,
    );
    if let Some(title) = title {
        doc.text(SCATTER_WIDTH / 2.0, 20.0, title, theme.title_size, Anchor::Middle);
    }

    ScatterChart {
        svg: doc.finish(),
        points,
        placement,
    }
}

pub(crate) fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
