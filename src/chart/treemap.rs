//! Squarified treemaps of organisations.

use crate::analyzers::types::{OrganisationStats, ServiceStatus, StatusCounts};

use super::svg::{Anchor, SvgDocument, estimate_text_width};
use super::theme::{ColorMap, Theme, normalize};

pub const ATTENTION_TITLE: &str = "Organisation Services Needing Attention Treemap";
pub const STATUS_TITLE: &str = "Service Publication Status by Organisation";

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;
const TITLE_BAND: f64 = 44.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreemapRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl TreemapRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    fn inset(self, padding: f64) -> Self {
        let pad = padding.max(0.0);
        Self {
            x: self.x + pad,
            y: self.y + pad,
            w: (self.w - pad * 2.0).max(0.0),
            h: (self.h - pad * 2.0).max(0.0),
        }
    }

    fn short_side(&self) -> f64 {
        self.w.min(self.h)
    }
}

/// Lays `weights` out as squarified rectangles filling `bounds`.
///
/// The result is index-aligned with `weights`; non-positive weights get an
/// empty rectangle at the origin of `bounds`.
pub fn squarify(weights: &[f64], bounds: TreemapRect) -> Vec<TreemapRect> {
    let empty = TreemapRect::new(bounds.x, bounds.y, 0.0, 0.0);
    let mut out = vec![empty; weights.len()];

    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return out;
    }
    let scale = bounds.area() / total;

    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0.0).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

    let mut remaining = bounds;
    let mut row: Vec<(usize, f64)> = Vec::new();
    for idx in order {
        let area = weights[idx] * scale;
        let side = remaining.short_side();
        if row.is_empty() || worst_with(&row, area, side) <= worst(&row, side) {
            row.push((idx, area));
        } else {
            remaining = layout_row(&row, remaining, &mut out);
            row = vec![(idx, area)];
        }
    }
    if !row.is_empty() {
        layout_row(&row, remaining, &mut out);
    }
    out
}

/// Worst aspect ratio of a row of areas laid along a side of length `side`.
fn worst(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    let max = row.iter().map(|(_, a)| *a).fold(f64::MIN, f64::max);
    let min = row.iter().map(|(_, a)| *a).fold(f64::MAX, f64::min);
    aspect(sum, max, min, side)
}

fn worst_with(row: &[(usize, f64)], area: f64, side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum::<f64>() + area;
    let max = row.iter().map(|(_, a)| *a).fold(area, f64::max);
    let min = row.iter().map(|(_, a)| *a).fold(area, f64::min);
    aspect(sum, max, min, side)
}

fn aspect(sum: f64, max: f64, min: f64, side: f64) -> f64 {
    if sum <= 0.0 || min <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    (side_sq * max / sum_sq).max(sum_sq / (side_sq * min))
}

/// Places `row` along the short side of `rect` and returns what is left.
fn layout_row(row: &[(usize, f64)], rect: TreemapRect, out: &mut [TreemapRect]) -> TreemapRect {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    if rect.w >= rect.h {
        // column on the left
        let col_w = if rect.h > 0.0 { sum / rect.h } else { 0.0 };
        let mut y = rect.y;
        for &(idx, area) in row {
            let h = if col_w > 0.0 { area / col_w } else { 0.0 };
            out[idx] = TreemapRect::new(rect.x, y, col_w, h);
            y += h;
        }
        TreemapRect::new(rect.x + col_w, rect.y, (rect.w - col_w).max(0.0), rect.h)
    } else {
        // row along the top
        let row_h = if rect.w > 0.0 { sum / rect.w } else { 0.0 };
        let mut x = rect.x;
        for &(idx, area) in row {
            let w = if row_h > 0.0 { area / row_h } else { 0.0 };
            out[idx] = TreemapRect::new(x, rect.y, w, row_h);
            x += w;
        }
        TreemapRect::new(rect.x, rect.y + row_h, rect.w, (rect.h - row_h).max(0.0))
    }
}

fn plot_bounds() -> TreemapRect {
    TreemapRect::new(10.0, TITLE_BAND, WIDTH - 20.0, HEIGHT - TITLE_BAND - 10.0)
}

fn label_if_fits(doc: &mut SvgDocument, rect: TreemapRect, text: &str, size: f32) {
    let fits = estimate_text_width(text, size) <= rect.w - 6.0 && (size as f64) * 1.4 <= rect.h;
    if fits {
        doc.text(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0, text, size, Anchor::Middle);
    }
}

/// Organisations sized by total services and coloured by attention
/// percentage, normalised across the organisations shown.
pub fn render_attention_treemap(stats: &[OrganisationStats], theme: &Theme) -> String {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT, theme);
    doc.text(WIDTH / 2.0, 22.0, ATTENTION_TITLE, theme.title_size, Anchor::Middle);

    let shown: Vec<&OrganisationStats> = stats.iter().filter(|s| s.total_services > 0).collect();
    let weights: Vec<f64> = shown.iter().map(|s| s.total_services as f64).collect();
    let rects = squarify(&weights, plot_bounds());

    let cmap = ColorMap::attention_skewed();
    let pct_min = shown.iter().map(|s| s.attention_percentage).fold(f64::INFINITY, f64::min);
    let pct_max = shown.iter().map(|s| s.attention_percentage).fold(f64::NEG_INFINITY, f64::max);

    for (org, rect) in shown.iter().zip(&rects) {
        let color = cmap.at(normalize(org.attention_percentage, pct_min, pct_max));
        doc.outlined_rect(rect.x, rect.y, rect.w, rect.h, &color.hex(), 0.8, &theme.background);
        label_if_fits(&mut doc, *rect, &org.organisation_name, theme.annotation_size + 2.0);
    }

    doc.finish()
}

/// Organisations sized by service count, each split into rectangles per
/// publication status.
pub fn render_status_treemap(counts: &[StatusCounts], theme: &Theme) -> String {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT, theme);
    doc.text(WIDTH / 2.0, 22.0, STATUS_TITLE, theme.title_size, Anchor::Middle);

    let weights: Vec<f64> = counts.iter().map(|c| c.total() as f64).collect();
    let org_rects = squarify(&weights, plot_bounds());

    for (org, org_rect) in counts.iter().zip(&org_rects) {
        let inner = org_rect.inset(1.0);
        let status_weights: Vec<f64> = org.counts.iter().map(|(_, n)| *n as f64).collect();
        let status_rects = squarify(&status_weights, inner);
        for ((status, _), rect) in org.counts.iter().zip(&status_rects) {
            let color = Theme::status_color(*status).hex();
            doc.rect(rect.x, rect.y, rect.w, rect.h, &color, 0.6);
        }
        doc.outlined_rect(org_rect.x, org_rect.y, org_rect.w, org_rect.h, "none", 0.0, &theme.background);
        label_if_fits(&mut doc, *org_rect, &org.organisation_name, theme.annotation_size + 2.0);
    }

    let mut x = 14.0;
    let y = HEIGHT - 4.0;
    for status in ServiceStatus::ALL {
        let label = status.label();
        doc.rect(x, y - 9.0, 10.0, 8.0, &Theme::status_color(status).hex(), 0.6);
        doc.text(x + 14.0, y - 5.0, label, theme.annotation_size + 1.0, Anchor::Start);
        x += 24.0 + estimate_text_width(label, theme.annotation_size + 1.0);
    }

    doc.finish()
}
