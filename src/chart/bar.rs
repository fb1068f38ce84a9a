//! Ranking bar chart and the stacked per-operator breakdown.

use crate::analyzers::types::{OperatorBreakdown, OrganisationStats};

use super::axis::{LinearScale, format_tick};
use super::svg::{Anchor, SvgDocument, estimate_text_width};
use super::theme::{Rgb, Theme};

pub const BREAKDOWN_TITLE: &str = "Detailed Breakdown for Top 3 Operators Requiring Attention";

/// Heading for the ranking of the `limit` largest operators at or above
/// `min_percentage`.
pub fn ranking_title(limit: usize, min_percentage: f64) -> String {
    format!("Top {limit} Operators with ≥ {min_percentage}% Services Requiring Attention")
}

/// Horizontal bars of total services, first operator at the top.
pub fn render_ranking(operators: &[OrganisationStats], theme: &Theme, title: &str) -> String {
    let width = 1200.0;
    let height = 1000.0;
    let label_width = operators
        .iter()
        .map(|op| estimate_text_width(&op.organisation_name, theme.tick_size))
        .fold(0.0, f64::max);

    let plot_left = (label_width + 60.0).min(width / 2.0);
    let plot_right = width - 40.0;
    let plot_top = 60.0;
    let plot_bottom = height - 70.0;

    let mut doc = SvgDocument::new(width, height, theme);
    doc.text(width / 2.0, 28.0, title, theme.title_size, Anchor::Middle);

    let max_total = operators
        .iter()
        .map(|op| op.total_services)
        .max()
        .unwrap_or(1)
        .max(1) as f64;
    let x_scale = LinearScale::new((0.0, max_total * 1.05), (plot_left, plot_right));
    for tick in x_scale.ticks(6) {
        let x = x_scale.map(tick);
        doc.line((x, plot_top), (x, plot_bottom), &theme.grid_color, 1.0);
        doc.text(x, plot_bottom + 14.0, &format_tick(tick), theme.tick_size, Anchor::Middle);
    }

    let slot = (plot_bottom - plot_top) / operators.len().max(1) as f64;
    for (rank, op) in operators.iter().enumerate() {
        let y = plot_top + slot * rank as f64;
        let bar_height = slot * 0.8;
        let x_end = x_scale.map(op.total_services as f64);
        doc.rect(
            plot_left,
            y + slot * 0.1,
            x_end - plot_left,
            bar_height,
            &Theme::rank_color(rank).hex(),
            1.0,
        );
        doc.text(
            plot_left - 6.0,
            y + slot / 2.0,
            &op.organisation_name,
            theme.tick_size,
            Anchor::End,
        );
    }

    doc.text(
        (plot_left + plot_right) / 2.0,
        height - 25.0,
        "Number of Services",
        theme.axis_label_size,
        Anchor::Middle,
    );
    doc.vertical_text(18.0, (plot_top + plot_bottom) / 2.0, "Operators", theme.axis_label_size);

    doc.finish()
}

/// Opacity of the `idx`-th of `len` timeliness segments.
pub fn segment_alpha(idx: usize, len: usize) -> f64 {
    if len == 0 {
        return 1.0;
    }
    0.5 + 0.5 * (idx as f64 / len as f64)
}

/// One panel per operator, sharing a y scale. Each panel stacks the
/// unpublished count in the panel's colour, then one lighter segment per
/// timeliness status.
pub fn render_breakdown(breakdowns: &[OperatorBreakdown], theme: &Theme) -> String {
    let panel_width = 600.0;
    let width = panel_width * breakdowns.len().max(1) as f64;
    let height = 600.0;
    let plot_top = 80.0;
    let plot_bottom = height - 60.0;

    let mut doc = SvgDocument::new(width, height, theme);
    doc.text(width / 2.0, 24.0, BREAKDOWN_TITLE, theme.title_size, Anchor::Middle);

    let max_total = breakdowns
        .iter()
        .map(OperatorBreakdown::total)
        .max()
        .unwrap_or(1)
        .max(1) as f64;
    let y_scale = LinearScale::new((0.0, max_total * 1.05), (plot_bottom, plot_top));

    for (idx, breakdown) in breakdowns.iter().enumerate() {
        let base = Theme::rank_color(idx);
        let left = panel_width * idx as f64 + 80.0;
        let right = panel_width * (idx + 1) as f64 - 20.0;

        for tick in y_scale.ticks(6) {
            let y = y_scale.map(tick);
            doc.line((left, y), (right, y), &theme.grid_color, 1.0);
            if idx == 0 {
                doc.text(left - 8.0, y, &format_tick(tick), theme.tick_size, Anchor::End);
            }
        }

        let bar_left = left + (right - left) * 0.3;
        let bar_width = (right - left) * 0.4;
        let mut segments: Vec<(String, usize, f64)> =
            vec![("Unpublished".to_string(), breakdown.unpublished, 1.0)];
        let len = breakdown.timeliness.len();
        segments.extend(
            breakdown
                .timeliness
                .iter()
                .enumerate()
                .map(|(i, (status, count))| (status.clone(), *count, segment_alpha(i, len))),
        );

        let mut bottom = 0.0;
        for (_, count, alpha) in &segments {
            let top = bottom + *count as f64;
            let y_top = y_scale.map(top);
            doc.rect(bar_left, y_top, bar_width, y_scale.map(bottom) - y_top, &base.hex(), *alpha);
            bottom = top;
        }

        draw_legend(&mut doc, right, plot_top, base, &segments, theme);

        let centre = (left + right) / 2.0;
        doc.text(centre, plot_top - 24.0, &breakdown.organisation_name, theme.axis_label_size, Anchor::Middle);
        doc.text(centre, plot_bottom + 14.0, &breakdown.organisation_name, theme.tick_size, Anchor::Middle);
        doc.text(centre, height - 22.0, "Operator", theme.axis_label_size, Anchor::Middle);
        doc.vertical_text(
            left - 55.0,
            (plot_top + plot_bottom) / 2.0,
            "Number of Services Requiring Attention",
            theme.axis_label_size,
        );
    }

    doc.finish()
}

fn draw_legend(
    doc: &mut SvgDocument,
    right: f64,
    top: f64,
    base: Rgb,
    segments: &[(String, usize, f64)],
    theme: &Theme,
) {
    let text_width = segments
        .iter()
        .map(|(label, _, _)| estimate_text_width(label, theme.tick_size))
        .fold(0.0, f64::max);
    let box_left = right - text_width - 30.0;
    let row = theme.tick_size as f64 * 1.6;

    doc.outlined_rect(
        box_left - 6.0,
        top,
        text_width + 32.0,
        row * segments.len() as f64 + 8.0,
        &theme.background,
        0.9,
        &theme.grid_color,
    );
    for (i, (label, _, alpha)) in segments.iter().enumerate() {
        let y = top + 4.0 + row * i as f64 + row / 2.0;
        doc.rect(box_left, y - 5.0, 14.0, 10.0, &base.hex(), *alpha);
        doc.text(box_left + 20.0, y, label, theme.tick_size, Anchor::Start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(name: &str, total: usize) -> OrganisationStats {
        OrganisationStats {
            organisation_name: name.to_string(),
            total_services: total,
            services_needing_attention: total,
            attention_percentage: 100.0,
        }
    }

    #[test]
    fn test_ranking_colours_top_three() {
        let ops = vec![op("First", 40), op("Second", 30), op("Third", 20), op("Fourth", 10)];
        let svg = render_ranking(&ops, &Theme::whitegrid(), &ranking_title(20, 75.0));

        for colour in ["#FF0000", "#008000", "#0000FF", "#808080"] {
            assert!(svg.contains(colour), "missing {colour}");
        }
        let first = svg.find(">First<").unwrap();
        let fourth = svg.find(">Fourth<").unwrap();
        assert!(first < fourth);
        assert!(svg.contains("≥ 75%"));
    }

    #[test]
    fn test_ranking_title() {
        assert_eq!(
            ranking_title(20, 75.0),
            "Top 20 Operators with ≥ 75% Services Requiring Attention"
        );
        assert_eq!(
            ranking_title(10, 82.5),
            "Top 10 Operators with ≥ 82.5% Services Requiring Attention"
        );
    }

    #[test]
    fn test_segment_alpha() {
        assert_eq!(segment_alpha(0, 2), 0.5);
        assert_eq!(segment_alpha(1, 2), 0.75);
        assert_eq!(segment_alpha(0, 0), 1.0);
    }

    #[test]
    fn test_breakdown_has_a_panel_per_operator() {
        let breakdowns = vec![
            OperatorBreakdown {
                organisation_name: "Acme".to_string(),
                unpublished: 3,
                timeliness: vec![("Stale - 42 day look ahead".to_string(), 2)],
            },
            OperatorBreakdown {
                organisation_name: "Zenith".to_string(),
                unpublished: 1,
                timeliness: vec![],
            },
        ];
        let svg = render_breakdown(&breakdowns, &Theme::whitegrid());

        assert!(svg.contains("width=\"1200\""));
        assert!(svg.contains("Stale - 42 day look ahead"));
        assert_eq!(svg.matches("Number of Services Requiring Attention").count(), 2);
        assert!(svg.contains(BREAKDOWN_TITLE));
    }
}
