//! SVG charts of catalogue statistics, with PNG rasterisation.

pub mod axis;
pub mod bar;
pub mod scatter;
pub mod svg;
pub mod theme;
pub mod treemap;

pub use bar::{ranking_title, render_breakdown, render_ranking};
pub use scatter::{ScatterChart, render_scatter};
pub use svg::{write_chart, write_png, write_svg};
pub use theme::Theme;
pub use treemap::{render_attention_treemap, render_status_treemap, squarify};
