//! SVG string assembly and output.

use anyhow::{Result, anyhow};
use std::path::Path;
use tracing::debug;

use super::theme::Theme;

/// Horizontal text alignment, mapped onto `text-anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// An SVG document built up as a string.
pub struct SvgDocument {
    buf: String,
    width: f64,
    height: f64,
    font_family: String,
    text_color: String,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64, theme: &Theme) -> Self {
        let mut buf = String::new();
        buf.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        buf.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            theme.background
        ));
        Self {
            buf,
            width,
            height,
            font_family: theme.font_family.clone(),
            text_color: theme.text_color.clone(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, opacity: f64) {
        self.buf.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{fill}\" fill-opacity=\"{opacity:.3}\"/>",
            w.max(0.0),
            h.max(0.0),
        ));
    }

    pub fn outlined_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, opacity: f64, stroke: &str) {
        self.buf.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{fill}\" fill-opacity=\"{opacity:.3}\" stroke=\"{stroke}\" stroke-width=\"1\"/>",
            w.max(0.0),
            h.max(0.0),
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.buf.push_str(&format!(
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{fill}\" stroke=\"#FFFFFF\" stroke-width=\"0.75\"/>"
        ));
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &str, width: f64) {
        self.buf.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{stroke}\" stroke-width=\"{width}\"/>",
            from.0, from.1, to.0, to.1
        ));
    }

    pub fn dashed_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &str, width: f64) {
        self.buf.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{stroke}\" stroke-width=\"{width}\" stroke-dasharray=\"3 2\"/>",
            from.0, from.1, to.0, to.1
        ));
    }

    /// Text vertically centred on `y`.
    pub fn text(&mut self, x: f64, y: f64, content: &str, size: f32, anchor: Anchor) {
        self.buf.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" dy=\"0.35em\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{size}\" fill=\"{}\">{}</text>",
            anchor.as_str(),
            self.font_family,
            self.text_color,
            escape_xml(content)
        ));
    }

    /// Text rotated a quarter turn anticlockwise around `(x, y)`.
    pub fn vertical_text(&mut self, x: f64, y: f64, content: &str, size: f32) {
        self.buf.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" dy=\"0.35em\" text-anchor=\"middle\" transform=\"rotate(-90 {x:.2} {y:.2})\" font-family=\"{}\" font-size=\"{size}\" fill=\"{}\">{}</text>",
            self.font_family,
            self.text_color,
            escape_xml(content)
        ));
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("</svg>");
        self.buf
    }
}

/// Rough rendered width of `text`, good enough for layout and fit checks.
pub fn estimate_text_width(text: &str, size: f32) -> f64 {
    text.chars().count() as f64 * size as f64 * 0.58
}

pub fn write_svg(svg: &str, output: &Path) -> Result<()> {
    std::fs::write(output, svg)?;
    Ok(())
}

/// Rasterises `svg` to a PNG file using system fonts.
pub fn write_png(svg: &str, output: &Path) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

/// Writes `svg` as SVG when `output` ends in `.svg`, otherwise as PNG.
pub fn write_chart(svg: &str, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let is_svg = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    debug!(output = %output.display(), is_svg, "Writing chart");
    if is_svg {
        write_svg(svg, output)
    } else {
        write_png(svg, output)
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
