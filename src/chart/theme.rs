use crate::analyzers::types::ServiceStatus;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb(0x00, 0x80, 0x00);
    pub const BLUE: Rgb = Rgb(0x00, 0x00, 0xFF);
    pub const YELLOW: Rgb = Rgb(0xFF, 0xFF, 0x00);
    pub const GREY: Rgb = Rgb(0x80, 0x80, 0x80);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// Piecewise-linear colour map over `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ColorMap {
    stops: Vec<(f64, Rgb)>,
}

impl ColorMap {
    /// `stops` must be sorted by position and span 0.0 to 1.0.
    pub fn new(stops: Vec<(f64, Rgb)>) -> Self {
        Self { stops }
    }

    /// Green through yellow at the midpoint to red.
    pub fn attention() -> Self {
        Self::new(vec![(0.0, Rgb::GREEN), (0.5, Rgb::YELLOW), (1.0, Rgb::RED)])
    }

    /// Green through yellow at 0.7 to red.
    pub fn attention_skewed() -> Self {
        Self::new(vec![(0.0, Rgb::GREEN), (0.7, Rgb::YELLOW), (1.0, Rgb::RED)])
    }

    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let Some(&(_, first)) = self.stops.first() else {
            return Rgb::BLACK;
        };
        for pair in self.stops.windows(2) {
            let (p0, c0) = pair[0];
            let (p1, c1) = pair[1];
            if t <= p1 {
                let span = p1 - p0;
                let local = if span <= 0.0 { 1.0 } else { (t - p0) / span };
                return Rgb::lerp(c0, c1, local);
            }
        }
        self.stops.last().map(|&(_, c)| c).unwrap_or(first)
    }
}

/// Scales `value` into `[0, 1]` over `[min, max]`. A degenerate range maps
/// everything to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        0.0
    } else {
        (value - min) / (max - min)
    }
}

/// Fonts and colours shared by every chart.
#[derive(Debug, Clone)]
pub struct Theme {
    pub font_family: String,
    pub title_size: f32,
    pub axis_label_size: f32,
    pub tick_size: f32,
    pub annotation_size: f32,
    pub text_color: String,
    pub grid_color: String,
    pub background: String,
    pub leader_color: String,
}

impl Theme {
    /// White background with light grid lines and no spines.
    pub fn whitegrid() -> Self {
        Self {
            font_family: "DejaVu Sans, Arial, Helvetica, sans-serif".to_string(),
            title_size: 16.0,
            axis_label_size: 13.0,
            tick_size: 11.0,
            annotation_size: 7.0,
            text_color: "#262626".to_string(),
            grid_color: "#EAEAF2".to_string(),
            background: "#FFFFFF".to_string(),
            leader_color: "#000000".to_string(),
        }
    }

    /// Bar colour for the `rank`-th operator in the ranking chart.
    pub fn rank_color(rank: usize) -> Rgb {
        match rank {
            0 => Rgb::RED,
            1 => Rgb::GREEN,
            2 => Rgb::BLUE,
            _ => Rgb::GREY,
        }
    }

    pub fn status_color(status: ServiceStatus) -> Rgb {
        match status {
            ServiceStatus::Unpublished => Rgb(0xE7, 0x4C, 0x3C),
            ServiceStatus::Published => Rgb(0x27, 0xAE, 0x60),
            ServiceStatus::StaleEndDate => Rgb(0xF1, 0xC4, 0x0F),
            ServiceStatus::StaleOtcVariation => Rgb(0x29, 0x80, 0xB9),
            ServiceStatus::StaleTwelveMonths => Rgb(0x8E, 0x44, 0xAD),
            ServiceStatus::Unknown => Rgb(0xBD, 0xC3, 0xC7),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::whitegrid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgb(0xE7, 0x4C, 0x3C).hex(), "#E74C3C");
    }

    #[test]
    fn test_color_map_endpoints_and_midpoint() {
        let cmap = ColorMap::attention();
        assert_eq!(cmap.at(0.0), Rgb::GREEN);
        assert_eq!(cmap.at(0.5), Rgb::YELLOW);
        assert_eq!(cmap.at(1.0), Rgb::RED);
        assert_eq!(cmap.at(7.0), Rgb::RED);
        assert_eq!(cmap.at(f64::NAN), Rgb::GREEN);
    }

    #[test]
    fn test_skewed_map_is_yellow_at_seventy_percent() {
        assert_eq!(ColorMap::attention_skewed().at(0.7), Rgb::YELLOW);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(5.0, 5.0, 5.0), 0.0);
    }
}
