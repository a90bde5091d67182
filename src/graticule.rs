/// Candidate line spacings in degrees, coarsest first.
const SPACING_LADDER: [f64; 12] = [30.0, 10.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.1, 0.05, 0.02, 0.01, 0.005];

pub struct Graticule {
    min_pixel_spacing: f64,
    visible: bool,
    labels: bool,
}

impl Graticule {
    pub fn new(min_pixel_spacing: f64, visible: bool) -> Self {
        Self {
            min_pixel_spacing,
            visible,
            labels: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn has_labels(&self) -> bool {
        self.labels
    }

    pub fn set_labels(&mut self, labels: bool) {
        self.labels = labels;
    }

    /// Picks the finest ladder step whose lines stay at least
    /// `min_pixel_spacing` apart, given the screen width of one degree of
    /// longitude at the current zoom.
    pub fn spacing_degrees(&self, pixels_per_degree: f64) -> f64 {
        let mut spacing = SPACING_LADDER[0];
        for step in SPACING_LADDER {
            if step * pixels_per_degree < self.min_pixel_spacing {
                break;
            }
            spacing = step;
        }
        spacing
    }

    /// Line positions covering `min..=max`, aligned to multiples of `spacing`.
    pub fn lines_between(min: f64, max: f64, spacing: f64) -> Vec<f64> {
        let first = (min / spacing).ceil() as i64;
        let last = (max / spacing).floor() as i64;
        (first..=last).map(|i| i as f64 * spacing).collect()
    }
}

/// Renders a graticule value as `12.5°N`, `74°W` and so on.
pub fn format_degrees(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let magnitude = value.abs();
    if magnitude.fract().abs() < 1e-9 {
        format!("{}°{}", magnitude as i64, hemisphere)
    } else {
        let text = format!("{:.3}", magnitude);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        format!("{}°{}", text, hemisphere)
    }
}
