use crate::geo::GeoPoint;
use egui::Color32;

pub struct UiState {
    // Search bar
    pub search_text: String,

    // Graticule settings
    pub show_graticule: bool,
    pub graticule_labels: bool,

    // Marker settings
    pub marker_color: Color32,

    pub dark_mode: bool,

    // Geographic position under the pointer, if it is over the map
    pub cursor_position: Option<GeoPoint>,
}

impl UiState {
    /// Half-transparent so the map stays readable under it.
    pub fn crosshair_color(&self) -> Color32 {
        if self.dark_mode {
            Color32::from_rgba_unmultiplied(255, 255, 255, 160)
        } else {
            Color32::from_rgba_unmultiplied(0, 0, 0, 128)
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            show_graticule: true,
            graticule_labels: true,
            marker_color: Color32::from_rgb(220, 40, 40),
            dark_mode: false,
            cursor_position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosshair_follows_the_theme() {
        let mut state = UiState::default();
        let light = state.crosshair_color();
        assert_eq!((light.r(), light.g(), light.b()), (0, 0, 0));

        state.dark_mode = true;
        let dark = state.crosshair_color();
        // Premultiplied white: every channel equals alpha.
        assert_eq!((dark.r(), dark.g(), dark.b()), (dark.a(), dark.a(), dark.a()));
        assert!(dark.a() >= 128, "{dark:?}");
    }
}
