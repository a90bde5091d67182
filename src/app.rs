use crate::config::AppConfig;
use crate::geocode::Geocoder;
use crate::graticule::{format_degrees, Graticule};
use crate::map_view::{wrap_longitude, MapView, MAX_LATITUDE};
use crate::measure::Measurement;
use crate::search::{apply_outcome, LocationSearch};
use crate::toast::Toasts;
use crate::ui::UiState;
use clipboard::ClipboardContext;
use clipboard::ClipboardProvider;
use egui::{Color32, Context, Stroke, Ui};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Zoom levels per mouse-wheel notch.
const SCROLL_ZOOM_STEP: f64 = 0.5;

pub struct MapDistanceApp {
    map: MapView,
    graticule: Graticule,
    measurement: Measurement,
    search: LocationSearch,
    toasts: Toasts,
    ui_state: UiState,
    clipboard: Option<ClipboardContext>,
}

impl MapDistanceApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig, geocoder: Arc<dyn Geocoder>) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        cc.egui_ctx.set_style(style);

        let clipboard = ClipboardProvider::new().ok();

        let repaint_ctx = cc.egui_ctx.clone();
        let search = LocationSearch::new(geocoder).with_wake(move || repaint_ctx.request_repaint());

        let ui_state = UiState::default();
        let mut graticule = Graticule::new(80.0, ui_state.show_graticule);
        graticule.set_labels(ui_state.graticule_labels);

        tracing::info!(center = %config.initial_center(), zoom = config.zoom, "map ready");

        Self {
            map: MapView::new(config.initial_center(), config.zoom),
            graticule,
            measurement: Measurement::default(),
            search,
            toasts: Toasts::default(),
            ui_state,
            clipboard,
        }
    }

    pub fn copy_to_clipboard(&mut self, text: String) -> bool {
        if let Some(clipboard) = &mut self.clipboard {
            clipboard.set_contents(text).is_ok()
        } else {
            false
        }
    }

    fn add_marker(&mut self) {
        self.measurement.add_marker(&mut self.map, self.ui_state.marker_color);
    }

    fn submit_search(&mut self) {
        if !self.search.submit(&self.ui_state.search_text) {
            tracing::debug!("search not started");
        }
    }

    // Drag to pan, scroll or double-click to zoom
    fn handle_map_interactions(&mut self, ui: &mut Ui, response: egui::Response) {
        let map_rect = response.rect;

        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.map.pan(response.drag_delta());
        }

        if response.hovered() {
            let scroll_delta = ui.input(|i| i.scroll_delta.y);
            if scroll_delta != 0.0 {
                let step = if scroll_delta > 0.0 { SCROLL_ZOOM_STEP } else { -SCROLL_ZOOM_STEP };
                if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
                    self.map.zoom_at(step, pos, map_rect);
                }
            }
        }

        if response.double_clicked() {
            if let Some(pos) = response.hover_pos() {
                self.map.zoom_at(1.0, pos, map_rect);
            }
        }

        self.ui_state.cursor_position = response
            .hover_pos()
            .map(|pos| self.map.screen_to_geo(pos, map_rect));
    }

    fn draw_map(&self, ui: &mut Ui) -> egui::Response {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let map_rect = response.rect;

        let (outside_color, sea_color) = if self.ui_state.dark_mode {
            (Color32::from_rgb(15, 15, 20), Color32::from_rgb(28, 38, 52))
        } else {
            (Color32::from_rgb(200, 200, 200), Color32::from_rgb(170, 211, 223))
        };
        painter.rect_filled(map_rect, 0.0, outside_color);

        let north_edge = self.map.lat_to_screen_y(MAX_LATITUDE, map_rect).max(map_rect.min.y);
        let south_edge = self.map.lat_to_screen_y(-MAX_LATITUDE, map_rect).min(map_rect.max.y);
        let world_rect = egui::Rect::from_min_max(
            egui::pos2(map_rect.min.x, north_edge),
            egui::pos2(map_rect.max.x, south_edge),
        );
        painter.rect_filled(world_rect, 0.0, sea_color);

        if self.graticule.is_visible() {
            self.draw_graticule(&painter, map_rect, world_rect);
        }

        let text_color = if self.ui_state.dark_mode {
            Color32::WHITE
        } else {
            Color32::BLACK
        };

        let points: Vec<_> = self
            .measurement
            .points()
            .map(|point| self.map.geo_to_screen(point, map_rect))
            .collect();
        if let &[from, to] = points.as_slice() {
            painter.line_segment([from, to], Stroke::new(2.0, self.ui_state.marker_color));
        }

        for marker in self.map.markers() {
            let tip = self.map.geo_to_screen(marker.position, map_rect);
            let head = tip - egui::vec2(0.0, 14.0);
            painter.line_segment([head, tip], Stroke::new(2.0, marker.color));
            painter.circle_filled(head, 6.0, marker.color);
            painter.circle_stroke(head, 6.0, Stroke::new(1.0, Color32::WHITE));

            painter.text(
                head + egui::vec2(10.0, 0.0),
                egui::Align2::LEFT_CENTER,
                marker.position.to_string(),
                egui::FontId::default(),
                text_color,
            );
        }

        // Markers are dropped where the crosshair points
        let center = map_rect.center();
        let crosshair_color = self.ui_state.crosshair_color();
        let crosshair_size = 10.0;
        painter.line_segment(
            [
                egui::pos2(center.x - crosshair_size, center.y),
                egui::pos2(center.x + crosshair_size, center.y),
            ],
            Stroke::new(1.0, crosshair_color),
        );
        painter.line_segment(
            [
                egui::pos2(center.x, center.y - crosshair_size),
                egui::pos2(center.x, center.y + crosshair_size),
            ],
            Stroke::new(1.0, crosshair_color),
        );

        response
    }

    fn draw_graticule(&self, painter: &egui::Painter, map_rect: egui::Rect, world_rect: egui::Rect) {
        let ((west, east), (south, north)) = self.map.visible_span(map_rect);
        let spacing = self.graticule.spacing_degrees(self.map.pixels_per_degree());

        let (line_color, axis_color, label_color) = if self.ui_state.dark_mode {
            (
                Color32::from_rgba_premultiplied(180, 180, 180, 50),
                Color32::from_rgba_premultiplied(200, 200, 200, 110),
                Color32::from_rgb(190, 190, 190),
            )
        } else {
            (
                Color32::from_rgba_premultiplied(60, 60, 80, 60),
                Color32::from_rgba_premultiplied(40, 40, 60, 120),
                Color32::from_rgb(50, 50, 70),
            )
        };

        // Meridians
        for lon in Graticule::lines_between(west, east, spacing) {
            let x = self.map.lon_to_screen_x(lon, map_rect);
            let wrapped = wrap_longitude(lon);
            let color = if wrapped.abs() < 1e-9 { axis_color } else { line_color };
            painter.line_segment(
                [egui::pos2(x, world_rect.min.y), egui::pos2(x, world_rect.max.y)],
                Stroke::new(1.0, color),
            );

            if self.graticule.has_labels() {
                painter.text(
                    egui::pos2(x + 3.0, world_rect.min.y + 3.0),
                    egui::Align2::LEFT_TOP,
                    format_degrees(wrapped, 'E', 'W'),
                    egui::FontId::monospace(10.0),
                    label_color,
                );
            }
        }

        // Parallels
        let south = south.max(-MAX_LATITUDE);
        let north = north.min(MAX_LATITUDE);
        for lat in Graticule::lines_between(south, north, spacing) {
            let y = self.map.lat_to_screen_y(lat, map_rect);
            let color = if lat.abs() < 1e-9 { axis_color } else { line_color };
            painter.line_segment(
                [egui::pos2(map_rect.min.x, y), egui::pos2(map_rect.max.x, y)],
                Stroke::new(1.0, color),
            );

            if self.graticule.has_labels() {
                painter.text(
                    egui::pos2(map_rect.min.x + 3.0, y - 2.0),
                    egui::Align2::LEFT_BOTTOM,
                    format_degrees(lat, 'N', 'S'),
                    egui::FontId::monospace(10.0),
                    label_color,
                );
            }
        }
    }
}

impl eframe::App for MapDistanceApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut style = (*ctx.style()).clone();
        if self.ui_state.dark_mode {
            style.visuals = egui::Visuals::dark();
        } else {
            style.visuals = egui::Visuals::light();
        }
        ctx.set_style(style);

        let dt = Duration::from_secs_f32(ctx.input(|i| i.stable_dt).max(0.0));
        self.map.tick(dt);

        if let Some(outcome) = self.search.poll() {
            apply_outcome(outcome, &mut self.map, &mut self.toasts);
        }
        self.toasts.prune(Instant::now());

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Map Distance");
                ui.separator();
                if ui.button("Add Marker").clicked() {
                    self.add_marker();
                }
                if ui.button("Clear Markers").clicked() {
                    self.measurement.clear(&mut self.map);
                }
                if ui.button("Reset View").clicked() {
                    self.map.reset_view();
                }
                ui.separator();
                ui.label("Zoom:");
                ui.label(format!("{:.1}", self.map.get_zoom()));
            });
        });

        egui::TopBottomPanel::bottom("search_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let search_clicked = ui.button("🔍 Search").clicked();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.ui_state.search_text)
                        .hint_text("Search Location")
                        .desired_width(f32::INFINITY),
                );
                let enter_pressed = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if search_clicked || enter_pressed {
                    self.submit_search();
                }
            });

            ui.horizontal(|ui| {
                if let Some(distance) = self.measurement.distance_label() {
                    let text = format!("Distance: {}", distance);
                    ui.label(text.clone());
                    if ui.button("Copy").clicked() {
                        self.copy_to_clipboard(text);
                    }
                }
                if self.search.is_pending() {
                    ui.spinner();
                }
            });
            ui.add_space(4.0);
        });

        egui::SidePanel::right("settings_panel")
            .resizable(true)
            .default_width(250.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading("Settings");
                    ui.separator();

                    ui.collapsing("Graticule", |ui| {
                        let visible_changed = ui
                            .checkbox(&mut self.ui_state.show_graticule, "Show Graticule")
                            .changed();
                        let labels_changed = ui
                            .checkbox(&mut self.ui_state.graticule_labels, "Show Labels")
                            .changed();

                        if visible_changed || labels_changed {
                            self.graticule.set_visible(self.ui_state.show_graticule);
                            self.graticule.set_labels(self.ui_state.graticule_labels);
                        }
                    });

                    ui.collapsing("Markers", |ui| {
                        ui.horizontal(|ui| {
                            ui.label("Marker Color:");
                            egui::color_picker::color_edit_button_srgba(
                                ui,
                                &mut self.ui_state.marker_color,
                                egui::color_picker::Alpha::Opaque,
                            );
                        });
                    });

                    ui.separator();

                    ui.heading("Pointer");
                    match self.ui_state.cursor_position {
                        Some(point) => ui.label(point.to_string()),
                        None => ui.label("-"),
                    };

                    ui.separator();

                    ui.heading("Measured Points");

                    let points: Vec<String> = self.measurement.points().map(|p| p.to_string()).collect();
                    if points.is_empty() {
                        ui.label("Press 'Add Marker' to drop a point at the crosshair");
                    }
                    for (i, coords) in points.into_iter().enumerate() {
                        ui.horizontal(|ui| {
                            ui.label(format!("{}. ({})", i + 1, coords));
                            if ui.button("Copy").clicked() {
                                self.copy_to_clipboard(coords.clone());
                            }
                        });
                    }

                    ui.separator();

                    ui.collapsing("Appearance", |ui| {
                        ui.checkbox(&mut self.ui_state.dark_mode, "Dark Mode");
                    });

                    ui.collapsing("Help", |ui| {
                        ui.label("• 'Add Marker' drops a marker at the crosshair");
                        ui.label("• The distance appears once two markers are placed");
                        ui.label("• Further markers replace the oldest one");
                        ui.label("• Drag to pan, scroll or double-click to zoom");
                        ui.label("• Type a place and press Enter to jump there");
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let response = self.draw_map(ui);
            self.handle_map_interactions(ui, response);
        });

        self.toasts.show(ctx);

        if self.map.is_animating() {
            ctx.request_repaint();
        } else if !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }
}
