use crate::geo::GeoPoint;
use crate::marker::{Marker, MarkerId};
use egui::{Color32, Pos2, Rect, Vec2};
use std::f64::consts::PI;
use std::time::Duration;

pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 19.0;
/// Web Mercator cannot represent the poles.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

const ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// What the screen controller needs from a map widget.
pub trait MapSurface {
    fn center(&self) -> GeoPoint;
    fn set_center(&mut self, center: GeoPoint);
    /// Moves the center to `target` over a short animation.
    fn animate_to(&mut self, target: GeoPoint);
    fn add_marker(&mut self, position: GeoPoint, color: Color32) -> MarkerId;
    fn remove_marker(&mut self, id: MarkerId) -> bool;
    fn clear_markers(&mut self);
}

struct Animation {
    from: (f64, f64),
    to: (f64, f64),
    elapsed: Duration,
}

/// A Web Mercator viewport: a center, a fractional zoom level and the
/// marker overlays drawn on top.
pub struct MapView {
    center: GeoPoint,
    zoom: f64,
    home_center: GeoPoint,
    home_zoom: f64,
    markers: Vec<Marker>,
    next_marker_id: u64,
    animation: Option<Animation>,
}

impl MapView {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let center = normalize(center);
        Self {
            center,
            zoom,
            home_center: center,
            home_zoom: zoom,
            markers: Vec::new(),
            next_marker_id: 0,
            animation: None,
        }
    }

    pub fn get_zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Width of the whole world in screen pixels at the current zoom.
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    pub fn pixels_per_degree(&self) -> f64 {
        self.world_size() / 360.0
    }

    /// Drags the map content by `delta` screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.animation = None;
        let scale = self.world_size();
        let (x, y) = project(self.center);
        self.center = unproject(x - delta.x as f64 / scale, y - delta.y as f64 / scale);
    }

    /// Changes the zoom by `step` levels keeping the point under `pos` fixed.
    pub fn zoom_at(&mut self, step: f64, pos: Pos2, view_rect: Rect) {
        let anchor = self.screen_to_geo(pos, view_rect);
        self.set_zoom(self.zoom + step);
        let moved = self.geo_to_screen(anchor, view_rect);
        self.pan(pos - moved);
    }

    pub fn reset_view(&mut self) {
        self.animation = None;
        self.center = self.home_center;
        self.zoom = self.home_zoom;
    }

    /// Advances a running `animate_to`. Returns true while still animating.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        animation.elapsed += dt;
        let t = (animation.elapsed.as_secs_f64() / ANIMATION_DURATION.as_secs_f64()).min(1.0);
        let eased = 1.0 - (1.0 - t).powi(3);

        let (fx, fy) = animation.from;
        let (tx, ty) = animation.to;
        self.center = unproject(fx + (tx - fx) * eased, fy + (ty - fy) * eased);

        if t >= 1.0 {
            self.animation = None;
            return false;
        }
        true
    }

    pub fn screen_to_geo(&self, pos: Pos2, view_rect: Rect) -> GeoPoint {
        let scale = self.world_size();
        let offset = pos - view_rect.center();
        let (x, y) = project(self.center);
        unproject(x + offset.x as f64 / scale, y + offset.y as f64 / scale)
    }

    /// Projects a point onto the screen, picking the world copy nearest the center.
    pub fn geo_to_screen(&self, point: GeoPoint, view_rect: Rect) -> Pos2 {
        let d_lon = wrap_longitude(point.longitude - self.center.longitude);
        egui::pos2(
            self.lon_to_screen_x(self.center.longitude + d_lon, view_rect),
            self.lat_to_screen_y(point.latitude, view_rect),
        )
    }

    /// Screen x of an unwrapped longitude; values beyond ±180 land on
    /// neighbouring world copies.
    pub fn lon_to_screen_x(&self, longitude: f64, view_rect: Rect) -> f32 {
        let dx = (longitude - self.center.longitude) / 360.0 * self.world_size();
        view_rect.center().x + dx as f32
    }

    pub fn lat_to_screen_y(&self, latitude: f64, view_rect: Rect) -> f32 {
        let (_, y) = project(GeoPoint::new(latitude, 0.0));
        let (_, cy) = project(self.center);
        view_rect.center().y + ((y - cy) * self.world_size()) as f32
    }

    /// Unwrapped longitude span and clamped latitude span visible in `view_rect`.
    pub fn visible_span(&self, view_rect: Rect) -> ((f64, f64), (f64, f64)) {
        let half_width = view_rect.width() as f64 / 2.0;
        let lon_half = half_width / self.pixels_per_degree();
        let north = self.screen_to_geo(view_rect.center_top(), view_rect).latitude;
        let south = self.screen_to_geo(view_rect.center_bottom(), view_rect).latitude;
        (
            (self.center.longitude - lon_half, self.center.longitude + lon_half),
            (south, north),
        )
    }
}

impl MapSurface for MapView {
    fn center(&self) -> GeoPoint {
        self.center
    }

    fn set_center(&mut self, center: GeoPoint) {
        self.animation = None;
        self.center = normalize(center);
    }

    fn animate_to(&mut self, target: GeoPoint) {
        let from = project(self.center);
        let (mut tx, ty) = project(normalize(target));
        // Take the short way round the antimeridian.
        if tx - from.0 > 0.5 {
            tx -= 1.0;
        } else if from.0 - tx > 0.5 {
            tx += 1.0;
        }
        self.animation = Some(Animation {
            from,
            to: (tx, ty),
            elapsed: Duration::ZERO,
        });
    }

    fn add_marker(&mut self, position: GeoPoint, color: Color32) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        self.markers.push(Marker::new(id, position, color));
        id
    }

    fn remove_marker(&mut self, id: MarkerId) -> bool {
        if let Some(index) = self.markers.iter().position(|marker| marker.id == id) {
            self.markers.remove(index);
            true
        } else {
            false
        }
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        return longitude;
    }
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

fn normalize(point: GeoPoint) -> GeoPoint {
    GeoPoint::new(
        point.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        wrap_longitude(point.longitude),
    )
}

/// Normalized Web Mercator coordinates, both in `0.0..=1.0` for the
/// representable world.
fn project(point: GeoPoint) -> (f64, f64) {
    let x = (point.longitude + 180.0) / 360.0;
    let phi = point.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn unproject(x: f64, y: f64) -> GeoPoint {
    let y = y.clamp(0.0, 1.0);
    let latitude = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    normalize(GeoPoint::new(latitude, x * 360.0 - 180.0))
}
