use std::collections::VecDeque;

use egui::Color32;

use crate::geo::{format_km, haversine_distance, GeoPoint};
use crate::map_view::MapSurface;
use crate::marker::MarkerId;

/// Points taking part in a measurement.
const CAPACITY: usize = 2;

/// The two most recently dropped markers and the distance between them.
#[derive(Default)]
pub struct Measurement {
    points: VecDeque<(MarkerId, GeoPoint)>,
    distance_m: Option<f64>,
}

impl Measurement {
    /// Drops a marker at the map center. Returns the new distance in meters
    /// when the addition completes a pair.
    pub fn add_marker<M: MapSurface + ?Sized>(&mut self, map: &mut M, color: Color32) -> Option<f64> {
        let center = map.center();
        let id = map.add_marker(center, color);
        self.points.push_back((id, center));
        tracing::info!(point = %center, "marker added");

        if self.points.len() > CAPACITY {
            if let Some((oldest, _)) = self.points.pop_front() {
                map.remove_marker(oldest);
            }
        }

        if self.points.len() < CAPACITY {
            return None;
        }

        let distance = haversine_distance(self.points[0].1, self.points[1].1);
        tracing::info!(meters = distance, "distance computed");
        self.distance_m = Some(distance);
        Some(distance)
    }

    pub fn clear<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        for (id, _) in self.points.drain(..) {
            map.remove_marker(id);
        }
        self.distance_m = None;
    }

    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.points.iter().map(|(_, point)| *point)
    }

    pub fn distance_m(&self) -> Option<f64> {
        self.distance_m
    }

    /// `"3936 km"`, once a pair has been measured.
    pub fn distance_label(&self) -> Option<String> {
        self.distance_m().and_then(format_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_view::MapView;

    const NEW_YORK: GeoPoint = GeoPoint::new(40.7128, -74.0060);
    const LOS_ANGELES: GeoPoint = GeoPoint::new(34.0522, -118.2437);
    const CHICAGO: GeoPoint = GeoPoint::new(41.8781, -87.6298);

    #[test]
    fn first_marker_does_not_measure() {
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut measurement = Measurement::default();

        assert!(measurement.add_marker(&mut map, Color32::RED).is_none());
        assert!(measurement.distance_label().is_none());
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].position, NEW_YORK);
    }

    #[test]
    fn second_marker_measures_once() {
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut measurement = Measurement::default();

        measurement.add_marker(&mut map, Color32::RED);
        map.set_center(LOS_ANGELES);
        let distance = measurement
            .add_marker(&mut map, Color32::RED)
            .expect("pair complete");

        assert!((distance - 3_936_000.0).abs() < 39_360.0);
        assert_eq!(measurement.distance_label().as_deref(), Some("3936 km"));
        assert_eq!(map.markers().len(), 2);
    }

    #[test]
    fn markers_at_the_same_spot_are_zero_km_apart() {
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut measurement = Measurement::default();

        measurement.add_marker(&mut map, Color32::RED);
        assert_eq!(measurement.add_marker(&mut map, Color32::RED), Some(0.0));
        assert_eq!(measurement.distance_label().as_deref(), Some("0 km"));
    }

    #[test]
    fn third_marker_replaces_the_oldest() {
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut measurement = Measurement::default();

        measurement.add_marker(&mut map, Color32::RED);
        map.set_center(LOS_ANGELES);
        measurement.add_marker(&mut map, Color32::RED);
        map.set_center(CHICAGO);
        let distance = measurement
            .add_marker(&mut map, Color32::RED)
            .expect("recomputed");

        assert_eq!(distance, haversine_distance(LOS_ANGELES, CHICAGO));
        assert_eq!(measurement.points().collect::<Vec<_>>(), vec![LOS_ANGELES, CHICAGO]);
        let on_map: Vec<_> = map.markers().iter().map(|m| m.position).collect();
        assert_eq!(on_map, vec![LOS_ANGELES, CHICAGO]);
    }

    #[test]
    fn clear_removes_markers_and_distance() {
        let mut map = MapView::new(NEW_YORK, 10.0);
        let mut measurement = Measurement::default();

        measurement.add_marker(&mut map, Color32::RED);
        measurement.add_marker(&mut map, Color32::RED);
        measurement.clear(&mut map);

        assert!(map.markers().is_empty());
        assert!(measurement.distance_m().is_none());
        assert_eq!(measurement.points().count(), 0);
        assert!(measurement.add_marker(&mut map, Color32::RED).is_none());
    }
}
