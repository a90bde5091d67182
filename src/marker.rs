use crate::geo::GeoPoint;
use egui::Color32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone)]
pub struct Marker {
    pub id: MarkerId,
    pub position: GeoPoint, // Anchored at the bottom center of the pin
    pub color: Color32,
}

impl Marker {
    pub fn new(id: MarkerId, position: GeoPoint, color: Color32) -> Self {
        Self {
            id,
            position,
            color,
        }
    }
}
