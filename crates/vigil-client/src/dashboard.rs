//! Pure helpers behind the investigator dashboard: status filtering, the
//! weighted point set for the heat layer, and the marker set.

use serde::Serialize;

use vigil_shared::types::Status;
use vigil_store::Complaint;

/// A weighted point for the heat layer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub weight: f64,
}

/// A map marker with its popup text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub popup: String,
}

/// The external map/heatmap widget. Re-rendering is caller-triggered,
/// never automatic; the debounced feed decides when to call this.
pub trait MapCanvas {
    fn render(&mut self, points: &[HeatPoint], markers: &[Marker]);
}

/// Keep only complaints with the given status; `None` keeps everything.
pub fn filter_by_status<'a>(
    complaints: impl IntoIterator<Item = &'a Complaint>,
    status: Option<Status>,
) -> Vec<&'a Complaint> {
    complaints
        .into_iter()
        .filter(|c| status.map_or(true, |s| c.status == s))
        .collect()
}

/// Every geolocated complaint contributes one unit-weight point.
pub fn heat_points<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> Vec<HeatPoint> {
    complaints
        .into_iter()
        .filter_map(|c| c.coordinates)
        .map(|coords| HeatPoint {
            lat: coords.lat,
            lng: coords.lng,
            weight: 1.0,
        })
        .collect()
}

/// Markers for geolocated, still-open complaints. Closed cases drop off
/// the map.
pub fn markers<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> Vec<Marker> {
    complaints
        .into_iter()
        .filter(|c| c.status != Status::Closed)
        .filter_map(|c| {
            c.coordinates.map(|coords| Marker {
                lat: coords.lat,
                lng: coords.lng,
                popup: format!("{}\n{}\n{}", c.vehicle_no, c.vehicle_type, c.status),
            })
        })
        .collect()
}
