use serde::{Deserialize, Serialize};

/// Geographic point in degrees. Longitude first, as the rendering surface
/// expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Straight-line distance in degrees. Only used for comparing camera
    /// positions, not for geodesy.
    pub fn distance_deg(&self, other: &LngLat) -> f64 {
        let dx = self.lng - other.lng;
        let dy = self.lat - other.lat;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Minimum number of points in a closed ring (triangle + closing point).
pub const MIN_RING_POINTS: usize = 4;

/// True if the ring's first and last points are identical.
pub fn is_closed(ring: &[LngLat]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => ring.len() > 1 && first == last,
        _ => false,
    }
}

/// Signed shoelace area in square degrees. Positive for counter-clockwise
/// rings.
pub fn signed_area(ring: &[LngLat]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    let mut sum = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        sum += ring[j].lng * ring[i].lat - ring[i].lng * ring[j].lat;
        j = i;
    }
    sum / 2.0
}

/// Area-weighted centroid of a ring. Falls back to the vertex mean for
/// degenerate (zero-area) rings.
pub fn centroid(ring: &[LngLat]) -> Option<LngLat> {
    if ring.is_empty() {
        return None;
    }
    let area = signed_area(ring);
    if area.abs() < f64::EPSILON {
        let n = ring.len() as f64;
        let lng = ring.iter().map(|p| p.lng).sum::<f64>() / n;
        let lat = ring.iter().map(|p| p.lat).sum::<f64>() / n;
        return Some(LngLat::new(lng, lat));
    }

    let n = ring.len();
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        let cross = ring[j].lng * ring[i].lat - ring[i].lng * ring[j].lat;
        cx += (ring[j].lng + ring[i].lng) * cross;
        cy += (ring[j].lat + ring[i].lat) * cross;
        j = i;
    }
    let k = 1.0 / (6.0 * area);
    Some(LngLat::new(cx * k, cy * k))
}

/// Even-odd point-in-polygon test against a single outer ring.
pub fn contains(ring: &[LngLat], point: LngLat) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let n = ring.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.lat > point.lat) != (pj.lat > point.lat) {
            let x_int = pi.lng + (point.lat - pi.lat) / (pj.lat - pi.lat) * (pj.lng - pi.lng);
            if point.lng < x_int {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
