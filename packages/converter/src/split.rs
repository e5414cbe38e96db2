//! Geometric choice among the 2025 wards a divided legacy ward was split
//! into.
//!
//! True ward polygons are not part of the reference data. Each candidate is
//! approximated by an axis-aligned square centred on its centroid whose
//! side is `sqrt(area_km2)` kilometres. A point inside exactly one square
//! picks that candidate; otherwise the geodesically nearest centroid wins.

use geo::{Contains, Destination, Distance, Geodesic, Point, Rect, coord};
use vn_admin_dictionary::CandidateWard;
use vn_admin_resolver_models::Coordinates;

const METERS_PER_KM: f64 = 1000.0;

fn point(coordinates: Coordinates) -> Point {
    Point::new(coordinates.longitude, coordinates.latitude)
}

/// Square of `area_km2` centred on `centroid`, in lon/lat degrees.
#[must_use]
pub fn approximate_square(centroid: Coordinates, area_km2: f64) -> Rect {
    let center = point(centroid);
    let half_side = area_km2.max(0.0).sqrt() * METERS_PER_KM / 2.0;

    let north = Geodesic.destination(center, 0.0, half_side);
    let east = Geodesic.destination(center, 90.0, half_side);
    let south = Geodesic.destination(center, 180.0, half_side);
    let west = Geodesic.destination(center, 270.0, half_side);

    Rect::new(
        coord! { x: west.x(), y: south.y() },
        coord! { x: east.x(), y: north.y() },
    )
}

/// Picks the candidate for a located point.
///
/// Returns `None` only when `candidates` is empty. Ties on distance keep
/// the earliest candidate.
#[must_use]
pub fn choose(candidates: &[CandidateWard], location: Coordinates) -> Option<&CandidateWard> {
    let target = point(location);

    let containing: Vec<&CandidateWard> = candidates
        .iter()
        .filter(|c| approximate_square(c.centroid(), c.area_km2).contains(&target))
        .collect();

    if let [only] = containing.as_slice() {
        log::debug!("Point lies only in the square of '{}'", only.ward_key);
        return Some(only);
    }

    log::debug!(
        "Point lies in {} candidate squares, falling back to nearest centroid",
        containing.len()
    );
    nearest(candidates, target)
}

fn nearest(candidates: &[CandidateWard], target: Point) -> Option<&CandidateWard> {
    let mut best: Option<(&CandidateWard, f64)> = None;
    for candidate in candidates {
        let distance = Geodesic.distance(point(candidate.centroid()), target);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}
