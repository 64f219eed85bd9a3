use crate::models::{Coordinates, Poi};

/// Enforce a minimum spacing between consecutive stops, walking outward from
/// the start. Candidates are visited in order of distance from the start; a
/// POI is accepted only when it is at least `min_distance_meters` from the
/// last accepted location (initially the start itself).
///
/// A single greedy pass — deterministic and cheap, not globally optimal.
/// Identity when no minimum is configured.
pub fn enforce_min_spacing(
    pois: Vec<Poi>,
    start: &Coordinates,
    min_distance_meters: Option<f64>,
) -> Vec<Poi> {
    let Some(min_distance) = min_distance_meters else {
        return pois;
    };
    if min_distance <= 0.0 {
        return pois;
    }

    let mut sorted = pois;
    sorted.sort_by(|a, b| {
        let da = start.distance_to(&a.coordinates);
        let db = start.distance_to(&b.coordinates);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut accepted = Vec::new();
    let mut cursor = *start;

    for poi in sorted {
        if cursor.distance_meters_to(&poi.coordinates) >= min_distance {
            cursor = poi.coordinates;
            accepted.push(poi);
        }
    }

    tracing::debug!(
        "Spacing filter kept {} stops at >= {:.0}m apart",
        accepted.len(),
        min_distance
    );

    accepted
}
