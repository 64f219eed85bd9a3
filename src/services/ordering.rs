use crate::constants::NEAREST_NEIGHBOR_MIN_WAYPOINTS;
use crate::models::Waypoint;

/// Reorder intermediate waypoints with a nearest-neighbor pass, holding the
/// first and last waypoints fixed. From the current position (initially the
/// start), repeatedly append the closest unvisited intermediate.
///
/// O(n²) in the number of intermediates, which is bounded by the requested
/// stop count. An approximate ordering, not an exact solver. No-op for
/// fewer than four waypoints — start, one intermediate and end leave
/// nothing to reorder.
pub fn optimize(waypoints: Vec<Waypoint>) -> Vec<Waypoint> {
    if waypoints.len() < NEAREST_NEIGHBOR_MIN_WAYPOINTS {
        return waypoints;
    }

    let original_distance = path_distance_km(&waypoints);
    let original = waypoints.clone();

    let mut iter = waypoints.into_iter();
    let start = match iter.next() {
        Some(wp) => wp,
        None => return Vec::new(),
    };
    let mut intermediates: Vec<Waypoint> = iter.collect();
    let end = match intermediates.pop() {
        Some(wp) => wp,
        None => return vec![start],
    };

    let mut ordered = Vec::with_capacity(intermediates.len() + 2);
    ordered.push(start);

    while !intermediates.is_empty() {
        let current = &ordered[ordered.len() - 1];
        let nearest_idx = intermediates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = current.coordinates.distance_to(&a.coordinates);
                let db = current.coordinates.distance_to(&b.coordinates);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        ordered.push(intermediates.remove(nearest_idx));
    }

    ordered.push(end);

    let optimized_distance = path_distance_km(&ordered);

    // Nearest-neighbor can lose on adversarial layouts; never regress past
    // the caller's ordering.
    if optimized_distance > original_distance {
        tracing::debug!(
            "Nearest-neighbor ordering regressed ({:.2}km -> {:.2}km), keeping original",
            original_distance,
            optimized_distance
        );
        return original;
    }

    if original_distance > 0.0 {
        let improvement_pct =
            (original_distance - optimized_distance) / original_distance * 100.0;
        tracing::debug!(
            "Nearest-neighbor ordering: {:.2}km -> {:.2}km ({:.1}% improvement)",
            original_distance,
            optimized_distance,
            improvement_pct
        );
    }

    ordered
}

/// Total straight-line distance (km) along a waypoint sequence. Exposed for
/// diagnostics and tests.
pub fn path_distance_km(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| pair[0].coordinates.distance_to(&pair[1].coordinates))
        .sum()
}
