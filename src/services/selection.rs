use crate::constants::{
    CANDIDATE_POOL_MULTIPLIER, DISTRIBUTION_MIN_SEPARATION_METERS, QUALITY_BONUS_DESCRIPTION,
    QUALITY_BONUS_NAME, QUALITY_BONUS_TAGS, QUALITY_SCORE_BASE, SCORE_WEIGHT_CATEGORY,
    SCORE_WEIGHT_DISTANCE, SCORE_WEIGHT_QUALITY,
};
use crate::models::{Coordinates, Poi, PoiCategory, RouteLengthClass};

/// Scores and filters a raw POI pool down to a target count, preferring
/// high-value categories, proximity to the start, quality signals, and
/// spatial spread.
pub struct PoiSelector {
    min_separation_meters: f64,
}

impl PoiSelector {
    pub fn new(min_separation_meters: f64) -> Self {
        PoiSelector {
            min_separation_meters,
        }
    }

    /// Select up to `target_count` POIs. An empty candidate pool yields an
    /// empty result; the orchestrator decides whether that is an error.
    pub fn select(
        &self,
        candidates: &[Poi],
        target_count: usize,
        start: &Coordinates,
        length_class: RouteLengthClass,
        categories: Option<&[PoiCategory]>,
    ) -> Vec<Poi> {
        let filtered: Vec<&Poi> = candidates
            .iter()
            .filter(|poi| {
                categories
                    .map(|wanted| wanted.contains(&poi.category))
                    .unwrap_or(true)
            })
            .collect();

        let mut scored: Vec<(f64, &Poi)> = filtered
            .iter()
            .map(|poi| (self.score(poi, start, length_class), *poi))
            .collect();

        // Sort by score descending
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        // Hand the distribution filter twice the target so it has room to
        // trade score for spread.
        let pool: Vec<Poi> = scored
            .into_iter()
            .take(target_count.saturating_mul(CANDIDATE_POOL_MULTIPLIER))
            .map(|(_, poi)| poi.clone())
            .collect();

        tracing::debug!(
            "Scored {} candidates, {} in distribution pool (target {})",
            filtered.len(),
            pool.len(),
            target_count
        );

        self.distribute(pool, target_count)
    }

    /// Combined score in [0, 1]: weighted category attractiveness, proximity
    /// to the start, and per-POI quality signals.
    pub fn score(&self, poi: &Poi, start: &Coordinates, length_class: RouteLengthClass) -> f64 {
        let category_weight = poi.category.weight();

        let distance_km = start.distance_to(&poi.coordinates);
        let distance_score = (1.0 - distance_km / length_class.max_poi_distance_km()).max(0.0);

        let quality_score = Self::quality_score(poi);

        SCORE_WEIGHT_CATEGORY * category_weight
            + SCORE_WEIGHT_DISTANCE * distance_score
            + SCORE_WEIGHT_QUALITY * quality_score
    }

    /// Base 0.5, plus bonuses for a real name, a description, and recognized
    /// quality tags; capped at 1.0.
    fn quality_score(poi: &Poi) -> f64 {
        let mut score = QUALITY_SCORE_BASE;
        if !poi.has_generic_name() {
            score += QUALITY_BONUS_NAME;
        }
        if poi.description.is_some() {
            score += QUALITY_BONUS_DESCRIPTION;
        }
        if poi.has_quality_tags() {
            score += QUALITY_BONUS_TAGS;
        }
        score.min(1.0)
    }

    /// Greedy max-min-distance selection to avoid spatial clustering.
    /// Seeded with the first candidate (input is score-sorted); each round
    /// picks the candidate farthest from everything already selected. The
    /// separation threshold is a soft preference — once nothing clears it,
    /// the best remaining candidate is accepted anyway, so the loop always
    /// terminates after `max_count` picks or exhaustion.
    pub fn distribute(&self, candidates: Vec<Poi>, max_count: usize) -> Vec<Poi> {
        if max_count == 0 {
            return Vec::new();
        }
        if candidates.len() <= max_count {
            return candidates;
        }

        let mut remaining = candidates;
        let mut selected: Vec<Poi> = vec![remaining.remove(0)];

        while selected.len() < max_count && !remaining.is_empty() {
            let (best_idx, best_min_dist) = remaining
                .iter()
                .enumerate()
                .map(|(idx, candidate)| {
                    let min_dist = selected
                        .iter()
                        .map(|s| s.coordinates.distance_meters_to(&candidate.coordinates))
                        .fold(f64::INFINITY, f64::min);
                    (idx, min_dist)
                })
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .unwrap_or((0, 0.0));

            if best_min_dist < self.min_separation_meters {
                tracing::debug!(
                    "Distribution filter: best remaining spacing {:.0}m below {:.0}m preference, accepting anyway",
                    best_min_dist,
                    self.min_separation_meters
                );
            }

            selected.push(remaining.remove(best_idx));
        }

        selected
    }
}

impl Default for PoiSelector {
    fn default() -> Self {
        Self::new(DISTRIBUTION_MIN_SEPARATION_METERS)
    }
}
