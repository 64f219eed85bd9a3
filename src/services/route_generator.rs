use crate::error::{Result, TourError};
use crate::models::{EndpointPolicy, GeneratedRoute, Poi, StartPoint, TourRequest, Waypoint};
use crate::providers::Geocoder;
use crate::services::ordering;
use crate::services::poi_service::PoiService;
use crate::services::segments::SegmentPlanner;
use crate::services::selection::PoiSelector;
use crate::services::spacing::enforce_min_spacing;
use crate::services::validator::{assemble_waypoints, ConstraintValidator};
use std::sync::Arc;
use std::time::Duration;

/// Composes the full pipeline: resolve start -> select POIs -> spacing
/// filter -> assemble waypoints per endpoint policy -> nearest-neighbor
/// ordering -> compute segments through the caches -> validate against the
/// walking-time cap -> aggregate.
pub struct RouteGenerator {
    geocoder: Arc<dyn Geocoder>,
    poi_service: Arc<PoiService>,
    selector: PoiSelector,
    planner: SegmentPlanner,
}

impl RouteGenerator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        poi_service: Arc<PoiService>,
        selector: PoiSelector,
        planner: SegmentPlanner,
    ) -> Self {
        RouteGenerator {
            geocoder,
            poi_service,
            selector,
            planner,
        }
    }

    /// Generate a tour, fetching the POI pool for the request's city through
    /// the caching POI service.
    pub async fn generate(&self, request: &TourRequest) -> Result<GeneratedRoute> {
        let pool = self
            .poi_service
            .pois_for_city(&request.city, request.categories.as_deref())
            .await?;
        self.generate_with_pool(request, pool).await
    }

    /// Generate with a caller-supplied POI pool.
    pub async fn generate_with_pool(
        &self,
        request: &TourRequest,
        pool: Vec<Poi>,
    ) -> Result<GeneratedRoute> {
        request.validate().map_err(TourError::InvalidRequest)?;

        tracing::info!(
            "Generating tour in '{}': {} stops max, endpoint {}, pool of {}",
            request.city,
            request.max_stops,
            request.endpoint,
            pool.len()
        );

        let start = self.resolve_start(&request.start).await?;
        let custom_end = self.resolve_custom_end(&request.endpoint).await?;

        let selected = self.selector.select(
            &pool,
            request.max_stops,
            &start.coordinates,
            request.length_class,
            request.categories.as_deref(),
        );
        let spaced = enforce_min_spacing(
            selected,
            &start.coordinates,
            request.min_stop_spacing_meters,
        );

        if spaced.is_empty() {
            return Err(TourError::InsufficientPois(format!(
                "no places near the start in '{}' match the request — widen the categories, \
                 allow a longer route, or relax the stop spacing",
                request.city
            )));
        }

        let stops: Vec<Waypoint> = spaced.iter().map(Waypoint::from).collect();
        tracing::debug!(
            "Selected stops: {}",
            stops
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut waypoints =
            assemble_waypoints(&start, &stops, &request.endpoint, custom_end.as_ref());
        if stops.len() > 1 {
            waypoints = ordering::optimize(waypoints);
        }
        let ordered_stops = Self::stops_of(&waypoints, &request.endpoint);

        let segments = self.planner.segments_for(&waypoints).await?;

        let (final_waypoints, final_segments) = ConstraintValidator::enforce(
            &self.planner,
            &start,
            ordered_stops,
            segments,
            request.max_walking_minutes,
            &request.endpoint,
            custom_end.as_ref(),
        )
        .await?;

        if let Some(cap_minutes) = request.max_walking_minutes {
            let total_seconds: f64 = final_segments.iter().map(|s| s.duration_seconds).sum();
            if total_seconds > f64::from(cap_minutes) * 60.0 {
                return Err(TourError::NoRouteWithinConstraints(format!(
                    "even the shortest possible route takes {:.0} minutes of walking, over \
                     the {} minute limit — raise the limit or start closer to the endpoint",
                    total_seconds / 60.0,
                    cap_minutes
                )));
            }
        }

        let route = GeneratedRoute::assemble(final_waypoints, final_segments);
        tracing::info!(
            "Generated tour: {} stops, {:.1}km, {:.0}min walking, {}min total experience",
            route.stop_count(),
            route.total_distance_meters / 1000.0,
            route.walking_minutes(),
            route.total_experience_minutes
        );

        Ok(route)
    }

    /// Wrap generation in a deadline. On timeout, in-flight provider calls
    /// are dropped and nothing partial is cached at the route level.
    pub async fn generate_with_timeout(
        &self,
        request: &TourRequest,
        deadline: Duration,
    ) -> Result<GeneratedRoute> {
        match tokio::time::timeout(deadline, self.generate(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Tour generation for '{}' timed out after {}s",
                    request.city,
                    deadline.as_secs()
                );
                Err(TourError::Timeout(format!(
                    "gave up after {} seconds — the routing service may be overloaded",
                    deadline.as_secs()
                )))
            }
        }
    }

    async fn resolve_start(&self, start: &StartPoint) -> Result<Waypoint> {
        match start {
            StartPoint::Coordinate(coordinates) => {
                Ok(Waypoint::synthesized("Start".to_string(), *coordinates))
            }
            StartPoint::Address(query) => {
                let located = self.geocoder.resolve(query).await?;
                tracing::debug!("Resolved start '{}' -> {}", query, located.display_name);
                Ok(Waypoint::synthesized(
                    located.display_name,
                    located.coordinates,
                ))
            }
        }
    }

    async fn resolve_custom_end(&self, policy: &EndpointPolicy) -> Result<Option<Waypoint>> {
        match policy {
            EndpointPolicy::Custom(name) => {
                let located = self.geocoder.resolve(name).await?;
                tracing::debug!("Resolved endpoint '{}' -> {}", name, located.display_name);
                Ok(Some(Waypoint::synthesized(
                    located.display_name,
                    located.coordinates,
                )))
            }
            _ => Ok(None),
        }
    }

    /// The POI stops of an assembled waypoint list, i.e. everything between
    /// the start and the policy-appended endpoint.
    fn stops_of(waypoints: &[Waypoint], policy: &EndpointPolicy) -> Vec<Waypoint> {
        match policy {
            EndpointPolicy::LastPlace => waypoints[1..].to_vec(),
            _ => waypoints[1..waypoints.len() - 1].to_vec(),
        }
    }
}
