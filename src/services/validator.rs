use crate::error::Result;
use crate::models::{EndpointPolicy, RouteSegment, Waypoint};
use crate::services::segments::SegmentPlanner;

/// Build the full waypoint sequence for a stop list under an endpoint
/// policy: round-trip re-appends the start, last-place ends at the final
/// stop, custom appends the separately resolved endpoint.
pub fn assemble_waypoints(
    start: &Waypoint,
    stops: &[Waypoint],
    policy: &EndpointPolicy,
    custom_end: Option<&Waypoint>,
) -> Vec<Waypoint> {
    let mut waypoints = Vec::with_capacity(stops.len() + 2);
    waypoints.push(start.clone());
    waypoints.extend(stops.iter().cloned());

    match policy {
        EndpointPolicy::RoundTrip => waypoints.push(start.clone()),
        EndpointPolicy::LastPlace => {}
        EndpointPolicy::Custom(_) => {
            if let Some(end) = custom_end {
                waypoints.push(end.clone());
            }
        }
    }

    waypoints
}

/// Enforces the walking-time cap against actual routed segments, trimming
/// stops until the route complies.
pub struct ConstraintValidator;

impl ConstraintValidator {
    /// Check total walking time against the cap; while it is exceeded,
    /// remove one stop from the middle of the remaining list (a simplicity
    /// choice, not distance-optimal), rebuild the endpoint per policy,
    /// re-request actual segments and re-check.
    ///
    /// Always terminates: every round removes a stop, and once the stop
    /// list is empty the minimal start/end route is returned as-is — even
    /// if it still exceeds the cap. An unreachable cap is never an error
    /// here; the orchestrator decides what to do with the fallback.
    pub async fn enforce(
        planner: &SegmentPlanner,
        start: &Waypoint,
        mut stops: Vec<Waypoint>,
        mut segments: Vec<RouteSegment>,
        max_walking_minutes: Option<u32>,
        policy: &EndpointPolicy,
        custom_end: Option<&Waypoint>,
    ) -> Result<(Vec<Waypoint>, Vec<RouteSegment>)> {
        let mut waypoints = assemble_waypoints(start, &stops, policy, custom_end);

        let Some(cap_minutes) = max_walking_minutes else {
            return Ok((waypoints, segments));
        };
        let cap_seconds = f64::from(cap_minutes) * 60.0;

        loop {
            let total_seconds: f64 = segments.iter().map(|s| s.duration_seconds).sum();

            if total_seconds <= cap_seconds {
                return Ok((waypoints, segments));
            }

            if stops.is_empty() {
                tracing::warn!(
                    "Walking-time cap of {}min unreachable even for the minimal route ({:.0}min)",
                    cap_minutes,
                    total_seconds / 60.0
                );
                return Ok((waypoints, segments));
            }

            let removed = stops.remove(stops.len() / 2);
            tracing::info!(
                "Route over {}min cap ({:.0}min walking), dropping '{}' ({} stops left)",
                cap_minutes,
                total_seconds / 60.0,
                removed.name,
                stops.len()
            );

            waypoints = assemble_waypoints(start, &stops, policy, custom_end);
            segments = planner.segments_for(&waypoints).await?;
        }
    }
}
