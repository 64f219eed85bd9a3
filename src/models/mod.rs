pub mod coordinates;
pub mod poi;
pub mod route;
pub mod waypoint;

pub use coordinates::Coordinates;
pub use poi::{Poi, PoiCategory};
pub use route::{GeneratedRoute, RouteSegment, TourRequest};
pub use waypoint::{EndpointPolicy, RouteLengthClass, StartPoint, Waypoint};
