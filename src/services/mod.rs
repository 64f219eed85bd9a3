pub mod ordering;
pub mod poi_service;
pub mod route_generator;
pub mod segments;
pub mod selection;
pub mod spacing;
pub mod validator;

pub use poi_service::PoiService;
pub use route_generator::RouteGenerator;
pub use segments::{SegmentMode, SegmentPlanner};
pub use selection::PoiSelector;
pub use validator::ConstraintValidator;
