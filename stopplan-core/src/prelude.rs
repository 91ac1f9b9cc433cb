pub use crate::MAX_SITE_CANDIDATES;
pub use crate::WALK_EPSILON;

// Re-export key components
pub use crate::export::{stops_to_geojson, stops_to_geojson_string};
pub use crate::loading::{
    PlacementParams, ResolvedParams, RoadNetworkBuilder, load_students_csv,
    network_from_overpass_json,
};
pub use crate::model::{
    BusRoutingProblem, BusStop, RoadNetwork, SiteAccess, StopPhase, Student, TravelMode,
};
pub use crate::placement::{PlacementOutcome, StopPlacer, place_stops};

// Core types
pub use crate::Meters;
pub use crate::RoadNodeId;
pub use crate::StopId;
pub use crate::StudentId;
