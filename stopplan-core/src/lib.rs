//! Bus stop placement for school-bus planning.
//!
//! Turns geolocated students and a road network with overlaid walk and drive
//! subgraphs into a covering set of capacity-respecting bus stops.

pub mod error;
pub mod export;
pub mod loading;
pub mod model;
pub mod placement;
pub mod prelude;
pub mod routing;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::Error;
pub use loading::{PlacementParams, ResolvedParams, RoadNetworkBuilder};
pub use model::{
    BusRoutingProblem, BusStop, RoadNetwork, SiteAccess, StopPhase, Student, TravelMode,
};
pub use placement::{PlacementOutcome, StopPlacer, place_stops};

/// Node handle inside a [`RoadNetwork`]
pub type RoadNodeId = petgraph::graph::NodeIndex;
/// Caller supplied student identifier
pub type StudentId = u64;
/// Dense stop identifier, reissued after every structural change
pub type StopId = usize;
/// Network distance in meters
pub type Meters = f64;

/// Slack applied to every "within walking distance" comparison
pub const WALK_EPSILON: Meters = 1e-6;

/// Upper bound on road-node candidates evaluated for a single stop site
pub const MAX_SITE_CANDIDATES: usize = 48;
