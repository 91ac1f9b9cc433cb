//! Data model for stop placement
//!
//! Contains the road network collaborator, students, stops and the
//! per-phase planning state.

pub mod network;
pub mod plan;
pub mod stop;
pub mod student;

pub use network::{RoadEdge, RoadNetwork, RoadNode, TravelMode};
pub use plan::{BusRoutingProblem, StopPhase};
pub use stop::{BusStop, SiteAccess, StopCandidate};
pub use student::{SnappedNodes, Student};
