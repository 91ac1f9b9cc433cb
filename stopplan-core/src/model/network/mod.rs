//! Road network with overlaid walk and drive subgraphs

pub mod components;
pub mod graph;

pub use components::{RoadEdge, RoadNode, TravelMode};
pub use graph::{IndexedPoint, RoadNetwork, haversine_distance};
