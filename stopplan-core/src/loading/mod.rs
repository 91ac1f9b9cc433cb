//! This module is responsible for loading data from various sources
//! (OSM Overpass exports, student CSV files) and building the road network
//! and placement configuration.

mod builder;
mod config;
pub mod osm;
pub mod students;

pub use builder::{Flow, RoadNetworkBuilder, WayAccess};
pub use config::{PlacementParams, ResolvedParams};
pub use osm::network_from_overpass_json;
pub use students::load_students_csv;
