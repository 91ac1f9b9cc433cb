//! Shortest-path primitives over the road network

pub mod dijkstra;

pub use dijkstra::{dijkstra_distances, find_junction, nearest_driveable};
