mod nearby;
mod regular_dijkstra;
mod state;

pub use nearby::{find_junction, nearest_driveable};
pub use regular_dijkstra::dijkstra_distances;
