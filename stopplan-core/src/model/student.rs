use geo::Point;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::{RoadNetwork, TravelMode};
use crate::StudentId;

/// Road nodes a student is snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnappedNodes {
    pub walk: NodeIndex,
    pub drive: NodeIndex,
}

/// A student waiting for the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// Home position (x = lon, y = lat)
    pub geometry: Point<f64>,
}

impl Student {
    pub fn new(id: StudentId, geometry: Point<f64>) -> Self {
        Self { id, geometry }
    }

    pub fn from_lat_lon(id: StudentId, lat: f64, lon: f64) -> Self {
        Self::new(id, Point::new(lon, lat))
    }

    /// Nearest walk and drive nodes on `network`, `None` only for an empty
    /// network. Not cached; placement snaps each student once per run.
    pub fn snapped(&self, network: &RoadNetwork) -> Option<SnappedNodes> {
        Some(SnappedNodes {
            walk: network.nearest_node(&self.geometry, TravelMode::Walk)?,
            drive: network.nearest_node(&self.geometry, TravelMode::Drive)?,
        })
    }
}
