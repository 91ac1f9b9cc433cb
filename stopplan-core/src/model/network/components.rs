//! Road network components - nodes, edges and travel modes

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Meters;

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// OSM ID of the node
    pub osm_id: i64,
    /// Node coordinates (x = lon, y = lat)
    pub geometry: Point<f64>,
    /// True if some outgoing edge is walkable
    pub walkable: bool,
    /// True if some outgoing edge is driveable
    pub driveable: bool,
}

impl RoadNode {
    pub fn new(osm_id: i64, geometry: Point<f64>) -> Self {
        Self {
            osm_id,
            geometry,
            walkable: false,
            driveable: false,
        }
    }

    pub fn supports(&self, mode: TravelMode) -> bool {
        match mode {
            TravelMode::Walk => self.walkable,
            TravelMode::Drive => self.driveable,
        }
    }
}

/// Directed road segment
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    /// Segment length in meters
    pub distance: Meters,
    pub walkable: bool,
    pub driveable: bool,
    /// Posted speed limit in km/h, if known
    pub speed_limit: Option<f64>,
}

impl RoadEdge {
    pub fn new(distance: Meters, walkable: bool, driveable: bool) -> Self {
        Self {
            distance,
            walkable,
            driveable,
            speed_limit: None,
        }
    }

    pub fn allows(&self, mode: TravelMode) -> bool {
        match mode {
            TravelMode::Walk => self.walkable,
            TravelMode::Drive => self.driveable,
        }
    }
}

/// Which edge-filtered view of the network a query runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walk,
    Drive,
}
