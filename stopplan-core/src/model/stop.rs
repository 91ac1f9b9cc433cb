use geo::Point;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::{StopId, StudentId};

/// How a stop's site relates to the road network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteAccess {
    /// Site is a driveable road node
    Driveable,
    /// No driveable node was reachable; the site is a walk-only node
    WalkOnly,
    /// Last-resort fallback: the site is a student's raw position
    Unsnapped,
}

/// A committed bus stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    pub id: StopId,
    pub site: Point<f64>,
    pub students: Vec<StudentId>,
    pub access: SiteAccess,
}

impl BusStop {
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

/// A proposed stop site for a group of students, before it is committed.
///
/// `cover` holds the group members (student indices) within walking
/// distance of the site and may be a strict subset of the group.
#[derive(Debug, Clone, PartialEq)]
pub struct StopCandidate {
    pub site: Point<f64>,
    pub walk_node: NodeIndex,
    pub drive_node: NodeIndex,
    pub cover: Vec<usize>,
    /// True when every group member is within walking distance
    pub feasible: bool,
    pub access: SiteAccess,
}
