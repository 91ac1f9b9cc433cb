use petgraph::graph::NodeIndex;

use crate::{
    Error, Meters, RoadNetwork, WALK_EPSILON,
    loading::ResolvedParams,
    model::{Student, TravelMode},
};

/// Stand-in for unreachable pairs when distances are summed or compared
pub(crate) const DISCONNECTED: Meters = 1e9;

pub(crate) fn penalized(distance: Meters) -> Meters {
    if distance.is_finite() {
        distance
    } else {
        DISCONNECTED
    }
}

/// Read-only state shared by every placement stage: the network, the
/// students with their snapped nodes and the resolved parameters.
pub(crate) struct PlacementContext<'a> {
    pub network: &'a RoadNetwork,
    pub students: &'a [Student],
    pub walk_nodes: Vec<NodeIndex>,
    pub drive_nodes: Vec<NodeIndex>,
    pub params: ResolvedParams,
}

impl<'a> PlacementContext<'a> {
    pub fn new(
        network: &'a RoadNetwork,
        students: &'a [Student],
        params: ResolvedParams,
    ) -> Result<Self, Error> {
        let snaps = students
            .iter()
            .map(|student| student.snapped(network).ok_or(Error::EmptyNetwork))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            network,
            students,
            walk_nodes: snaps.iter().map(|s| s.walk).collect(),
            drive_nodes: snaps.iter().map(|s| s.drive).collect(),
            params,
        })
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn max_walk(&self) -> Meters {
        self.params.max_walk
    }

    pub fn within_walk(&self, distance: Meters) -> bool {
        distance <= self.params.max_walk + WALK_EPSILON
    }

    /// Walk distances from `from` to each listed student, infinite where
    /// the expansion bounded by `cutoff` never reached them.
    pub fn walk_distances_to(
        &self,
        from: NodeIndex,
        members: &[usize],
        cutoff: Option<Meters>,
    ) -> Vec<Meters> {
        let reached = self
            .network
            .shortest_paths(from, TravelMode::Walk, cutoff);
        members
            .iter()
            .map(|&m| {
                reached
                    .get(&self.walk_nodes[m])
                    .copied()
                    .unwrap_or(f64::INFINITY)
            })
            .collect()
    }
}
