use geo::Point;
use hashbrown::HashMap;
use log::debug;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use crate::{
    Error,
    model::{RoadEdge, RoadNetwork, RoadNode, network::haversine_distance},
};

/// Directions a way may be traversed in, relative to its node order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Both,
    Forward,
    Backward,
    Closed,
}

impl Flow {
    pub fn forward(self) -> bool {
        matches!(self, Flow::Both | Flow::Forward)
    }

    pub fn backward(self) -> bool {
        matches!(self, Flow::Both | Flow::Backward)
    }
}

/// Walk/drive permissions of a way
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WayAccess {
    pub walk: Flow,
    pub drive: Flow,
    pub speed_limit: Option<f64>,
}

impl WayAccess {
    /// Two-way street open to cars and pedestrians
    pub fn street() -> Self {
        Self {
            walk: Flow::Both,
            drive: Flow::Both,
            speed_limit: None,
        }
    }

    /// Two-way pedestrian-only path
    pub fn footpath() -> Self {
        Self {
            walk: Flow::Both,
            drive: Flow::Closed,
            speed_limit: None,
        }
    }
}

/// Incrementally assembles a [`RoadNetwork`].
///
/// Node walk/drive flags are derived in [`RoadNetworkBuilder::build`] from
/// the outgoing edges, so callers only describe edges.
#[derive(Debug, Default)]
pub struct RoadNetworkBuilder {
    graph: DiGraph<RoadNode, RoadEdge>,
    by_osm_id: HashMap<i64, NodeIndex>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning the existing index if `osm_id` is already known.
    pub fn add_node(&mut self, osm_id: i64, geometry: Point<f64>) -> NodeIndex {
        *self
            .by_osm_id
            .entry(osm_id)
            .or_insert_with(|| self.graph.add_node(RoadNode::new(osm_id, geometry)))
    }

    pub fn node_index(&self, osm_id: i64) -> Option<NodeIndex> {
        self.by_osm_id.get(&osm_id).copied()
    }

    /// Adds a single directed edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeIndex`] if either endpoint is unknown and
    /// [`Error::InvalidData`] for a negative or non-finite distance.
    pub fn add_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        edge: RoadEdge,
    ) -> Result<EdgeIndex, Error> {
        if self.graph.node_weight(from).is_none() || self.graph.node_weight(to).is_none() {
            return Err(Error::InvalidNodeIndex);
        }
        if !edge.distance.is_finite() || edge.distance < 0.0 {
            return Err(Error::InvalidData(format!(
                "edge distance must be finite and non-negative, got {}",
                edge.distance
            )));
        }
        Ok(self.graph.add_edge(from, to, edge))
    }

    /// Adds the directed edges of a way given as a list of OSM node ids.
    /// Segment lengths are great-circle distances between the endpoints.
    ///
    /// Returns the number of directed edges created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the way references an unknown node.
    pub fn add_way(&mut self, node_ids: &[i64], access: WayAccess) -> Result<usize, Error> {
        let resolved = node_ids
            .iter()
            .map(|id| {
                self.node_index(*id)
                    .ok_or_else(|| Error::InvalidData(format!("way references unknown node {id}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = 0;
        for pair in resolved.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            let distance = haversine_distance(&self.graph[u].geometry, &self.graph[v].geometry);

            for (from, to, walk, drive) in [
                (u, v, access.walk.forward(), access.drive.forward()),
                (v, u, access.walk.backward(), access.drive.backward()),
            ] {
                if !walk && !drive {
                    continue;
                }
                let mut edge = RoadEdge::new(distance, walk, drive);
                edge.speed_limit = access.speed_limit;
                self.add_edge(from, to, edge)?;
                created += 1;
            }
        }
        Ok(created)
    }

    /// Derives node flags and builds the snapping indices.
    pub fn build(mut self) -> RoadNetwork {
        let flags: Vec<(NodeIndex, bool, bool)> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (source, _) = self.graph.edge_endpoints(e)?;
                let weight = &self.graph[e];
                Some((source, weight.walkable, weight.driveable))
            })
            .collect();

        for (node, walkable, driveable) in flags {
            let weight = &mut self.graph[node];
            weight.walkable |= walkable;
            weight.driveable |= driveable;
        }

        debug!(
            "Built road network with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        RoadNetwork::from_graph(self.graph)
    }
}
