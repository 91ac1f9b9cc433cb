use geo::{Distance, Haversine, Point};
use hashbrown::HashMap;
use petgraph::{Directed, graph::{DiGraph, Edges, NodeIndex}};
use rstar::{RTree, primitives::GeomWithData};

use super::components::{RoadEdge, RoadNode, TravelMode};
use crate::{Meters, routing::dijkstra};

/// Node position in the spatial index (x = lon, y = lat)
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Road network with separate snapping indices per travel mode.
///
/// The graph is immutable once built; every placement query borrows it
/// read-only.
#[derive(Clone)]
pub struct RoadNetwork {
    pub graph: DiGraph<RoadNode, RoadEdge>,
    walk_index: RTree<IndexedPoint>,
    drive_index: RTree<IndexedPoint>,
    any_index: RTree<IndexedPoint>,
}

impl RoadNetwork {
    /// Wraps a finished graph and builds the snapping indices.
    pub(crate) fn from_graph(graph: DiGraph<RoadNode, RoadEdge>) -> Self {
        let index_where = |keep: &dyn Fn(&RoadNode) -> bool| {
            let points: Vec<IndexedPoint> = graph
                .node_indices()
                .filter(|&idx| keep(&graph[idx]))
                .map(|idx| {
                    let p = graph[idx].geometry;
                    GeomWithData::new([p.x(), p.y()], idx)
                })
                .collect();
            RTree::bulk_load(points)
        };

        let walk_index = index_where(&|node| node.walkable);
        let drive_index = index_where(&|node| node.driveable);
        let any_index = index_where(&|_| true);

        Self {
            graph,
            walk_index,
            drive_index,
            any_index,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, node: NodeIndex) -> Option<&RoadNode> {
        self.graph.node_weight(node)
    }

    pub fn node_point(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.graph.node_weight(node).map(|n| n.geometry)
    }

    /// Outgoing edges of `node`
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, RoadEdge, Directed> {
        self.graph.edges(node)
    }

    /// Nearest node usable by `mode`, or the nearest node of any kind when
    /// the network has none of the requested modality.
    pub fn nearest_node(&self, point: &Point<f64>, mode: TravelMode) -> Option<NodeIndex> {
        let query = [point.x(), point.y()];
        let index = match mode {
            TravelMode::Walk => &self.walk_index,
            TravelMode::Drive => &self.drive_index,
        };
        index
            .nearest_neighbor(&query)
            .or_else(|| self.any_index.nearest_neighbor(&query))
            .map(|entry| entry.data)
    }

    /// Returns `node` if it supports `mode`, otherwise the nearest node that does.
    pub fn snap_to_mode(&self, node: NodeIndex, mode: TravelMode) -> NodeIndex {
        match self.graph.node_weight(node) {
            Some(weight) if weight.supports(mode) => node,
            Some(weight) => self.nearest_node(&weight.geometry, mode).unwrap_or(node),
            None => node,
        }
    }

    /// Cutoff-bounded single source distances over the edges `mode` may use.
    pub fn shortest_paths(
        &self,
        from: NodeIndex,
        mode: TravelMode,
        cutoff: Option<Meters>,
    ) -> HashMap<NodeIndex, Meters> {
        dijkstra::dijkstra_distances(self, from, mode, cutoff)
    }

    pub fn driveable_degree(&self, node: NodeIndex) -> usize {
        self.graph
            .edges(node)
            .filter(|edge| edge.weight().driveable)
            .count()
    }
}

/// Great-circle distance in meters between two lon/lat points
pub fn haversine_distance(a: &Point<f64>, b: &Point<f64>) -> Meters {
    Haversine.distance(*a, *b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{line_network, meters_east};

    #[test]
    fn haversine_matches_known_offset() {
        let origin = Point::new(0.0, 0.0);
        let east = meters_east(&origin, 100.0);
        let d = haversine_distance(&origin, &east);
        assert!((d - 100.0).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn haversine_keeps_precision_on_short_segments() {
        let origin = Point::new(37.6, 55.75);
        for meters in [0.05, 1.0, 7.5] {
            let d = haversine_distance(&origin, &meters_east(&origin, meters));
            assert!((d - meters).abs() < 1e-6, "{meters} m came back as {d}");
        }
    }

    #[test]
    fn nearest_node_falls_back_to_any_modality() {
        // walk-only line: no driveable nodes at all
        let (network, nodes) = line_network(3, 50.0, true, false);
        let far_end = network.node_point(nodes[2]).unwrap();
        assert_eq!(network.nearest_node(&far_end, TravelMode::Drive), Some(nodes[2]));
        assert_eq!(network.driveable_degree(nodes[1]), 0);
    }

    #[test]
    fn shortest_paths_respects_cutoff() {
        let (network, nodes) = line_network(5, 50.0, true, true);
        let dist = network.shortest_paths(nodes[0], TravelMode::Walk, Some(120.0));
        assert!(dist.contains_key(&nodes[2]));
        assert!(!dist.contains_key(&nodes[3]));
        assert!((dist[&nodes[2]] - 100.0).abs() < 1e-6);
    }
}
