//! Hand-built networks for unit tests, laid out in meters around (0, 0)

use geo::{Destination, Haversine, Point};
use petgraph::graph::NodeIndex;

use crate::{
    RoadNetwork, Student,
    loading::RoadNetworkBuilder,
    model::RoadEdge,
};

const EARTH_RADIUS: f64 = 6_370_000.0;

/// Point `meters` along the great circle heading east from `origin`
pub(crate) fn meters_east(origin: &Point<f64>, meters: f64) -> Point<f64> {
    Haversine.destination(*origin, 90.0, meters)
}

fn offset(east: f64, north: f64) -> Point<f64> {
    Point::new(
        (east / EARTH_RADIUS).to_degrees(),
        (north / EARTH_RADIUS).to_degrees(),
    )
}

/// Network with explicit edge lengths, independent of node geometry
pub(crate) struct NetworkFixture {
    builder: RoadNetworkBuilder,
    next_id: i64,
}

impl NetworkFixture {
    pub fn new() -> Self {
        Self {
            builder: RoadNetworkBuilder::new(),
            next_id: 1,
        }
    }

    pub fn node(&mut self, east: f64, north: f64) -> NodeIndex {
        let id = self.next_id;
        self.next_id += 1;
        self.builder.add_node(id, offset(east, north))
    }

    fn link(&mut self, a: NodeIndex, b: NodeIndex, distance: f64, drive: bool) {
        for (from, to) in [(a, b), (b, a)] {
            self.builder
                .add_edge(from, to, RoadEdge::new(distance, true, drive))
                .unwrap();
        }
    }

    /// Two-way street, open to walking and driving
    pub fn road(&mut self, a: NodeIndex, b: NodeIndex, distance: f64) {
        self.link(a, b, distance, true);
    }

    pub fn footpath(&mut self, a: NodeIndex, b: NodeIndex, distance: f64) {
        self.link(a, b, distance, false);
    }

    pub fn build(self) -> RoadNetwork {
        self.builder.build()
    }
}

/// `n` nodes along the equator, `spacing` meters apart
pub(crate) fn line_network(
    n: usize,
    spacing: f64,
    walk: bool,
    drive: bool,
) -> (RoadNetwork, Vec<NodeIndex>) {
    let mut builder = RoadNetworkBuilder::new();
    let nodes: Vec<NodeIndex> = (0..n)
        .map(|i| builder.add_node(i as i64 + 1, offset(i as f64 * spacing, 0.0)))
        .collect();
    for pair in nodes.windows(2) {
        for (from, to) in [(pair[0], pair[1]), (pair[1], pair[0])] {
            builder
                .add_edge(from, to, RoadEdge::new(spacing, walk, drive))
                .unwrap();
        }
    }
    (builder.build(), nodes)
}

/// Street of `n` nodes with student `i` living on node `positions[i]`
pub(crate) fn line_network_with_students(
    n: usize,
    spacing: f64,
    positions: &[usize],
) -> (RoadNetwork, Vec<Student>) {
    let (network, nodes) = line_network(n, spacing, true, true);
    let students = positions
        .iter()
        .enumerate()
        .map(|(i, &p)| Student::new(i as u64, network.node_point(nodes[p]).unwrap()))
        .collect();
    (network, students)
}

/// Two separate streets 5 km apart with one student on each
pub(crate) fn two_component_network() -> (RoadNetwork, Vec<Student>) {
    let mut fx = NetworkFixture::new();
    let a = fx.node(0.0, 0.0);
    let b = fx.node(50.0, 0.0);
    let c = fx.node(5000.0, 0.0);
    let d = fx.node(5050.0, 0.0);
    fx.road(a, b, 50.0);
    fx.road(c, d, 50.0);
    let network = fx.build();
    let students = vec![
        Student::new(0, network.node_point(a).unwrap()),
        Student::new(1, network.node_point(c).unwrap()),
    ];
    (network, students)
}
