//! Synthetic road networks shared by the integration tests.
//!
//! Coordinates are laid out in meters east/north of (0, 0) and converted to
//! degrees; edge lengths are given explicitly.
#![allow(dead_code)]

use geo::Point;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stopplan_core::{RoadNetwork, RoadNetworkBuilder, RoadNodeId, Student, model::RoadEdge};

const EARTH_RADIUS: f64 = 6_370_000.0;

pub fn at(east: f64, north: f64) -> Point<f64> {
    Point::new(
        (east / EARTH_RADIUS).to_degrees(),
        (north / EARTH_RADIUS).to_degrees(),
    )
}

#[derive(Default)]
pub struct Streets {
    builder: RoadNetworkBuilder,
    next_id: i64,
}

impl Streets {
    pub fn node(&mut self, east: f64, north: f64) -> RoadNodeId {
        self.next_id += 1;
        self.builder.add_node(self.next_id, at(east, north))
    }

    pub fn road(&mut self, a: RoadNodeId, b: RoadNodeId, meters: f64) {
        self.link(a, b, meters, true);
    }

    pub fn footpath(&mut self, a: RoadNodeId, b: RoadNodeId, meters: f64) {
        self.link(a, b, meters, false);
    }

    fn link(&mut self, a: RoadNodeId, b: RoadNodeId, meters: f64, drive: bool) {
        self.builder
            .add_edge(a, b, RoadEdge::new(meters, true, drive))
            .unwrap();
        self.builder
            .add_edge(b, a, RoadEdge::new(meters, true, drive))
            .unwrap();
    }

    pub fn build(self) -> RoadNetwork {
        self.builder.build()
    }
}

/// Straight two-way street of `n` nodes, `spacing` meters apart
pub fn street(n: usize, spacing: f64) -> (RoadNetwork, Vec<RoadNodeId>) {
    let mut streets = Streets::default();
    let nodes: Vec<RoadNodeId> = (0..n)
        .map(|i| streets.node(i as f64 * spacing, 0.0))
        .collect();
    for pair in nodes.windows(2) {
        streets.road(pair[0], pair[1], spacing);
    }
    (streets.build(), nodes)
}

/// Square street grid with `size` x `size` intersections, `block` meters apart
pub fn grid(size: usize, block: f64) -> RoadNetwork {
    let mut streets = Streets::default();
    let nodes: Vec<Vec<RoadNodeId>> = (0..size)
        .map(|row| {
            (0..size)
                .map(|col| streets.node(col as f64 * block, row as f64 * block))
                .collect()
        })
        .collect();
    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                streets.road(nodes[row][col], nodes[row][col + 1], block);
            }
            if row + 1 < size {
                streets.road(nodes[row][col], nodes[row + 1][col], block);
            }
        }
    }
    streets.build()
}

/// One student on each listed node, ids counting from zero
pub fn students_on(network: &RoadNetwork, nodes: &[RoadNodeId]) -> Vec<Student> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, &node)| Student::new(i as u64, network.node_point(node).unwrap()))
        .collect()
}

/// Students scattered uniformly over a square of `extent` meters
pub fn scattered_students(count: usize, extent: f64, seed: u64) -> Vec<Student> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let point = at(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent));
            Student::new(i as u64 + 100, point)
        })
        .collect()
}
