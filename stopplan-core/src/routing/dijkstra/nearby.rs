//! Bounded searches over the drive graph used when choosing stop sites

use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::{Meters, model::RoadNetwork, model::TravelMode};

/// Settles drive-graph nodes in distance order from `start` and yields
/// each one to `visit` until it returns `false` or `limit` is exhausted.
fn walk_drive_graph(
    network: &RoadNetwork,
    start: NodeIndex,
    limit: Meters,
    mut visit: impl FnMut(NodeIndex) -> bool,
) {
    let mut best: HashMap<NodeIndex, Meters> = HashMap::new();
    let mut heap = BinaryHeap::new();
    best.insert(start, 0.0);
    heap.push(State {
        cost: 0.0,
        node: start,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if best.get(&node).is_some_and(|&d| cost > d) {
            continue;
        }
        if !visit(node) {
            return;
        }
        for edge in network.edges(node) {
            if !edge.weight().driveable {
                continue;
            }
            let next = edge.target();
            let next_cost = cost + edge.weight().distance;
            if next_cost > limit {
                continue;
            }
            if best.get(&next).is_none_or(|&d| next_cost < d) {
                best.insert(next, next_cost);
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }
}

/// Up to `k` driveable nodes closest to `start` along driveable edges,
/// nearest first. Never empty: falls back to the (snapped) start node.
pub fn nearest_driveable(
    network: &RoadNetwork,
    start: NodeIndex,
    limit: Meters,
    k: usize,
) -> Vec<NodeIndex> {
    let start = network.snap_to_mode(start, TravelMode::Drive);
    let mut found = Vec::with_capacity(k);
    walk_drive_graph(network, start, limit, |node| {
        if network.node(node).is_some_and(|n| n.driveable) {
            found.push(node);
        }
        found.len() < k
    });
    if found.is_empty() {
        found.push(start);
    }
    found
}

/// Closest node within `limit` along driveable edges whose driveable
/// degree is at least `min_degree`.
pub fn find_junction(
    network: &RoadNetwork,
    start: NodeIndex,
    limit: Meters,
    min_degree: usize,
) -> Option<NodeIndex> {
    let mut junction = None;
    walk_drive_graph(network, start, limit, |node| {
        if network.driveable_degree(node) >= min_degree {
            junction = Some(node);
            return false;
        }
        true
    });
    junction
}
