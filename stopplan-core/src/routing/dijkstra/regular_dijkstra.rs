use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::{Meters, model::RoadNetwork, model::TravelMode};

/// Dijkstra's algorithm over the edges usable by `mode`.
/// Returns a map of reached node indices to distances in meters; nodes
/// farther than `max_cost` are never inserted.
pub fn dijkstra_distances(
    network: &RoadNetwork,
    start: NodeIndex,
    mode: TravelMode,
    max_cost: Option<Meters>,
) -> HashMap<NodeIndex, Meters> {
    let mut distances: HashMap<NodeIndex, Meters> = HashMap::new();
    let mut heap = BinaryHeap::new();

    if network.node(start).is_none() {
        return distances;
    }

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node)
            && cost > best
        {
            continue;
        }

        for edge in network.edges(node) {
            if !edge.weight().allows(mode) {
                continue;
            }
            let next = edge.target();
            let next_cost = cost + edge.weight().distance;

            if let Some(max) = max_cost
                && next_cost > max
            {
                continue;
            }

            // Add or update distance if better using Entry API
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}
