//! Clean-up passes joining near-duplicate stops and stops on dead ends

use hashbrown::HashMap;
use log::debug;
use petgraph::graph::NodeIndex;

use super::{
    context::PlacementContext,
    stops::{PlacedStop, merge_into},
};
use crate::{Meters, WALK_EPSILON, model::TravelMode};

/// Share of the dead-end search radius inside which a well connected stop
/// always wins over a closer dead end
const CONNECTED_PREFERENCE: f64 = 0.6;

/// Merges stops whose sites are within the merge distance of each other
/// along the drive graph, until no such pair is left. The stop with more
/// students survives.
pub(crate) fn merge_close(ctx: &PlacementContext<'_>, stops: &mut Vec<PlacedStop>) -> usize {
    let threshold = ctx.params.merge_dist;
    let mut reach: HashMap<NodeIndex, HashMap<NodeIndex, Meters>> = HashMap::new();
    let mut merged = 0;

    while let Some((i, j)) = close_pair(ctx, stops, threshold, &mut reach) {
        let (keep, absorbed) = if stops[j].members.len() > stops[i].members.len() {
            (j, i)
        } else {
            (i, j)
        };
        merge_into(stops, keep, absorbed);
        merged += 1;
    }

    if merged > 0 {
        debug!("Merged {merged} stops closer than {threshold:.0} m by road");
    }
    merged
}

fn close_pair(
    ctx: &PlacementContext<'_>,
    stops: &[PlacedStop],
    threshold: Meters,
    reach: &mut HashMap<NodeIndex, HashMap<NodeIndex, Meters>>,
) -> Option<(usize, usize)> {
    for (i, stop) in stops.iter().enumerate() {
        let reached = reach.entry(stop.drive_node).or_insert_with(|| {
            ctx.network.shortest_paths(
                stop.drive_node,
                TravelMode::Drive,
                Some(threshold + WALK_EPSILON),
            )
        });
        let partner = stops.iter().enumerate().position(|(j, other)| {
            j != i
                && reached
                    .get(&other.drive_node)
                    .is_some_and(|&d| d <= threshold + WALK_EPSILON)
        });
        if let Some(j) = partner {
            return Some((i, j));
        }
    }
    None
}

/// Folds stops sited on dead ends (driveable degree two or less) into a
/// better connected stop within walking reach, until none can move.
pub(crate) fn merge_culdesac(ctx: &PlacementContext<'_>, stops: &mut Vec<PlacedStop>) -> usize {
    let max_walk = ctx.max_walk();
    let cutoff = (0.5 * max_walk).max(90.0).min(0.9 * max_walk);
    let mut merged = 0;

    'scan: loop {
        for i in 0..stops.len() {
            let degree = ctx.network.driveable_degree(stops[i].drive_node);
            if degree > 2 {
                continue;
            }
            if let Some(target) = culdesac_target(ctx, stops, i, degree, cutoff) {
                debug!(
                    "Folding dead-end stop at {:?} into stop at {:?}",
                    stops[i].drive_node, stops[target].drive_node
                );
                merge_into(stops, target, i);
                merged += 1;
                continue 'scan;
            }
        }
        break;
    }
    merged
}

fn culdesac_target(
    ctx: &PlacementContext<'_>,
    stops: &[PlacedStop],
    i: usize,
    degree: usize,
    cutoff: Meters,
) -> Option<usize> {
    let reached = ctx.network.shortest_paths(
        stops[i].walk_node,
        TravelMode::Walk,
        Some(cutoff + WALK_EPSILON),
    );

    let mut options: Vec<(Meters, usize, usize)> = stops
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .filter_map(|(j, other)| {
            let d = *reached.get(&other.walk_node)?;
            (d <= cutoff + WALK_EPSILON)
                .then(|| (d, j, ctx.network.driveable_degree(other.drive_node)))
        })
        .collect();
    options.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let connected = options.iter().find(|&&(_, _, deg)| deg > 2);
    if let Some(&(d, j, _)) = connected
        && d <= CONNECTED_PREFERENCE * cutoff
    {
        return Some(j);
    }
    options
        .iter()
        .find(|&&(_, _, deg)| deg > 2 || deg >= degree)
        .map(|&(_, j, _)| j)
}
