use hashbrown::HashMap;
use log::{debug, warn};
use petgraph::graph::NodeIndex;
use rand::Rng;
use rayon::prelude::*;

use super::{
    context::PlacementContext,
    site::select_site,
    stops::{PlacedStop, dedupe_by_site},
};
use crate::{Meters, WALK_EPSILON, model::TravelMode};

/// Rebinds every student to the nearest stop that reaches them within the
/// assignment radius. Students no stop reaches get a stop of their own, so
/// coverage is total afterwards.
pub(crate) fn refine<R: Rng>(ctx: &PlacementContext<'_>, rng: &mut R, stops: &mut Vec<PlacedStop>) {
    dedupe_by_site(stops);

    let radius = ctx.params.assign_radius;
    let reach: Vec<HashMap<NodeIndex, Meters>> = stops
        .par_iter()
        .map(|stop| {
            ctx.network
                .shortest_paths(stop.walk_node, TravelMode::Walk, Some(radius + WALK_EPSILON))
        })
        .collect();

    for stop in stops.iter_mut() {
        stop.members.clear();
    }

    let mut orphans = Vec::new();
    for student in 0..ctx.student_count() {
        let node = ctx.walk_nodes[student];
        let nearest = reach
            .iter()
            .enumerate()
            .filter_map(|(s, reached)| {
                reached
                    .get(&node)
                    .filter(|&&d| d <= radius + WALK_EPSILON)
                    .map(|&d| (s, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        match nearest {
            Some((s, _)) => stops[s].members.push(student),
            None => orphans.push(student),
        }
    }

    if !orphans.is_empty() {
        debug!("{} students out of reach of every stop", orphans.len());
    }
    for student in orphans {
        stops.push(singleton_stop(ctx, rng, student));
    }

    stops.retain(|stop| !stop.members.is_empty());
    dedupe_by_site(stops);
}

/// Stop serving one student: a selected site when one is walkable,
/// otherwise the student's own position.
pub(crate) fn singleton_stop<R: Rng>(
    ctx: &PlacementContext<'_>,
    rng: &mut R,
    student: usize,
) -> PlacedStop {
    let candidate = select_site(ctx, &[student], rng);
    if candidate.feasible {
        PlacedStop::from_candidate(candidate, vec![student])
    } else {
        warn!(
            "No walkable site for student {}, placing the stop at their home",
            ctx.students[student].id
        );
        PlacedStop::unsnapped(ctx, student)
    }
}
