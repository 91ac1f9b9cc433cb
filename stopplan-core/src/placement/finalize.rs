use log::{debug, warn};
use rand::Rng;
use rayon::prelude::*;

use super::{context::PlacementContext, site::select_site, stops::PlacedStop};
use crate::{Meters, WALK_EPSILON, model::SiteAccess, model::TravelMode};

/// Capacity-aware rebinding of students to stops, followed by a site
/// recomputation for every stop's final membership.
///
/// Students go to their nearest stop with room left, best pair first. When
/// every reachable stop is full the student is forced onto the nearest one
/// anyway; the indices of stops over capacity are returned. Emptied stops
/// are kept.
pub(crate) fn final_assignment<R: Rng>(
    ctx: &PlacementContext<'_>,
    rng: &mut R,
    stops: &mut [PlacedStop],
) -> Vec<usize> {
    let max_walk = ctx.max_walk();
    let cutoff = (1.5 * max_walk).max(max_walk + 25.0);
    let cap = ctx.params.cap;
    let n = ctx.student_count();

    let mut previous = vec![None; n];
    for (s, stop) in stops.iter().enumerate() {
        for &member in &stop.members {
            previous[member] = Some(s);
        }
    }

    let mut options: Vec<(Meters, usize, usize)> = stops
        .par_iter()
        .enumerate()
        .flat_map_iter(|(s, stop)| {
            let reached = ctx.network.shortest_paths(
                stop.walk_node,
                TravelMode::Walk,
                Some(cutoff + WALK_EPSILON),
            );
            (0..n)
                .filter_map(move |student| {
                    reached
                        .get(&ctx.walk_nodes[student])
                        .map(|&d| (d, student, s))
                })
                .collect::<Vec<_>>()
        })
        .collect();
    options.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut assigned: Vec<Option<usize>> = vec![None; n];
    let mut load = vec![0usize; stops.len()];
    for &(_, student, s) in &options {
        if assigned[student].is_none() && load[s] < cap {
            assigned[student] = Some(s);
            load[s] += 1;
        }
    }

    let mut forced = 0;
    for student in 0..n {
        if assigned[student].is_some() {
            continue;
        }
        let nearest = options
            .iter()
            .find(|&&(_, st, _)| st == student)
            .map(|&(_, _, s)| s);
        if let Some(s) = nearest.or(previous[student]) {
            assigned[student] = Some(s);
            load[s] += 1;
            forced += 1;
        }
    }
    if forced > 0 {
        debug!("Forced {forced} students onto full or distant stops");
    }

    for stop in stops.iter_mut() {
        stop.members.clear();
    }
    for (student, s) in assigned.into_iter().enumerate() {
        if let Some(s) = s {
            stops[s].members.push(student);
        }
    }

    for stop in stops.iter_mut().filter(|stop| !stop.members.is_empty()) {
        let candidate = select_site(ctx, &stop.members, rng);
        if candidate.feasible || stop.access != SiteAccess::Unsnapped {
            stop.relocate(candidate);
        }
    }

    let overflowed: Vec<usize> = load
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > cap)
        .map(|(s, _)| s)
        .collect();
    if !overflowed.is_empty() {
        warn!(
            "{} stops exceed the capacity of {cap} students",
            overflowed.len()
        );
    }
    overflowed
}
