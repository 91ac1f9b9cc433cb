use fixedbitset::FixedBitSet;
use log::debug;
use rand::Rng;

use super::{
    cluster::NeighborCache,
    context::PlacementContext,
    site::select_site,
    stops::{PlacedStop, dedupe_by_site},
};

/// Rebuilds the stops from scratch when there are more than the target
/// count, covering students greedily with the largest walk neighborhoods.
/// Every student ends up on exactly one of the new stops.
pub(crate) fn consolidate<R: Rng>(
    ctx: &PlacementContext<'_>,
    rng: &mut R,
    stops: &mut Vec<PlacedStop>,
) {
    let Some(target) = ctx.params.target() else {
        return;
    };
    if stops.len() <= target {
        return;
    }

    let groups = cover_groups(ctx, target);
    debug!(
        "Consolidating {} stops into {} groups (target {target})",
        stops.len(),
        groups.len()
    );

    *stops = groups
        .into_iter()
        .map(|group| {
            let candidate = select_site(ctx, &group, rng);
            let mut members = candidate.cover.clone();
            members.extend(group.iter().filter(|m| !candidate.cover.contains(m)));
            PlacedStop::from_candidate(candidate, members)
        })
        .collect();
    dedupe_by_site(stops);
}

/// Greedy neighborhood covering: each round keeps the largest
/// {seed} + walk neighbors subset over all unused seeds, sized to spread the
/// remaining students evenly over the remaining slots.
fn cover_groups(ctx: &PlacementContext<'_>, target: usize) -> Vec<Vec<usize>> {
    let n = ctx.student_count();
    let mut cache = NeighborCache::filled(ctx, ctx.max_walk());
    let mut used = FixedBitSet::with_capacity(n);
    let mut groups: Vec<Vec<usize>> = Vec::with_capacity(target);
    let mut remaining = n;

    while groups.len() < target && remaining > 0 {
        let slots = target - groups.len();
        let desired = remaining.div_ceil(slots).min(ctx.params.cap).max(1);

        let mut best: Vec<usize> = Vec::new();
        for seed in 0..n {
            if used.contains(seed) {
                continue;
            }
            let mut subset = vec![seed];
            subset.extend(
                cache
                    .neighbors(ctx, seed)
                    .iter()
                    .map(|&(j, _)| j)
                    .filter(|&j| !used.contains(j))
                    .take(desired - 1),
            );
            if subset.len() > best.len() {
                best = subset;
                if best.len() == desired {
                    break;
                }
            }
        }

        for &member in &best {
            used.insert(member);
        }
        remaining -= best.len();
        groups.push(best);
    }

    groups.extend(used.zeroes().map(|leftover| vec![leftover]));
    groups
}
