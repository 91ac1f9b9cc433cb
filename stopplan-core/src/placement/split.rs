//! Capacity-driven partitioning of oversized clusters (k-medoids)

use log::{debug, trace};
use rayon::prelude::*;

use super::context::{PlacementContext, penalized};
use crate::Meters;

const MAX_ROUNDS: usize = 6;

/// Splits `group` into at most `⌈|group| / cap⌉` walk-compact parts
/// (fewer when a target stop count is set). Groups within capacity pass
/// through unchanged.
pub(crate) fn split_group(ctx: &PlacementContext<'_>, group: Vec<usize>) -> Vec<Vec<usize>> {
    let cap = ctx.params.cap;
    if group.len() <= cap {
        return vec![group];
    }

    let mut k = group.len().div_ceil(cap);
    if let Some(target) = ctx.params.target() {
        k = k.min(target);
    }
    if k <= 1 {
        return vec![group];
    }

    let matrix = distance_matrix(ctx, &group);
    let connected = matrix
        .iter()
        .enumerate()
        .any(|(a, row)| row.iter().enumerate().any(|(b, d)| a != b && d.is_finite()));
    if !connected {
        debug!(
            "Cluster of {} students is fully disconnected, slicing into chunks of {cap}",
            group.len()
        );
        return group.chunks(cap).map(<[usize]>::to_vec).collect();
    }

    let parts = k_medoids(&matrix, k);
    trace!(
        "Split cluster of {} into {} groups (k = {k})",
        group.len(),
        parts.len()
    );
    parts
        .into_iter()
        .map(|part| part.into_iter().map(|local| group[local]).collect())
        .collect()
}

/// Pairwise walk distances with one bounded expansion per member.
/// Pairs farther apart than three walk distances are infinite.
fn distance_matrix(ctx: &PlacementContext<'_>, group: &[usize]) -> Vec<Vec<Meters>> {
    let cutoff = 3.0 * ctx.max_walk();
    group
        .par_iter()
        .map(|&member| {
            let mut row = ctx.walk_distances_to(ctx.walk_nodes[member], group, Some(cutoff));
            if let Some(own) = group.iter().position(|&m| m == member) {
                row[own] = 0.0;
            }
            row
        })
        .collect()
}

/// Partitions the indices of `matrix` into at most `k` groups around
/// medoids. Returns local indices; empty groups are dropped.
fn k_medoids(matrix: &[Vec<Meters>], k: usize) -> Vec<Vec<usize>> {
    let n = matrix.len();
    let mut medoids = seed_medoids(matrix, k);
    let mut assignment = vec![usize::MAX; n];

    for _ in 0..MAX_ROUNDS {
        let mut changed = false;

        for point in 0..n {
            let nearest = (0..medoids.len())
                .min_by(|&a, &b| {
                    penalized(matrix[point][medoids[a]])
                        .total_cmp(&penalized(matrix[point][medoids[b]]))
                        .then(a.cmp(&b))
                })
                .unwrap_or(0);
            if assignment[point] != nearest {
                assignment[point] = nearest;
                changed = true;
            }
        }

        for (slot, medoid) in medoids.iter_mut().enumerate() {
            let members: Vec<usize> = (0..n).filter(|&p| assignment[p] == slot).collect();
            let best = members.iter().copied().min_by(|&a, &b| {
                intra_sum(matrix, a, &members)
                    .total_cmp(&intra_sum(matrix, b, &members))
                    .then(a.cmp(&b))
            });
            if let Some(best) = best
                && best != *medoid
            {
                *medoid = best;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    let mut groups = vec![Vec::new(); medoids.len()];
    for (point, &slot) in assignment.iter().enumerate() {
        groups[slot].push(point);
    }
    groups.retain(|g| !g.is_empty());
    groups
}

fn intra_sum(matrix: &[Vec<Meters>], point: usize, members: &[usize]) -> Meters {
    members.iter().map(|&m| penalized(matrix[point][m])).sum()
}

/// Farthest-point seeding: the most central point first, then repeatedly
/// the point farthest from every medoid chosen so far.
fn seed_medoids(matrix: &[Vec<Meters>], k: usize) -> Vec<usize> {
    let n = matrix.len();
    let all: Vec<usize> = (0..n).collect();
    let first = (0..n)
        .min_by(|&a, &b| {
            intra_sum(matrix, a, &all)
                .total_cmp(&intra_sum(matrix, b, &all))
                .then(a.cmp(&b))
        })
        .unwrap_or(0);

    let mut medoids = vec![first];
    while medoids.len() < k.min(n) {
        let next = (0..n).filter(|p| !medoids.contains(p)).max_by(|&a, &b| {
            let spread = |p: usize| {
                medoids
                    .iter()
                    .map(|&m| penalized(matrix[p][m]))
                    .fold(f64::INFINITY, f64::min)
            };
            spread(a).total_cmp(&spread(b)).then(b.cmp(&a))
        });
        match next {
            Some(next) => medoids.push(next),
            None => break,
        }
    }
    medoids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loading::PlacementParams,
        test_support::{line_network_with_students, two_component_network},
    };

    #[test]
    fn passes_through_groups_within_capacity() {
        let (network, students) = line_network_with_students(4, 10.0, &[0, 1, 2]);
        let params = PlacementParams {
            cap: Some(3),
            ..PlacementParams::with_max_walk(100.0)
        };
        let ctx = PlacementContext::new(&network, &students, params.resolve().unwrap()).unwrap();
        assert_eq!(split_group(&ctx, vec![0, 1, 2]), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn splits_two_blobs_apart() {
        // two tight blobs of three students 500 m apart on one street
        let (network, students) =
            line_network_with_students(60, 10.0, &[0, 1, 2, 50, 51, 52]);
        let params = PlacementParams {
            cap: Some(3),
            ..PlacementParams::with_max_walk(200.0)
        };
        let ctx = PlacementContext::new(&network, &students, params.resolve().unwrap()).unwrap();
        let mut parts = split_group(&ctx, (0..6).collect());
        parts.sort();
        assert_eq!(parts, vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn target_count_limits_k() {
        let (network, students) = line_network_with_students(10, 10.0, &[0, 1, 2, 3, 4, 5]);
        let params = PlacementParams {
            cap: Some(2),
            target_stop_count: 1,
            ..PlacementParams::with_max_walk(200.0)
        };
        let ctx = PlacementContext::new(&network, &students, params.resolve().unwrap()).unwrap();
        assert_eq!(split_group(&ctx, (0..6).collect()).len(), 1);
    }

    #[test]
    fn disconnected_members_are_chunked() {
        let (network, students) = two_component_network();
        let params = PlacementParams {
            cap: Some(1),
            ..PlacementParams::with_max_walk(100.0)
        };
        let ctx = PlacementContext::new(&network, &students, params.resolve().unwrap()).unwrap();
        assert_eq!(split_group(&ctx, vec![0, 1]), vec![vec![0], vec![1]]);
    }

    #[test]
    fn seeding_picks_center_then_extremes() {
        let positions = [0.0, 10.0, 20.0, 30.0, 100.0];
        let matrix: Vec<Vec<f64>> = positions
            .iter()
            .map(|a: &f64| positions.iter().map(|b| (a - b).abs()).collect())
            .collect();
        assert_eq!(seed_medoids(&matrix, 2), vec![2, 4]);
        let groups = k_medoids(&matrix, 2);
        assert_eq!(groups, vec![vec![0, 1, 2, 3], vec![4]]);
    }
}
