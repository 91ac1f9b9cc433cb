//! Stop site selection for one group of students.
//!
//! The medoid of the group seeds a pool of nearby driveable nodes, which is
//! searched with simulated annealing. Sites on dead ends are moved to a
//! nearby junction when the group can still walk there.

use itertools::Itertools;
use log::trace;
use petgraph::graph::NodeIndex;
use rand::Rng;
use rayon::prelude::*;

use super::context::{PlacementContext, penalized};
use crate::{
    MAX_SITE_CANDIDATES, Meters, WALK_EPSILON,
    model::{SiteAccess, StopCandidate, TravelMode},
    routing::{find_junction, nearest_driveable},
};

const MEDOID_CANDIDATES: usize = 8;
const MEMBER_CANDIDATES: usize = 3;

const WORST_WALK_WEIGHT: f64 = 0.35;
const DEAD_END_FACTOR: f64 = 0.4;

const ANNEALING_STEPS: usize = 160;
const COOLING: f64 = 0.94;
const MIN_TEMPERATURE: f64 = 1.0;

const JUNCTION_DEGREE: usize = 3;
const JUNCTION_SEARCH_LIMIT: Meters = 80.0;

/// Walk distances from one candidate node to every group member
#[derive(Debug, Clone)]
struct Evaluation {
    drive_node: NodeIndex,
    walk_node: NodeIndex,
    distances: Vec<Meters>,
    score: f64,
}

impl Evaluation {
    fn feasible(&self) -> bool {
        self.score.is_finite()
    }
}

/// Chooses a road node to serve `group` (student indices, non-empty).
///
/// The returned candidate's `cover` lists the members within walking
/// distance of the site; it can be a strict subset of `group` when no
/// node serves everyone, in which case `feasible` is false.
pub(crate) fn select_site<R: Rng>(
    ctx: &PlacementContext<'_>,
    group: &[usize],
    rng: &mut R,
) -> StopCandidate {
    debug_assert!(!group.is_empty());
    let medoid = medoid(ctx, group);

    let candidates = candidate_nodes(ctx, group, medoid);
    let evaluations: Vec<Evaluation> = candidates
        .par_iter()
        .map(|&node| evaluate(ctx, group, node))
        .collect();

    let mut chosen = match anneal(&evaluations, ctx.max_walk(), rng) {
        Some(best) => evaluations[best].clone(),
        None => {
            trace!(
                "No feasible site among {} candidates for a group of {}, using the medoid",
                evaluations.len(),
                group.len()
            );
            evaluate(ctx, group, ctx.drive_nodes[medoid])
        }
    };

    if let Some(junction) = escape_dead_end(ctx, group, &chosen) {
        chosen = junction;
    }

    into_candidate(ctx, group, medoid, chosen)
}

/// Member with the smallest total walk distance to the rest of the group.
/// Members with someone beyond walking distance are only picked when every
/// member has.
fn medoid(ctx: &PlacementContext<'_>, group: &[usize]) -> usize {
    if group.len() == 1 {
        return group[0];
    }

    let totals: Vec<(bool, Meters)> = group
        .par_iter()
        .map(|&member| {
            let distances = ctx.walk_distances_to(ctx.walk_nodes[member], group, None);
            let reaches_all = distances.iter().all(|&d| ctx.within_walk(d));
            (reaches_all, distances.into_iter().map(penalized).sum())
        })
        .collect();

    group
        .iter()
        .zip(&totals)
        .min_by(|(a, (a_ok, a_total)), (b, (b_ok, b_total))| {
            b_ok.cmp(a_ok)
                .then(a_total.total_cmp(b_total))
                .then(a.cmp(b))
        })
        .map_or(group[0], |(&member, _)| member)
}

/// Driveable nodes near the medoid and near every other member, without
/// duplicates and bounded in number.
fn candidate_nodes(ctx: &PlacementContext<'_>, group: &[usize], medoid: usize) -> Vec<NodeIndex> {
    let reach = ctx.params.move_radius();
    let around_medoid = nearest_driveable(
        ctx.network,
        ctx.drive_nodes[medoid],
        reach,
        MEDOID_CANDIDATES,
    );
    let around_members = group
        .iter()
        .filter(|&&member| member != medoid)
        .flat_map(|&member| {
            nearest_driveable(ctx.network, ctx.drive_nodes[member], reach, MEMBER_CANDIDATES)
        });

    around_medoid
        .into_iter()
        .chain(around_members)
        .unique()
        .take(MAX_SITE_CANDIDATES)
        .collect()
}

fn evaluate(ctx: &PlacementContext<'_>, group: &[usize], drive_node: NodeIndex) -> Evaluation {
    let walk_node = ctx.network.snap_to_mode(drive_node, TravelMode::Walk);
    let distances = ctx.walk_distances_to(walk_node, group, Some(ctx.max_walk() + WALK_EPSILON));

    let score = if distances.iter().all(|&d| ctx.within_walk(d)) {
        let total: Meters = distances.iter().sum();
        let worst = distances.iter().copied().fold(0.0, f64::max);
        total + WORST_WALK_WEIGHT * worst + dead_end_penalty(ctx, drive_node)
    } else {
        f64::INFINITY
    };

    Evaluation {
        drive_node,
        walk_node,
        distances,
        score,
    }
}

fn dead_end_penalty(ctx: &PlacementContext<'_>, node: NodeIndex) -> f64 {
    let degree = ctx.network.driveable_degree(node);
    if degree <= 2 {
        (4 - degree) as f64 * DEAD_END_FACTOR
    } else {
        0.0
    }
}

/// Simulated annealing over candidate indices. Returns the best feasible
/// candidate seen, or `None` if no candidate is feasible.
fn anneal<R: Rng>(evaluations: &[Evaluation], max_walk: Meters, rng: &mut R) -> Option<usize> {
    let mut current = evaluations.iter().position(Evaluation::feasible)?;
    let mut best = current;
    let mut temperature = (0.15 * max_walk).max(15.0);

    for _ in 0..ANNEALING_STEPS {
        if temperature < MIN_TEMPERATURE {
            break;
        }
        let proposal = rng.gen_range(0..evaluations.len());
        let delta = evaluations[proposal].score - evaluations[current].score;
        let accept = if delta < 0.0 {
            true
        } else if delta.is_finite() {
            rng.gen_range(0.0..1.0) < (-delta / temperature).exp()
        } else {
            false
        };

        if accept {
            current = proposal;
            if evaluations[current].score < evaluations[best].score {
                best = current;
            }
        }
        temperature *= COOLING;
    }

    Some(best)
}

/// Junction near a dead-end site where the whole group can still walk
fn escape_dead_end(
    ctx: &PlacementContext<'_>,
    group: &[usize],
    chosen: &Evaluation,
) -> Option<Evaluation> {
    if ctx.network.driveable_degree(chosen.drive_node) > 2 {
        return None;
    }
    let limit = JUNCTION_SEARCH_LIMIT.min(0.5 * ctx.max_walk());
    let junction = find_junction(ctx.network, chosen.drive_node, limit, JUNCTION_DEGREE)?;
    if junction == chosen.drive_node {
        return None;
    }

    let relocated = evaluate(ctx, group, junction);
    relocated.feasible().then(|| {
        trace!(
            "Moved dead-end site {:?} to junction {:?}",
            chosen.drive_node, junction
        );
        relocated
    })
}

fn into_candidate(
    ctx: &PlacementContext<'_>,
    group: &[usize],
    medoid: usize,
    chosen: Evaluation,
) -> StopCandidate {
    let mut cover: Vec<usize> = group
        .iter()
        .zip(&chosen.distances)
        .filter(|&(_, &d)| ctx.within_walk(d))
        .map(|(&member, _)| member)
        .collect();
    let feasible = cover.len() == group.len();
    if cover.is_empty() {
        cover.push(medoid);
    }

    let driveable = ctx
        .network
        .node(chosen.drive_node)
        .is_some_and(|node| node.driveable);
    let site = ctx
        .network
        .node_point(chosen.drive_node)
        .unwrap_or(ctx.students[medoid].geometry);

    StopCandidate {
        site,
        walk_node: chosen.walk_node,
        drive_node: chosen.drive_node,
        cover,
        feasible,
        access: if driveable {
            SiteAccess::Driveable
        } else {
            SiteAccess::WalkOnly
        },
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::{
        loading::PlacementParams,
        test_support::{NetworkFixture, line_network_with_students, two_component_network},
    };

    fn context<'a>(
        network: &'a crate::RoadNetwork,
        students: &'a [crate::Student],
        max_walk: f64,
    ) -> PlacementContext<'a> {
        let params = PlacementParams::with_max_walk(max_walk).resolve().unwrap();
        PlacementContext::new(network, students, params).unwrap()
    }

    #[test]
    fn picks_the_central_node_of_a_street() {
        let (network, students) = line_network_with_students(5, 20.0, &[0, 1, 2]);
        let ctx = context(&network, &students, 200.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let candidate = select_site(&ctx, &[0, 1, 2], &mut rng);
        assert_eq!(candidate.drive_node, ctx.walk_nodes[1]);
        assert_eq!(candidate.cover, vec![0, 1, 2]);
        assert!(candidate.feasible);
        assert_eq!(candidate.access, SiteAccess::Driveable);
    }

    #[test]
    fn medoid_prefers_members_reaching_everyone() {
        let (network, students) = line_network_with_students(5, 20.0, &[0, 4, 2]);
        let ctx = context(&network, &students, 200.0);
        assert_eq!(medoid(&ctx, &[0, 1, 2]), 2);
        assert_eq!(medoid(&ctx, &[1]), 1);
    }

    #[test]
    fn medoid_skips_members_with_anyone_beyond_walk() {
        // homes at 0, 90, 100, 110, 120, 130 and 190 m; the 110 m home has
        // the lowest total but is 110 m from the first one
        let (network, students) =
            line_network_with_students(20, 10.0, &[0, 9, 10, 11, 12, 13, 19]);
        let ctx = context(&network, &students, 100.0);
        let group: Vec<usize> = (0..7).collect();
        assert_eq!(medoid(&ctx, &group), 2);
    }

    #[test]
    fn dead_end_site_moves_to_junction() {
        // dead end d, 80 m from a three-way junction j
        let mut fx = NetworkFixture::new();
        let d = fx.node(0.0, 0.0);
        let j = fx.node(80.0, 0.0);
        let n = fx.node(80.0, 50.0);
        let s = fx.node(80.0, -50.0);
        fx.road(d, j, 80.0);
        fx.road(j, n, 50.0);
        fx.road(j, s, 50.0);
        let network = fx.build();
        let students = vec![crate::Student::new(1, network.node_point(d).unwrap())];
        let ctx = context(&network, &students, 200.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let candidate = select_site(&ctx, &[0], &mut rng);
        assert_eq!(candidate.drive_node, j);
        assert_eq!(candidate.cover, vec![0]);
        assert!(candidate.feasible);
    }

    #[test]
    fn dead_end_stays_when_junction_is_out_of_reach() {
        let mut fx = NetworkFixture::new();
        let d = fx.node(0.0, 0.0);
        let j = fx.node(150.0, 0.0);
        let n = fx.node(150.0, 50.0);
        let s = fx.node(150.0, -50.0);
        fx.road(d, j, 150.0);
        fx.road(j, n, 50.0);
        fx.road(j, s, 50.0);
        let network = fx.build();
        let students = vec![crate::Student::new(1, network.node_point(d).unwrap())];
        let ctx = context(&network, &students, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(select_site(&ctx, &[0], &mut rng).drive_node, d);
    }

    #[test]
    fn disconnected_group_degrades_to_partial_cover() {
        let (network, students) = two_component_network();
        let ctx = context(&network, &students, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let candidate = select_site(&ctx, &[0, 1], &mut rng);
        assert!(!candidate.feasible);
        assert_eq!(candidate.cover.len(), 1);
    }

    #[test]
    fn annealing_without_feasible_candidates_gives_up() {
        let infeasible = Evaluation {
            drive_node: NodeIndex::new(0),
            walk_node: NodeIndex::new(0),
            distances: vec![f64::INFINITY],
            score: f64::INFINITY,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(anneal(&[infeasible.clone(), infeasible], 100.0, &mut rng), None);
    }
}
