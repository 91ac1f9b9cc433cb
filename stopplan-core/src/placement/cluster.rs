//! Density clustering of students over walk-graph distance (DBSCAN)

use std::collections::VecDeque;

use log::debug;
use rayon::prelude::*;

use super::context::PlacementContext;
use crate::{Meters, WALK_EPSILON, model::TravelMode};

/// Memoized walk-graph neighborhoods of every student for one radius.
/// Neighbors exclude the student itself and are sorted nearest first.
pub(crate) struct NeighborCache {
    radius: Meters,
    entries: Vec<Option<Vec<(usize, Meters)>>>,
}

impl NeighborCache {
    pub fn new(ctx: &PlacementContext<'_>, radius: Meters) -> Self {
        Self {
            radius,
            entries: vec![None; ctx.student_count()],
        }
    }

    /// Cache with every neighborhood computed up front, in parallel
    pub fn filled(ctx: &PlacementContext<'_>, radius: Meters) -> Self {
        let entries = (0..ctx.student_count())
            .into_par_iter()
            .map(|i| Some(region_query(ctx, i, radius)))
            .collect();
        Self { radius, entries }
    }

    pub fn neighbors(&mut self, ctx: &PlacementContext<'_>, i: usize) -> &[(usize, Meters)] {
        let radius = self.radius;
        self.entries[i].get_or_insert_with(|| region_query(ctx, i, radius))
    }
}

/// Students whose walk node lies within `radius` of student `i`'s walk node
fn region_query(ctx: &PlacementContext<'_>, i: usize, radius: Meters) -> Vec<(usize, Meters)> {
    let reached = ctx
        .network
        .shortest_paths(ctx.walk_nodes[i], TravelMode::Walk, Some(radius));

    let mut neighbors: Vec<(usize, Meters)> = ctx
        .walk_nodes
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .filter_map(|(j, node)| {
            reached
                .get(node)
                .filter(|&&d| d <= radius + WALK_EPSILON)
                .map(|&d| (j, d))
        })
        .collect();
    neighbors.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    neighbors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Unvisited,
    Noise,
    Cluster(usize),
}

/// Result of density clustering, as student indices
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Clustering {
    pub clusters: Vec<Vec<usize>>,
    pub noise: Vec<usize>,
}

impl Clustering {
    /// Clusters followed by every noise point as a group of its own
    pub fn into_groups(self) -> Vec<Vec<usize>> {
        let mut groups = self.clusters;
        groups.extend(self.noise.into_iter().map(|i| vec![i]));
        groups
    }
}

/// Groups students with DBSCAN over walk distance, using the seed radius
/// and `min_pts` from the context parameters.
pub(crate) fn density_clusters(ctx: &PlacementContext<'_>) -> Clustering {
    let n = ctx.student_count();
    let min_pts = ctx.params.min_pts;
    let mut cache = NeighborCache::new(ctx, ctx.params.seed_radius);
    let mut labels = vec![Label::Unvisited; n];
    let mut cluster_count = 0;

    for i in 0..n {
        if labels[i] != Label::Unvisited {
            continue;
        }
        let seeds: Vec<usize> = cache.neighbors(ctx, i).iter().map(|&(j, _)| j).collect();
        if seeds.len() + 1 < min_pts {
            labels[i] = Label::Noise;
            continue;
        }

        let cluster = cluster_count;
        cluster_count += 1;
        labels[i] = Label::Cluster(cluster);

        let mut queue: VecDeque<usize> = seeds.into();
        while let Some(j) = queue.pop_front() {
            match labels[j] {
                // border point: joins the cluster but is not expanded
                Label::Noise => {
                    labels[j] = Label::Cluster(cluster);
                    continue;
                }
                Label::Cluster(_) => continue,
                Label::Unvisited => labels[j] = Label::Cluster(cluster),
            }

            let neighbors = cache.neighbors(ctx, j);
            if neighbors.len() + 1 >= min_pts {
                queue.extend(
                    neighbors
                        .iter()
                        .map(|&(k, _)| k)
                        .filter(|&k| matches!(labels[k], Label::Unvisited | Label::Noise)),
                );
            }
        }
    }

    let mut clustering = Clustering {
        clusters: vec![Vec::new(); cluster_count],
        noise: Vec::new(),
    };
    for (i, label) in labels.into_iter().enumerate() {
        match label {
            Label::Cluster(c) => clustering.clusters[c].push(i),
            _ => clustering.noise.push(i),
        }
    }

    debug!(
        "DBSCAN found {} clusters and {} noise points among {n} students",
        clustering.clusters.len(),
        clustering.noise.len()
    );
    clustering
}
