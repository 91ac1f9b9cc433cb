//! Stop placement pipeline.
//!
//! Cluster, split to capacity, select a site per group, refine coverage,
//! consolidate toward the target count, merge near-duplicate and dead-end
//! stops, then rebind students under capacity.

mod cluster;
mod consolidate;
mod context;
mod finalize;
mod merge;
mod refine;
mod site;
mod split;
mod stops;

use std::time::Instant;

use fixedbitset::FixedBitSet;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    Error, StopId,
    loading::PlacementParams,
    model::{BusStop, RoadNetwork, SiteAccess, Student},
};
use context::PlacementContext;
use stops::PlacedStop;

/// Stops produced by one placement run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementOutcome {
    pub stops: Vec<BusStop>,
    /// Stops holding more students than the capacity allows, because some
    /// students had no other stop within reach
    pub overflowed: Vec<StopId>,
}

/// One configured placement run over a fixed network and roster
pub struct StopPlacer<'a> {
    ctx: PlacementContext<'a>,
    rng: ChaCha8Rng,
}

impl<'a> StopPlacer<'a> {
    /// Validates the parameters and snaps every student to the network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] for invalid parameters and
    /// [`Error::EmptyNetwork`] when there are students but no road nodes.
    pub fn new(
        network: &'a RoadNetwork,
        students: &'a [Student],
        params: &PlacementParams,
    ) -> Result<Self, Error> {
        let resolved = params.resolve()?;
        if !students.is_empty() && network.is_empty() {
            return Err(Error::EmptyNetwork);
        }

        let seed = params.seed.unwrap_or_else(rand::random);
        debug!("Placement RNG seed: {seed}");

        Ok(Self {
            ctx: PlacementContext::new(network, students, resolved)?,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn run(mut self) -> PlacementOutcome {
        let ctx = &self.ctx;
        let rng = &mut self.rng;
        if ctx.student_count() == 0 {
            return PlacementOutcome::default();
        }

        let start = Instant::now();
        info!(
            "Placing stops for {} students (max walk {:.0} m)",
            ctx.student_count(),
            ctx.max_walk()
        );

        let groups = cluster::density_clusters(ctx).into_groups();
        let groups: Vec<Vec<usize>> = groups
            .into_iter()
            .flat_map(|group| split::split_group(ctx, group))
            .collect();
        debug!("{} groups after capacity split", groups.len());

        let mut stops = initial_stops(ctx, rng, &groups);
        debug!("{} stops emitted", stops.len());

        refine::refine(ctx, rng, &mut stops);
        debug!("{} stops after refinement", stops.len());

        consolidate::consolidate(ctx, rng, &mut stops);
        merge::merge_close(ctx, &mut stops);
        merge::merge_culdesac(ctx, &mut stops);
        debug!("{} stops after merging", stops.len());

        let overflowed = finalize::final_assignment(ctx, rng, &mut stops);

        let stops: Vec<BusStop> = stops
            .into_iter()
            .enumerate()
            .map(|(id, stop)| stop.into_bus_stop(id, ctx))
            .collect();
        let walk_only = stops
            .iter()
            .filter(|stop| stop.access == SiteAccess::WalkOnly)
            .count();
        if walk_only > 0 {
            warn!("{walk_only} stops have no driveable node within reach");
        }
        info!("Placed {} stops in {:.2?}", stops.len(), start.elapsed());

        PlacementOutcome { stops, overflowed }
    }
}

/// One stop per group, covering the members its site reaches, then a
/// stop of its own for every student no group site covered.
fn initial_stops(
    ctx: &PlacementContext<'_>,
    rng: &mut ChaCha8Rng,
    groups: &[Vec<usize>],
) -> Vec<PlacedStop> {
    let mut covered = FixedBitSet::with_capacity(ctx.student_count());
    let mut stops = Vec::with_capacity(groups.len());

    for group in groups.iter().filter(|g| !g.is_empty()) {
        let candidate = site::select_site(ctx, group, rng);
        let cover = candidate.cover.clone();
        for &member in &cover {
            covered.insert(member);
        }
        stops.push(PlacedStop::from_candidate(candidate, cover));
    }

    let uncovered: Vec<usize> = covered.zeroes().collect();
    if !uncovered.is_empty() {
        debug!("{} students left outside every group site", uncovered.len());
    }
    stops.extend(
        uncovered
            .into_iter()
            .map(|student| refine::singleton_stop(ctx, rng, student)),
    );
    stops
}

/// Places bus stops for `students` on `network`.
///
/// Every student ends up on exactly one returned stop. Stops are numbered
/// densely from zero; stops left without students are kept.
///
/// # Errors
///
/// Returns an error for invalid parameters, or for an empty network when
/// there is at least one student.
pub fn place_stops(
    students: &[Student],
    network: &RoadNetwork,
    params: &PlacementParams,
) -> Result<Vec<BusStop>, Error> {
    Ok(StopPlacer::new(network, students, params)?.run().stops)
}
