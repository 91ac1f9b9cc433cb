use geo::Point;
use hashbrown::HashMap;
use log::debug;
use petgraph::graph::NodeIndex;

use super::context::PlacementContext;
use crate::model::{BusStop, SiteAccess, StopCandidate};

/// A stop owned by the pipeline. Members are student indices; the stop id
/// is its position in the working list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedStop {
    pub site: Point<f64>,
    pub walk_node: NodeIndex,
    pub drive_node: NodeIndex,
    pub access: SiteAccess,
    pub members: Vec<usize>,
}

impl PlacedStop {
    pub fn from_candidate(candidate: StopCandidate, members: Vec<usize>) -> Self {
        Self {
            site: candidate.site,
            walk_node: candidate.walk_node,
            drive_node: candidate.drive_node,
            access: candidate.access,
            members,
        }
    }

    /// Last-resort stop sited at the student's own position
    pub fn unsnapped(ctx: &PlacementContext<'_>, student: usize) -> Self {
        Self {
            site: ctx.students[student].geometry,
            walk_node: ctx.walk_nodes[student],
            drive_node: ctx.drive_nodes[student],
            access: SiteAccess::Unsnapped,
            members: vec![student],
        }
    }

    /// Moves the stop to a new site, keeping its members.
    pub fn relocate(&mut self, candidate: StopCandidate) {
        self.site = candidate.site;
        self.walk_node = candidate.walk_node;
        self.drive_node = candidate.drive_node;
        self.access = candidate.access;
    }

    pub fn into_bus_stop(self, id: usize, ctx: &PlacementContext<'_>) -> BusStop {
        BusStop {
            id,
            site: self.site,
            students: self.members.iter().map(|&m| ctx.students[m].id).collect(),
            access: self.access,
        }
    }
}

/// Merges stops sharing a drive node into the first of them.
/// Returns the number of stops removed.
pub(crate) fn dedupe_by_site(stops: &mut Vec<PlacedStop>) -> usize {
    let before = stops.len();
    let mut first_at: HashMap<NodeIndex, usize> = HashMap::with_capacity(before);
    let mut kept: Vec<PlacedStop> = Vec::with_capacity(before);

    for stop in stops.drain(..) {
        match first_at.get(&stop.drive_node) {
            Some(&idx) => kept[idx].members.extend(stop.members),
            None => {
                first_at.insert(stop.drive_node, kept.len());
                kept.push(stop);
            }
        }
    }

    *stops = kept;
    let removed = before - stops.len();
    if removed > 0 {
        debug!("Deduplicated {removed} stops sharing a site");
    }
    removed
}

/// Moves every member of `absorbed` into `keep` and removes `absorbed`.
pub(crate) fn merge_into(stops: &mut Vec<PlacedStop>, keep: usize, absorbed: usize) {
    debug_assert_ne!(keep, absorbed);
    let moved = std::mem::take(&mut stops[absorbed].members);
    stops[keep].members.extend(moved);
    stops.remove(absorbed);
}
