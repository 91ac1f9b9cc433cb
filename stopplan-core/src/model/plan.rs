//! Planning state of a bus routing problem
//!
//! Phase outputs are explicit states instead of nullable containers. Only
//! stop placement is modeled here; bus assignment and route sequencing
//! consume the placed stops downstream.

use hashbrown::{HashMap, HashSet};
use log::info;

use super::{BusStop, RoadNetwork, Student};
use crate::{Error, StudentId, loading::PlacementParams, placement::StopPlacer};

/// Output of the stop placement phase
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StopPhase {
    #[default]
    Pending,
    Placed(Vec<BusStop>),
}

impl StopPhase {
    pub fn stops(&self) -> Option<&[BusStop]> {
        match self {
            StopPhase::Pending => None,
            StopPhase::Placed(stops) => Some(stops),
        }
    }
}

/// Students to serve and the stops placed for them so far
#[derive(Debug, Clone)]
pub struct BusRoutingProblem {
    pub students: Vec<Student>,
    pub stops: StopPhase,
}

impl BusRoutingProblem {
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            students,
            stops: StopPhase::Pending,
        }
    }

    /// Runs stop placement and moves the problem to [`StopPhase::Placed`].
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters, an empty network, or if the
    /// placed stops fail [`BusRoutingProblem::validate`].
    pub fn place_stops(
        &mut self,
        network: &RoadNetwork,
        params: &PlacementParams,
    ) -> Result<&[BusStop], Error> {
        let outcome = StopPlacer::new(network, &self.students, params)?.run();
        info!(
            "Placed {} stops for {} students",
            outcome.stops.len(),
            self.students.len()
        );
        self.stops = StopPhase::Placed(outcome.stops);
        self.validate()?;
        Ok(self.stops.stops().unwrap_or_default())
    }

    /// Checks the semantic constraints of the current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for an empty roster or duplicate ids
    /// and [`Error::CoverageViolation`] if placed stops don't partition the
    /// students.
    pub fn validate(&self) -> Result<(), Error> {
        if self.students.is_empty() {
            return Err(Error::InvalidData(
                "there must be at least one student".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.students.len());
        for student in &self.students {
            if !seen.insert(student.id) {
                return Err(Error::InvalidData(format!(
                    "duplicate student id {}",
                    student.id
                )));
            }
        }

        if let StopPhase::Placed(stops) = &self.stops {
            validate_coverage(&self.students, stops)?;
        }
        Ok(())
    }
}

/// Verifies that stop ids are unique and that every student appears on
/// exactly one stop.
///
/// # Errors
///
/// Returns [`Error::CoverageViolation`] describing the first problem found.
pub fn validate_coverage(students: &[Student], stops: &[BusStop]) -> Result<(), Error> {
    let mut stop_ids = HashSet::with_capacity(stops.len());
    for stop in stops {
        if !stop_ids.insert(stop.id) {
            return Err(Error::CoverageViolation(format!(
                "duplicate bus stop id {}",
                stop.id
            )));
        }
    }

    let mut frequency: HashMap<StudentId, usize> =
        students.iter().map(|s| (s.id, 0)).collect();
    for stop in stops {
        for id in &stop.students {
            let Some(count) = frequency.get_mut(id) else {
                return Err(Error::CoverageViolation(format!(
                    "bus stop {} refers to non-existing student {id}",
                    stop.id
                )));
            };
            *count += 1;
        }
    }

    if let Some((id, count)) = frequency.iter().find(|&(_, &count)| count != 1) {
        return Err(Error::CoverageViolation(format!(
            "student {id} assigned to {count} stops"
        )));
    }
    Ok(())
}
