use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Meters};

/// Named options of the stop placement pipeline.
///
/// Optional radii default to `max_walk_dist`; `cap = None` means unbounded
/// and `target_stop_count = 0` leaves the stop count unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Longest walk a student may be asked to make, in meters
    pub max_walk_dist: Meters,
    /// DBSCAN neighborhood radius
    pub seed_radius: Option<Meters>,
    /// Radius of the global nearest-stop reassignment
    pub assign_radius: Option<Meters>,
    /// Maximum students per stop
    pub cap: Option<usize>,
    /// DBSCAN minimum neighborhood size, the point itself included
    pub min_pts: usize,
    /// Drive distance under which two stops are merged
    pub merge_dist: Option<Meters>,
    pub target_stop_count: usize,
    /// Seed for annealing; `None` draws one from OS entropy
    pub seed: Option<u64>,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            max_walk_dist: 400.0,
            seed_radius: None,
            assign_radius: None,
            cap: None,
            min_pts: 1,
            merge_dist: None,
            target_stop_count: 0,
            seed: None,
        }
    }
}

impl PlacementParams {
    pub fn with_max_walk(max_walk_dist: Meters) -> Self {
        Self {
            max_walk_dist,
            ..Self::default()
        }
    }

    /// Reads parameters from a JSON file; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open file '{}': {}", path.display(), e),
            )
        })?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Validates the options and applies defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] for a non-positive walk distance,
    /// negative radii or a zero capacity.
    pub fn resolve(&self) -> Result<ResolvedParams, Error> {
        let max_walk = self.max_walk_dist;
        if !max_walk.is_finite() || max_walk <= 0.0 {
            return Err(Error::InvalidParams(format!(
                "max_walk_dist must be a positive number of meters, got {max_walk}"
            )));
        }

        let radius = |name: &str, value: Option<Meters>| match value {
            Some(r) if !r.is_finite() || r < 0.0 => Err(Error::InvalidParams(format!(
                "{name} must be a non-negative number of meters, got {r}"
            ))),
            Some(r) if r > 0.0 => Ok(r),
            _ => Ok(max_walk),
        };
        let seed_radius = radius("seed_radius", self.seed_radius)?;
        let assign_radius = radius("assign_radius", self.assign_radius)?;

        let merge_dist = match self.merge_dist {
            Some(d) if !d.is_finite() || d < 0.0 => {
                return Err(Error::InvalidParams(format!(
                    "merge_dist must be a non-negative number of meters, got {d}"
                )));
            }
            Some(d) => d,
            None => (0.35 * max_walk).min(75.0),
        };

        let cap = match self.cap {
            Some(0) => {
                return Err(Error::InvalidParams(
                    "cap must allow at least one student per stop".to_string(),
                ));
            }
            Some(cap) => cap,
            None => usize::MAX,
        };

        Ok(ResolvedParams {
            max_walk,
            seed_radius,
            assign_radius,
            cap,
            min_pts: self.min_pts.max(1),
            merge_dist,
            target_stop_count: self.target_stop_count,
            seed: self.seed,
        })
    }
}

/// Validated parameters with every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    pub max_walk: Meters,
    pub seed_radius: Meters,
    pub assign_radius: Meters,
    /// `usize::MAX` when unbounded
    pub cap: usize,
    pub min_pts: usize,
    pub merge_dist: Meters,
    pub target_stop_count: usize,
    pub seed: Option<u64>,
}

impl ResolvedParams {
    /// How far from a student the drive graph is searched for candidate sites
    pub fn move_radius(&self) -> Meters {
        self.max_walk.max(60.0)
    }

    pub fn target(&self) -> Option<usize> {
        (self.target_stop_count > 0).then_some(self.target_stop_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_max_walk() {
        let resolved = PlacementParams::with_max_walk(200.0).resolve().unwrap();
        assert_eq!(resolved.seed_radius, 200.0);
        assert_eq!(resolved.assign_radius, 200.0);
        assert_eq!(resolved.cap, usize::MAX);
        assert_eq!(resolved.min_pts, 1);
        assert!((resolved.merge_dist - 70.0).abs() < 1e-9);
        assert_eq!(resolved.target(), None);
        assert_eq!(resolved.move_radius(), 200.0);
    }

    #[test]
    fn merge_dist_default_is_capped() {
        let resolved = PlacementParams::with_max_walk(1000.0).resolve().unwrap();
        assert_eq!(resolved.merge_dist, 75.0);
        assert_eq!(resolved.move_radius(), 1000.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(PlacementParams::with_max_walk(0.0).resolve().is_err());
        assert!(PlacementParams::with_max_walk(f64::NAN).resolve().is_err());
        let params = PlacementParams {
            cap: Some(0),
            ..PlacementParams::default()
        };
        assert!(matches!(params.resolve(), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let params: PlacementParams =
            serde_json::from_str(r#"{"max_walk_dist": 250.0, "cap": 12, "min_pts": 2}"#).unwrap();
        assert_eq!(params.cap, Some(12));
        assert_eq!(params.target_stop_count, 0);
        assert_eq!(params.seed, None);
        assert_eq!(params.resolve().unwrap().seed_radius, 250.0);
    }
}
