use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::network::PyRoadNetwork;
use stopplan_core::prelude::*;

/// A placed bus stop and the students boarding there
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "BusStop", frozen)]
#[derive(Clone)]
pub struct PyBusStop {
    pub inner: BusStop,
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyBusStop {
    #[getter]
    fn id(&self) -> usize {
        self.inner.id
    }

    /// Get the coordinates of this stop as (lat, lon)
    #[getter]
    fn coordinates(&self) -> (f64, f64) {
        (self.inner.site.y(), self.inner.site.x())
    }

    #[getter]
    fn students(&self) -> Vec<StudentId> {
        self.inner.students.clone()
    }

    /// One of "driveable", "walk_only" or "unsnapped"
    #[getter]
    fn access(&self) -> &'static str {
        match self.inner.access {
            SiteAccess::Driveable => "driveable",
            SiteAccess::WalkOnly => "walk_only",
            SiteAccess::Unsnapped => "unsnapped",
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "BusStop(id={}, lat={}, lon={}, students={})",
            self.inner.id,
            self.inner.site.y(),
            self.inner.site.x(),
            self.inner.students.len()
        )
    }
}

/// Place bus stops for a set of students
///
/// Clusters students by walking distance, picks a road node for every
/// group and refines the result so that every student boards at exactly
/// one stop.
///
/// Parameters
/// ----------
/// network : RoadNetwork
///     Road network to place stops on
/// students : list[tuple[int, float, float]]
///     Students as (id, lat, lon)
/// max_walk_dist : float, default=400.0
///     Longest walk to a stop, in meters
/// seed_radius : float, optional
///     Clustering radius in meters, defaults to max_walk_dist
/// assign_radius : float, optional
///     Nearest-stop reassignment radius in meters, defaults to max_walk_dist
/// cap : int, optional
///     Maximum students per stop, unbounded by default
/// min_pts : int, default=1
///     Minimum neighborhood size for a dense cluster
/// merge_dist : float, optional
///     Stops closer than this by road are merged
/// target_stop_count : int, default=0
///     Desired number of stops, 0 leaves it unconstrained
/// seed : int, optional
///     Random seed for reproducible results
///
/// Returns
/// -------
/// list[BusStop]
///
/// Raises
/// ------
/// ValueError
///     If the parameters are invalid or the network is empty
///
/// Notes
/// -----
/// The function releases the GIL during processing to allow other Python
/// threads to continue execution.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction(name = "place_stops")]
#[pyo3(signature = (
    network,
    students,
    max_walk_dist = 400.0,
    seed_radius = None,
    assign_radius = None,
    cap = None,
    min_pts = 1,
    merge_dist = None,
    target_stop_count = 0,
    seed = None
))]
#[allow(clippy::too_many_arguments)]
pub fn py_place_stops(
    py: Python<'_>,
    network: &PyRoadNetwork,
    students: Vec<(StudentId, f64, f64)>,
    max_walk_dist: f64,
    seed_radius: Option<f64>,
    assign_radius: Option<f64>,
    cap: Option<usize>,
    min_pts: usize,
    merge_dist: Option<f64>,
    target_stop_count: usize,
    seed: Option<u64>,
) -> PyResult<Vec<PyBusStop>> {
    let params = PlacementParams {
        max_walk_dist,
        seed_radius,
        assign_radius,
        cap,
        min_pts,
        merge_dist,
        target_stop_count,
        seed,
    };
    let students: Vec<Student> = students
        .into_iter()
        .map(|(id, lat, lon)| Student::from_lat_lon(id, lat, lon))
        .collect();

    let stops = py
        .detach(|| place_stops(&students, &network.network, &params))
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Stop placement failed: {e}"
            ))
        })?;

    Ok(stops.into_iter().map(|inner| PyBusStop { inner }).collect())
}

/// Convert bus stops to a GeoJSON FeatureCollection string
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction(name = "stops_to_geojson")]
pub fn py_stops_to_geojson(stops: Vec<PyRef<'_, PyBusStop>>) -> PyResult<String> {
    let stops: Vec<BusStop> = stops.iter().map(|stop| stop.inner.clone()).collect();
    stops_to_geojson_string(&stops).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
            "GeoJSON export failed: {e}"
        ))
    })
}
