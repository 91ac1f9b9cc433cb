use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::define_stub_info_gatherer;

use network::PyRoadNetwork;
use stops::{PyBusStop, py_place_stops, py_stops_to_geojson};

pub mod network;
pub mod stops;

/// A Python module implemented in Rust.
#[pymodule]
fn stopplan(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyRoadNetwork>()?;
    m.add_class::<PyBusStop>()?;

    m.add_function(wrap_pyfunction!(py_place_stops, m)?)?;
    m.add_function(wrap_pyfunction!(py_stops_to_geojson, m)?)?;
    Ok(())
}

#[cfg(feature = "stubgen")]
define_stub_info_gatherer!(stub_info);
