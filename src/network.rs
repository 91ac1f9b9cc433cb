use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

use stopplan_core::prelude::*;

/// RoadNetwork
///
/// Street network with overlaid walk and drive subgraphs, used to snap
/// students and candidate stop sites and to measure walking distances.
///
/// Example:
///
/// .. code-block:: python
///
///     with open("area.json") as f:
///         network = RoadNetwork.from_overpass_json(f.read())
///     stops = place_stops(network, [(1, 55.75, 37.61)], max_walk_dist=300.0)
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "RoadNetwork", frozen)]
pub struct PyRoadNetwork {
    pub(crate) network: RoadNetwork,
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyRoadNetwork {
    /// Build a road network from an Overpass API JSON export
    ///
    /// Parameters
    /// ----------
    /// text : str
    ///     Output of an Overpass query for highway ways with their nodes
    ///     (``out body;`` after recursing down with ``>;``)
    ///
    /// Raises
    /// ------
    /// ValueError
    ///     If the document is not valid JSON or references missing nodes
    #[staticmethod]
    pub fn from_overpass_json(py: Python<'_>, text: &str) -> PyResult<Self> {
        let network = py
            .detach(|| network_from_overpass_json(text))
            .map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                    "Failed to load road network: {e}"
                ))
            })?;
        Ok(PyRoadNetwork { network })
    }

    pub fn node_count(&self) -> usize {
        self.network.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.network.edge_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "RoadNetwork with {} nodes and {} edges",
            self.network.node_count(),
            self.network.edge_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
