use std::path::PathBuf;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;
use tracing::level_filters::LevelFilter;

use crate::error::RoutingError;
use crate::geometry::{Point, Rect};
use crate::graph::{NodeBounds, NodeGeometry, NodeId};
use crate::host::EdgeAnchors;
use crate::lib_tracing::LibTracer;
use crate::obstacles::ObstacleSet;
use crate::routing::{EdgeRouter, RoutedPath, RoutingConfig, DEFAULT_PADDING};

type PyPointTuple = (f64, f64);
/// `(min_x, min_y, max_x, max_y)`
type PyRectTuple = (f64, f64, f64, f64);
/// `(center_x, center_y, width, height)`
type PyBoundsTuple = (f64, f64, f64, f64);

impl From<RoutingError> for PyErr {
    fn from(error: RoutingError) -> Self {
        match error {
            RoutingError::InvalidConfig(_) | RoutingError::UnknownNode(_) | RoutingError::UnknownEdge(_) => {
                PyValueError::new_err(error.to_string())
            }
            _ => PyRuntimeError::new_err(error.to_string()),
        }
    }
}

#[pyclass(name = "RoutedPath")]
#[derive(Clone, Debug)]
pub struct PyRoutedPath {
    #[pyo3(get)]
    points: Vec<PyPointTuple>,
    #[pyo3(get)]
    obstructions: usize,
    #[pyo3(get)]
    kind: String,
    #[pyo3(get)]
    candidates_evaluated: usize,
}

#[pymethods]
impl PyRoutedPath {
    #[getter]
    fn is_clear(&self) -> bool {
        self.obstructions == 0
    }

    fn __len__(&self) -> usize {
        self.points.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "RoutedPath(kind={}, points={:?}, obstructions={})",
            self.kind, self.points, self.obstructions
        )
    }
}

impl From<RoutedPath> for PyRoutedPath {
    fn from(routed: RoutedPath) -> Self {
        PyRoutedPath {
            points: routed.points().iter().map(Point::as_tuple).collect(),
            obstructions: routed.obstructions,
            kind: format!("{:?}", routed.kind),
            candidates_evaluated: routed.candidates_evaluated,
        }
    }
}

/// `MissingAnchor` becomes `None` so the caller keeps its current path.
fn into_py_route(result: Result<RoutedPath, RoutingError>) -> PyResult<Option<PyRoutedPath>> {
    match result {
        Ok(routed) => Ok(Some(routed.into())),
        Err(error) if error.keeps_previous_path() => Ok(None),
        Err(error) => Err(error.into()),
    }
}

fn obstacle_set(obstacles: Vec<PyRectTuple>) -> ObstacleSet {
    obstacles
        .into_iter()
        .map(|(min_x, min_y, max_x, max_y)| Rect::from_corners(Point::new(min_x, min_y), Point::new(max_x, max_y)))
        .collect::<Vec<_>>()
        .into()
}

#[pyclass(name = "EdgeRouter")]
pub struct PyEdgeRouter {
    router: EdgeRouter,
}

#[pymethods]
impl PyEdgeRouter {
    #[new]
    #[pyo3(signature = (padding=DEFAULT_PADDING, offsets=None, double_bend=true))]
    fn new(padding: f64, offsets: Option<Vec<f64>>, double_bend: bool) -> PyResult<Self> {
        let mut config = RoutingConfig::default().with_padding(padding)?;
        if let Some(offsets) = offsets {
            config = config.with_offsets(offsets)?;
        }
        let config = config.with_double_bend(double_bend);
        Ok(PyEdgeRouter {
            router: EdgeRouter::new(config),
        })
    }

    /// Route between two anchors around already padded obstacle rectangles.
    fn route(
        &self,
        start: Option<PyPointTuple>,
        end: Option<PyPointTuple>,
        obstacles: Vec<PyRectTuple>,
    ) -> PyResult<Option<PyRoutedPath>> {
        let obstacles = obstacle_set(obstacles);
        into_py_route(self.router.route(start.map(Point::from), end.map(Point::from), &obstacles))
    }

    /// Route an edge using raw node geometry; the router pads the nodes and
    /// leaves out `source` and `target`.
    fn route_nodes(
        &self,
        source: String,
        target: String,
        start: Option<PyPointTuple>,
        end: Option<PyPointTuple>,
        nodes: Vec<(String, Option<PyBoundsTuple>)>,
    ) -> PyResult<Option<PyRoutedPath>> {
        let nodes: Vec<NodeGeometry> = nodes
            .into_iter()
            .map(|(id, bounds)| NodeGeometry {
                id: NodeId(id),
                bounds: bounds.map(|(x, y, width, height)| NodeBounds::new(Point::new(x, y), width, height)),
            })
            .collect();
        let anchors = EdgeAnchors {
            source: NodeId(source),
            target: NodeId(target),
            start: start.map(Point::from),
            end: end.map(Point::from),
        };
        into_py_route(self.router.route_nodes(&nodes, &anchors))
    }

    #[getter]
    fn padding(&self) -> f64 {
        self.router.config().padding()
    }
}

#[pyclass(name = "LibTracer")]
pub struct PyLibTracer {}

#[pymethods]
impl PyLibTracer {
    #[new]
    #[pyo3(signature = (level="info", debug_log=None))]
    fn new(level: &str, debug_log: Option<PathBuf>) -> PyResult<Self> {
        let level: LevelFilter = level
            .parse()
            .map_err(|_| PyValueError::new_err(format!("unknown log level {level:?}")))?;
        let mut tracer = LibTracer::new(level);
        if let Some(path) = debug_log {
            tracer = tracer.with_debug_log(&path)?;
        }
        tracer.install()?;
        Ok(PyLibTracer {})
    }
}

/// One-shot routing with the default configuration.
#[pyfunction]
fn route_edge(
    start: Option<PyPointTuple>,
    end: Option<PyPointTuple>,
    obstacles: Vec<PyRectTuple>,
) -> PyResult<Option<PyRoutedPath>> {
    let obstacles = obstacle_set(obstacles);
    into_py_route(crate::routing::route(start.map(Point::from), end.map(Point::from), &obstacles))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEdgeRouter>()?;
    m.add_class::<PyRoutedPath>()?;
    m.add_class::<PyLibTracer>()?;
    m.add_function(wrap_pyfunction!(route_edge, m)?)?;
    Ok(())
}
