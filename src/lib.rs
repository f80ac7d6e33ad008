//! Obstacle-avoiding edge routing for diagram editors.
//!
//! An edge is routed between two anchor points as a short orthogonal-ish
//! polyline that avoids the padded bounding boxes of every other node. The
//! router tries a fixed lattice of single- and double-bend candidates and
//! keeps the one crossing the fewest obstacles.

pub mod error;
pub mod geometry;
pub mod graph;
pub mod host;
pub mod lib_tracing;
pub mod obstacles;
pub mod routing;

#[cfg(feature = "python")]
mod python;

pub use error::{AnchorEnd, RoutingError};
pub use geometry::{BoundingBox, Point, Rect};
pub use graph::{Diagram, EdgeId, NodeBounds, NodeGeometry, NodeId};
pub use host::{DiagramHost, EdgeAnchors, RerouteReport, RoutingTrigger};
pub use lib_tracing::LibTracer;
pub use obstacles::{build_obstacles, ObstacleBuild, ObstacleSet};
pub use routing::{
    route, Candidate, CandidateKind, CandidateSource, EdgeRouter, LatticeCandidates, Path, RouteTrace, RoutedPath,
    RoutingConfig,
};
