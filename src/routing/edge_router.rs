use tracing::{debug, debug_span, warn};

use crate::error::{AnchorEnd, RoutingError};
use crate::geometry::Point;
use crate::graph::NodeGeometry;
use crate::host::EdgeAnchors;
use crate::obstacles::{build_obstacles, ObstacleSet};

use super::candidates::{CandidateSource, LatticeCandidates};
use super::selector::select_best;
use super::trace::RouteTrace;
use super::types::{Candidate, CandidateKind, Path, RoutedPath, RoutingConfig};

/// Routes one edge at a time. Holds only immutable configuration, so a single
/// router can be shared across threads and calls.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRouter {
    config: RoutingConfig,
    generator: LatticeCandidates,
}

impl EdgeRouter {
    pub fn new(config: RoutingConfig) -> Self {
        let generator = LatticeCandidates::from_config(&config);
        EdgeRouter { config, generator }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Route with the lattice generator. `Err(MissingAnchor)` means the caller
    /// keeps the edge's current path.
    pub fn route(
        &self,
        start: Option<Point>,
        end: Option<Point>,
        obstacles: &ObstacleSet,
    ) -> Result<RoutedPath, RoutingError> {
        if self.config.trace() {
            let (routed, trace) = self.route_traced(start, end, obstacles)?;
            debug!(trace = %trace.to_json(), "routing trace");
            return Ok(routed);
        }
        self.route_with(&self.generator, start, end, obstacles)
    }

    /// Route with any candidate source in place of the lattice.
    pub fn route_with<S: CandidateSource + ?Sized>(
        &self,
        source: &S,
        start: Option<Point>,
        end: Option<Point>,
        obstacles: &ObstacleSet,
    ) -> Result<RoutedPath, RoutingError> {
        self.route_observed(source, start, end, obstacles, |_, _, _| {})
    }

    pub fn route_traced(
        &self,
        start: Option<Point>,
        end: Option<Point>,
        obstacles: &ObstacleSet,
    ) -> Result<(RoutedPath, RouteTrace), RoutingError> {
        let (start, end) = resolve_anchors(start, end)?;
        let mut trace = RouteTrace::new(start, end, obstacles.rects());
        let routed = self.route_observed(
            &self.generator,
            Some(start),
            Some(end),
            obstacles,
            |candidate, obstructions, improved| trace.record(candidate, obstructions, improved),
        )?;
        trace.result = Some(routed.clone());
        Ok((routed, trace))
    }

    /// Builds the obstacle set from the host's nodes, leaving out the edge's
    /// own endpoints, and routes between the anchors. Nodes without usable
    /// bounds are logged and left out.
    pub fn route_nodes(&self, nodes: &[NodeGeometry], anchors: &EdgeAnchors) -> Result<RoutedPath, RoutingError> {
        let (routed, skipped) = self.route_nodes_reporting(nodes, anchors);
        for error in &skipped {
            warn!(%error, "obstacle left out");
        }
        routed
    }

    /// Like `route_nodes`, but hands the nodes left out of the obstacle set
    /// back to the caller instead of logging them.
    pub(crate) fn route_nodes_reporting(
        &self,
        nodes: &[NodeGeometry],
        anchors: &EdgeAnchors,
    ) -> (Result<RoutedPath, RoutingError>, Vec<RoutingError>) {
        let build = build_obstacles(nodes, &anchors.source, &anchors.target, self.config.padding());
        let routed = self.route(anchors.start, anchors.end, &build.obstacles);
        (routed, build.skipped)
    }

    fn route_observed<S, F>(
        &self,
        source: &S,
        start: Option<Point>,
        end: Option<Point>,
        obstacles: &ObstacleSet,
        observe: F,
    ) -> Result<RoutedPath, RoutingError>
    where
        S: CandidateSource + ?Sized,
        F: FnMut(&Candidate, usize, bool),
    {
        let (start, end) = resolve_anchors(start, end)?;
        let span = debug_span!(
            "route",
            start.x = start.x,
            start.y = start.y,
            end.x = end.x,
            end.y = end.y,
            obstacles = obstacles.len()
        );
        let _enter = span.enter();

        if obstacles.is_empty() {
            return Ok(RoutedPath {
                path: Path::collapse_duplicates(vec![start, end]),
                kind: CandidateKind::Direct,
                obstructions: 0,
                candidates_evaluated: 0,
            });
        }

        let selection = select_best(source.candidates(start, end), obstacles, observe);
        let routed = selection.into_routed(start, end, obstacles);
        if routed.is_clear() {
            debug!(
                kind = ?routed.kind,
                evaluated = routed.candidates_evaluated,
                "found clear path"
            );
        } else {
            debug!(
                kind = ?routed.kind,
                obstructions = routed.obstructions,
                evaluated = routed.candidates_evaluated,
                "no clear path; using best effort"
            );
        }
        Ok(routed)
    }
}

impl Default for EdgeRouter {
    fn default() -> Self {
        EdgeRouter::new(RoutingConfig::default())
    }
}

/// Routes with the default configuration.
pub fn route(start: Option<Point>, end: Option<Point>, obstacles: &ObstacleSet) -> Result<RoutedPath, RoutingError> {
    EdgeRouter::default().route(start, end, obstacles)
}

fn resolve_anchors(start: Option<Point>, end: Option<Point>) -> Result<(Point, Point), RoutingError> {
    let start = resolve_anchor(start, AnchorEnd::Start)?;
    let end = resolve_anchor(end, AnchorEnd::End)?;
    Ok((start, end))
}

/// Non-finite coordinates count as unavailable.
fn resolve_anchor(anchor: Option<Point>, end: AnchorEnd) -> Result<Point, RoutingError> {
    match anchor {
        Some(point) if point.is_finite() => Ok(point),
        _ => Err(RoutingError::MissingAnchor { end }),
    }
}
