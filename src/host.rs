//! Contract between the router and the diagram engine that owns nodes and
//! edges. The engine hands over geometry snapshots and receives finished
//! paths through `apply_path`; nothing else crosses the boundary.

use hashbrown::HashSet;
use tracing::{debug, info_span, warn};

use crate::error::RoutingError;
use crate::geometry::Point;
use crate::graph::{EdgeId, NodeGeometry, NodeId};
use crate::routing::{EdgeRouter, Path};

/// Anchor points of one edge together with the nodes it connects.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAnchors {
    pub source: NodeId,
    pub target: NodeId,
    pub start: Option<Point>,
    pub end: Option<Point>,
}

pub trait DiagramHost {
    /// Current geometry of every node.
    fn nodes(&self) -> Vec<NodeGeometry>;

    /// `None` when the edge is unknown to the host.
    fn anchors(&self, edge: &EdgeId) -> Option<EdgeAnchors>;

    /// Every edge currently in the diagram.
    fn edge_ids(&self) -> Vec<EdgeId>;

    /// Edges whose source or target is `node`.
    fn edges_touching(&self, node: &NodeId) -> Vec<EdgeId>;

    fn apply_path(&mut self, edge: &EdgeId, path: &Path);
}

/// Host events that require edges to be re-routed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutingTrigger {
    EdgeAdded(EdgeId),
    EdgeEndpointChanged(EdgeId),
    NodeMoveCompleted(NodeId),
    FullRender,
}

impl RoutingTrigger {
    pub fn affected_edges<H: DiagramHost + ?Sized>(&self, host: &H) -> Vec<EdgeId> {
        match self {
            RoutingTrigger::EdgeAdded(edge) | RoutingTrigger::EdgeEndpointChanged(edge) => vec![edge.clone()],
            RoutingTrigger::NodeMoveCompleted(node) => host.edges_touching(node),
            RoutingTrigger::FullRender => host.edge_ids(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RerouteReport {
    /// Edges that received a new path.
    pub routed: Vec<EdgeId>,
    /// Routed edges whose path still crosses an obstacle, with the count.
    pub best_effort: Vec<(EdgeId, usize)>,
    /// Edges left untouched, with the reason.
    pub skipped: Vec<(EdgeId, RoutingError)>,
    /// Nodes left out of at least one obstacle set for lack of bounds, each
    /// listed once. An edge's own endpoints are never obstacles, so they only
    /// show up here when some other routed edge needed them.
    pub missing_obstacles: Vec<NodeId>,
}

impl RerouteReport {
    pub fn is_clean(&self) -> bool {
        self.best_effort.is_empty() && self.skipped.is_empty()
    }
}

impl EdgeRouter {
    /// Re-routes every edge affected by `trigger` and writes the results back.
    /// Edges with missing anchors keep their current path.
    pub fn reroute<H: DiagramHost + ?Sized>(&self, host: &mut H, trigger: &RoutingTrigger) -> RerouteReport {
        let span = info_span!("reroute", trigger = ?trigger);
        let _enter = span.enter();

        let mut report = RerouteReport::default();
        let edges = trigger.affected_edges(host);
        if edges.is_empty() {
            return report;
        }

        let nodes = host.nodes();
        let mut reported: HashSet<NodeId> = HashSet::new();

        for edge in edges {
            let Some(anchors) = host.anchors(&edge) else {
                warn!(edge = %edge, "edge is unknown to the host");
                report.skipped.push((edge.clone(), RoutingError::UnknownEdge(edge)));
                continue;
            };
            let (routed, left_out) = self.route_nodes_reporting(&nodes, &anchors);
            for error in left_out {
                if let RoutingError::MissingObstacleData { node } = error {
                    if reported.insert(node.clone()) {
                        warn!(node = %node, "node has no usable bounding box; not treated as an obstacle");
                        report.missing_obstacles.push(node);
                    }
                }
            }
            match routed {
                Ok(routed) => {
                    host.apply_path(&edge, &routed.path);
                    if !routed.is_clear() {
                        report.best_effort.push((edge.clone(), routed.obstructions));
                    }
                    report.routed.push(edge);
                }
                Err(error) => {
                    debug!(edge = %edge, %error, "keeping previous path");
                    report.skipped.push((edge, error));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Diagram, NodeBounds};

    fn diagram() -> Diagram {
        let mut diagram = Diagram::new();
        diagram.add_node("a".into(), Some(NodeBounds::new(Point::new(-10.0, 0.0), 20.0, 20.0)));
        diagram.add_node("b".into(), Some(NodeBounds::new(Point::new(210.0, 0.0), 20.0, 20.0)));
        diagram.add_node("blocker".into(), Some(NodeBounds::new(Point::new(100.0, 0.0), 20.0, 20.0)));
        diagram.add_node("pending".into(), None);
        diagram.add_edge("ab".into(), &"a".into(), &"b".into()).unwrap();
        diagram
            .set_anchors(&"ab".into(), Some(Point::new(0.0, 0.0)), Some(Point::new(200.0, 0.0)))
            .unwrap();
        diagram
    }

    #[test]
    fn edge_added_routes_that_edge() {
        let mut diagram = diagram();
        let report = EdgeRouter::default().reroute(&mut diagram, &RoutingTrigger::EdgeAdded("ab".into()));
        assert_eq!(report.routed, vec![EdgeId::from("ab")]);
        assert!(report.is_clean());
        assert_eq!(report.missing_obstacles, vec![NodeId::from("pending")]);
        let path = diagram.path(&"ab".into()).unwrap();
        assert_eq!(path.start(), Some(Point::new(0.0, 0.0)));
        assert_eq!(path.end(), Some(Point::new(200.0, 0.0)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn missing_anchor_keeps_previous_path() {
        let mut diagram = diagram();
        let router = EdgeRouter::default();
        router.reroute(&mut diagram, &RoutingTrigger::FullRender);
        let before = diagram.path(&"ab".into()).cloned();

        diagram.set_anchors(&"ab".into(), None, Some(Point::new(200.0, 0.0))).unwrap();
        let report = router.reroute(&mut diagram, &RoutingTrigger::EdgeEndpointChanged("ab".into()));
        assert!(report.routed.is_empty());
        assert!(report.skipped[0].1.keeps_previous_path());
        assert_eq!(diagram.path(&"ab".into()).cloned(), before);
    }

    #[test]
    fn node_move_reroutes_incident_edges_only() {
        let mut diagram = diagram();
        diagram.add_edge("bb".into(), &"blocker".into(), &"b".into()).unwrap();
        diagram
            .set_anchors(&"bb".into(), Some(Point::new(110.0, 0.0)), Some(Point::new(200.0, 0.0)))
            .unwrap();
        let report = EdgeRouter::default().reroute(&mut diagram, &RoutingTrigger::NodeMoveCompleted("a".into()));
        assert_eq!(report.routed, vec![EdgeId::from("ab")]);
        assert!(diagram.path(&"bb".into()).is_none());
    }

    #[test]
    fn moving_the_source_reroutes_with_fresh_geometry() {
        let mut diagram = diagram();
        let router = EdgeRouter::default();
        router.reroute(&mut diagram, &RoutingTrigger::FullRender);
        assert_eq!(diagram.path(&"ab".into()).map(Path::len), Some(3));

        diagram
            .set_node_bounds(&"a".into(), Some(NodeBounds::new(Point::new(-10.0, 200.0), 20.0, 20.0)))
            .unwrap();
        diagram
            .set_anchors(&"ab".into(), Some(Point::new(0.0, 200.0)), Some(Point::new(200.0, 0.0)))
            .unwrap();
        let report = router.reroute(&mut diagram, &RoutingTrigger::NodeMoveCompleted("a".into()));

        assert_eq!(report.routed, vec![EdgeId::from("ab")]);
        let path = diagram.path(&"ab".into()).unwrap();
        assert_eq!(path.as_slice(), &[Point::new(0.0, 200.0), Point::new(200.0, 0.0)]);
    }

    #[test]
    fn moving_a_blocker_affects_only_edges_routed_afterwards() {
        let mut diagram = diagram();
        let router = EdgeRouter::default();
        router.reroute(&mut diagram, &RoutingTrigger::FullRender);
        let detour = diagram.path(&"ab".into()).cloned().unwrap();
        assert_eq!(detour.bends(), &[Point::new(100.0, 40.0)]);

        diagram
            .set_node_bounds(&"blocker".into(), Some(NodeBounds::new(Point::new(100.0, 300.0), 20.0, 20.0)))
            .unwrap();
        let report = router.reroute(&mut diagram, &RoutingTrigger::NodeMoveCompleted("blocker".into()));
        assert!(report.routed.is_empty());
        assert_eq!(diagram.path(&"ab".into()), Some(&detour));

        router.reroute(&mut diagram, &RoutingTrigger::FullRender);
        let path = diagram.path(&"ab".into()).unwrap();
        assert_eq!(path.as_slice(), &[Point::new(0.0, 0.0), Point::new(200.0, 0.0)]);
    }

    #[test]
    fn endpoints_without_bounds_are_not_reported_as_missing_obstacles() {
        let mut diagram = diagram();
        diagram.set_node_bounds(&"a".into(), None).unwrap();
        diagram.add_edge("ba".into(), &"b".into(), &"a".into()).unwrap();
        diagram
            .set_anchors(&"ba".into(), Some(Point::new(200.0, 5.0)), Some(Point::new(0.0, 5.0)))
            .unwrap();

        let report = EdgeRouter::default().reroute(&mut diagram, &RoutingTrigger::FullRender);
        assert_eq!(report.routed.len(), 2);
        assert_eq!(report.missing_obstacles, vec![NodeId::from("pending")]);
    }

    #[test]
    fn unknown_edge_is_skipped() {
        let mut diagram = diagram();
        let report = EdgeRouter::default().reroute(&mut diagram, &RoutingTrigger::EdgeAdded("ghost".into()));
        assert!(matches!(&report.skipped[0].1, RoutingError::UnknownEdge(id) if id.0 == "ghost"));
    }

    #[test]
    fn full_render_routes_every_edge() {
        let mut diagram = diagram();
        diagram.add_edge("ba".into(), &"b".into(), &"a".into()).unwrap();
        diagram
            .set_anchors(&"ba".into(), Some(Point::new(200.0, 5.0)), Some(Point::new(0.0, 5.0)))
            .unwrap();
        let report = EdgeRouter::default().reroute(&mut diagram, &RoutingTrigger::FullRender);
        assert_eq!(report.routed, vec![EdgeId::from("ab"), EdgeId::from("ba")]);
        assert!(diagram.path(&"ba".into()).is_some());
    }
}
