use std::fmt;

use indexmap::IndexMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::geometry::{BoundingBox, Point, Rect};
use crate::host::{DiagramHost, EdgeAnchors};
use crate::routing::Path;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        EdgeId(value.to_string())
    }
}

/// Placed node geometry: center plus extent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeBounds {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl NodeBounds {
    pub fn new(center: Point, width: f64, height: f64) -> Self {
        NodeBounds { center, width, height }
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.width, self.height)
    }
}

impl BoundingBox for NodeBounds {
    fn top_left(&self) -> Point {
        Point::new(
            self.center.x - self.width.abs() / 2.0,
            self.center.y - self.height.abs() / 2.0,
        )
    }

    fn bottom_right(&self) -> Point {
        Point::new(
            self.center.x + self.width.abs() / 2.0,
            self.center.y + self.height.abs() / 2.0,
        )
    }
}

/// A node as the router sees it. `bounds` is `None` while the host has not
/// measured the node yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeGeometry {
    pub id: NodeId,
    pub bounds: Option<NodeBounds>,
}

#[derive(Clone, Debug, PartialEq)]
struct DiagramNode {
    id: NodeId,
    bounds: Option<NodeBounds>,
}

#[derive(Clone, Debug, PartialEq)]
struct DiagramEdge {
    id: EdgeId,
    start: Option<Point>,
    end: Option<Point>,
    path: Option<Path>,
}

/// In-memory diagram snapshot. Node and edge iteration follows insertion
/// order so full re-renders route edges deterministically.
#[derive(Default)]
pub struct Diagram {
    graph: StableDiGraph<DiagramNode, DiagramEdge>,
    nodes: IndexMap<NodeId, NodeIndex>,
    edges: IndexMap<EdgeId, EdgeIndex>,
}

impl Diagram {
    pub fn new() -> Self {
        Diagram::default()
    }

    /// Adds a node, or updates its bounds if the id is already known.
    pub fn add_node(&mut self, id: NodeId, bounds: Option<NodeBounds>) {
        if let Some(&index) = self.nodes.get(&id) {
            self.graph[index].bounds = bounds;
            return;
        }
        let index = self.graph.add_node(DiagramNode {
            id: id.clone(),
            bounds,
        });
        self.nodes.insert(id, index);
    }

    pub fn set_node_bounds(&mut self, id: &NodeId, bounds: Option<NodeBounds>) -> Result<(), RoutingError> {
        let index = self.node_index(id)?;
        self.graph[index].bounds = bounds;
        Ok(())
    }

    /// Removes the node together with every edge attached to it.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(), RoutingError> {
        let index = self.node_index(id)?;
        let attached: Vec<EdgeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id.clone())
            .collect();
        for edge_id in attached {
            self.edges.shift_remove(&edge_id);
        }
        self.graph.remove_node(index);
        self.nodes.shift_remove(id);
        Ok(())
    }

    pub fn add_edge(&mut self, id: EdgeId, source: &NodeId, target: &NodeId) -> Result<(), RoutingError> {
        let source_index = self.node_index(source)?;
        let target_index = self.node_index(target)?;
        if let Some(previous) = self.edges.get(&id).copied() {
            self.graph.remove_edge(previous);
        }
        let index = self.graph.add_edge(
            source_index,
            target_index,
            DiagramEdge {
                id: id.clone(),
                start: None,
                end: None,
                path: None,
            },
        );
        self.edges.insert(id, index);
        Ok(())
    }

    pub fn set_anchors(&mut self, id: &EdgeId, start: Option<Point>, end: Option<Point>) -> Result<(), RoutingError> {
        let index = self.edge_index(id)?;
        let edge = &mut self.graph[index];
        edge.start = start;
        edge.end = end;
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<(), RoutingError> {
        let index = self.edge_index(id)?;
        self.graph.remove_edge(index);
        self.edges.shift_remove(id);
        Ok(())
    }

    /// The last path applied to the edge, if any.
    pub fn path(&self, id: &EdgeId) -> Option<&Path> {
        let index = self.edges.get(id)?;
        self.graph[*index].path.as_ref()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn node_index(&self, id: &NodeId) -> Result<NodeIndex, RoutingError> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| RoutingError::UnknownNode(id.clone()))
    }

    fn edge_index(&self, id: &EdgeId) -> Result<EdgeIndex, RoutingError> {
        self.edges
            .get(id)
            .copied()
            .ok_or_else(|| RoutingError::UnknownEdge(id.clone()))
    }
}

impl DiagramHost for Diagram {
    fn nodes(&self) -> Vec<NodeGeometry> {
        self.nodes
            .values()
            .map(|&index| {
                let node = &self.graph[index];
                NodeGeometry {
                    id: node.id.clone(),
                    bounds: node.bounds,
                }
            })
            .collect()
    }

    fn anchors(&self, edge: &EdgeId) -> Option<EdgeAnchors> {
        let index = *self.edges.get(edge)?;
        let (source, target) = self.graph.edge_endpoints(index)?;
        let weight = &self.graph[index];
        Some(EdgeAnchors {
            source: self.graph[source].id.clone(),
            target: self.graph[target].id.clone(),
            start: weight.start,
            end: weight.end,
        })
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().cloned().collect()
    }

    fn edges_touching(&self, node: &NodeId) -> Vec<EdgeId> {
        let Some(&index) = self.nodes.get(node) else {
            return Vec::new();
        };
        let mut positions: Vec<usize> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .filter_map(|edge| self.edges.get_index_of(&edge.weight().id))
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
            .into_iter()
            .filter_map(|position| self.edges.get_index(position).map(|(id, _)| id.clone()))
            .collect()
    }

    fn apply_path(&mut self, edge: &EdgeId, path: &Path) {
        if let Some(&index) = self.edges.get(edge) {
            self.graph[index].path = Some(path.clone());
        }
    }
}
