use hashbrown::HashSet;
use rstar::{Envelope, RTree, RTreeObject, SelectionFunction, AABB};
use tracing::debug;

use crate::error::RoutingError;
use crate::geometry::{segment_intersects_rect, BoundingBox, Point, Rect};
use crate::graph::{NodeGeometry, NodeId};

impl RTreeObject for Rect {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.top_left(), self.bottom_right())
    }
}

/// Selects the obstacles a single segment intersects. Parents are pruned by
/// envelope, leaves by the exact segment/rectangle test.
struct SegmentSelection {
    from: Point,
    to: Point,
    envelope: AABB<Point>,
}

impl SegmentSelection {
    fn new(from: Point, to: Point) -> Self {
        SegmentSelection {
            from,
            to,
            envelope: AABB::from_corners(from, to),
        }
    }
}

impl SelectionFunction<Rect> for SegmentSelection {
    fn should_unpack_parent(&self, envelope: &AABB<Point>) -> bool {
        envelope.intersects(&self.envelope)
    }

    fn should_unpack_leaf(&self, leaf: &Rect) -> bool {
        segment_intersects_rect(&self.from, &self.to, leaf)
    }
}

/// Padded obstacle rectangles for one routing call.
#[derive(Clone, Debug)]
pub struct ObstacleSet {
    rects: Vec<Rect>,
    tree: RTree<Rect>,
}

impl ObstacleSet {
    pub fn new(rects: Vec<Rect>) -> Self {
        let tree = RTree::bulk_load(rects.clone());
        ObstacleSet { rects, tree }
    }

    pub fn empty() -> Self {
        ObstacleSet::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rect> {
        self.rects.iter()
    }

    /// Obstacles hit by the segment `from`-`to`.
    pub fn segment_hits(&self, from: Point, to: Point) -> usize {
        self.tree
            .locate_with_selection_function(SegmentSelection::new(from, to))
            .count()
    }

    /// Total (segment, obstacle) intersections along the polyline.
    pub fn obstruction_count(&self, points: &[Point]) -> usize {
        points
            .windows(2)
            .map(|window| self.segment_hits(window[0], window[1]))
            .sum()
    }
}

impl From<Vec<Rect>> for ObstacleSet {
    fn from(rects: Vec<Rect>) -> Self {
        ObstacleSet::new(rects)
    }
}

impl<'a> IntoIterator for &'a ObstacleSet {
    type Item = &'a Rect;
    type IntoIter = std::slice::Iter<'a, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}

/// Obstacles for one edge plus the nodes that had to be left out.
#[derive(Debug)]
pub struct ObstacleBuild {
    pub obstacles: ObstacleSet,
    pub skipped: Vec<RoutingError>,
}

/// Padded boxes of every node except the edge's own endpoints. Nodes without
/// usable bounds end up in `skipped`; reporting them is up to the caller.
pub fn build_obstacles(nodes: &[NodeGeometry], source: &NodeId, target: &NodeId, padding: f64) -> ObstacleBuild {
    let padding = padding.max(0.0);
    let excluded: HashSet<&NodeId> = [source, target].into_iter().collect();

    let mut rects = Vec::with_capacity(nodes.len());
    let mut skipped = Vec::new();
    for node in nodes {
        if excluded.contains(&node.id) {
            continue;
        }
        match node.bounds {
            Some(bounds) if bounds.is_finite() => rects.push(bounds.rect().padded(padding)),
            _ => {
                debug!(node = %node.id, "node has no usable bounding box; not treated as an obstacle");
                skipped.push(RoutingError::MissingObstacleData { node: node.id.clone() });
            }
        }
    }

    ObstacleBuild {
        obstacles: ObstacleSet::new(rects),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path_obstruction_count;
    use crate::graph::NodeBounds;

    fn node(id: &str, x: f64, y: f64, width: f64, height: f64) -> NodeGeometry {
        NodeGeometry {
            id: id.into(),
            bounds: Some(NodeBounds::new(Point::new(x, y), width, height)),
        }
    }

    #[test]
    fn excludes_source_and_target() {
        let nodes = vec![
            node("source", 0.0, 0.0, 20.0, 20.0),
            node("middle", 100.0, 0.0, 40.0, 40.0),
            node("target", 200.0, 0.0, 20.0, 20.0),
        ];
        let build = build_obstacles(&nodes, &"source".into(), &"target".into(), 0.0);
        assert_eq!(build.obstacles.len(), 1);
        assert_eq!(
            build.obstacles.rects()[0],
            Rect::from_center(Point::new(100.0, 0.0), 40.0, 40.0)
        );
        assert!(build.skipped.is_empty());
    }

    #[test]
    fn padding_expands_all_sides() {
        let nodes = vec![node("n", 50.0, 50.0, 10.0, 10.0)];
        let build = build_obstacles(&nodes, &"a".into(), &"b".into(), 5.0);
        let rect = build.obstacles.rects()[0];
        assert_eq!((rect.min_x, rect.min_y, rect.max_x, rect.max_y), (40.0, 40.0, 60.0, 60.0));
    }

    #[test]
    fn negative_padding_is_treated_as_zero() {
        let nodes = vec![node("n", 50.0, 50.0, 10.0, 10.0)];
        let build = build_obstacles(&nodes, &"a".into(), &"b".into(), -3.0);
        assert_eq!(build.obstacles.rects()[0].width(), 10.0);
    }

    #[test]
    fn nodes_without_bounds_are_skipped() {
        let nodes = vec![
            NodeGeometry {
                id: "unmeasured".into(),
                bounds: None,
            },
            NodeGeometry {
                id: "broken".into(),
                bounds: Some(NodeBounds::new(Point::new(f64::NAN, 0.0), 1.0, 1.0)),
            },
            node("ok", 0.0, 0.0, 1.0, 1.0),
        ];
        let build = build_obstacles(&nodes, &"a".into(), &"b".into(), 0.0);
        assert_eq!(build.obstacles.len(), 1);
        assert_eq!(build.skipped.len(), 2);
        assert!(matches!(
            &build.skipped[0],
            RoutingError::MissingObstacleData { node } if node.0 == "unmeasured"
        ));
    }

    #[test]
    fn zero_size_node_is_a_point_obstacle() {
        let nodes = vec![node("dot", 100.0, 0.0, 0.0, 0.0)];
        let build = build_obstacles(&nodes, &"a".into(), &"b".into(), 0.0);
        let path = [Point::new(0.0, 0.0), Point::new(200.0, 0.0)];
        assert_eq!(build.obstacles.obstruction_count(&path), 1);
    }

    #[test]
    fn tree_count_matches_linear_scan() {
        let rects: Vec<Rect> = (0..12)
            .map(|i| {
                let offset = i as f64 * 35.0;
                Rect::from_center(Point::new(offset, (i % 3) as f64 * 25.0 - 25.0), 20.0, 30.0)
            })
            .collect();
        let obstacles = ObstacleSet::new(rects.clone());
        let paths: [&[Point]; 3] = [
            &[Point::new(-50.0, 0.0), Point::new(450.0, 0.0)],
            &[Point::new(-50.0, -60.0), Point::new(200.0, 60.0), Point::new(450.0, -60.0)],
            &[Point::new(0.0, 100.0), Point::new(400.0, 100.0)],
        ];
        for path in paths {
            assert_eq!(obstacles.obstruction_count(path), path_obstruction_count(path, &rects));
        }
    }
}
