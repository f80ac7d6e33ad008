use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub trait BoundingBox {
    fn top_left(&self) -> Point;
    fn bottom_right(&self) -> Point;

    fn bounding_box(&self) -> Rect {
        Rect::from_corners(self.top_left(), self.bottom_right())
    }
}

#[derive(Clone, Debug, PartialEq, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl rstar::Point for Point {
    type Scalar = f64;
    const DIMENSIONS: usize = 2;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Point {
            x: generator(0),
            y: generator(1),
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.x,
            1 => self.y,
            _ => panic!("Index out of bounds"),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Index out of bounds"),
        }
    }
}

/// Axis-aligned rectangle with inclusive bounds.
#[derive(Clone, Debug, PartialEq, Copy, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Builds a rectangle from any two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Rect {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        let half_width = width.abs() / 2.0;
        let half_height = height.abs() / 2.0;
        Rect {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Grows the rectangle by `padding` on all four sides.
    pub fn padded(&self, padding: f64) -> Self {
        Rect {
            min_x: self.min_x - padding,
            min_y: self.min_y - padding,
            max_x: self.max_x + padding,
            max_y: self.max_y + padding,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        point_in_rect(point, self)
    }

    /// The four boundary edges, clockwise from the top edge.
    pub fn edges(&self) -> [(Point, Point); 4] {
        let top_left = Point::new(self.min_x, self.min_y);
        let top_right = Point::new(self.max_x, self.min_y);
        let bottom_right = Point::new(self.max_x, self.max_y);
        let bottom_left = Point::new(self.min_x, self.max_y);
        [
            (top_left, top_right),
            (top_right, bottom_right),
            (bottom_right, bottom_left),
            (bottom_left, top_left),
        ]
    }
}

impl BoundingBox for Rect {
    fn top_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    fn bottom_right(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Turn direction of the triple `a -> b -> c`.
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let value = (b.y - a.y) * (c.x - b.x) - (b.x - a.x) * (c.y - b.y);
    match value.partial_cmp(&0.0) {
        Some(Ordering::Greater) => Orientation::Clockwise,
        Some(Ordering::Less) => Orientation::CounterClockwise,
        _ => Orientation::Collinear,
    }
}

/// Whether `q` lies within the coordinate extent of segment `p`-`r`.
/// Only meaningful when the three points are collinear.
pub fn on_segment(p: &Point, q: &Point, r: &Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

pub fn point_in_rect(p: &Point, r: &Rect) -> bool {
    r.min_x <= p.x && p.x <= r.max_x && r.min_y <= p.y && p.y <= r.max_y
}

pub fn segments_intersect(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p3, p2))
        || (o2 == Orientation::Collinear && on_segment(p1, p4, p2))
        || (o3 == Orientation::Collinear && on_segment(p3, p1, p4))
        || (o4 == Orientation::Collinear && on_segment(p3, p2, p4))
}

/// Unit obstruction test: touching the boundary counts as intersecting.
pub fn segment_intersects_rect(p1: &Point, p2: &Point, rect: &Rect) -> bool {
    if point_in_rect(p1, rect) || point_in_rect(p2, rect) {
        return true;
    }
    if p1 == p2 {
        return false;
    }
    rect.edges()
        .iter()
        .any(|(a, b)| segments_intersect(p1, p2, a, b))
}

/// Number of (segment, obstacle) pairs of the polyline that intersect.
pub fn path_obstruction_count<'a, I>(points: &[Point], obstacles: I) -> usize
where
    I: IntoIterator<Item = &'a Rect> + Clone,
{
    points
        .windows(2)
        .map(|window| {
            obstacles
                .clone()
                .into_iter()
                .filter(|rect| segment_intersects_rect(&window[0], &window[1], rect))
                .count()
        })
        .sum()
}
