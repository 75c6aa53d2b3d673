//! Planar geometry for cell boundaries.
//!
//! Cell-boundary binning needs two routines: the convex hull of the points
//! assigned to a cell and the centroid of that hull. Both are implemented here
//! with no external geometry dependency.
//!
//! The hull uses Andrew's monotone chain. Points are sorted leftmost first,
//! ties broken by the lower `y`, so the output depends only on the point set
//! and never on the order the points arrived in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A point in the tissue coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lexicographic(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

/// Shape class of a hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullKind {
    /// No vertices
    Empty,
    /// A single distinct point
    Point,
    /// Two distinct points, or any collinear set
    Segment,
    /// Three or more non-collinear vertices
    Polygon,
}

/// A simple polygon stored as its vertex ring.
///
/// Vertices are counter-clockwise and the ring is open (the first vertex is
/// not repeated at the end). Degenerate hulls are kept as one- or two-vertex
/// rings rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Wrap an open vertex ring.
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Vertex ring.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Shape class.
    pub fn kind(&self) -> HullKind {
        match self.vertices.len() {
            0 => HullKind::Empty,
            1 => HullKind::Point,
            2 => HullKind::Segment,
            _ if self.signed_area() == 0.0 => HullKind::Segment,
            _ => HullKind::Polygon,
        }
    }

    /// Signed shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let origin = self.vertices[0];
        let mut twice_area = 0.0;
        for i in 1..n - 1 {
            let a = self.vertices[i];
            let b = self.vertices[i + 1];
            twice_area += (a.x - origin.x) * (b.y - origin.y) - (b.x - origin.x) * (a.y - origin.y);
        }
        twice_area / 2.0
    }

    /// Absolute area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Geometric centroid.
    ///
    /// For a ring with non-zero area this is the area-weighted centroid of the
    /// enclosed region. Zero-area rings fall back to the vertex mean, which is
    /// the point itself or the midpoint of a segment. Returns `None` for an
    /// empty polygon.
    pub fn centroid(&self) -> Option<Point> {
        let n = self.vertices.len();
        if n == 0 {
            return None;
        }

        let area = self.signed_area();
        if n < 3 || area == 0.0 {
            let (sx, sy) = self
                .vertices
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            return Some(Point::new(sx / n as f64, sy / n as f64));
        }

        // Fan triangulation from the first vertex keeps magnitudes small.
        let origin = self.vertices[0];
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 1..n - 1 {
            let a = self.vertices[i];
            let b = self.vertices[i + 1];
            let (ax, ay) = (a.x - origin.x, a.y - origin.y);
            let (bx, by) = (b.x - origin.x, b.y - origin.y);
            let cross = ax * by - bx * ay;
            cx += (ax + bx) * cross;
            cy += (ay + by) * cross;
        }
        let scale = 1.0 / (6.0 * area);
        Some(Point::new(origin.x + cx * scale, origin.y + cy * scale))
    }
}

/// Cross product of `o->a` and `o->b`; positive when `b` turns left.
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull of a point set.
///
/// Duplicates and collinear boundary points are dropped. One distinct point
/// yields a single-vertex ring, a collinear set yields its two extreme points.
pub fn convex_hull(points: &[Point]) -> Polygon {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.lexicographic(b));
    sorted.dedup_by(|a, b| a.lexicographic(b) == Ordering::Equal);

    if sorted.len() <= 2 {
        return Polygon::new(sorted);
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    Polygon::new(lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_hull_square_with_interior_points() {
        let points = pts(&[
            (0.0, 0.0),
            (2.0, 1.0),
            (4.0, 0.0),
            (1.0, 3.0),
            (4.0, 4.0),
            (0.0, 4.0),
            (2.0, 2.0),
        ]);
        let hull = convex_hull(&points);

        assert_eq!(
            hull.vertices(),
            &pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)])[..]
        );
        assert_eq!(hull.kind(), HullKind::Polygon);
        assert_eq!(hull.area(), 16.0);
        assert_eq!(hull.centroid(), Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_hull_drops_collinear_boundary_points() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.vertices().contains(&Point::new(1.0, 0.0)));
    }

    #[test]
    fn test_hull_single_point() {
        let hull = convex_hull(&pts(&[(3.0, 5.0), (3.0, 5.0)]));
        assert_eq!(hull.kind(), HullKind::Point);
        assert_eq!(hull.centroid(), Some(Point::new(3.0, 5.0)));
    }

    #[test]
    fn test_hull_two_points_is_segment() {
        let hull = convex_hull(&pts(&[(4.0, 4.0), (0.0, 0.0)]));
        assert_eq!(hull.kind(), HullKind::Segment);
        assert_eq!(hull.vertices()[0], Point::new(0.0, 0.0));
        assert_eq!(hull.centroid(), Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_hull_collinear_set_is_segment() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (1.0, 1.0), (3.0, 3.0), (2.0, 2.0)]));
        assert_eq!(hull.kind(), HullKind::Segment);
        assert_eq!(hull.len(), 2);
        assert_eq!(hull.centroid(), Some(Point::new(1.5, 1.5)));
    }

    #[test]
    fn test_empty_hull() {
        let hull = convex_hull(&[]);
        assert_eq!(hull.kind(), HullKind::Empty);
        assert_eq!(hull.centroid(), None);
    }

    #[test]
    fn test_centroid_is_area_weighted_not_point_mean() {
        // Many points crowd one corner of a right triangle.
        let mut points = pts(&[(0.0, 0.0), (6.0, 0.0), (0.0, 6.0)]);
        for _ in 0..10 {
            points.push(Point::new(0.5, 0.5));
        }
        let hull = convex_hull(&points);
        let c = hull.centroid().unwrap();
        assert!((c.x - 2.0).abs() < 1e-12);
        assert!((c.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ring_is_counter_clockwise() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]));
        assert!(hull.signed_area() > 0.0);
    }

    proptest! {
        #[test]
        fn test_hull_and_centroid_ignore_input_order(
            coords in prop::collection::vec((-500i32..500, -500i32..500), 1..40),
            seed in any::<u64>(),
        ) {
            let points: Vec<Point> = coords
                .iter()
                .map(|&(x, y)| Point::new(x as f64, y as f64))
                .collect();

            // Deterministic permutation driven by the seed.
            let mut shuffled = points.clone();
            let mut state = seed | 1;
            for i in (1..shuffled.len()).rev() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let j = (state % (i as u64 + 1)) as usize;
                shuffled.swap(i, j);
            }

            let a = convex_hull(&points);
            let b = convex_hull(&shuffled);
            prop_assert_eq!(a.vertices(), b.vertices());
            prop_assert_eq!(a.centroid(), b.centroid());
        }
    }
}
