//! Pure geometric predicates used by validation and point editing.
//!
//! Everything here operates on plain point slices; no shape state is
//! consulted, which keeps the validation engine testable in isolation.

use kurbo::{Point, Vec2};

/// Tolerance for collinearity checks in the segment intersection test.
const COLLINEAR_EPS: f64 = 1e-10;

/// Orientation of the ordered triple (p, q, r).
///
/// Returns 0 for collinear, 1 for clockwise, 2 for counter-clockwise
/// (in the internal Y-down coordinate space).
fn orientation(p: Point, q: Point, r: Point) -> u8 {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val.abs() < COLLINEAR_EPS {
        0
    } else if val > 0.0 {
        1
    } else {
        2
    }
}

/// For collinear p, q, r: does q lie within the bounding box of segment p-r?
fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Test whether segments p1-q1 and p2-q2 intersect, including touching
/// endpoints and collinear overlap.
pub fn segments_intersect(p1: Point, q1: Point, p2: Point, q2: Point) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, p2, q1))
        || (o2 == 0 && on_segment(p1, q2, q1))
        || (o3 == 0 && on_segment(p2, p1, q2))
        || (o4 == 0 && on_segment(p2, q1, q2))
}

/// Ray-casting parity test for point containment.
///
/// A polygon with fewer than 3 vertices contains nothing.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        let crosses = (yi > point.y) != (yj > point.y)
            && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Candidate separating axes: normalized outward normals of every edge.
///
/// Zero-length edges (duplicated vertices) have no direction and
/// contribute no axis.
fn edge_normals(points: &[Point]) -> Vec<Vec2> {
    let mut axes = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        let p1 = points[i];
        let p2 = points[(i + 1) % points.len()];
        let edge = Vec2::new(p1.x - p2.x, p1.y - p2.y);
        let normal = Vec2::new(-edge.y, edge.x);
        let len = normal.hypot();
        if len != 0.0 {
            axes.push(normal / len);
        }
    }
    axes
}

/// Project a polygon onto an axis, returning the covered interval.
fn project(points: &[Point], axis: Vec2) -> (f64, f64) {
    let mut min = points[0].to_vec2().dot(axis);
    let mut max = min;
    for p in &points[1..] {
        let d = p.to_vec2().dot(axis);
        if d < min {
            min = d;
        } else if d > max {
            max = d;
        }
    }
    (min, max)
}

/// Separating Axis Theorem overlap test for two convex polygons.
///
/// Returns false as soon as any candidate axis separates the projections.
pub fn polygons_overlap(poly1: &[Point], poly2: &[Point]) -> bool {
    if poly1.is_empty() || poly2.is_empty() {
        return false;
    }
    let mut axes = edge_normals(poly1);
    axes.extend(edge_normals(poly2));
    // fully degenerate input (every edge zero-length) offers no axis to test
    if axes.is_empty() {
        return false;
    }

    for axis in axes {
        let (min1, max1) = project(poly1, axis);
        let (min2, max2) = project(poly2, axis);
        if !(max1 > min2 && max2 > min1) {
            return false;
        }
    }
    true
}

/// Test whether the closed polygonal chain through `points` intersects
/// itself. Adjacent edges (including the wraparound pair) share an endpoint
/// and are skipped.
pub fn polygon_self_intersects(points: &[Point]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let p1 = points[i];
            let q1 = points[(i + 1) % n];
            let p2 = points[j];
            let q2 = points[(j + 1) % n];
            if segments_intersect(p1, q1, p2, q2) {
                return true;
            }
        }
    }
    false
}

/// Closest point on segment a-b to `point`, with the squared distance.
///
/// A zero-length segment projects onto its single endpoint.
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> (Point, f64) {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq == 0.0 {
        return (a, pv.hypot2());
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    let d = Vec2::new(point.x - proj.x, point.y - proj.y);
    (proj, d.hypot2())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = square(0.0, 0.0, 10.0);
        assert!(point_in_polygon(Point::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(15.0, 15.0), &poly));
    }

    #[test]
    fn test_point_in_degenerate_polygon() {
        let two = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!(!point_in_polygon(Point::new(5.0, 0.0), &two));
        assert!(!point_in_polygon(Point::new(1.0, 1.0), &[]));
    }

    #[test]
    fn test_segments_crossing() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_segments_parallel() {
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
        ));
    }

    #[test]
    fn test_segments_collinear_overlap() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(15.0, 0.0),
        ));
    }

    #[test]
    fn test_overlap_separated_squares() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(20.0, 20.0, 10.0);
        assert!(!polygons_overlap(&a, &b));
    }

    #[test]
    fn test_overlap_intersecting_squares() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        assert!(polygons_overlap(&a, &b));
    }

    #[test]
    fn test_overlap_containment() {
        let outer = square(0.0, 0.0, 20.0);
        let inner = square(5.0, 5.0, 5.0);
        assert!(polygons_overlap(&outer, &inner));
    }

    #[test]
    fn test_overlap_with_zero_length_edge() {
        let mut a = square(0.0, 0.0, 10.0);
        a.push(Point::new(0.0, 10.0)); // duplicates the last vertex
        let b = square(30.0, 0.0, 10.0);
        assert!(!polygons_overlap(&a, &b));
    }

    #[test]
    fn test_overlap_detected_despite_duplicated_vertex() {
        let mut a = square(0.0, 0.0, 10.0);
        a.push(Point::new(0.0, 10.0)); // duplicates the last vertex
        let b = square(5.0, 5.0, 10.0);
        assert!(polygons_overlap(&a, &b));
        assert!(polygons_overlap(&b, &a));
    }

    #[test]
    fn test_self_intersect_triangle_is_false() {
        let tri = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 10.0),
        ];
        assert!(!polygon_self_intersects(&tri));
    }

    #[test]
    fn test_self_intersect_bowtie() {
        let bowtie = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        assert!(polygon_self_intersects(&bowtie));
    }

    #[test]
    fn test_self_intersect_square_is_false() {
        assert!(!polygon_self_intersects(&square(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_closest_point_on_segment() {
        let (p, d_sq) = closest_point_on_segment(
            Point::new(5.0, 5.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!((d_sq - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_closest_point_clamps_to_endpoint() {
        let (p, _) = closest_point_on_segment(
            Point::new(-5.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(p, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_closest_point_zero_length_segment() {
        let a = Point::new(3.0, 4.0);
        let (p, d_sq) = closest_point_on_segment(Point::new(0.0, 0.0), a, a);
        assert_eq!(p, a);
        assert!((d_sq - 25.0).abs() < 1e-12);
    }
}
