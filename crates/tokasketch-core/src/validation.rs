//! Cross-shape validation rules.
//!
//! Validation runs on the whole document at once: every shape's error flag
//! is cleared first, then set again for each shape named by an issue. The
//! store skips validation while the user is interacting or a shape is
//! still being built, so half-placed geometry never raises issues.

use crate::geometry::{point_in_polygon, polygon_self_intersects, polygons_overlap};
use crate::shapes::{Shape, ShapeType, TokamakElement};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueKind {
    ParallelogramOverlap,
    ShapeInsideLimiter,
    PolygonSelfIntersection,
}

impl ValidationIssueKind {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationIssueKind::ParallelogramOverlap => "Parallelograms cannot overlap.",
            ValidationIssueKind::ShapeInsideLimiter => "Shapes cannot be inside a limiter.",
            ValidationIssueKind::PolygonSelfIntersection => "Polygon should not intersect itself.",
        }
    }
}

impl fmt::Display for ValidationIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One violated rule, with the ids of the offending shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub shape_ids: Vec<String>,
}

/// True when an inner shape is entirely contained in the outer polygon.
/// An outer shape with fewer than 3 points contains nothing; a shape with
/// no points is never reported as contained.
fn shape_inside(inner: &Shape, outer: &Shape) -> bool {
    let outer_points = outer.point_positions();
    if outer_points.len() < 3 || inner.points.is_empty() {
        return false;
    }
    inner
        .points
        .iter()
        .all(|p| point_in_polygon(p.position(), &outer_points))
}

/// Check every rule against the document and update each shape's
/// `has_validation_error` flag. The caller must not invoke this while
/// interaction or building is in progress; the store enforces that.
pub fn run_validation(shapes: &mut [Shape]) -> Vec<ValidationIssue> {
    for shape in shapes.iter_mut() {
        shape.has_validation_error = false;
    }
    let mut issues = Vec::new();

    // Rule 1: parallelograms must not overlap each other. Overlap and
    // self-intersection run on anchor points; curve controls only bend
    // the rendered path.
    let parallelograms: Vec<usize> = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| s.shape_type() == ShapeType::Parallelogram)
        .map(|(i, _)| i)
        .collect();
    for (a, &i) in parallelograms.iter().enumerate() {
        for &j in &parallelograms[a + 1..] {
            let points1 = shapes[i].anchor_points();
            let points2 = shapes[j].anchor_points();
            if !points1.is_empty()
                && !points2.is_empty()
                && polygons_overlap(&points1, &points2)
            {
                issues.push(ValidationIssue {
                    kind: ValidationIssueKind::ParallelogramOverlap,
                    shape_ids: vec![shapes[i].id.clone(), shapes[j].id.clone()],
                });
            }
        }
    }

    // Rule 2: nothing may sit inside a limiter.
    let limiters: Vec<usize> = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| s.element() == TokamakElement::Limiter)
        .map(|(i, _)| i)
        .collect();
    for &l in &limiters {
        for i in 0..shapes.len() {
            if shapes[i].element() == TokamakElement::Limiter {
                continue;
            }
            if shape_inside(&shapes[i], &shapes[l]) {
                issues.push(ValidationIssue {
                    kind: ValidationIssueKind::ShapeInsideLimiter,
                    shape_ids: vec![shapes[i].id.clone(), shapes[l].id.clone()],
                });
            }
        }
    }

    // Rule 3: polygons must not self-intersect.
    for shape in shapes.iter().filter(|s| s.shape_type() == ShapeType::Polygon) {
        if polygon_self_intersects(&shape.anchor_points()) {
            issues.push(ValidationIssue {
                kind: ValidationIssueKind::PolygonSelfIntersection,
                shape_ids: vec![shape.id.clone()],
            });
        }
    }

    for issue in &issues {
        for id in &issue.shape_ids {
            if let Some(shape) = shapes.iter_mut().find(|s| s.id == *id) {
                shape.has_validation_error = true;
            }
        }
    }
    if !issues.is_empty() {
        debug!("validation found {} issue(s)", issues.len());
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use kurbo::Point;

    fn finished(element: TokamakElement, id: &str, points: &[(f64, f64)]) -> Shape {
        let mut shape = Shape::new(id, element);
        for &(x, y) in points {
            shape.update_ephemeral(Point::new(x, y), Modifiers::default());
            shape.place_point();
        }
        shape.finish_building();
        shape
    }

    fn coil(id: &str, x: f64, y: f64, size: f64) -> Shape {
        // third point completes the parallelogram
        finished(
            TokamakElement::Coil,
            id,
            &[(x, y), (x + size, y), (x + size, y + size)],
        )
    }

    #[test]
    fn test_overlapping_parallelograms_flagged() {
        let mut shapes = vec![coil("A", 0.0, 0.0, 20.0), coil("B", 10.0, 10.0, 20.0)];
        let issues = run_validation(&mut shapes);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ValidationIssueKind::ParallelogramOverlap);
        assert_eq!(issues[0].shape_ids, vec!["A", "B"]);
        assert!(shapes.iter().all(|s| s.has_validation_error));
    }

    #[test]
    fn test_separated_parallelograms_pass() {
        let mut shapes = vec![coil("A", 0.0, 0.0, 20.0), coil("B", 100.0, 100.0, 20.0)];
        assert!(run_validation(&mut shapes).is_empty());
        assert!(shapes.iter().all(|s| !s.has_validation_error));
    }

    #[test]
    fn test_shape_inside_limiter_flagged() {
        let limiter = finished(
            TokamakElement::Limiter,
            "LIM",
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
        );
        let inner = coil("C", 40.0, 40.0, 10.0);
        let mut shapes = vec![limiter, inner];
        let issues = run_validation(&mut shapes);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ValidationIssueKind::ShapeInsideLimiter);
        assert_eq!(issues[0].shape_ids, vec!["C", "LIM"]);
    }

    #[test]
    fn test_shape_straddling_limiter_passes() {
        let limiter = finished(
            TokamakElement::Limiter,
            "LIM",
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
        );
        let straddler = coil("C", 90.0, 40.0, 30.0);
        let mut shapes = vec![limiter, straddler];
        let issues = run_validation(&mut shapes);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_self_intersecting_polygon_flagged() {
        let bowtie = finished(
            TokamakElement::Vessel,
            "V",
            &[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)],
        );
        let mut shapes = vec![bowtie];
        let issues = run_validation(&mut shapes);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ValidationIssueKind::PolygonSelfIntersection);
        assert!(shapes[0].has_validation_error);
    }

    #[test]
    fn test_curve_controls_ignored_by_self_intersection() {
        let mut shape = finished(
            TokamakElement::Vessel,
            "V",
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
        );
        // the raw point chain through this control crosses the top edge,
        // but the anchors still form a plain square
        shape.add_point(Point::new(5.0, 20.0), Some(1), true, false);
        assert!(shape.points[1].is_curve_control);
        let mut shapes = vec![shape];
        assert!(run_validation(&mut shapes).is_empty());
    }

    #[test]
    fn test_flags_cleared_on_revalidation() {
        let mut shapes = vec![coil("A", 0.0, 0.0, 20.0), coil("B", 10.0, 10.0, 20.0)];
        assert_eq!(run_validation(&mut shapes).len(), 1);

        // move one coil away and revalidate
        shapes[1].move_by(200.0, 200.0);
        assert!(run_validation(&mut shapes).is_empty());
        assert!(shapes.iter().all(|s| !s.has_validation_error));
    }

    #[test]
    fn test_multiple_issues_reported_together() {
        let limiter = finished(
            TokamakElement::Limiter,
            "LIM",
            &[(0.0, 0.0), (200.0, 0.0), (200.0, 200.0), (0.0, 200.0)],
        );
        let a = coil("A", 40.0, 40.0, 20.0);
        let b = coil("B", 50.0, 50.0, 20.0);
        let mut shapes = vec![limiter, a, b];
        let issues = run_validation(&mut shapes);
        let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&ValidationIssueKind::ParallelogramOverlap));
        assert!(kinds.contains(&ValidationIssueKind::ShapeInsideLimiter));
    }
}
