//! Parametric plasma boundary curve.
//!
//! The boundary is a D-shaped cross-section described by a major radius,
//! vertical position, minor radius, and per-hemisphere elongation,
//! triangularity and X-point severity. The sampler produces a closed
//! polyline; rendering and hit-testing treat it as read-only geometry.

use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// Number of angular samples over a full turn; the boundary has
/// `SAMPLES + 1` points so the curve closes on itself.
const SAMPLES: usize = 200;

/// Parameters of the plasma boundary, in the external wire spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasmaShape {
    pub show: bool,
    #[serde(rename = "R")]
    pub major_radius: f64,
    #[serde(rename = "Z")]
    pub vertical_position: f64,
    #[serde(rename = "a")]
    pub minor_radius: f64,
    #[serde(rename = "upperElongation")]
    pub upper_elongation: f64,
    #[serde(rename = "lowerElongation")]
    pub lower_elongation: f64,
    #[serde(rename = "upperTriangularity")]
    pub upper_triangularity: f64,
    #[serde(rename = "lowerTriangularity")]
    pub lower_triangularity: f64,
    #[serde(rename = "upperXPointSeverity")]
    pub upper_x_point_severity: f64,
    #[serde(rename = "lowerXPointSeverity")]
    pub lower_x_point_severity: f64,
}

impl Default for PlasmaShape {
    fn default() -> Self {
        Self {
            show: false,
            major_radius: 250.0,
            vertical_position: 250.0,
            minor_radius: 100.0,
            upper_elongation: 1.2,
            lower_elongation: 1.3,
            upper_triangularity: 0.2,
            lower_triangularity: 0.5,
            upper_x_point_severity: 1.0,
            lower_x_point_severity: 1.0,
        }
    }
}

impl PlasmaShape {
    /// Sample the boundary of this parameter set.
    pub fn boundary(&self) -> Vec<Point> {
        plasma_boundary(
            self.major_radius,
            self.vertical_position,
            self.minor_radius,
            self.upper_elongation,
            self.lower_elongation,
            self.upper_triangularity,
            self.lower_triangularity,
            self.upper_x_point_severity,
            self.lower_x_point_severity,
        )
    }
}

/// X-point shaping factor for one hemisphere.
///
/// Severity <= 0 leaves the circular profile untouched.
fn severity_factor(severity: f64, cos_t: f64) -> f64 {
    if severity > 0.0 {
        severity * cos_t.abs() - (severity - 1.0) * cos_t * cos_t
    } else {
        1.0
    }
}

/// Sample the plasma boundary as `(r, z)` coordinate pairs.
///
/// 201 angles evenly spaced over [0, 2π]; the first and last samples
/// coincide so the polyline closes. Upper/lower asymmetry is blended as
/// average ± half-difference weighted by sin θ; the hemisphere whose
/// X-point factor applies is picked by the sign of sin θ.
#[allow(clippy::too_many_arguments)]
pub fn plasma_boundary(
    major_radius: f64,
    vertical_position: f64,
    minor_radius: f64,
    elongation_up: f64,
    elongation_down: f64,
    triangularity_up: f64,
    triangularity_down: f64,
    x_point_up: f64,
    x_point_down: f64,
) -> Vec<Point> {
    let tr = 0.5 * (triangularity_up + triangularity_down);
    let dtr = 0.5 * (triangularity_up - triangularity_down);
    let elon = 0.5 * (elongation_up + elongation_down);
    let delon = 0.5 * (elongation_up - elongation_down);

    let mut boundary = Vec::with_capacity(SAMPLES + 1);
    for i in 0..=SAMPLES {
        let theta = i as f64 * (2.0 * std::f64::consts::PI) / SAMPLES as f64;
        let (sin_t, cos_t) = theta.sin_cos();

        let factor = if sin_t >= 0.0 {
            severity_factor(x_point_up, cos_t)
        } else {
            severity_factor(x_point_down, cos_t)
        };

        let radial = minor_radius * (factor * cos_t - (tr + dtr * sin_t) * sin_t * sin_t);
        let vertical = minor_radius * sin_t * (elon + delon * sin_t);

        boundary.push(Point::new(major_radius + radial, vertical_position + vertical));
    }
    boundary
}

/// Render a sampled boundary as a polyline path in the internal Y-down
/// space (z negated). Returns `None` when the sample set is empty, which
/// callers treat as "no renderable boundary".
pub fn boundary_path(boundary: &[Point]) -> Option<BezPath> {
    let first = boundary.first()?;
    let mut path = BezPath::new();
    path.move_to(Point::new(first.x, -first.y));
    for p in &boundary[1..] {
        path.line_to(Point::new(p.x, -p.y));
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_sample_count_and_closure() {
        let pts = plasma_boundary(250.0, 250.0, 100.0, 1.2, 1.3, 0.2, 0.5, 1.0, 1.0);
        assert_eq!(pts.len(), 201);

        let first = pts[0];
        let last = pts[pts.len() - 1];
        assert!((first.x - last.x).abs() < 1e-9);
        assert!((first.y - last.y).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_starts_at_outboard_midplane() {
        // At θ = 0: factor = severity·1 − (severity−1)·1 = 1, so r = R + a.
        let pts = plasma_boundary(250.0, 250.0, 100.0, 1.2, 1.3, 0.2, 0.5, 1.0, 1.0);
        assert!((pts[0].x - 350.0).abs() < 1e-9);
        assert!((pts[0].y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_severity_keeps_circular_factor() {
        // With severity 0 and no elongation/triangularity the boundary is a circle.
        let pts = plasma_boundary(0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        for p in &pts {
            let radius = (p.x * p.x + p.y * p.y).sqrt();
            assert!((radius - 1.0).abs() < 1e-9, "radius {radius}");
        }
    }

    #[test]
    fn test_elongation_stretches_vertically() {
        let pts = plasma_boundary(0.0, 0.0, 100.0, 2.0, 2.0, 0.0, 0.0, 0.0, 0.0);
        let max_z = pts.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!((max_z - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_path_flips_z() {
        let pts = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let path = boundary_path(&pts).unwrap();
        let svg = path.to_svg();
        assert!(svg.contains("-2"));
        assert!(svg.contains("-4"));
    }

    #[test]
    fn test_boundary_path_empty() {
        assert!(boundary_path(&[]).is_none());
    }

    #[test]
    fn test_plasma_shape_wire_names() {
        let json = serde_json::to_value(PlasmaShape::default()).unwrap();
        assert!(json.get("R").is_some());
        assert!(json.get("upperElongation").is_some());
        assert!(json.get("lowerXPointSeverity").is_some());
    }
}
