//! Rotation rig: a single arm handle anchored at the selection-time center.
//!
//! The origin is captured when the shape is selected and stays fixed for
//! the whole session, so repeated drags rotate around the same point even
//! as the bounding box moves. The shape's `rotation_angle_rad` accumulates
//! the absolute arm angle and resets to zero on deselect.

use super::marker::Marker;
use super::Shape;
use kurbo::Point;

/// Extra arm length beyond half the shape width.
const ARM_MARGIN: f64 = 35.0;
/// Angle deltas below this are ignored.
const MIN_ANGLE_DELTA: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct RotateRig {
    pub origin: Point,
    pub arm_length: f64,
    pub handle: Marker,
}

impl RotateRig {
    /// Capture the rotation origin and arm length from the current shape.
    /// Shapes without geometry have no rig.
    pub fn for_shape(shape: &mut Shape) -> Option<Self> {
        let origin = shape.center()?;
        shape.rotation_angle_rad = 0.0;
        let arm_length = shape.width() / 2.0 + ARM_MARGIN;
        let mut rig = Self {
            origin,
            arm_length,
            handle: Marker::handle(0, 0.0, 0.0, Default::default()),
        };
        rig.sync(shape);
        Some(rig)
    }

    /// Reposition the handle at the current angle around the fixed origin.
    pub fn sync(&mut self, shape: &Shape) {
        let angle = shape.rotation_angle_rad;
        self.handle.x = self.origin.x + self.arm_length * angle.cos();
        self.handle.y = self.origin.y + self.arm_length * angle.sin();
    }

    /// Apply a handle drag. The new absolute angle is derived from the
    /// dragged handle position relative to the fixed origin.
    pub fn drag_handle(&mut self, shape: &mut Shape, dx: f64, dy: f64) {
        let mouse = Point::new(self.handle.x + dx, self.handle.y + dy);
        let new_angle = (mouse.y - self.origin.y).atan2(mouse.x - self.origin.x);
        self.rotate_to(shape, new_angle);
    }

    /// Rotate the shape to an absolute angle in radians.
    pub fn rotate_to(&mut self, shape: &mut Shape, new_angle: f64) {
        let delta = new_angle - shape.rotation_angle_rad;
        if delta.abs() < MIN_ANGLE_DELTA {
            return;
        }
        let (sin, cos) = delta.sin_cos();
        for p in &mut shape.points {
            let x = p.x - self.origin.x;
            let y = p.y - self.origin.y;
            p.x = x * cos - y * sin + self.origin.x;
            p.y = x * sin + y * cos + self.origin.y;
        }
        shape.rotation_angle_rad = new_angle;
        self.sync(shape);
    }

    pub fn rotate_to_degrees(&mut self, shape: &mut Shape, degrees: f64) {
        self.rotate_to(shape, degrees.to_radians());
    }
}
