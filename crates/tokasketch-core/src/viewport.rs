//! Pan/zoom coordinate transform between device and local space.
//!
//! The editor core never sees raw device coordinates: the host feeds every
//! pointer event through [`Viewport::screen_to_local`] first. Local space
//! is Y-down; the Y-up flip happens only at the serialization boundary.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// View transform state for the infinite canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Pan offset in device pixels.
    pub pan: Vec2,
    /// Zoom factor (device pixels per local unit).
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.05,
            max_zoom: 40.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local-to-device transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Map a device point into local shape coordinates.
    pub fn screen_to_local(&self, screen: Point) -> Point {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan) * screen
    }

    /// Map a local point into device coordinates.
    pub fn local_to_screen(&self, local: Point) -> Point {
        self.transform() * local
    }

    /// Pan by a device-pixel delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the local point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.screen_to_local(screen);
        self.zoom = new_zoom;
        let shifted = self.local_to_screen(anchor);
        self.pan += Vec2::new(screen.x - shifted.x, screen.y - shifted.y);
    }

    /// Frame a local bounding box inside the viewport with padding.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
            return;
        }
        let usable = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        self.zoom = (usable.width / bounds.width())
            .min(usable.height / bounds.height())
            .clamp(self.min_zoom, self.max_zoom);

        let center = bounds.center();
        self.pan = Vec2::new(
            viewport.width / 2.0 - center.x * self.zoom,
            viewport.height / 2.0 - center.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_roundtrip() {
        let vp = Viewport::new();
        let p = Point::new(42.0, -17.0);
        assert_eq!(vp.screen_to_local(p), p);
    }

    #[test]
    fn test_roundtrip_with_pan_and_zoom() {
        let mut vp = Viewport::new();
        vp.pan = Vec2::new(30.0, -20.0);
        vp.zoom = 1.5;

        let screen = Point::new(123.0, 456.0);
        let back = vp.local_to_screen(vp.screen_to_local(screen));
        assert!((back.x - screen.x).abs() < 1e-10);
        assert!((back.y - screen.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut vp = Viewport::new();
        let screen = Point::new(200.0, 150.0);
        let before = vp.screen_to_local(screen);
        vp.zoom_at(screen, 2.0);
        let after = vp.screen_to_local(screen);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::new();
        vp.zoom_at(Point::ZERO, 1e-6);
        assert!((vp.zoom - vp.min_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut vp = Viewport::new();
        vp.fit_to_bounds(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Size::new(500.0, 500.0),
            50.0,
        );
        let center = vp.local_to_screen(Point::new(50.0, 50.0));
        assert!((center.x - 250.0).abs() < 1e-9);
        assert!((center.y - 250.0).abs() < 1e-9);
    }
}
