//! Draggable point entity.
//!
//! Markers are the vertices of every shape and double as resize/rotate
//! handles. A marker knows how its own movement is restricted; what a
//! movement *means* (curve-control repositioning, parallelogram linkage,
//! handle-driven resize) is decided by the owning shape or rig, which is
//! authoritative for markers flagged as derived.

use crate::input::Modifiers;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Which axes a marker may move along when dragged directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveRestriction {
    Horizontal,
    Vertical,
    #[default]
    Both,
}

/// A mutable 2D point with drag state.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Position-dependent index within the owning sequence; reassigned
    /// whenever sibling markers are inserted or removed.
    pub id: usize,
    pub x: f64,
    pub y: f64,
    /// True for a synthetic midpoint that bends the segment between its
    /// neighbors into a quadratic curve.
    pub is_curve_control: bool,
    /// Transient: a drag session is active on this marker.
    pub is_dragging: bool,
    pub move_restriction: MoveRestriction,
    /// True when an owner recomputes this marker's coordinates (resize and
    /// rotate handles, curve controls); direct drags then only report
    /// deltas and the owner sets the final position.
    pub is_derived_position: bool,
}

impl Marker {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            is_curve_control: false,
            is_dragging: false,
            move_restriction: MoveRestriction::Both,
            is_derived_position: false,
        }
    }

    pub fn curve_control(id: usize, x: f64, y: f64) -> Self {
        Self {
            is_curve_control: true,
            is_derived_position: true,
            ..Self::new(id, x, y)
        }
    }

    pub fn handle(id: usize, x: f64, y: f64, restriction: MoveRestriction) -> Self {
        Self {
            move_restriction: restriction,
            is_derived_position: true,
            ..Self::new(id, x, y)
        }
    }

    pub fn position(&self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: kurbo::Point) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Begin a drag session. Exactly one session may be active per marker;
    /// returns false if one already is.
    pub fn start_drag(&mut self) -> bool {
        if self.is_dragging {
            return false;
        }
        self.is_dragging = true;
        true
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    /// Filter a raw drag delta through the movement restriction and the
    /// modifier axis freezes (Alt pins X, Meta pins Y).
    pub fn filtered_delta(&self, dx: f64, dy: f64, modifiers: Modifiers) -> Vec2 {
        let dx = if self.move_restriction == MoveRestriction::Vertical || modifiers.alt {
            0.0
        } else {
            dx
        };
        let dy = if self.move_restriction == MoveRestriction::Horizontal || modifiers.meta {
            0.0
        } else {
            dy
        };
        Vec2::new(dx, dy)
    }

    /// Apply a filtered delta directly. Derived markers are not moved here;
    /// their owner recomputes the position from the reported delta.
    pub fn apply_delta(&mut self, delta: Vec2) {
        if self.is_derived_position {
            return;
        }
        self.x += delta.x;
        self.y += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_drag_session() {
        let mut m = Marker::new(0, 0.0, 0.0);
        assert!(m.start_drag());
        assert!(!m.start_drag());
        m.end_drag();
        assert!(m.start_drag());
    }

    #[test]
    fn test_move_restriction_filters_axis() {
        let mut m = Marker::new(0, 0.0, 0.0);
        m.move_restriction = MoveRestriction::Vertical;
        let d = m.filtered_delta(5.0, 7.0, Modifiers::default());
        assert_eq!(d, Vec2::new(0.0, 7.0));

        m.move_restriction = MoveRestriction::Horizontal;
        let d = m.filtered_delta(5.0, 7.0, Modifiers::default());
        assert_eq!(d, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_modifiers_freeze_axes() {
        let m = Marker::new(0, 0.0, 0.0);
        let alt = Modifiers {
            alt: true,
            ..Default::default()
        };
        assert_eq!(m.filtered_delta(5.0, 7.0, alt), Vec2::new(0.0, 7.0));

        let meta = Modifiers {
            meta: true,
            ..Default::default()
        };
        assert_eq!(m.filtered_delta(5.0, 7.0, meta), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_derived_marker_ignores_direct_moves() {
        let mut m = Marker::handle(0, 1.0, 2.0, MoveRestriction::Both);
        m.apply_delta(Vec2::new(10.0, 10.0));
        assert_eq!((m.x, m.y), (1.0, 2.0));
    }

    #[test]
    fn test_plain_marker_moves() {
        let mut m = Marker::new(0, 1.0, 2.0);
        m.apply_delta(Vec2::new(10.0, -2.0));
        assert_eq!((m.x, m.y), (11.0, 0.0));
    }
}
