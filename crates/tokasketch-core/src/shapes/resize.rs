//! Bounding-box resize rig with eight handles.
//!
//! The rig is created when a resizeable shape is selected and must be
//! resynced with [`ResizeRig::sync`] after any mutation that changes the
//! bounding box. Handle positions are derived; dragging a handle feeds the
//! delta back through [`ResizeRig::resize_shape`].

use super::marker::{Marker, MoveRestriction};
use super::Shape;
use crate::input::Modifiers;
use kurbo::Rect;

/// Gap between the bounding box and the handles.
const HANDLE_PADDING: f64 = 12.0;
/// A resize never shrinks the box below this size on either axis.
const MIN_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePosition {
    TopLeft,
    TopMiddle,
    TopRight,
    RightMiddle,
    BottomRight,
    BottomMiddle,
    BottomLeft,
    LeftMiddle,
}

impl HandlePosition {
    pub const ALL: [HandlePosition; 8] = [
        HandlePosition::TopLeft,
        HandlePosition::TopMiddle,
        HandlePosition::TopRight,
        HandlePosition::RightMiddle,
        HandlePosition::BottomRight,
        HandlePosition::BottomMiddle,
        HandlePosition::BottomLeft,
        HandlePosition::LeftMiddle,
    ];

    fn is_corner(self) -> bool {
        matches!(
            self,
            HandlePosition::TopLeft
                | HandlePosition::TopRight
                | HandlePosition::BottomRight
                | HandlePosition::BottomLeft
        )
    }

    fn moves_left(self) -> bool {
        matches!(
            self,
            HandlePosition::TopLeft | HandlePosition::BottomLeft | HandlePosition::LeftMiddle
        )
    }

    fn moves_right(self) -> bool {
        matches!(
            self,
            HandlePosition::TopRight | HandlePosition::BottomRight | HandlePosition::RightMiddle
        )
    }

    fn moves_top(self) -> bool {
        matches!(
            self,
            HandlePosition::TopLeft | HandlePosition::TopMiddle | HandlePosition::TopRight
        )
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            HandlePosition::BottomLeft | HandlePosition::BottomMiddle | HandlePosition::BottomRight
        )
    }

    fn restriction(self) -> MoveRestriction {
        match self {
            HandlePosition::TopMiddle | HandlePosition::BottomMiddle => MoveRestriction::Vertical,
            HandlePosition::LeftMiddle | HandlePosition::RightMiddle => MoveRestriction::Horizontal,
            _ => MoveRestriction::Both,
        }
    }

    fn anchor(self, bbox: Rect, padding: f64) -> (f64, f64) {
        let mid_x = bbox.min_x() + bbox.width() / 2.0;
        let mid_y = bbox.min_y() + bbox.height() / 2.0;
        match self {
            HandlePosition::TopLeft => (bbox.min_x() - padding, bbox.min_y() - padding),
            HandlePosition::TopMiddle => (mid_x, bbox.min_y() - padding),
            HandlePosition::TopRight => (bbox.max_x() + padding, bbox.min_y() - padding),
            HandlePosition::RightMiddle => (bbox.max_x() + padding, mid_y),
            HandlePosition::BottomRight => (bbox.max_x() + padding, bbox.max_y() + padding),
            HandlePosition::BottomMiddle => (mid_x, bbox.max_y() + padding),
            HandlePosition::BottomLeft => (bbox.min_x() - padding, bbox.max_y() + padding),
            HandlePosition::LeftMiddle => (bbox.min_x() - padding, mid_y),
        }
    }
}

/// Eight derived-position markers around a shape's bounding box.
#[derive(Debug, Clone, Default)]
pub struct ResizeRig {
    pub handles: Vec<Marker>,
}

impl ResizeRig {
    /// Build the rig for a shape. Shapes without a bounding box get an
    /// empty rig.
    pub fn for_shape(shape: &Shape) -> Self {
        let mut rig = Self::default();
        rig.sync(shape);
        rig
    }

    /// Recompute handle positions from the shape's current bounding box.
    pub fn sync(&mut self, shape: &Shape) {
        let Some(bbox) = shape.bounding_box() else {
            self.handles.clear();
            return;
        };
        if self.handles.len() != HandlePosition::ALL.len() {
            self.handles = HandlePosition::ALL
                .iter()
                .enumerate()
                .map(|(i, pos)| {
                    let (x, y) = pos.anchor(bbox, HANDLE_PADDING);
                    Marker::handle(i, x, y, pos.restriction())
                })
                .collect();
        } else {
            for (i, pos) in HandlePosition::ALL.iter().enumerate() {
                let (x, y) = pos.anchor(bbox, HANDLE_PADDING);
                self.handles[i].x = x;
                self.handles[i].y = y;
            }
        }
    }

    /// Apply a handle drag to the shape. Shift locks the aspect ratio on
    /// corner handles by projecting the delta onto the aspect diagonal.
    /// Points are rescaled by normalized bounding-box coordinates; a
    /// degenerate axis translates instead of scaling.
    pub fn resize_shape(
        &mut self,
        shape: &mut Shape,
        handle: HandlePosition,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    ) {
        let Some(old_box) = shape.bounding_box() else {
            return;
        };
        let old_width = old_box.width();
        let old_height = old_box.height();

        let index = HandlePosition::ALL.iter().position(|p| *p == handle);
        let (dx, dy) = if let Some(i) = index {
            let filtered = self.handles.get(i).map_or_else(
                || kurbo::Vec2::new(dx, dy),
                |h| h.filtered_delta(dx, dy, modifiers),
            );
            (filtered.x, filtered.y)
        } else {
            (dx, dy)
        };

        let (mut dx, mut dy) = (dx, dy);
        if modifiers.shift && old_width != 0.0 && old_height != 0.0 && handle.is_corner() {
            let aspect = old_width / old_height;
            let sign = match handle {
                HandlePosition::TopRight | HandlePosition::BottomLeft => -1.0,
                _ => 1.0,
            };
            let scale = (dx * aspect + dy * sign) / (aspect * aspect + 1.0);
            dx = scale * aspect;
            dy = scale * sign;
        }

        let mut min_x = old_box.min_x();
        let mut min_y = old_box.min_y();
        let mut max_x = old_box.max_x();
        let mut max_y = old_box.max_y();

        if handle.moves_left() {
            min_x += dx;
        }
        if handle.moves_right() {
            max_x += dx;
        }
        if handle.moves_top() {
            min_y += dy;
        }
        if handle.moves_bottom() {
            max_y += dy;
        }

        // clamp instead of letting an edge cross its opposite
        if handle.moves_left() && max_x - min_x < MIN_SIZE {
            min_x = max_x - MIN_SIZE;
        }
        if handle.moves_right() && max_x - old_box.min_x() < MIN_SIZE {
            max_x = old_box.min_x() + MIN_SIZE;
        }
        if handle.moves_top() && max_y - min_y < MIN_SIZE {
            min_y = max_y - MIN_SIZE;
        }
        if handle.moves_bottom() && max_y - old_box.min_y() < MIN_SIZE {
            max_y = old_box.min_y() + MIN_SIZE;
        }

        let new_width = max_x - min_x;
        let new_height = max_y - min_y;

        for p in &mut shape.points {
            p.x = if old_width == 0.0 {
                min_x
            } else {
                min_x + (p.x - old_box.min_x()) / old_width * new_width
            };
            p.y = if old_height == 0.0 {
                min_y
            } else {
                min_y + (p.y - old_box.min_y()) / old_height * new_height
            };
        }

        self.sync(shape);
    }

    /// Inspector-driven absolute resize. Deltas are applied through the
    /// bottom-right handle so the top-left corner stays fixed.
    pub fn resize_to(
        &mut self,
        shape: &mut Shape,
        width: Option<f64>,
        height: Option<f64>,
    ) {
        if shape.bounding_box().is_none() {
            return;
        }
        let dx = width.map_or(0.0, |w| w - shape.width());
        let dy = height.map_or(0.0, |h| h - shape.height());
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.resize_shape(
            shape,
            HandlePosition::BottomRight,
            dx,
            dy,
            Modifiers::default(),
        );
    }
}
