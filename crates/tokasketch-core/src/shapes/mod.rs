//! Shape entities: geometry, capabilities, interactive behavior.
//!
//! A [`Shape`] owns its markers and interprets every marker movement itself
//! (curve controls, parallelogram side linkage). Resize and rotate handles
//! live in separate rigs that are rebuilt from the shape after mutations.

pub mod element;
pub mod marker;
pub mod metadata;
pub mod resize;
pub mod rotate;

pub use element::{ShapeOptions, ShapeType, TokamakElement};
pub use marker::{Marker, MoveRestriction};
pub use metadata::Metadata;
pub use resize::{HandlePosition, ResizeRig};
pub use rotate::RotateRig;

use crate::geometry::closest_point_on_segment;
use crate::input::Modifiers;
use kurbo::{BezPath, Circle, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Radius of the circle drawn for point-type shapes.
const POINT_RADIUS: f64 = 10.0;
/// Arrowhead geometry for vector-type shapes.
const ARROWHEAD_LENGTH: f64 = 10.0;
const ARROWHEAD_WING_ANGLE: f64 = std::f64::consts::PI / 6.0;
/// Maximum distance from a click to the outline for point insertion.
const MAX_INSERT_DISTANCE: f64 = 20.0;
/// Curve tolerance when flattening the point circle.
const CIRCLE_TOLERANCE: f64 = 0.1;

fn is_false(b: &bool) -> bool {
    !*b
}

/// One point of a shape in the external document format. Y is flipped to
/// Y-up at this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPoint {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "isCurveControl", default, skip_serializing_if = "is_false")]
    pub is_curve_control: bool,
}

/// A shape in the external document format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedShape {
    pub element: TokamakElement,
    pub points: Vec<SerializedPoint>,
    #[serde(default)]
    pub metadata: Value,
}

/// An editable tokamak element on the canvas.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: String,
    pub options: ShapeOptions,
    pub points: Vec<Marker>,
    pub metadata: Option<Metadata>,

    pub is_selected: bool,
    pub is_building: bool,
    pub is_dragging: bool,
    pub has_validation_error: bool,
    pub disable_selection: bool,

    /// Accumulated rotation since selection; reset to 0 on deselect.
    pub rotation_angle_rad: f64,

    /// Preview point tracking the cursor while building.
    ephemeral: Option<Point>,
}

impl Shape {
    /// Create an empty shape in building mode.
    pub fn new(id: impl Into<String>, element: TokamakElement) -> Self {
        Self {
            id: id.into(),
            options: ShapeOptions::for_element(element),
            points: Vec::new(),
            metadata: Metadata::default_for(element),
            is_selected: true,
            is_building: true,
            is_dragging: false,
            has_validation_error: false,
            disable_selection: false,
            rotation_angle_rad: 0.0,
            ephemeral: None,
        }
    }

    pub fn element(&self) -> TokamakElement {
        self.options.element
    }

    pub fn shape_type(&self) -> ShapeType {
        self.options.shape_type
    }

    pub fn ephemeral_point(&self) -> Option<Point> {
        self.ephemeral
    }

    // ---- selection ----------------------------------------------------

    pub fn select(&mut self) {
        if !self.options.selectable || self.disable_selection {
            return;
        }
        self.is_selected = true;
    }

    pub fn deselect(&mut self) {
        self.is_selected = false;
        self.rotation_angle_rad = 0.0;
    }

    pub fn toggle_selection(&mut self) {
        if !self.options.selectable || self.disable_selection {
            return;
        }
        if self.is_selected {
            self.deselect();
        } else {
            self.is_selected = true;
        }
    }

    // ---- derived geometry ---------------------------------------------

    pub fn bounding_box(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let mut rect = Rect::from_points(first.position(), first.position());
        for p in &self.points[1..] {
            rect = rect.union_pt(p.position());
        }
        Some(rect)
    }

    pub fn width(&self) -> f64 {
        self.bounding_box().map_or(0.0, |b| b.width())
    }

    pub fn height(&self) -> f64 {
        self.bounding_box().map_or(0.0, |b| b.height())
    }

    pub fn center(&self) -> Option<Point> {
        self.bounding_box().map(|b| b.center())
    }

    /// Translate the shape so its bounding-box center lands on `center`.
    pub fn set_center(&mut self, center: Point) {
        if let Some(current) = self.center() {
            self.move_by(center.x - current.x, center.y - current.y);
        }
    }

    /// Smaller angle between the first three points of a parallelogram,
    /// in degrees. Zero for other shape types and degenerate sides.
    pub fn first_angle(&self) -> f64 {
        if self.shape_type() != ShapeType::Parallelogram || self.points.len() < 3 {
            return 0.0;
        }
        let p0 = self.points[0].position();
        let p1 = self.points[1].position();
        let p2 = self.points[2].position();

        let v1 = p0 - p1;
        let v2 = p2 - p1;
        let mag1 = v1.hypot();
        let mag2 = v2.hypot();
        if mag1 == 0.0 || mag2 == 0.0 {
            return 0.0;
        }
        let cos_theta = (v1.dot(v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
        cos_theta.acos().to_degrees()
    }

    /// Reposition the third and fourth points so the first-corner angle
    /// becomes `angle` degrees, preserving side length and orientation.
    pub fn set_first_angle(&mut self, angle: f64) {
        if self.shape_type() != ShapeType::Parallelogram || self.points.len() < 4 {
            return;
        }
        let angle_rad = angle.clamp(0.0, 180.0).to_radians();

        let p0 = self.points[0].position();
        let p1 = self.points[1].position();
        let p2 = self.points[2].position();

        let v_ref = p0 - p1;
        let v_rot = p2 - p1;
        let len_rot = v_rot.hypot();
        if len_rot == 0.0 {
            return;
        }

        let cross = v_ref.cross(v_rot);
        let sign = if cross < 0.0 { -1.0 } else { 1.0 };
        let new_angle = v_ref.y.atan2(v_ref.x) + sign * angle_rad;

        let new_p2 = p1 + Vec2::new(len_rot * new_angle.cos(), len_rot * new_angle.sin());
        self.points[2].set_position(new_p2);
        // p3 = p0 + p2 - p1 keeps the opposite sides parallel
        self.points[3]
            .set_position(Point::new(p0.x + new_p2.x - p1.x, p0.y + new_p2.y - p1.y));
    }

    /// Anchor points only (curve controls excluded).
    pub fn anchor_points(&self) -> Vec<Point> {
        self.points
            .iter()
            .filter(|p| !p.is_curve_control)
            .map(|p| p.position())
            .collect()
    }

    pub fn point_positions(&self) -> Vec<Point> {
        self.points.iter().map(|p| p.position()).collect()
    }

    // ---- building -----------------------------------------------------

    /// Track the cursor with the ephemeral preview point. Alt pins the
    /// previous X, Meta pins the previous Y.
    pub fn update_ephemeral(&mut self, position: Point, modifiers: Modifiers) {
        if !self.is_building {
            return;
        }
        let next = match self.ephemeral {
            None => position,
            Some(prev) => Point::new(
                if modifiers.alt { prev.x } else { position.x },
                if modifiers.meta { prev.y } else { position.y },
            ),
        };
        self.ephemeral = Some(next);
    }

    /// Commit the ephemeral point as the next vertex. Returns true when the
    /// shape finished building as a result.
    pub fn place_point(&mut self) -> bool {
        if !self.is_building {
            return false;
        }
        let Some(position) = self.ephemeral else {
            return false;
        };

        match self.shape_type() {
            ShapeType::Polygon => {
                self.add_point(position, None, false, false);
                false
            }
            ShapeType::Parallelogram => {
                self.add_point(position, None, false, false);
                if self.points.len() == 3 {
                    let p0 = self.points[0].position();
                    let p1 = self.points[1].position();
                    let p2 = self.points[2].position();
                    let fourth = Point::new(p2.x - (p1.x - p0.x), p2.y - (p1.y - p0.y));
                    self.add_point(fourth, None, false, false);
                    self.finish_building();
                    return true;
                }
                false
            }
            ShapeType::Point => {
                self.add_point(position, None, false, false);
                self.finish_building();
                true
            }
            ShapeType::Vector => {
                self.add_point(position, None, false, false);
                if self.points.len() == 2 {
                    self.finish_building();
                    return true;
                }
                false
            }
        }
    }

    /// True when `position` is within `tolerance` of the first placed
    /// marker. Closed polygons finish building on this hit.
    pub fn first_marker_hit(&self, position: Point, tolerance: f64) -> bool {
        self.points
            .first()
            .map(|m| (m.position() - position).hypot() <= tolerance)
            .unwrap_or(false)
    }

    pub fn finish_building(&mut self) {
        self.is_building = false;
        self.ephemeral = None;
    }

    /// A closed shape needs 3 anchors, a vector 2, a point 1.
    pub fn has_enough_points(&self) -> bool {
        let anchors = self.points.iter().filter(|p| !p.is_curve_control).count();
        match self.shape_type() {
            ShapeType::Polygon => anchors >= 3,
            ShapeType::Parallelogram => anchors == 4,
            ShapeType::Vector => anchors == 2,
            ShapeType::Point => anchors == 1,
        }
    }

    // ---- point editing ------------------------------------------------

    /// Insert a point. `position` of `None` appends; curve-control requests
    /// are demoted to plain anchors unless the shape already has two
    /// anchors, the insertion index is interior, and both neighbors are
    /// anchors. Deserialization bypasses the demotion rules.
    pub fn add_point(
        &mut self,
        point: Point,
        position: Option<usize>,
        is_curve_control: bool,
        deserialize: bool,
    ) {
        // out-of-range positions become an append
        let position = position.map(|pos| pos.min(self.points.len()));
        let mut is_curve_control = is_curve_control;
        if !deserialize && is_curve_control {
            let anchors = self.points.iter().filter(|p| !p.is_curve_control).count();
            match position {
                None | Some(0) => is_curve_control = false,
                Some(_) if anchors < 2 => is_curve_control = false,
                Some(pos) => {
                    let prev = &self.points[pos - 1];
                    let next = &self.points[if pos >= self.points.len() { 0 } else { pos }];
                    if prev.is_curve_control || next.is_curve_control {
                        is_curve_control = false;
                    }
                }
            }
        }

        let marker = if is_curve_control {
            Marker::curve_control(self.points.len(), point.x, point.y)
        } else {
            Marker::new(self.points.len(), point.x, point.y)
        };
        match position {
            None => self.points.push(marker),
            Some(pos) => self.points.insert(pos, marker),
        }
        self.renumber();
    }

    /// Remove the point with marker id `id`. Only polygons support removal;
    /// an anchor is kept when only three anchors remain, and removing an
    /// anchor also removes its flanking curve controls.
    pub fn remove_point(&mut self, id: usize) {
        if self.is_building || self.shape_type() != ShapeType::Polygon {
            return;
        }
        let Some(index) = self.points.iter().position(|p| p.id == id) else {
            return;
        };
        let anchors = self.points.iter().filter(|p| !p.is_curve_control).count();
        if !self.points[index].is_curve_control && anchors == 3 {
            return;
        }

        let n = self.points.len();
        let prev = if index > 0 { index - 1 } else { n - 1 };
        let next = if index < n - 1 { index + 1 } else { 0 };

        let mut doomed = vec![index];
        if prev != index && self.points[prev].is_curve_control {
            doomed.push(prev);
        }
        if next != index && next != prev && self.points[next].is_curve_control {
            doomed.push(next);
        }
        doomed.sort_unstable();
        for i in doomed.into_iter().rev() {
            self.points.remove(i);
        }
        self.renumber();
    }

    /// Alt-click on the outline: insert a point at the closest edge
    /// projection when it is within range. Shift requests a curve control.
    /// Returns true when a point was inserted.
    pub fn insert_point_on_edge(&mut self, click: Point, want_curve_control: bool) -> bool {
        if !self.options.editable || self.is_building || !self.is_selected {
            return false;
        }
        let n = self.points.len();
        if n < 2 {
            return false;
        }

        let mut best: Option<(usize, Point, f64)> = None;
        for i in 0..n {
            let p1 = self.points[i].position();
            let p2 = if i == n - 1 {
                if !self.options.closed_shape {
                    continue;
                }
                self.points[0].position()
            } else {
                self.points[i + 1].position()
            };
            let (projection, dist_sq) = closest_point_on_segment(click, p1, p2);
            if best.map_or(true, |(_, _, d)| dist_sq < d) {
                best = Some((i, projection, dist_sq));
            }
        }

        match best {
            Some((index, projection, dist_sq))
                if dist_sq <= MAX_INSERT_DISTANCE * MAX_INSERT_DISTANCE =>
            {
                self.add_point(projection, Some(index + 1), want_curve_control, false);
                true
            }
            _ => false,
        }
    }

    /// Move one marker by a raw drag delta. Restrictions and modifier axis
    /// freezes are applied first; curve controls and parallelogram side
    /// pairs get their special handling here.
    pub fn move_point(&mut self, index: usize, dx: f64, dy: f64, modifiers: Modifiers) {
        if index >= self.points.len() {
            return;
        }
        let delta = self.points[index].filtered_delta(dx, dy, modifiers);

        if self.points[index].is_curve_control {
            let target = self.curve_control_target(index, delta, modifiers);
            self.points[index].set_position(target);
            return;
        }

        let p = &mut self.points[index];
        p.x += delta.x;
        p.y += delta.y;

        // Parallelogram sides move in lock-step: 0 with 1, 2 with 3.
        if self.shape_type() == ShapeType::Parallelogram
            && !self.is_building
            && self.points.len() == 4
            && index < 4
        {
            let partner = index ^ 1;
            self.points[partner].x += delta.x;
            self.points[partner].y += delta.y;
        }
    }

    /// New position for a dragged curve control. Without Shift the control
    /// follows the cursor; with Shift it is constrained to the
    /// perpendicular bisector of its neighboring anchors.
    fn curve_control_target(&self, index: usize, delta: Vec2, modifiers: Modifiers) -> Point {
        let current = self.points[index].position();
        let mouse = current + delta;
        if !modifiers.shift {
            return mouse;
        }

        let n = self.points.len();
        let prev = self.points[if index > 0 { index - 1 } else { n - 1 }].position();
        let next = self.points[if index < n - 1 { index + 1 } else { 0 }].position();

        let mid = prev.midpoint(next);
        let perp = Vec2::new(prev.y - next.y, next.x - prev.x);
        let d_sq = perp.hypot2();
        if d_sq <= 1e-9 {
            return mouse;
        }
        let t = (mouse - mid).dot(perp) / d_sq;
        mid + perp * t
    }

    /// Begin a whole-shape drag session. Refused while building, when the
    /// shape is not draggable, or when a session is already active.
    pub fn begin_drag(&mut self) -> bool {
        if self.is_building || !self.options.draggable || self.is_dragging {
            return false;
        }
        self.is_dragging = true;
        true
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    /// Whole-shape translation from a pointer drag. Alt freezes the X
    /// axis and Meta freezes the Y axis, matching marker drags. Refused
    /// while building.
    pub fn drag_by(&mut self, dx: f64, dy: f64, modifiers: Modifiers) {
        if self.is_building || !self.options.draggable {
            return;
        }
        self.move_by(
            if modifiers.alt { 0.0 } else { dx },
            if modifiers.meta { 0.0 } else { dy },
        );
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    fn renumber(&mut self) {
        for (i, p) in self.points.iter_mut().enumerate() {
            p.id = i;
        }
    }

    // ---- outline path --------------------------------------------------

    /// Outline path in local coordinates, including the ephemeral preview
    /// segment while building. Empty shapes have no path.
    pub fn to_path(&self) -> Option<BezPath> {
        let first = self.points.first()?;

        let mut path = match self.shape_type() {
            ShapeType::Point => Circle::new(first.position(), POINT_RADIUS)
                .to_path(CIRCLE_TOLERANCE),
            ShapeType::Vector => {
                let mut path = BezPath::new();
                path.move_to(first.position());
                if self.points.len() == 2 {
                    let p0 = first.position();
                    let p1 = self.points[1].position();
                    path.line_to(p1);

                    let angle = (p1.y - p0.y).atan2(p1.x - p0.x);
                    let wing = |side: f64| {
                        Point::new(
                            p1.x - ARROWHEAD_LENGTH * (angle + side * ARROWHEAD_WING_ANGLE).cos(),
                            p1.y - ARROWHEAD_LENGTH * (angle + side * ARROWHEAD_WING_ANGLE).sin(),
                        )
                    };
                    path.move_to(wing(-1.0));
                    path.line_to(p1);
                    path.line_to(wing(1.0));
                }
                path
            }
            ShapeType::Polygon => self.polygon_path(),
            ShapeType::Parallelogram => {
                let mut path = BezPath::new();
                path.move_to(first.position());
                for p in &self.points[1..] {
                    path.line_to(p.position());
                }
                path
            }
        };

        if let Some(ephemeral) = self.ephemeral {
            if self.shape_type() != ShapeType::Point {
                path.line_to(ephemeral);
            }
        }
        if !self.is_building && self.options.closed_shape && self.shape_type() != ShapeType::Point {
            path.close_path();
        }
        Some(path)
    }

    /// Anchor-and-curve-control chain. Each curve control M bends the
    /// segment between its neighbors into the quadratic whose control point
    /// is 2M - 0.5*P0 - 0.5*P2, so the curve passes through M at t = 0.5.
    fn polygon_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut pen = self.points[0].position();
        path.move_to(pen);

        let n = self.points.len();
        let mut i = 1;
        while i < n {
            let current = &self.points[i];
            if current.is_curve_control {
                let m = current.position();
                let (p2, advance) = if i + 1 < n {
                    (self.points[i + 1].position(), 2)
                } else {
                    // trailing control bends the closing segment
                    (self.points[0].position(), 1)
                };
                let ctrl = Point::new(
                    2.0 * m.x - 0.5 * pen.x - 0.5 * p2.x,
                    2.0 * m.y - 0.5 * pen.y - 0.5 * p2.y,
                );
                path.quad_to(ctrl, p2);
                pen = p2;
                i += advance;
            } else {
                pen = current.position();
                path.line_to(pen);
                i += 1;
            }
        }
        path
    }

    // ---- serialization -------------------------------------------------

    /// Snapshot in the external Y-up document format.
    pub fn serialize(&self) -> SerializedShape {
        SerializedShape {
            element: self.element(),
            points: self
                .points
                .iter()
                .map(|p| SerializedPoint {
                    x: p.x,
                    y: -p.y,
                    is_curve_control: p.is_curve_control,
                })
                .collect(),
            metadata: self
                .metadata
                .as_ref()
                .map(Metadata::to_value)
                .unwrap_or(Value::Null),
        }
    }

    /// Rebuild a shape from the external document format. The result is
    /// finished and deselected.
    pub fn deserialize(id: impl Into<String>, serialized: &SerializedShape) -> Self {
        let mut shape = Shape::new(id, serialized.element);
        for p in &serialized.points {
            shape.add_point(Point::new(p.x, -p.y), None, p.is_curve_control, true);
        }
        if let Some(meta) = Metadata::from_element_value(serialized.element, &serialized.metadata) {
            shape.metadata = Some(meta);
        }
        shape.finish_building();
        shape.is_selected = false;
        shape
    }
}
