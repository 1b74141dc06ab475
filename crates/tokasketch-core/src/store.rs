//! Document store: the shape collection, undo history, and export format.
//!
//! History is snapshot based. The host drives [`ShapeStore::tick`] from its
//! event loop; a changed document must stay settled for the debounce window
//! before a snapshot is recorded, so mid-drag states never enter the stack.
//! Validation also runs from `tick` and is skipped while the user is
//! interacting or a shape is still being built.

use crate::input::Modifiers;
use crate::plasma::{boundary_path, PlasmaShape};
use crate::shapes::{SerializedShape, Shape, ShapeType, TokamakElement};
use crate::validation::{run_validation, ValidationIssue};
use chrono::{SecondsFormat, Utc};
use kurbo::{BezPath, Point};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const ID_ALPHABET: &[u8] = b"1234567890ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_LENGTH: usize = 8;
const MAX_UNDO_STACK_SIZE: usize = 100;
const SNAPSHOT_DEBOUNCE: Duration = Duration::from_millis(500);
/// Clicks within this distance of the first marker close a polygon.
const CLOSE_TOLERANCE: f64 = 10.0;

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Random 8-character uppercase alphanumeric id.
fn random_id() -> String {
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut state = nanos ^ counter.wrapping_mul(0x517cc1b727220a95);
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[(splitmix64(&mut state) % ID_ALPHABET.len() as u64) as usize] as char)
        .collect()
}

/// Reference image shown behind the canvas. The image itself is a host
/// concern; the store only keeps the placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub opacity: f64,
    /// Host-side locator for the image, if one is loaded.
    pub source: Option<String>,
    pub center: Point,
    pub width: f64,
}

impl Default for BackgroundImage {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            source: None,
            center: Point::new(300.0, 300.0),
            width: 500.0,
        }
    }
}

/// Top-level document exchanged with files and storage backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: String,
    #[serde(rename = "exportedAt")]
    pub exported_at: String,
    pub shapes: Vec<SerializedShape>,
    #[serde(rename = "plasmaShape")]
    pub plasma_shape: PlasmaShape,
}

pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug)]
pub struct ShapeStore {
    pub shapes: Vec<Shape>,
    pub plasma_shape: PlasmaShape,
    pub background_image: BackgroundImage,
    pub validation_issues: Vec<ValidationIssue>,

    interacting: bool,
    undo_stack: Vec<String>,
    undo_cursor: Option<usize>,
    dirty_since: Option<Instant>,
    revision: u64,
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeStore {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            plasma_shape: PlasmaShape::default(),
            background_image: BackgroundImage::default(),
            validation_issues: Vec::new(),
            interacting: false,
            undo_stack: Vec::new(),
            undo_cursor: None,
            dirty_since: None,
            revision: 0,
        }
    }

    /// Monotonic counter bumped whenever the savable state changes.
    /// Autosave compares this against what it last wrote.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ---- interaction flag ----------------------------------------------

    /// Mirror of the host's pointer-down state. While set, validation and
    /// history snapshots are held back.
    pub fn set_interacting(&mut self, interacting: bool) {
        self.interacting = interacting;
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    // ---- queries --------------------------------------------------------

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_mut(&mut self, id: &str) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn unfinished_shape(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_building)
    }

    pub fn unfinished_shape_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.is_building)
    }

    pub fn selected_shapes(&self) -> Vec<&Shape> {
        self.shapes.iter().filter(|s| s.is_selected).collect()
    }

    // ---- creation --------------------------------------------------------

    /// True when another finished shape of this element may be created.
    /// Only the limiter is capped (at one).
    pub fn can_create(&self, element: TokamakElement) -> bool {
        self.within_limit(element, false)
    }

    fn within_limit(&self, element: TokamakElement, include_unfinished: bool) -> bool {
        let count = self
            .shapes
            .iter()
            .filter(|s| s.element() == element)
            .filter(|s| include_unfinished || !s.is_building)
            .count();
        match element {
            TokamakElement::Limiter => count < 1,
            _ => true,
        }
    }

    fn safe_shape_id(&self) -> String {
        let mut id = random_id();
        while self.shapes.iter().any(|s| s.id == id) {
            id = random_id();
        }
        id
    }

    /// Start building a shape of the given element, or cancel building.
    ///
    /// Requesting the element already being built cancels it; requesting a
    /// different one replaces the in-progress shape. Returns the new
    /// shape's id, or `None` when the request cancelled or hit a limit.
    pub fn toggle_create(&mut self, element: TokamakElement) -> Option<String> {
        if self.delete_unfinished(Some(element)) {
            self.sync_selection_lock();
            return None;
        }
        self.delete_unfinished(None);
        if !self.within_limit(element, true) {
            info!("creation limit reached for {element}");
            self.sync_selection_lock();
            return None;
        }

        let shape = Shape::new(self.safe_shape_id(), element);
        let id = shape.id.clone();
        debug!("building new {element} shape {id}");
        self.shapes.push(shape);
        self.sync_selection_lock();
        Some(id)
    }

    /// Remove unfinished shapes, optionally only of one element. Returns
    /// true when anything was removed.
    pub fn delete_unfinished(&mut self, element: Option<TokamakElement>) -> bool {
        let before = self.shapes.len();
        self.shapes
            .retain(|s| !(s.is_building && element.map_or(true, |e| s.element() == e)));
        self.shapes.len() != before
    }

    /// While a shape is being built, nothing else may be selected.
    fn sync_selection_lock(&mut self) {
        let building = self.shapes.iter().any(|s| s.is_building);
        for shape in &mut self.shapes {
            shape.disable_selection = building;
        }
    }

    // ---- building input --------------------------------------------------

    /// Forward cursor movement to the shape under construction.
    pub fn pointer_moved(&mut self, position: Point, modifiers: Modifiers) {
        if let Some(shape) = self.unfinished_shape_mut() {
            shape.update_ephemeral(position, modifiers);
        }
    }

    /// A click on the canvas while building: closes a polygon when the
    /// first marker is hit, otherwise commits the preview point. Returns
    /// true when the shape finished building.
    pub fn canvas_click(&mut self, position: Point) -> bool {
        let Some(shape) = self.unfinished_shape_mut() else {
            return false;
        };
        let finished = if shape.shape_type() == ShapeType::Polygon
            && shape.first_marker_hit(position, CLOSE_TOLERANCE)
        {
            shape.finish_building();
            true
        } else {
            shape.place_point()
        };
        if finished {
            self.sync_selection_lock();
        }
        finished
    }

    // ---- selection and removal -------------------------------------------

    /// A click on a finished shape: exclusive selection, or a toggle that
    /// leaves other selections alone when Shift is held. Ignored while a
    /// shape is being built.
    pub fn click_shape(&mut self, id: &str, modifiers: Modifiers) {
        if self.unfinished_shape().is_some() {
            return;
        }
        if modifiers.shift {
            if let Some(shape) = self.shape_mut(id) {
                shape.toggle_selection();
            }
            return;
        }
        for shape in &mut self.shapes {
            if shape.id == id {
                shape.select();
            } else if !shape.is_building {
                shape.deselect();
            }
        }
    }

    pub fn deselect_all(&mut self) {
        for shape in &mut self.shapes {
            if !shape.is_building {
                shape.deselect();
            }
        }
    }

    pub fn delete_shape(&mut self, id: &str) -> bool {
        let before = self.shapes.len();
        self.shapes.retain(|s| s.id != id);
        let removed = self.shapes.len() != before;
        if removed {
            self.sync_selection_lock();
        }
        removed
    }

    // ---- history ---------------------------------------------------------

    /// Advance the debounced snapshot and validation machinery. The host
    /// calls this periodically (and after mutations) with a monotonic now.
    pub fn tick(&mut self, now: Instant) {
        if self.interacting || self.unfinished_shape().is_some() {
            self.dirty_since = None;
            return;
        }

        self.validation_issues = run_validation(&mut self.shapes);

        let serialized = match serde_json::to_string(&self.serialize_shapes()) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to serialize shapes for history: {e}");
                return;
            }
        };
        let current = self.undo_cursor.and_then(|c| self.undo_stack.get(c));
        if current == Some(&serialized) {
            self.dirty_since = None;
            return;
        }

        match self.dirty_since {
            None => self.dirty_since = Some(now),
            Some(since) if now.duration_since(since) >= SNAPSHOT_DEBOUNCE => {
                self.push_snapshot(serialized);
                self.dirty_since = None;
            }
            Some(_) => {}
        }
    }

    fn push_snapshot(&mut self, serialized: String) {
        // drop any redo branch beyond the cursor
        let keep = self.undo_cursor.map_or(0, |c| c + 1);
        self.undo_stack.truncate(keep);
        self.undo_stack.push(serialized);
        self.undo_cursor = Some(self.undo_stack.len() - 1);

        if self.undo_stack.len() > MAX_UNDO_STACK_SIZE {
            self.undo_stack.remove(0);
            self.undo_cursor = Some(self.undo_stack.len() - 1);
        }
        self.revision += 1;
        debug!(
            "history snapshot recorded, depth {} cursor {:?}",
            self.undo_stack.len(),
            self.undo_cursor
        );
    }

    pub fn can_undo(&self) -> bool {
        self.undo_cursor.map_or(false, |c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.undo_cursor
            .map_or(false, |c| c + 1 < self.undo_stack.len())
    }

    pub fn undo(&mut self) {
        if !self.can_undo() {
            return;
        }
        let cursor = self.undo_cursor.unwrap_or(0) - 1;
        self.undo_cursor = Some(cursor);
        self.restore_snapshot(cursor);
    }

    pub fn redo(&mut self) {
        if !self.can_redo() {
            return;
        }
        let cursor = self.undo_cursor.unwrap_or(0) + 1;
        self.undo_cursor = Some(cursor);
        self.restore_snapshot(cursor);
    }

    fn restore_snapshot(&mut self, cursor: usize) {
        let Some(snapshot) = self.undo_stack.get(cursor) else {
            return;
        };
        match serde_json::from_str::<Vec<SerializedShape>>(snapshot) {
            Ok(shapes) => {
                self.shapes.clear();
                self.deserialize_shapes(&shapes);
                self.sync_selection_lock();
                self.validation_issues = run_validation(&mut self.shapes);
                self.revision += 1;
            }
            Err(e) => error!("failed to restore history snapshot: {e}"),
        }
    }

    // ---- serialization ---------------------------------------------------

    pub fn serialize_shapes(&self) -> Vec<SerializedShape> {
        self.shapes.iter().map(Shape::serialize).collect()
    }

    /// Rebuild shapes from serialized records, assigning fresh ids.
    pub fn deserialize_shapes(&mut self, data: &[SerializedShape]) {
        for serialized in data {
            let shape = Shape::deserialize(self.safe_shape_id(), serialized);
            self.shapes.push(shape);
        }
    }

    /// Snapshot the whole document for export or persistence.
    pub fn export(&self) -> ExportDocument {
        ExportDocument {
            version: EXPORT_VERSION.to_string(),
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            shapes: self.serialize_shapes(),
            plasma_shape: self.plasma_shape.clone(),
        }
    }

    /// Replace the document with imported data. History is reset; the
    /// imported state becomes the new baseline on the next tick.
    pub fn import(&mut self, document: &ExportDocument) {
        info!(
            "importing document version {} with {} shape(s)",
            document.version,
            document.shapes.len()
        );
        self.shapes.clear();
        self.undo_stack.clear();
        self.undo_cursor = None;
        self.dirty_since = None;
        self.deserialize_shapes(&document.shapes);
        self.plasma_shape = document.plasma_shape.clone();
        self.sync_selection_lock();
        self.validation_issues = run_validation(&mut self.shapes);
        self.revision += 1;
    }

    /// Import a document from its JSON text. Malformed input is logged
    /// and leaves the store untouched. Returns true on success.
    pub fn import_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<ExportDocument>(json) {
            Ok(document) => {
                self.import(&document);
                true
            }
            Err(e) => {
                error!("failed to parse imported document: {e}");
                false
            }
        }
    }

    // ---- plasma ----------------------------------------------------------

    pub fn set_plasma_shape(&mut self, plasma: PlasmaShape) {
        if self.plasma_shape != plasma {
            self.plasma_shape = plasma;
            self.revision += 1;
        }
    }

    /// Render path for the plasma boundary, `None` while hidden.
    pub fn plasma_shape_path(&self) -> Option<BezPath> {
        if !self.plasma_shape.show {
            return None;
        }
        boundary_path(&self.plasma_shape.boundary())
    }
}
