//! TokaSketch Core Library
//!
//! Platform-agnostic data model and interaction logic for the tokamak
//! cross-section editor.

pub mod geometry;
pub mod input;
pub mod plasma;
pub mod shapes;
pub mod storage;
pub mod store;
pub mod validation;
pub mod viewport;

pub use input::{InputState, Modifiers, MouseButton, PointerEvent};
pub use plasma::{plasma_boundary, PlasmaShape};
pub use shapes::{
    Marker, Metadata, MoveRestriction, SerializedShape, Shape, ShapeOptions, ShapeType,
    TokamakElement,
};
pub use store::{BackgroundImage, ExportDocument, ShapeStore, EXPORT_VERSION};
pub use validation::{run_validation, ValidationIssue, ValidationIssueKind};
pub use viewport::Viewport;
