//! Tokamak element classification and per-element capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometric family of a shape. Determines how points are collected while
/// building and how the outline path is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    /// Arbitrary closed or open chain of points.
    Polygon,
    /// Four points with opposite sides kept parallel.
    Parallelogram,
    /// Two points rendered as an arrow.
    Vector,
    /// A single point rendered as a circle.
    Point,
}

/// Physical element a shape represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokamakElement {
    Vessel,
    Limiter,
    Coil,
    Passive,
    Probe,
    Loop,
    TfCoil,
    Blanket,
}

impl TokamakElement {
    pub const ALL: [TokamakElement; 8] = [
        TokamakElement::Vessel,
        TokamakElement::Limiter,
        TokamakElement::Coil,
        TokamakElement::Passive,
        TokamakElement::Probe,
        TokamakElement::Loop,
        TokamakElement::TfCoil,
        TokamakElement::Blanket,
    ];
}

impl fmt::Display for TokamakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokamakElement::Vessel => "vessel",
            TokamakElement::Limiter => "limiter",
            TokamakElement::Coil => "coil",
            TokamakElement::Passive => "passive",
            TokamakElement::Probe => "probe",
            TokamakElement::Loop => "loop",
            TokamakElement::TfCoil => "tf_coil",
            TokamakElement::Blanket => "blanket",
        };
        f.write_str(s)
    }
}

/// Capability flags attached to every shape at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeOptions {
    pub element: TokamakElement,
    #[serde(rename = "shapeType")]
    pub shape_type: ShapeType,
    pub draggable: bool,
    pub selectable: bool,
    /// Closed shapes connect the last point back to the first.
    #[serde(rename = "closedShape")]
    pub closed_shape: bool,
    pub resizeable: bool,
    /// Editable shapes support point insertion, removal and curve controls.
    pub editable: bool,
    pub rotatable: bool,
}

impl ShapeOptions {
    /// Capability table per element. All shapes are draggable and selectable;
    /// the rest varies by geometry.
    pub fn for_element(element: TokamakElement) -> Self {
        use TokamakElement::*;
        let (shape_type, closed_shape, resizeable, editable, rotatable) = match element {
            Vessel | Limiter | TfCoil | Blanket => (ShapeType::Polygon, true, true, true, true),
            Coil | Passive => (ShapeType::Parallelogram, true, true, false, true),
            Probe => (ShapeType::Vector, false, false, false, false),
            Loop => (ShapeType::Point, true, false, false, false),
        };
        Self {
            element,
            shape_type,
            draggable: true,
            selectable: true,
            closed_shape,
            resizeable,
            editable,
            rotatable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_wire_names() {
        assert_eq!(
            serde_json::to_string(&TokamakElement::TfCoil).unwrap(),
            "\"tf_coil\""
        );
        assert_eq!(
            serde_json::to_string(&ShapeType::Parallelogram).unwrap(),
            "\"parallelogram\""
        );
    }

    #[test]
    fn test_capability_table() {
        let vessel = ShapeOptions::for_element(TokamakElement::Vessel);
        assert_eq!(vessel.shape_type, ShapeType::Polygon);
        assert!(vessel.editable && vessel.resizeable && vessel.rotatable);

        let coil = ShapeOptions::for_element(TokamakElement::Coil);
        assert_eq!(coil.shape_type, ShapeType::Parallelogram);
        assert!(!coil.editable);
        assert!(coil.resizeable && coil.rotatable);

        let probe = ShapeOptions::for_element(TokamakElement::Probe);
        assert_eq!(probe.shape_type, ShapeType::Vector);
        assert!(!probe.closed_shape);
        assert!(!probe.resizeable && !probe.editable && !probe.rotatable);

        let lp = ShapeOptions::for_element(TokamakElement::Loop);
        assert_eq!(lp.shape_type, ShapeType::Point);
        assert!(lp.closed_shape);
        assert!(!lp.resizeable);
    }

    #[test]
    fn test_all_elements_draggable_selectable() {
        for element in TokamakElement::ALL {
            let opts = ShapeOptions::for_element(element);
            assert!(opts.draggable && opts.selectable, "{element}");
        }
    }

    #[test]
    fn test_options_roundtrip() {
        let opts = ShapeOptions::for_element(TokamakElement::Blanket);
        let json = serde_json::to_value(opts).unwrap();
        assert_eq!(json["shapeType"], "polygon");
        assert_eq!(json["closedShape"], true);
        let back: ShapeOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, opts);
    }
}
