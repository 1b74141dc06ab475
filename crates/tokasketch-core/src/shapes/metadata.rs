//! Per-element engineering metadata carried alongside shape geometry.
//!
//! The variants serialize to the same camelCase records the export format
//! uses. Coil and passive records share several field names, so parsing is
//! always keyed by the owning element rather than inferred from the value.

use super::element::TokamakElement;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoilMetadata {
    pub name: String,
    pub turns: f64,
    pub resistance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inductance: Option<f64>,
    #[serde(rename = "maxCurrent", default, skip_serializing_if = "Option::is_none")]
    pub max_current: Option<f64>,
    #[serde(rename = "maxVoltage", default, skip_serializing_if = "Option::is_none")]
    pub max_voltage: Option<f64>,
    #[serde(
        rename = "nFilamentsRadial",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub n_filaments_radial: Option<f64>,
    #[serde(
        rename = "nFilamentsVertical",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub n_filaments_vertical: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VesselMetadata {
    pub name: String,
    pub resistivity: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PassiveMetadata {
    pub name: String,
    pub resistance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns: Option<f64>,
    #[serde(
        rename = "nFilamentsRadial",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub n_filaments_radial: Option<f64>,
    #[serde(
        rename = "nFilamentsVertical",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub n_filaments_vertical: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbeMetadata {
    pub name: String,
    #[serde(rename = "effectiveLength")]
    pub effective_length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoopMetadata {
    pub name: String,
}

/// Typed metadata record for one shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    Coil(CoilMetadata),
    Vessel(VesselMetadata),
    Passive(PassiveMetadata),
    Probe(ProbeMetadata),
    Loop(LoopMetadata),
}

impl Metadata {
    /// Default metadata for a newly created element, `None` for elements
    /// that carry none (limiter, tf_coil, blanket).
    pub fn default_for(element: TokamakElement) -> Option<Self> {
        match element {
            TokamakElement::Coil => Some(Metadata::Coil(CoilMetadata {
                inductance: Some(0.0),
                max_current: Some(0.0),
                max_voltage: Some(0.0),
                n_filaments_radial: Some(0.0),
                n_filaments_vertical: Some(0.0),
                ..Default::default()
            })),
            TokamakElement::Vessel => Some(Metadata::Vessel(VesselMetadata::default())),
            TokamakElement::Passive => Some(Metadata::Passive(PassiveMetadata {
                turns: Some(0.0),
                n_filaments_radial: Some(0.0),
                n_filaments_vertical: Some(0.0),
                ..Default::default()
            })),
            TokamakElement::Probe => Some(Metadata::Probe(ProbeMetadata {
                kpb: Some(0.0),
                ..Default::default()
            })),
            TokamakElement::Loop => Some(Metadata::Loop(LoopMetadata::default())),
            _ => None,
        }
    }

    /// Parse a JSON record as metadata for `element`. Unknown or mismatched
    /// payloads produce `None`; callers fall back to defaults.
    pub fn from_element_value(element: TokamakElement, value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match element {
            TokamakElement::Coil => serde_json::from_value(value.clone()).ok().map(Metadata::Coil),
            TokamakElement::Vessel => serde_json::from_value(value.clone())
                .ok()
                .map(Metadata::Vessel),
            TokamakElement::Passive => serde_json::from_value(value.clone())
                .ok()
                .map(Metadata::Passive),
            TokamakElement::Probe => serde_json::from_value(value.clone())
                .ok()
                .map(Metadata::Probe),
            TokamakElement::Loop => serde_json::from_value(value.clone()).ok().map(Metadata::Loop),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Metadata::Coil(m) => serde_json::to_value(m),
            Metadata::Vessel(m) => serde_json::to_value(m),
            Metadata::Passive(m) => serde_json::to_value(m),
            Metadata::Probe(m) => serde_json::to_value(m),
            Metadata::Loop(m) => serde_json::to_value(m),
        }
        .unwrap_or(Value::Null)
    }

    pub fn name(&self) -> &str {
        match self {
            Metadata::Coil(m) => &m.name,
            Metadata::Vessel(m) => &m.name,
            Metadata::Passive(m) => &m.name,
            Metadata::Probe(m) => &m.name,
            Metadata::Loop(m) => &m.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Metadata::Coil(m) => m.name = name,
            Metadata::Vessel(m) => m.name = name,
            Metadata::Passive(m) => m.name = name,
            Metadata::Probe(m) => m.name = name,
            Metadata::Loop(m) => m.name = name,
        }
    }
}
