//! Keyframe and timing declarations handed to the native animation facility.
//!
//! A flip animation is always a single interpolation between two keyframes:
//! a start keyframe carrying the inverse transform, and an end keyframe that
//! is empty ("animate to the natural state") except for exit transitions,
//! where it carries the end-state bias.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// A single keyframe: an ordered map of CSS property names to values.
///
/// An empty keyframe means "the node's current, natural state".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe {
    properties: BTreeMap<String, String>,
}

impl Keyframe {
    /// Create an empty keyframe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property value, replacing any previous value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(property.into(), value.into());
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Get a property value.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    /// Check if the keyframe carries no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The number of properties in the keyframe.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Iterate over all property-value pairs in property order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Fill behavior of a native animation outside its active interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// No effect outside the active interval.
    None,
    /// Hold the final keyframe after the animation ends.
    Forwards,
    /// Apply the first keyframe during the delay phase.
    Backwards,
    /// Both `Forwards` and `Backwards`.
    Both,
}

impl Default for FillMode {
    fn default() -> Self {
        Self::None
    }
}

impl FillMode {
    /// The CSS serialization of this fill mode.
    pub fn to_css(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Forwards => "forwards",
            Self::Backwards => "backwards",
            Self::Both => "both",
        }
    }
}

/// Timing parameters for one native animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationTiming {
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Easing function for the interpolation.
    pub easing: Easing,
    /// Fill behavior outside the active interval.
    pub fill: FillMode,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            duration_ms: 300.0,
            easing: Easing::default(),
            fill: FillMode::None,
        }
    }
}

impl AnimationTiming {
    /// Create a timing with the given duration and easing and no fill.
    pub fn new(duration_ms: f64, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
            fill: FillMode::None,
        }
    }

    /// Set the fill mode.
    pub fn with_fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }
}
