//! The delta/transform engine.
//!
//! Given a node's first and last snapshots (and optionally its ancestors'
//! composed snapshots), this module computes the inverse transform that makes
//! the node appear to start at its old geometry and animate to its new one,
//! and builds the keyframe pair handed to the native animation facility.
//!
//! The parent compensation exists because a nested child's own rectangles
//! are measured in viewport coordinates after the parent has already applied
//! its own compensating transform for its last geometry; the child delta
//! subtracts the parent's contribution so the two transforms compose without
//! double-counting the parent's inversion.

use serde::{Deserialize, Serialize};
use tracing::warn;

use glide_host::Keyframe;

use crate::config::PreserveMode;
use crate::snapshot::{CornerRadius, StyleSnapshot};

/// The inverse transform that visually re-creates the first state from the
/// last state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlipDelta {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl FlipDelta {
    /// The identity delta: no movement, no scaling.
    pub fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Whether this delta would leave the node visually unchanged.
    pub fn is_identity(&self) -> bool {
        self == &Self::identity()
    }
}

impl Default for FlipDelta {
    fn default() -> Self {
        Self::identity()
    }
}

/// End-state correction applied only during exit transitions, compensating
/// for the position-mode change a node undergoes when it is reparented into
/// its fixed exit slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitBias {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ExitBias {
    /// The identity bias: the exit animates to the natural reinserted state.
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    /// Whether this bias carries no correction.
    pub fn is_identity(&self) -> bool {
        self == &Self::identity()
    }
}

impl Default for ExitBias {
    fn default() -> Self {
        Self::identity()
    }
}

/// A scale ratio of exactly zero (or a non-finite one, from a degenerate
/// denominator) would erase the node; substitute identity.
fn safe_scale(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        1.0
    } else {
        value
    }
}

/// Compute the inverse transform from `last` back to `first`, subtracting
/// the ancestor compensation when both composed parent states exist.
pub fn compute_delta(
    first: &StyleSnapshot,
    last: &StyleSnapshot,
    parent_first: Option<&StyleSnapshot>,
    parent_last: Option<&StyleSnapshot>,
) -> FlipDelta {
    let (parent_dx, parent_dy, parent_dw, parent_dh) = match (parent_first, parent_last) {
        (Some(pf), Some(pl)) => {
            let parent_offset_x = (pf.rect.width - pl.rect.width) / 2.0;
            let parent_offset_y = (pf.rect.height - pl.rect.height) / 2.0;
            (
                pf.rect.left - pl.rect.left + parent_offset_x,
                pf.rect.top - pl.rect.top + parent_offset_y,
                safe_scale(pf.rect.width / pl.rect.width),
                safe_scale(pf.rect.height / pl.rect.height),
            )
        }
        _ => (0.0, 0.0, 1.0, 1.0),
    };

    // The offset centers the scale pivot: transform origin is the node's own
    // center, so a size change shifts the visual box by half the difference.
    let offset_x = (first.rect.width - last.rect.width) / 2.0;
    let offset_y = (first.rect.height - last.rect.height) / 2.0;

    FlipDelta {
        translate_x: -parent_dx + first.rect.left - last.rect.left + offset_x,
        translate_y: -parent_dy + first.rect.top - last.rect.top + offset_y,
        scale_x: safe_scale((first.rect.width / last.rect.width) / parent_dw),
        scale_y: safe_scale((first.rect.height / last.rect.height) / parent_dh),
    }
}

/// Compute the exit bias for a position-mode change between the pre-removal
/// (`first`) and post-reinsertion (`last`) captures, masked by the preserve
/// mode. Identity when the position mode did not change.
pub fn exit_bias(first: &StyleSnapshot, last: &StyleSnapshot, preserve: PreserveMode) -> ExitBias {
    if first.position == last.position {
        return ExitBias::identity();
    }

    let mut bias = ExitBias::identity();
    if preserve.preserves_position() {
        bias.x = first.rect.left - last.rect.left + (first.rect.width - last.rect.width) / 2.0;
        bias.y = first.rect.top - last.rect.top + (first.rect.height - last.rect.height) / 2.0;
    }
    if preserve.preserves_scale() {
        bias.width = safe_scale(first.rect.width / last.rect.width);
        bias.height = safe_scale(first.rect.height / last.rect.height);
    }
    bias
}

const CORNERS: [(&str, fn(&StyleSnapshot) -> CornerRadius); 4] = [
    ("border-top-left-radius", |s| s.radii.top_left),
    ("border-top-right-radius", |s| s.radii.top_right),
    ("border-bottom-left-radius", |s| s.radii.bottom_left),
    ("border-bottom-right-radius", |s| s.radii.bottom_right),
];

/// Build the start keyframe: the inverse transform plus the first state's
/// visual style, with each border radius divided by the scale delta so the
/// radius visually matches the first state while the node is scaled.
///
/// `extra_properties` are copied verbatim from the first capture; one that
/// is absent from the capture is skipped with a diagnostic, never an error.
pub fn start_keyframe(
    first: &StyleSnapshot,
    delta: &FlipDelta,
    extra_properties: &[String],
) -> Keyframe {
    let mut keyframe = Keyframe::new();
    keyframe.set("transform-origin", "50% 50%");
    keyframe.set(
        "translate",
        format!("{}px {}px", delta.translate_x, delta.translate_y),
    );
    keyframe.set("scale", format!("{} {}", delta.scale_x, delta.scale_y));
    keyframe.set("background-color", first.color.clone());
    keyframe.set("opacity", first.opacity.clone());

    for (property, radius_of) in CORNERS {
        let radius = radius_of(first);
        keyframe.set(
            property,
            format!(
                "{}px {}px",
                radius.x / delta.scale_x,
                radius.y / delta.scale_y
            ),
        );
    }

    for property in extra_properties {
        match first.extra.get(property) {
            Some(value) => keyframe.set(property.clone(), value.clone()),
            None => warn!("property {property:?} is not present in the first state"),
        }
    }

    keyframe
}

/// Build the end keyframe: empty in the common case ("animate to the
/// natural state"); an exit bias contributes its translate/scale.
pub fn end_keyframe(bias: &ExitBias) -> Keyframe {
    let mut keyframe = Keyframe::new();
    if bias.x != 0.0 || bias.y != 0.0 {
        keyframe.set("translate", format!("{}px {}px", bias.x, bias.y));
    }
    if bias.width != 1.0 || bias.height != 1.0 {
        keyframe.set("scale", format!("{} {}", bias.width, bias.height));
    }
    keyframe
}
