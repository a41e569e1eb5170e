//! Geometry/style capture.
//!
//! [`StyleSnapshot::capture`] turns a node into an immutable value: its
//! committed layout rectangle plus the resolved style the flip animation
//! interpolates (background color, opacity, position mode, border radii, and
//! any additional caller-requested properties). A snapshot holds no node
//! reference, so it stays valid after the node is mutated or removed.
//!
//! Border radii are decomposed at capture time into absolute per-axis pixel
//! values: percentage radii resolve against `max(width, height)`, and the
//! result is multiplied by the node's currently-applied scale factor so a
//! capture taken mid-animation still describes the radius the user sees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::warn;

use glide_host::{Rect, RenderHost};

use crate::error::StyleParseError;

/// Position mode of a node, as far as flip cares about it: exit transitions
/// compensate for a node being forced between in-flow and out-of-flow
/// positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    /// In-flow positioning (`static`, `relative`, and anything unrecognized).
    Normal,
    /// Out-of-flow, positioned against the nearest positioned ancestor.
    Absolute,
    /// Out-of-flow, positioned against the viewport.
    Fixed,
}

impl Default for PositionMode {
    fn default() -> Self {
        Self::Normal
    }
}

impl PositionMode {
    /// Interpret a computed `position` value.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            _ => Self::Normal,
        }
    }
}

/// One corner's radius, decomposed into absolute per-axis pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerRadius {
    pub x: f64,
    pub y: f64,
}

/// All four corner radii of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BorderRadii {
    pub top_left: CornerRadius,
    pub top_right: CornerRadius,
    pub bottom_left: CornerRadius,
    pub bottom_right: CornerRadius,
}

/// Immutable capture of a node's rect and resolved style at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    /// Layout rectangle in viewport coordinates.
    pub rect: Rect,
    /// Serialized background color, comparable across captures.
    pub color: String,
    /// Serialized opacity.
    pub opacity: String,
    /// Position mode at capture time.
    pub position: PositionMode,
    /// Corner radii, pre-resolved to absolute pixels.
    pub radii: BorderRadii,
    /// Additional caller-requested style properties, verbatim.
    pub extra: BTreeMap<String, String>,
}

assert_impl_all!(StyleSnapshot: Send, Sync);

impl StyleSnapshot {
    /// Capture a node's current geometry and resolved style.
    ///
    /// Must be called only when layout is committed; the host's `rect` and
    /// `computed_style` are trusted to be up to date. `properties` lists
    /// additional style properties to capture beyond the built-in set.
    pub fn capture<H: RenderHost>(host: &H, node: &H::Node, properties: &[String]) -> Self {
        let rect = host.rect(node);
        let scale = current_scale(host, node);

        let corner = |property: &str| {
            resolve_corner(host.computed_style(node, property).as_deref(), &rect, scale)
        };
        let radii = BorderRadii {
            top_left: corner("border-top-left-radius"),
            top_right: corner("border-top-right-radius"),
            bottom_left: corner("border-bottom-left-radius"),
            bottom_right: corner("border-bottom-right-radius"),
        };

        let mut extra = BTreeMap::new();
        for property in properties {
            if let Some(value) = host.computed_style(node, property) {
                extra.insert(property.clone(), value);
            }
        }

        Self {
            rect,
            color: host
                .computed_style(node, "background-color")
                .unwrap_or_else(|| "rgba(0, 0, 0, 0)".to_string()),
            opacity: host
                .computed_style(node, "opacity")
                .unwrap_or_else(|| "1".to_string()),
            position: host
                .computed_style(node, "position")
                .map(|value| PositionMode::parse(&value))
                .unwrap_or_default(),
            radii,
            extra,
        }
    }

    /// Return a copy with a different rectangle (used for ancestor-composed
    /// derivations, which offset the rect but keep the style).
    pub fn with_rect(&self, rect: Rect) -> Self {
        Self {
            rect,
            ..self.clone()
        }
    }
}

/// The node's currently-applied scale factor, read from its active `scale`
/// style. Identity when no scale is in effect or the value is malformed.
fn current_scale<H: RenderHost>(host: &H, node: &H::Node) -> (f64, f64) {
    let Some(value) = host.computed_style(node, "scale") else {
        return (1.0, 1.0);
    };
    match parse_scale(&value) {
        Ok(Some(pair)) => pair,
        Ok(None) => (1.0, 1.0),
        Err(err) => {
            warn!("ignoring active scale: {err}");
            (1.0, 1.0)
        }
    }
}

/// Parse a computed `scale` value into a per-axis pair.
///
/// `none` (and the empty string) mean no scale is in effect. A single
/// component is a uniform scale, which is how uniform scales serialize.
pub(crate) fn parse_scale(value: &str) -> Result<Option<(f64, f64)>, StyleParseError> {
    let value = value.trim();
    if value.is_empty() || value == "none" {
        return Ok(None);
    }

    let invalid = || StyleParseError::InvalidScale(value.to_string());
    let mut parts = value.split_whitespace();
    let x: f64 = parts
        .next()
        .ok_or_else(invalid)?
        .parse()
        .map_err(|_| invalid())?;
    let y: f64 = match parts.next() {
        Some(part) => part.parse().map_err(|_| invalid())?,
        None => x,
    };
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok(Some((x, y)))
}

/// Resolve one corner's radius value to absolute per-axis pixels.
///
/// The computed value carries one or two length components (x, and
/// optionally y). Percentages resolve against `max(width, height)`; the
/// resolved value is scaled by the node's active scale factor.
fn resolve_corner(value: Option<&str>, rect: &Rect, scale: (f64, f64)) -> CornerRadius {
    let Some(value) = value else {
        return CornerRadius::default();
    };

    let reference = rect.width.max(rect.height);
    let mut components = value.split_whitespace();
    let x = match components.next() {
        Some(component) => resolve_length(component, reference),
        None => 0.0,
    };
    let y = match components.next() {
        Some(component) => resolve_length(component, reference),
        None => x,
    };

    CornerRadius {
        x: x * scale.0,
        y: y * scale.1,
    }
}

/// Resolve one length component to pixels, degrading to zero on malformed
/// input.
fn resolve_length(component: &str, reference: f64) -> f64 {
    match parse_length(component, reference) {
        Ok(pixels) => pixels,
        Err(err) => {
            warn!("ignoring radius component: {err}");
            0.0
        }
    }
}

/// Parse one length component: `px`, `%` (against `reference`), or a bare
/// number.
fn parse_length(component: &str, reference: f64) -> Result<f64, StyleParseError> {
    let component = component.trim();
    let invalid = || StyleParseError::InvalidLength(component.to_string());

    if let Some(percent) = component.strip_suffix('%') {
        let value: f64 = percent.trim().parse().map_err(|_| invalid())?;
        return Ok(value / 100.0 * reference);
    }
    let number = component.strip_suffix("px").unwrap_or(component).trim();
    number.parse().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scale() {
        assert_eq!(parse_scale("none").unwrap(), None);
        assert_eq!(parse_scale("").unwrap(), None);
        assert_eq!(parse_scale("2").unwrap(), Some((2.0, 2.0)));
        assert_eq!(parse_scale("2 0.5").unwrap(), Some((2.0, 0.5)));
        assert!(parse_scale("2 0.5 1").is_err());
        assert!(parse_scale("abc").is_err());
        assert!(parse_scale("inf").is_err());
    }

    #[test]
    fn test_parse_length_units() {
        assert_eq!(parse_length("8px", 100.0).unwrap(), 8.0);
        assert_eq!(parse_length("8", 100.0).unwrap(), 8.0);
        assert_eq!(parse_length("50%", 200.0).unwrap(), 100.0);
        assert!(parse_length("8em", 100.0).is_err());
    }

    #[test]
    fn test_resolve_corner_components() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);

        // A single component applies to both axes.
        let radius = resolve_corner(Some("8px"), &rect, (1.0, 1.0));
        assert_eq!(radius, CornerRadius { x: 8.0, y: 8.0 });

        // Two components are per-axis.
        let radius = resolve_corner(Some("8px 16px"), &rect, (1.0, 1.0));
        assert_eq!(radius, CornerRadius { x: 8.0, y: 16.0 });

        // Percentages resolve against max(width, height).
        let radius = resolve_corner(Some("50%"), &rect, (1.0, 1.0));
        assert_eq!(radius, CornerRadius { x: 50.0, y: 50.0 });

        // The active scale factor applies per axis.
        let radius = resolve_corner(Some("10px"), &rect, (2.0, 0.5));
        assert_eq!(radius, CornerRadius { x: 20.0, y: 5.0 });

        // Malformed components degrade to zero, not a failure.
        let radius = resolve_corner(Some("bogus 16px"), &rect, (1.0, 1.0));
        assert_eq!(radius, CornerRadius { x: 0.0, y: 16.0 });
    }

    #[test]
    fn test_position_mode_parse() {
        assert_eq!(PositionMode::parse("static"), PositionMode::Normal);
        assert_eq!(PositionMode::parse("relative"), PositionMode::Normal);
        assert_eq!(PositionMode::parse("absolute"), PositionMode::Absolute);
        assert_eq!(PositionMode::parse("fixed"), PositionMode::Fixed);
    }

    #[test]
    fn test_with_rect_keeps_style() {
        let snapshot = StyleSnapshot {
            rect: Rect::new(10.0, 10.0, 50.0, 50.0),
            color: "rgb(255, 0, 0)".to_string(),
            opacity: "0.5".to_string(),
            ..Default::default()
        };
        let moved = snapshot.with_rect(Rect::new(110.0, 10.0, 50.0, 50.0));
        assert_eq!(moved.rect.left, 110.0);
        assert_eq!(moved.color, snapshot.color);
        assert_eq!(moved.opacity, snapshot.opacity);
    }
}
