//! Easing declarations for native animation playback.
//!
//! The core never interpolates easing curves itself; it hands a declarative
//! timing function to the host's animation facility, which runs it outside
//! the scripting thread. This module only models the CSS-compatible curves
//! and their serialized form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Easing function for animation timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Easing {
    /// Linear interpolation (no easing).
    Linear,

    /// CSS `ease` - slow start, fast middle, slow end.
    Ease,

    /// CSS `ease-in` - slow start, accelerating.
    EaseIn,

    /// CSS `ease-out` - fast start, decelerating.
    EaseOut,

    /// CSS `ease-in-out` - slow start and end, fast middle.
    EaseInOut,

    /// Custom cubic bezier curve with control points (x1, y1) and (x2, y2).
    /// x values must be in [0, 1], y values can be any float.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Default for Easing {
    fn default() -> Self {
        Self::EaseInOut
    }
}

impl Easing {
    /// Create a custom cubic bezier easing function.
    ///
    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// The CSS serialization of this easing, as understood by the host's
    /// native animation facility.
    pub fn to_css(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::Ease => "ease".to_string(),
            Self::EaseIn => "ease-in".to_string(),
            Self::EaseOut => "ease-out".to_string(),
            Self::EaseInOut => "ease-in-out".to_string(),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Error returned when a CSS easing string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEasingError(String);

impl fmt::Display for ParseEasingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized easing value: {:?}", self.0)
    }
}

impl std::error::Error for ParseEasingError {}

impl FromStr for Easing {
    type Err = ParseEasingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            _ => {}
        }

        if let Some(body) = value
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<f32> = body
                .split(',')
                .map(|p| p.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| ParseEasingError(s.to_string()))?;
            if parts.len() == 4
                && (0.0..=1.0).contains(&parts[0])
                && (0.0..=1.0).contains(&parts[2])
            {
                return Ok(Self::CubicBezier {
                    x1: parts[0],
                    y1: parts[1],
                    x2: parts[2],
                    y2: parts[3],
                });
            }
        }

        Err(ParseEasingError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_curves_round_trip() {
        for easing in [
            Easing::Linear,
            Easing::Ease,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert_eq!(easing.to_css().parse::<Easing>().unwrap(), easing);
        }
    }

    #[test]
    fn test_cubic_bezier_round_trip() {
        let easing = Easing::cubic_bezier(0.4, 0.0, 0.2, 1.0);
        assert_eq!(easing.to_css(), "cubic-bezier(0.4, 0, 0.2, 1)");
        assert_eq!(easing.to_css().parse::<Easing>().unwrap(), easing);
    }

    #[test]
    fn test_invalid_easing_is_rejected() {
        assert!("spring".parse::<Easing>().is_err());
        assert!("cubic-bezier(2, 0, 0, 1)".parse::<Easing>().is_err());
    }

    #[test]
    #[should_panic]
    fn test_cubic_bezier_rejects_out_of_range_x() {
        Easing::cubic_bezier(1.5, 0.0, 0.2, 1.0);
    }
}
