//! Typed errors for style interpretation.
//!
//! Nothing here escapes the crate as a hard failure: callers degrade to
//! identity/zero values and log a diagnostic, because a bad style value must
//! never break layout — the worst allowed outcome is "no animation plays".

use thiserror::Error;

/// Error raised while interpreting a computed style value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleParseError {
    /// A length component was not a number with an understood unit.
    #[error("invalid length value: {0:?}")]
    InvalidLength(String),

    /// A `scale` value was not one or two finite numbers.
    #[error("invalid scale value: {0:?}")]
    InvalidScale(String),
}
