//! FLIP-style transition animation core.
//!
//! When a keyed node's layout or visual style changes between two render
//! passes, Glide animates the visual transform from the old state to the new
//! one instead of snapping, while the new layout takes effect instantly:
//! record **F**irst geometry, let the framework apply the **L**ast geometry,
//! **I**nvert by starting from a transform that visually re-creates the old
//! state, and **P**lay the native animation back to neutral.
//!
//! # Architecture
//!
//! ```text
//! FlipScope (host + registry + defaults)
//!   ├── FlipRegistry        first/last snapshots + attached keys
//!   └── FlipUnit (per key)  lifecycle state machine
//!         ├── StyleSnapshot::capture   geometry/style capture
//!         ├── delta                    inverse-transform + keyframes
//!         ├── NestedScope              ancestor-composed state, unflips
//!         └── unflip / debug           per-frame correction loops
//! ```
//!
//! The embedding layer owns reactivity and the render tree; it drives each
//! [`FlipUnit`] through explicit lifecycle callbacks and implements the
//! `glide-host` traits. Everything is wired by explicit dependency
//! injection — no ambient lookup.

pub mod config;
pub mod delta;
pub mod error;
pub mod nested;
pub mod registry;
pub mod scope;
pub mod snapshot;
pub mod unflip;
pub mod unit;

mod debug;

pub use config::{
    ClassToggle, DEFAULT_ENTER_CLASS, DEFAULT_EXIT_CLASS, PreserveMode, ScopeOptions, Trigger,
    UnitOptions,
};
pub use delta::{ExitBias, FlipDelta, compute_delta, end_keyframe, exit_bias, start_keyframe};
pub use error::StyleParseError;
pub use nested::NestedScope;
pub use registry::FlipRegistry;
pub use scope::FlipScope;
pub use snapshot::{BorderRadii, CornerRadius, PositionMode, StyleSnapshot};
pub use unflip::UnflipRegistration;
pub use unit::{FlipPhase, FlipUnit};
