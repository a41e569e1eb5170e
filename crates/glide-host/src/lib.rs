//! glide-host: the seam between the Glide animation core and its platform.
//!
//! This crate defines everything the FLIP core consumes from the rendering
//! collaborator — committed geometry, resolved style, class and inline-style
//! mutation, native declarative animations, and the cooperative scheduling
//! primitives — plus the plain-data playback types exchanged across that
//! boundary. It knows nothing about FLIP semantics.

mod easing;
mod geometry;
mod host;
mod keyframe;

pub use easing::{Easing, ParseEasingError};
pub use geometry::Rect;
pub use host::{AnimationHandle, Host, HostCallback, RenderHost, Scheduler};
pub use keyframe::{AnimationTiming, FillMode, Keyframe};
