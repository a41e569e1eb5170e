//! glide-testing: a deterministic in-memory host for the animation core.
//!
//! [`MockHost`] implements the `glide-host` traits over a scripted node
//! arena: tests create nodes, script their rects and computed styles, drive
//! the scheduler by hand (`run_frame`, `run_microtasks`, `run_tick`) and
//! inspect every recorded animation, class, inline style and attribute the
//! core produced. Nothing is timed; every step is explicit, so scenarios
//! replay identically.

mod mock;

pub use mock::{AnimationView, MockAnimation, MockHost, MockNode};
