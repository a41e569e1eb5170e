//! Debug mirroring of live animated values.
//!
//! When debug is enabled, every style property the current animation touches
//! is mirrored each frame onto a `data-flip-*` attribute, so the in-flight
//! values are inspectable from outside. The attributes are removed when the
//! animation ends or is cancelled.

use std::cell::Cell;
use std::rc::Rc;

use glide_host::Host;

const ATTRIBUTE_PREFIX: &str = "data-flip-";

fn attribute_name(property: &str) -> String {
    format!("{ATTRIBUTE_PREFIX}{property}")
}

/// Mirror the computed values of `properties` onto attributes of `node`
/// every frame while `active` holds, then strip them.
pub(crate) fn mirror_animated_styles<H: Host>(
    host: Rc<H>,
    node: H::Node,
    properties: Vec<String>,
    active: Rc<Cell<bool>>,
) {
    if !active.get() {
        for property in &properties {
            host.remove_attribute(&node, &attribute_name(property));
        }
        return;
    }

    for property in &properties {
        match host.computed_style(&node, property) {
            Some(value) => host.set_attribute(&node, &attribute_name(property), &value),
            None => host.remove_attribute(&node, &attribute_name(property)),
        }
    }

    let scheduler = Rc::clone(&host);
    scheduler.after_next_frame(Box::new(move || {
        mirror_animated_styles(host, node, properties, active);
    }));
}
