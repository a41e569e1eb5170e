//! End-to-end lifecycle scenarios for a single animated unit.

use std::rc::Rc;

use anyhow::{Result, ensure};
use serde_json::json;

use glide_core::{FlipPhase, FlipScope, FlipUnit, ScopeOptions, UnitOptions};
use glide_host::{Easing, FillMode, Rect};
use glide_testing::{MockHost, MockNode};

fn setup() -> (Rc<MockHost>, Rc<FlipScope<MockHost>>, MockNode) {
    let host = MockHost::new();
    let scope = FlipScope::new(Rc::clone(&host), ScopeOptions::default());
    let root = host.create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
    (host, scope, root)
}

#[test]
fn capture_is_deterministic_without_mutation() {
    let (host, _, root) = setup();
    let node = host.create_child(root, Rect::new(10.0, 20.0, 100.0, 50.0));
    host.set_computed(node, "background-color", "rgb(255, 0, 0)");
    host.set_computed(node, "opacity", "0.5");
    host.set_computed(node, "border-top-left-radius", "25%");

    let a = glide_core::StyleSnapshot::capture(&*host, &node, &[]);
    let b = glide_core::StyleSnapshot::capture(&*host, &node, &[]);
    assert_eq!(a, b);
    assert_eq!(a.radii.top_left.x, 25.0);
}

#[test]
fn mount_records_baseline_without_animating() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(10.0, 10.0, 100.0, 100.0));

    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    unit.set_rendered_node(Some(node));
    unit.mounted();

    assert!(scope.registry().first("card").is_some());
    assert_eq!(host.animation_count(), 0);
    assert_eq!(unit.phase(), FlipPhase::Baselined);
}

#[test]
fn trigger_change_plays_the_inverse_transform() -> Result<()> {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(0.0, 0.0, 100.0, 100.0));

    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    unit.set_rendered_node(Some(node));
    unit.mounted();

    // The trigger changes while the old layout is still committed.
    unit.will_update(&vec![json!(1)]);
    // The new layout commits.
    host.set_rect(node, Rect::new(200.0, 0.0, 50.0, 50.0));
    unit.did_update();

    // Playback starts one frame later, once geometry is committed.
    ensure!(host.animation_count() == 0);
    host.run_frame();
    ensure!(host.animation_count() == 1);

    let animation = host.last_animation().unwrap();
    ensure!(animation.keyframes.len() == 2);
    let start = &animation.keyframes[0];
    assert_eq!(start.get("translate"), Some("-175px 25px"));
    assert_eq!(start.get("scale"), Some("2 2"));
    assert_eq!(start.get("transform-origin"), Some("50% 50%"));
    assert!(animation.keyframes[1].is_empty());
    assert_eq!(animation.timing.duration_ms, 300.0);
    assert_eq!(animation.timing.easing, Easing::EaseInOut);
    assert_eq!(animation.timing.fill, FillMode::None);
    assert_eq!(unit.phase(), FlipPhase::Animating);

    host.finish_animations();
    assert_eq!(unit.phase(), FlipPhase::Baselined);
    assert_eq!(host.live_animation_count(node), 0);
    Ok(())
}

#[test]
fn unchanged_geometry_yields_identity_keyframe() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(40.0, 40.0, 80.0, 80.0));

    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    unit.set_rendered_node(Some(node));
    unit.mounted();

    unit.will_update(&vec![json!("a")]);
    unit.did_update();
    host.run_frame();

    let start = &host.last_animation().unwrap().keyframes[0];
    assert_eq!(start.get("translate"), Some("0px 0px"));
    assert_eq!(start.get("scale"), Some("1 1"));
}

#[test]
fn retrigger_supersedes_the_previous_animation() -> Result<()> {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(0.0, 0.0, 100.0, 100.0));

    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    unit.set_rendered_node(Some(node));
    unit.mounted();

    unit.will_update(&vec![json!(1)]);
    host.set_rect(node, Rect::new(100.0, 0.0, 100.0, 100.0));
    unit.did_update();
    host.run_frame();
    ensure!(host.live_animation_count(node) == 1);

    // Retrigger mid-flight: the second animation always supersedes.
    unit.will_update(&vec![json!(2)]);
    host.set_rect(node, Rect::new(0.0, 0.0, 100.0, 100.0));
    unit.did_update();
    host.run_frame();

    ensure!(host.animation_count() == 2);
    ensure!(host.live_animation_count(node) == 1);
    let views = host.animation_views();
    assert!(views[0].cancelled);
    assert!(!views[1].cancelled);
    Ok(())
}

#[test]
fn unchanged_trigger_does_not_flip() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(0.0, 0.0, 100.0, 100.0));

    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    unit.set_rendered_node(Some(node));
    unit.mounted();

    unit.will_update(&vec![json!(1)]);
    unit.did_update();
    host.run_frame();
    let count = host.animation_count();

    // The same trigger value again is not a change.
    unit.will_update(&vec![json!(1)]);
    unit.did_update();
    host.run_frame();
    assert_eq!(host.animation_count(), count);
}

#[test]
fn enter_class_is_flashed_and_defines_the_baseline() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(0.0, 0.0, 100.0, 100.0));

    let unit = FlipUnit::new(
        Rc::clone(&scope),
        None,
        UnitOptions::new("card").with_enter(true),
    );
    unit.set_rendered_node(Some(node));
    unit.mounted();

    // The class was added, captured, and removed within one call: it is
    // never observable afterwards, but the baseline exists and the enter
    // animation is scheduled.
    assert!(!host.has_class(node, "enter"));
    assert!(scope.registry().first("card").is_some());
    host.run_frame();
    assert_eq!(host.animation_count(), 1);
}

#[test]
fn zero_sized_captures_are_never_stored() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::default());

    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    unit.set_rendered_node(Some(node));
    unit.mounted();
    assert!(scope.registry().first("card").is_none());
    assert_eq!(unit.phase(), FlipPhase::Unbaselined);

    // Once the node is really laid out, the next pass baselines it.
    host.set_rect(node, Rect::new(0.0, 0.0, 50.0, 50.0));
    unit.will_update(&vec![json!(1)]);
    unit.did_update();
    host.run_frame();
    assert!(scope.registry().first("card").is_some());
}

#[test]
fn extra_properties_are_captured_and_played() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(0.0, 0.0, 100.0, 100.0));
    host.set_computed(node, "box-shadow", "2px 2px 4px rgb(0, 0, 0)");

    let unit = FlipUnit::new(
        Rc::clone(&scope),
        None,
        UnitOptions::new("card").with_properties(vec!["box-shadow".to_string()]),
    );
    unit.set_rendered_node(Some(node));
    unit.mounted();

    unit.will_update(&vec![json!(1)]);
    host.set_computed(node, "box-shadow", "none");
    unit.did_update();
    host.run_frame();

    let start = &host.last_animation().unwrap().keyframes[0];
    assert_eq!(start.get("box-shadow"), Some("2px 2px 4px rgb(0, 0, 0)"));
}
