//! Removal, exit transitions, and the re-attachment race.

use std::rc::Rc;

use anyhow::{Result, ensure};
use serde_json::json;

use glide_core::{FlipPhase, FlipScope, FlipUnit, PreserveMode, ScopeOptions, UnitOptions};
use glide_host::{FillMode, Rect, RenderHost};
use glide_testing::{MockHost, MockNode};

fn setup() -> (Rc<MockHost>, Rc<FlipScope<MockHost>>, MockNode) {
    let host = MockHost::new();
    let scope = FlipScope::new(Rc::clone(&host), ScopeOptions::default());
    let root = host.create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
    (host, scope, root)
}

#[test]
fn unmount_clears_the_entry_one_tick_later() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(10.0, 10.0, 100.0, 100.0));

    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    unit.set_rendered_node(Some(node));
    unit.mounted();
    unit.unmounted();

    // The baseline survives until the race guard has run.
    assert!(scope.registry().first("card").is_some());
    assert!(!scope.registry().is_attached("card"));
    assert_eq!(unit.phase(), FlipPhase::Removed);

    host.run_tick();
    assert!(scope.registry().first("card").is_none());
    assert!(scope.registry().last("card").is_none());
}

#[test]
fn exit_transition_reinserts_animates_and_removes() -> Result<()> {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(10.0, 10.0, 100.0, 100.0));

    let unit = FlipUnit::new(
        Rc::clone(&scope),
        None,
        UnitOptions::new("card")
            .with_exit(true)
            .with_preserve(PreserveMode::All),
    );
    unit.set_rendered_node(Some(node));
    unit.mounted();

    // The logical tree drops the node; the visual tree may already have.
    host.remove_node(&node);
    unit.unmounted();
    assert_eq!(unit.phase(), FlipPhase::Exiting);

    // The exit slot forces out-of-flow positioning with new geometry.
    host.set_computed(node, "position", "absolute");
    host.set_rect(node, Rect::new(30.0, 40.0, 50.0, 50.0));

    host.run_microtasks();
    ensure!(host.has_class(node, "exit"));
    ensure!(host.is_connected(&node));
    ensure!(host.live_animation_count(node) == 1);

    let animation = host.last_animation().unwrap();
    assert_eq!(animation.timing.fill, FillMode::Forwards);
    let start = &animation.keyframes[0];
    assert_eq!(start.get("translate"), Some("5px -5px"));
    assert_eq!(start.get("scale"), Some("2 2"));
    // The biased end keyframe compensates the position-mode change.
    let end = &animation.keyframes[1];
    assert_eq!(end.get("translate"), Some("5px -5px"));
    assert_eq!(end.get("scale"), Some("2 2"));

    host.finish_animations();
    ensure!(!host.is_connected(&node));
    assert_eq!(unit.phase(), FlipPhase::Removed);

    host.run_tick();
    assert!(scope.registry().first("card").is_none());
    Ok(())
}

#[test]
fn exit_without_position_change_has_a_natural_end_state() {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(10.0, 10.0, 100.0, 100.0));

    let unit = FlipUnit::new(
        Rc::clone(&scope),
        None,
        UnitOptions::new("card")
            .with_exit("leaving")
            .with_preserve(PreserveMode::All),
    );
    unit.set_rendered_node(Some(node));
    unit.mounted();
    unit.unmounted();

    host.run_microtasks();
    assert!(host.has_class(node, "leaving"));
    let animation = host.last_animation().unwrap();
    assert!(animation.keyframes[1].is_empty());
}

#[test]
fn reattached_key_keeps_baseline_and_skips_exit() -> Result<()> {
    let (host, scope, root) = setup();
    let node = host.create_child(root, Rect::new(10.0, 10.0, 100.0, 100.0));

    let first_unit = FlipUnit::new(
        Rc::clone(&scope),
        None,
        UnitOptions::new("card").with_exit(true),
    );
    first_unit.set_rendered_node(Some(node));
    first_unit.mounted();

    // A reorder detaches and reattaches the key within one flush.
    first_unit.unmounted();
    let second_unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("card"));
    second_unit.set_rendered_node(Some(node));
    second_unit.mounted();

    host.run_microtasks();
    // No exit replay on the live node.
    ensure!(!host.has_class(node, "exit"));
    ensure!(host.is_connected(&node));

    host.run_tick();
    // The baseline survived the race guard.
    ensure!(scope.registry().first("card").is_some());
    ensure!(scope.registry().is_attached("card"));

    host.settle();
    host.finish_animations();
    ensure!(host.is_connected(&node));
    Ok(())
}

#[test]
fn reorders_settle_to_one_baseline_per_surviving_key() -> Result<()> {
    let (host, scope, root) = setup();

    let mut units = Vec::new();
    let mut nodes = Vec::new();
    for index in 0..4 {
        let node = host.create_child(
            root,
            Rect::new(index as f64 * 110.0, 0.0, 100.0, 100.0),
        );
        let unit = FlipUnit::new(
            Rc::clone(&scope),
            None,
            UnitOptions::new(format!("item-{index}")),
        );
        unit.set_rendered_node(Some(node));
        unit.mounted();
        units.push(unit);
        nodes.push(node);
    }
    ensure!(scope.registry().baseline_count() == 4);

    // Shuffle: every unit sees the new list and its shifted geometry.
    let shuffled_left = [220.0, 0.0, 330.0, 110.0];
    for (unit, (&node, &left)) in units.iter().zip(nodes.iter().zip(shuffled_left.iter())) {
        unit.will_update(&vec![json!("shuffled")]);
        host.set_rect(node, Rect::new(left, 0.0, 100.0, 100.0));
    }
    for unit in &units {
        unit.did_update();
    }
    host.settle();
    host.finish_animations();
    ensure!(scope.registry().baseline_count() == 4);

    // Remove: the last item leaves for good.
    let removed = units.pop().unwrap();
    removed.unmounted();
    for unit in &units {
        unit.will_update(&vec![json!([0, 1, 2])]);
    }
    for unit in &units {
        unit.did_update();
    }
    host.settle();
    host.finish_animations();
    ensure!(scope.registry().baseline_count() == 3);
    ensure!(scope.registry().first("item-3").is_none());

    // Append: a fresh key joins and baselines exactly once.
    let node = host.create_child(root, Rect::new(440.0, 0.0, 100.0, 100.0));
    let unit = FlipUnit::new(Rc::clone(&scope), None, UnitOptions::new("item-4"));
    unit.set_rendered_node(Some(node));
    unit.mounted();
    host.settle();
    host.finish_animations();

    ensure!(scope.registry().baseline_count() == 4);
    for key in ["item-0", "item-1", "item-2", "item-4"] {
        ensure!(scope.registry().first(key).is_some());
    }
    ensure!(scope.registry().attached_count() == 4);
    Ok(())
}
