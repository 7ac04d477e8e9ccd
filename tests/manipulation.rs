use approx::assert_abs_diff_eq;
use glam::Vec3;
use joint_drag::kinematics::{JointSpec, KinematicTree};
use joint_drag::manipulation::{
    EventDispatcher, JointHandle, ManipulationConfig, ManipulationEvent, Manipulator,
    PointerInput,
};
use joint_drag::math::Transform;
use joint_drag::picking::{Ray, SphereShape};
use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

/// Single joint at the world origin with a grab handle sphere around it.
fn single(spec: JointSpec) -> KinematicTree {
    KinematicTree::builder("base")
        .link("moving")
        .joint(spec)
        .surface("moving", SphereShape::new(Vec3::ZERO, 0.25))
        .build()
        .unwrap()
}

/// Straight-down ray meeting the y = 0 plane at `(x, 0, z)`.
fn down(x: f32, z: f32) -> Ray {
    Ray::new(Vec3::new(x, 5.0, z), Vec3::NEG_Y)
}

fn grab(tree: &mut KinematicTree, manipulator: &mut Manipulator, events: &mut Vec<ManipulationEvent>) {
    manipulator.pointer_move(tree, down(0.0, 0.0), events);
    manipulator.pointer_down(tree, events);
    assert!(manipulator.grabbed().is_some(), "setup failed to grab");
}

fn value_of(tree: &KinematicTree, name: &str) -> f32 {
    tree.joint(tree.joint_by_name(name).unwrap()).unwrap().value()
}

#[test]
fn quarter_turn_about_y_is_clockwise() {
    let mut tree = single(JointSpec::revolute("j", "base", "moving").axis(Vec3::Y));
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);

    manipulator.pointer_move(&mut tree, down(1.0, 0.0), &mut events);
    manipulator.pointer_move(&mut tree, down(0.0, 1.0), &mut events);

    assert_abs_diff_eq!(value_of(&tree, "j"), -FRAC_PI_2, epsilon = 1e-5);
}

#[test]
fn prismatic_drag_scales_by_sensitivity() {
    let mut tree = single(JointSpec::prismatic("slide", "base", "moving").axis(Vec3::X));
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);

    // Vertical rays through (0,0,0) and (2,0,0) are closest to the pivot there.
    manipulator.pointer_move(&mut tree, down(0.0, 0.0), &mut events);
    manipulator.pointer_move(&mut tree, down(2.0, 0.0), &mut events);

    assert_abs_diff_eq!(value_of(&tree, "slide"), 0.02, epsilon = 1e-6);
}

#[test]
fn prismatic_sensitivity_is_configurable() {
    let mut tree = single(JointSpec::prismatic("slide", "base", "moving").axis(Vec3::X));
    let mut manipulator = Manipulator::new(ManipulationConfig::new(0.5));
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);

    manipulator.pointer_move(&mut tree, down(0.0, 0.0), &mut events);
    manipulator.pointer_move(&mut tree, down(-1.0, 0.0), &mut events);

    assert_abs_diff_eq!(value_of(&tree, "slide"), -0.5, epsilon = 1e-6);
}

#[test]
fn in_plane_ray_changes_nothing() {
    let mut tree = single(JointSpec::revolute("j", "base", "moving").axis(Vec3::Y));
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);
    manipulator.pointer_move(&mut tree, down(1.0, 0.0), &mut events);
    events.clear();

    let flat = Ray::new(Vec3::new(-3.0, 0.0, 1.0), Vec3::X);
    assert_eq!(flat.direction.dot(Vec3::Y), 0.0);
    manipulator.pointer_move(&mut tree, flat, &mut events);

    assert!(events.is_empty());
    assert_eq!(value_of(&tree, "j"), 0.0);
}

#[test]
fn reloading_mid_drag_clears_the_session() {
    let mut tree = single(JointSpec::revolute("j", "base", "moving").axis(Vec3::Y));
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);
    manipulator.pointer_move(&mut tree, down(1.0, 0.0), &mut events);
    manipulator.pointer_move(&mut tree, down(1.0, 1.0), &mut events);
    let stale = manipulator.grabbed().unwrap();
    events.clear();

    let mut reloaded = single(JointSpec::revolute("j", "base", "moving").axis(Vec3::Y));
    manipulator.pointer_move(&mut reloaded, down(0.0, 1.0), &mut events);
    manipulator.pointer_up(&reloaded, &mut events);

    assert!(manipulator.grabbed().is_none());
    assert!(events.iter().all(|e| e.handle() != stale));
    assert_eq!(value_of(&reloaded, "j"), 0.0);
}

#[test]
fn full_drag_emits_expected_sequence() {
    let mut tree = single(JointSpec::revolute("j", "base", "moving").axis(Vec3::Y));
    let handle = JointHandle::new(&tree, tree.joint_by_name("j").unwrap());
    let mut manipulator = Manipulator::default();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut dispatcher = EventDispatcher::new();
    {
        let seen = Rc::clone(&seen);
        dispatcher.subscribe(move |event| seen.borrow_mut().push(*event));
    }

    for input in [
        PointerInput::Move(down(0.0, 0.0)),
        PointerInput::Down,
        PointerInput::Move(down(1.0, 0.0)),
        PointerInput::Move(down(1.0, 1.0)),
        PointerInput::Move(down(1.0, 1.0)),
        PointerInput::Up,
    ] {
        manipulator.handle_input(&mut tree, input, &mut dispatcher);
    }

    // Released away from the handle sphere, so the joint is unhovered too.
    assert_eq!(
        *seen.borrow(),
        vec![
            ManipulationEvent::Hover(handle),
            ManipulationEvent::ManipulateStart(handle),
            ManipulationEvent::ValueChange(handle),
            ManipulationEvent::ManipulateEnd(handle),
            ManipulationEvent::Unhover(handle),
        ]
    );
    assert!(manipulator.hovered().is_none());
}

#[test]
fn applied_values_respect_limits_throughout_a_sweep() {
    let mut tree = single(
        JointSpec::revolute("j", "base", "moving")
            .axis(Vec3::Y)
            .limits(-0.75, 0.3),
    );
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);

    let mut last = value_of(&tree, "j");
    for step in 0..720 {
        let angle = step as f32 * 0.05;
        let radius = 1.0 + (step % 7) as f32 * 0.3;
        events.clear();
        manipulator.pointer_move(&mut tree, down(radius * angle.cos(), radius * angle.sin()), &mut events);

        let value = value_of(&tree, "j");
        assert!((-0.75..=0.3).contains(&value), "value {value} escaped limits");

        let changed = events
            .iter()
            .any(|e| matches!(e, ManipulationEvent::ValueChange(_)));
        if changed {
            assert!((value - last).abs() > 1e-4);
        } else {
            assert_eq!(value, last);
        }
        last = value;
    }
}

#[test]
fn at_most_one_hovered_and_grabbed_is_hovered() {
    let mut tree = KinematicTree::builder("base")
        .link("a")
        .link("b")
        .joint(JointSpec::continuous("ja", "base", "a").axis(Vec3::Y))
        .joint(
            JointSpec::continuous("jb", "base", "b")
                .axis(Vec3::Y)
                .origin(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        )
        .surface("a", SphereShape::new(Vec3::ZERO, 0.4))
        .surface("b", SphereShape::new(Vec3::ZERO, 0.4))
        .build()
        .unwrap();
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();

    let script = [
        PointerInput::Move(down(0.0, 0.0)),
        PointerInput::Move(down(0.7, 0.0)),
        PointerInput::Down,
        PointerInput::Move(down(0.0, 0.0)),
        PointerInput::Move(down(-0.5, 0.5)),
        PointerInput::Up,
        PointerInput::Move(down(1.0, 0.0)),
        PointerInput::Down,
        PointerInput::Down,
        PointerInput::Up,
        PointerInput::Up,
        PointerInput::Move(down(5.0, 5.0)),
        PointerInput::Down,
    ];

    let mut hovered: Option<JointHandle> = None;
    for input in script {
        events.clear();
        manipulator.handle_input(&mut tree, input, &mut events);

        for event in &events {
            match event {
                ManipulationEvent::Hover(h) => {
                    assert!(hovered.is_none(), "hover while {hovered:?} still hovered");
                    hovered = Some(*h);
                }
                ManipulationEvent::Unhover(h) => {
                    assert_eq!(hovered, Some(*h));
                    hovered = None;
                }
                _ => {}
            }
        }

        assert_eq!(manipulator.hovered(), hovered);
        if let Some(grabbed) = manipulator.grabbed() {
            assert_eq!(Some(grabbed), manipulator.hovered());
        }
    }
    assert!(manipulator.grabbed().is_none());
}

#[test]
fn axis_less_joint_turns_about_the_tree_default_axis() {
    let mut tree = KinematicTree::builder("base")
        .default_axis(Vec3::Y)
        .link("moving")
        .link("tip")
        .joint(JointSpec::continuous("j", "base", "moving"))
        .joint(
            JointSpec::fixed("tip_mount", "moving", "tip")
                .origin(Transform::from_position(Vec3::X)),
        )
        .surface("moving", SphereShape::new(Vec3::ZERO, 0.25))
        .build()
        .unwrap();
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);

    manipulator.pointer_move(&mut tree, down(1.0, 0.0), &mut events);
    manipulator.pointer_move(&mut tree, down(0.0, 1.0), &mut events);

    assert_abs_diff_eq!(value_of(&tree, "j"), -FRAC_PI_2, epsilon = 1e-5);

    // The link follows the pointer: +X swings round to +Z.
    let tip = tree
        .link_world_transform(tree.link_by_name("tip").unwrap())
        .unwrap()
        .position;
    assert_abs_diff_eq!(tip.x, 0.0, epsilon = 1e-5);
    assert_abs_diff_eq!(tip.y, 0.0, epsilon = 1e-5);
    assert_abs_diff_eq!(tip.z, 1.0, epsilon = 1e-5);
}

#[test]
fn broken_frame_before_anchoring_does_not_end_the_drag() {
    let mut tree = single(JointSpec::revolute("j", "base", "moving").axis(Vec3::Y));
    let mut manipulator = Manipulator::default();
    let mut events = Vec::new();
    grab(&mut tree, &mut manipulator, &mut events);

    manipulator.pointer_move(&mut tree, Ray::new(Vec3::splat(f32::NAN), Vec3::NEG_Y), &mut events);
    manipulator.pointer_move(&mut tree, down(1.0, 0.0), &mut events);
    manipulator.pointer_move(&mut tree, down(0.0, 1.0), &mut events);

    assert!(manipulator.grabbed().is_some());
    assert_abs_diff_eq!(value_of(&tree, "j"), -FRAC_PI_2, epsilon = 1e-5);
}
