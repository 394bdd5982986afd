use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use glam::Vec3;

use zoetrope_bridge::Runtime;
use zoetrope_scene::{RenderNode, Scene};
use zoetrope_scripting::ErrorKind;

fn runtime_with_scene() -> (Runtime, Rc<RefCell<Scene>>) {
    let scene = Rc::new(RefCell::new(Scene::new()));
    let runtime = Runtime::new(Box::new(Rc::clone(&scene)));
    (runtime, scene)
}

fn root_of(scene: &Rc<RefCell<Scene>>, name: &str) -> RenderNode {
    let mut scene = scene.borrow_mut();
    let slot = scene
        .animations_mut()
        .iter_mut()
        .position(|a| a.name == name)
        .unwrap_or_else(|| panic!("no animation named {name}"));
    scene.animations_mut().remove(slot).root
}

#[test]
fn constant_scene_registers_no_drivers() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source(
        "(animation \"still\" 2 (vec3 1 4 1)\n  (translate (vec3 0 1 0) (cube (vec3 2) (color \"red\"))))",
    )
    .unwrap();

    assert_eq!(rt.driver_count(), 0);
    let scene = scene.borrow();
    let anim = scene.get("still").unwrap();
    assert_eq!(anim.length, 2.0);
    assert_eq!(anim.light_pos, Vec3::new(1.0, 4.0, 1.0));
    assert_eq!(anim.root.node_count(), 2);
}

#[test]
fn literal_vec3_is_static_not_aliased() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source("(= v (vec3 1 2 3))\n(animation \"a\" 1 v (translate v (cube)))")
        .unwrap();
    assert_eq!(rt.driver_count(), 0);
    assert_eq!(
        scene.borrow().get("a").unwrap().light_pos,
        Vec3::new(1.0, 2.0, 3.0)
    );

    let root = root_of(&scene, "a");
    let RenderNode::Translate { offset, .. } = root else {
        panic!("expected a translate root");
    };
    assert_eq!(offset.get(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn binding_errors_name_the_offered_variant() {
    let (mut rt, _scene) = runtime_with_scene();
    let err = rt.eval_source("(cube (color \"red\"))").unwrap_err();
    assert!(err.to_string().contains("expect vec3, got color"), "{err}");

    let err = rt
        .eval_source("(rotateX (color \"red\") (cube))")
        .unwrap_err();
    assert!(err.to_string().contains("expect number, got color"), "{err}");
}

#[test]
fn helper_adopts_children_like_a_group() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source("(animation \"a\" 1 (vec3 0 4 0) (helper (cube) (cube)))")
        .unwrap();
    assert_eq!(scene.borrow().get("a").unwrap().root.node_count(), 3);
}

#[test]
fn broadcast_vec3_shares_one_cell_across_components() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source("(animation \"a\" 1 (vec3 0 4 0) (cube (vec3 (fn (t) (+ t 1)))))")
        .unwrap();

    // One callable, one driver, even though it feeds three components.
    assert_eq!(rt.driver_count(), 1);
    rt.tick(2.0);

    let root = root_of(&scene, "a");
    match root {
        RenderNode::Primitive { scale, .. } => assert_eq!(scale.get(), Vec3::splat(3.0)),
        _ => panic!("expected a primitive root"),
    }
}

#[test]
fn scalar_driver_tracks_tick_time() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source("(animation \"a\" 1 (vec3 0 4 0) (rotateX (fn (t) (* t 2)) (cube)))")
        .unwrap();
    assert_eq!(rt.driver_count(), 1);

    rt.tick(0.25);
    let root = root_of(&scene, "a");
    match root {
        RenderNode::Rotate { angle, axis, .. } => {
            assert_eq!(*angle.borrow(), 0.5);
            assert_eq!(axis.get(), Vec3::X);
        }
        _ => panic!("expected a rotate root"),
    }
}

#[test]
fn lfo_oscillates_around_its_center() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source("(animation \"a\" 1 (vec3 0 4 0) (rotateZ (lfo 0 1 1) (cube)))")
        .unwrap();
    assert_eq!(rt.driver_count(), 1);

    let root = root_of(&scene, "a");
    let RenderNode::Rotate { angle, .. } = root else {
        panic!("expected a rotate root");
    };

    // Initial value is the center, before any tick.
    assert_eq!(*angle.borrow(), 0.0);
    rt.tick(0.25);
    assert!((*angle.borrow() - 1.0).abs() < 1e-4);
    rt.tick(0.5);
    assert!(angle.borrow().abs() < 1e-4);
}

#[test]
fn vector_lfo_oscillates_per_component() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source(
        "(animation \"a\" 1 (vec3 0 4 0)\n  (translate (lfo (vec3 0 1 0) (vec3 1 0 0) 1) (cube)))",
    )
    .unwrap();

    let root = root_of(&scene, "a");
    let RenderNode::Translate { offset, .. } = root else {
        panic!("expected a translate root");
    };

    rt.tick(0.25);
    let v = offset.get();
    assert!((v.x - 1.0).abs() < 1e-4);
    assert_eq!(v.y, 1.0);
    assert_eq!(v.z, 0.0);
}

#[test]
fn driver_failure_holds_last_value() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source(
        "(animation \"a\" 1 (vec3 0 4 0)\n  (rotateX (fn (t) (if (< t 1) t no-such-symbol)) (cube)))",
    )
    .unwrap();

    let root = root_of(&scene, "a");
    let RenderNode::Rotate { angle, .. } = root else {
        panic!("expected a rotate root");
    };

    rt.tick(0.5);
    assert_eq!(*angle.borrow(), 0.5);
    rt.tick(2.0);
    assert_eq!(*angle.borrow(), 0.5);
}

#[test]
fn node_adopted_twice_is_an_error() {
    let (mut rt, _scene) = runtime_with_scene();
    let err = rt
        .eval_source("(= c (cube))\n(= g (group c))\n(group c)")
        .unwrap_err();
    assert!(err.to_string().contains("already adopted"), "{err}");
}

#[test]
fn reevaluation_replaces_scene_and_drivers() {
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source("(animation \"first\" 1 (vec3 0 4 0) (rotateY (fn (t) t) (cube)))")
        .unwrap();
    assert_eq!(rt.driver_count(), 1);

    rt.eval_source("(animation \"second\" 1 (vec3 0 4 0) (cube))")
        .unwrap();
    assert_eq!(rt.driver_count(), 0);

    let scene = scene.borrow();
    assert!(scene.get("first").is_none());
    assert!(scene.get("second").is_some());
    assert_eq!(scene.animations().len(), 1);
}

#[test]
fn reevaluation_is_deterministic() {
    let src = "(= leg (fn () (translate (vec3 0 -1 0) (cube))))\n\
               (animation \"a\" 1 (vec3 0 4 0) (group (leg) (leg)))";
    let (mut rt, scene) = runtime_with_scene();
    rt.eval_source(src).unwrap();
    let first = scene.borrow().get("a").unwrap().root.node_count();

    rt.eval_source(src).unwrap();
    let second = scene.borrow().get("a").unwrap().root.node_count();
    assert_eq!(first, second);
    assert_eq!(first, 5);
}

#[test]
fn failed_evaluation_leaves_partial_scene() {
    let (mut rt, scene) = runtime_with_scene();
    let err = rt
        .eval_source("(animation \"done\" 1 (vec3 0 4 0) (cube))\n(no-such-symbol)")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Eval);
    assert!(scene.borrow().get("done").is_some());
}

#[test]
fn eval_returns_last_value_rendered() {
    let (mut rt, _scene) = runtime_with_scene();
    assert_eq!(rt.eval_source("(= x 41) (+ x 1)").unwrap(), "42");
}

#[test]
fn require_resolves_dotted_names_and_memoizes() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/util.zt"), "(= n (+ n 1))\n").unwrap();
    fs::write(
        dir.path().join("main.zt"),
        "(= n 0)\n(require \"lib.util\")\n(require \"lib.util\")\nn\n",
    )
    .unwrap();

    let (mut rt, _scene) = runtime_with_scene();
    rt.new_session(&dir.path().join("main.zt"));
    // Memoized second require does not re-run the module body.
    assert_eq!(rt.eval().unwrap(), "1");
    assert_eq!(rt.used_files(), vec!["lib/util.zt", "main.zt"]);

    // A fresh pass clears the memo table and runs the module again.
    assert_eq!(rt.eval().unwrap(), "1");
}

#[test]
fn require_of_a_missing_file_is_a_resolution_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.zt"), "(require \"nope\")\n").unwrap();

    let (mut rt, _scene) = runtime_with_scene();
    rt.new_session(&dir.path().join("main.zt"));
    let err = rt.eval().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Resolution);
    assert!(err.to_string().contains("nope.zt"), "{err}");
}

#[test]
fn host_errors_carry_the_call_trace() {
    let (mut rt, _scene) = runtime_with_scene();
    let err = rt
        .eval_source("(= build (fn () (color \"no-such-color\")))\n(build)")
        .unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("unknown color"), "{rendered}");
    assert!(rendered.contains("=> build"), "{rendered}");
}
