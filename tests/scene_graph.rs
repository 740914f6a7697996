use glam::{Mat4, Vec3};
use kong::scene::{Animator, NodeKind, NodeParams, SceneManager, Transform};

fn assert_mat_eq(a: Mat4, b: Mat4) {
    assert!(a.abs_diff_eq(b, 1e-4), "{a:?} != {b:?}");
}

#[test]
fn absolute_is_parent_absolute_times_relative() {
    let mut scene = SceneManager::new(None);
    let a = scene.add_empty_scene_node(
        NodeParams::new()
            .at(Vec3::new(1.0, 2.0, 3.0))
            .rotated(Vec3::new(0.0, 90.0, 0.0)),
    );
    let b = scene.add_empty_scene_node(
        NodeParams::new()
            .under(a)
            .at(Vec3::new(0.0, 0.0, 5.0))
            .scaled(Vec3::splat(2.0)),
    );
    let c = scene.add_empty_scene_node(NodeParams::new().under(b).rotated(Vec3::new(30.0, 0.0, 10.0)));

    let root = scene.root();
    scene.graph_mut().animate(root, 0);

    let graph = scene.graph();
    for node in [a, b, c] {
        let parent = graph.parent(node).unwrap();
        let expected = graph.absolute_transform(parent).unwrap() * graph.relative(node).unwrap().matrix();
        assert_mat_eq(graph.absolute_transform(node).unwrap(), expected);
    }
    assert_mat_eq(
        graph.absolute_transform(root).unwrap(),
        graph.relative(root).unwrap().matrix(),
    );
    assert!(graph
        .absolute_position(b)
        .unwrap()
        .abs_diff_eq(Vec3::new(6.0, 2.0, 3.0), 1e-4));
}

#[test]
fn absolute_transform_is_frame_coherent() {
    let mut scene = SceneManager::new(None);
    let node = scene.add_empty_scene_node(NodeParams::new());
    scene.graph_mut().set_position(node, Vec3::new(4.0, 0.0, 0.0));

    // stale until refreshed
    assert_eq!(scene.graph().absolute_position(node), Some(Vec3::ZERO));

    scene.update_absolute_position(node);
    assert_eq!(scene.graph().absolute_position(node), Some(Vec3::new(4.0, 0.0, 0.0)));
}

#[test]
fn reparenting_is_exclusive_and_idempotent() {
    let mut scene = SceneManager::new(None);
    let a = scene.add_empty_scene_node(NodeParams::new().named("a"));
    let b = scene.add_empty_scene_node(NodeParams::new().named("b"));
    let n = scene.add_empty_scene_node(NodeParams::new().under(a));

    assert!(scene.add_child(b, n));
    assert!(scene.add_child(b, n));

    let graph = scene.graph();
    assert_eq!(graph.parent(n), Some(b));
    assert!(!graph.children(a).contains(&n));
    assert_eq!(graph.children(b), vec![n]);
}

#[test]
fn cycles_are_refused() {
    let mut scene = SceneManager::new(None);
    let a = scene.add_empty_scene_node(NodeParams::new());
    let b = scene.add_empty_scene_node(NodeParams::new().under(a));

    assert!(!scene.add_child(b, a));
    assert!(!scene.add_child(a, a));
    assert_eq!(scene.graph().parent(b), Some(a));
}

#[test]
fn removed_nodes_and_their_subtree_are_gone() {
    let mut scene = SceneManager::new(None);
    let a = scene.add_empty_scene_node(NodeParams::new());
    let b = scene.add_cube_scene_node(1.0, NodeParams::new().under(a));
    let keep = scene.add_empty_scene_node(NodeParams::new());

    scene.remove_node(a);

    assert!(!scene.contains(a));
    assert!(!scene.contains(b));
    assert!(scene.contains(keep));
    assert_eq!(scene.graph().children(scene.root()), vec![keep]);
}

#[test]
fn removing_the_active_camera_resets_it() {
    let mut scene = SceneManager::new(None);
    let camera = scene.add_camera_scene_node(Vec3::ZERO, NodeParams::new().at(Vec3::NEG_Z));
    assert_eq!(scene.active_camera(), Some(camera));

    scene.remove_all();

    assert_eq!(scene.active_camera(), None);
    assert!(!scene.contains(camera));
    assert!(scene.contains(scene.root()));
}

#[test]
fn clear_removes_detached_nodes_too() {
    let mut scene = SceneManager::new(None);
    let parent = scene.add_empty_scene_node(NodeParams::new());
    let orphan = scene.add_empty_scene_node(NodeParams::new().under(parent));
    assert!(scene.graph_mut().remove_child(parent, orphan));
    assert!(scene.contains(orphan));

    scene.clear();

    assert!(!scene.contains(orphan));
    assert!(!scene.contains(parent));
    assert_eq!(scene.graph().node_count(), 1);
}

#[test]
fn only_cameras_become_active() {
    let mut scene = SceneManager::new(None);
    let cube = scene.add_cube_scene_node(1.0, NodeParams::new());
    let camera = scene.add_camera_scene_node(Vec3::ZERO, NodeParams::new().at(Vec3::NEG_Z));

    assert!(!scene.set_active_camera(Some(cube)));
    assert_eq!(scene.active_camera(), Some(camera));
    assert!(scene.set_active_camera(None));
    assert_eq!(scene.active_camera(), None);
}

#[test]
fn nodes_are_found_by_id_and_name() {
    let mut scene = SceneManager::new(None);
    let parent = scene.add_empty_scene_node(NodeParams::new().named("parent"));
    let child = scene.add_cube_scene_node(1.0, NodeParams::new().under(parent).with_id(42).named("crate"));

    assert_eq!(scene.find_node_by_id(42), Some(child));
    assert_eq!(scene.find_node_by_name("parent"), Some(parent));
    assert_eq!(scene.find_node_by_name("missing"), None);
    assert_eq!(scene.graph().kind(child), Some(NodeKind::Cube));
}

#[test]
fn transformed_bounding_box_follows_the_node() {
    let mut scene = SceneManager::new(None);
    let cube = scene.add_cube_scene_node(2.0, NodeParams::new().at(Vec3::new(10.0, 0.0, 0.0)));

    let local = scene.bounding_box(cube);
    assert!(local.min.abs_diff_eq(Vec3::splat(-1.0), 1e-5));
    assert!(local.max.abs_diff_eq(Vec3::splat(1.0), 1e-5));

    let world = scene.transformed_bounding_box(cube);
    assert!(world.min.abs_diff_eq(Vec3::new(9.0, -1.0, -1.0), 1e-5));
    assert!(world.max.abs_diff_eq(Vec3::new(11.0, 1.0, 1.0), 1e-5));
}

#[test]
#[should_panic(expected = "camera nodes have no bounding box")]
fn camera_bounding_box_is_a_programming_error() {
    let mut scene = SceneManager::new(None);
    let camera = scene.add_camera_scene_node(Vec3::ZERO, NodeParams::new().at(Vec3::NEG_Z));
    scene.bounding_box(camera);
}

#[test]
fn animators_run_during_the_sweep() {
    let mut scene = SceneManager::new(None);
    let node = scene.add_empty_scene_node(NodeParams::new());
    scene.add_animator(
        node,
        Animator::fly_straight(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1000, false, 0),
    );

    let root = scene.root();
    scene.graph_mut().animate(root, 500);

    let position = scene.graph().absolute_position(node).unwrap();
    assert!(position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-4));
    assert_eq!(
        scene.graph().relative(node).map(|t| t.translation),
        Some(position)
    );
}

#[test]
fn transform_composes_in_scale_rotate_translate_order() {
    let t = Transform::from_trs(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 90.0), Vec3::splat(2.0));
    let p = t.matrix().transform_point3(Vec3::X);
    assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
}
