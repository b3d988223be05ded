//! End-to-end tests of 3D scenes through the facade.

use std::thread;

use fieldscope::*;
use proptest::prelude::*;

/// Camera on the +X axis looking at the origin, so depth falls with x.
fn scene_looking_down_x() -> Scene {
    let mut scene = Scene::new();
    scene.camera_mut().set_xyz(DVec3::new(20.0, 0.0, 0.0));
    scene.camera_mut().set_focus_xyz(DVec3::ZERO);
    scene
}

/// A short segment along y, centred at `x`.
fn marker_at(x: f64) -> Element {
    let mut style = Style::default();
    style.relative_position = RelativePosition::Centered;
    Element::new(Primitive::Segment)
        .with_xyz(DVec3::new(x, 0.0, 0.0))
        .with_size_xyz(DVec3::new(0.0, 0.1, 0.0))
        .with_style(style)
}

#[test]
fn test_painter_order_matches_known_depths() {
    init_logging();
    let xs = [3.0, -2.0, 0.5, 5.0, -7.5, 1.0];
    let mut scene = scene_looking_down_x();
    let ids: Vec<ElementId> = xs.iter().map(|x| scene.add(marker_at(*x))).collect();

    // Farthest from the camera (smallest x) first.
    let mut expected: Vec<(f64, ElementId)> = xs.iter().copied().zip(ids).collect();
    expected.sort_by(|a, b| a.0.total_cmp(&b.0));
    let expected: Vec<ElementId> = expected.into_iter().map(|(_, id)| id).collect();

    let order: Vec<ElementId> = scene.sorted_tiles().iter().map(|t| t.element).collect();
    assert_eq!(order, expected);

    for mode in [ProjectionMode::NoPerspective, ProjectionMode::PlanarYz] {
        scene.camera_mut().set_projection_mode(mode);
        let order: Vec<ElementId> = scene.sorted_tiles().iter().map(|t| t.element).collect();
        assert_eq!(order, expected, "{}", mode.name());
    }
}

#[test]
fn test_equal_depths_keep_insertion_order() {
    init_logging();
    let mut scene = scene_looking_down_x();
    let first = scene.add(marker_at(1.0));
    let near = scene.add(marker_at(4.0));
    let second = scene.add(marker_at(1.0));
    let third = scene.add(marker_at(1.0));
    let order: Vec<ElementId> = scene.sorted_tiles().iter().map(|t| t.element).collect();
    assert_eq!(order, vec![first, second, third, near]);
}

#[test]
fn test_depth_factor_pulls_element_forward() {
    init_logging();
    let mut scene = scene_looking_down_x();
    let near = scene.add(marker_at(4.0));
    let far = scene.add(marker_at(-4.0));
    scene.get_mut(far).unwrap().style_mut().depth_factor = 0.1;
    let order: Vec<ElementId> = scene.sorted_tiles().iter().map(|t| t.element).collect();
    assert_eq!(order, vec![near, far]);
}

#[test]
fn test_nan_tiles_are_not_drawn() {
    init_logging();
    let mut scene = scene_looking_down_x();
    scene.add(marker_at(0.0));
    scene.add(Element::new(Primitive::Segment).with_xyz(DVec3::NAN));
    assert_eq!(scene.sorted_tiles().len(), 1);
    let list = scene.render(&Viewport::new(100, 100));
    assert_eq!(list.len(), 1);
}

#[test]
fn test_group_rotation_and_bounds() {
    init_logging();
    let mut scene = Scene::new();
    let group = scene.add(Element::group().with_xyz(DVec3::new(0.0, 0.0, 10.0)));
    scene
        .add_to_group(group, Element::new(Primitive::Segment))
        .unwrap();
    scene
        .get_mut(group)
        .unwrap()
        .set_transformation(Some(DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2)));

    let bounds = scene.bounds();
    assert!((bounds.min - DVec3::new(-1.0, 0.0, 10.0)).length() < 1e-12);
    assert!((bounds.max - DVec3::new(0.0, 1.0, 11.0)).length() < 1e-12);

    scene.reset_camera();
    assert!((scene.camera().focus() - bounds.center()).length() < 1e-12);
}

#[test]
fn test_every_primitive_renders() {
    init_logging();
    let mut scene = Scene::new();
    let trail = Element::trail();
    let handle = trail.trail_handle().unwrap().clone();
    handle.add_point(DVec3::ZERO);
    handle.add_point(DVec3::ONE);
    let group = scene.add(Element::group());
    for primitive in [
        Primitive::Box(BoxShape::default()),
        Primitive::Cone(ConeShape::default()),
        Primitive::Sphere(SphereShape::default()),
        Primitive::Segment,
        Primitive::Spring(SpringShape::default()),
        Primitive::Tetrahedron(TetrahedronShape::default()),
    ] {
        let name = primitive.name();
        let id = scene.add_to_group(group, Element::new(primitive)).unwrap();
        assert_eq!(scene.get(id).unwrap().name(), name);
    }
    scene.add(trail);

    let list = scene.render(&Viewport::new(320, 240));
    assert!(!list.is_empty());
    assert_eq!(list.space(), CoordinateSpace::Screen);
    let markers = list
        .iter()
        .filter(|c| matches!(c, DrawCommand::Marker { .. }))
        .count();
    assert_eq!(markers, 1);
}

#[test]
fn test_trail_fed_from_another_thread() {
    init_logging();
    let mut scene = Scene::new();
    let id = scene.add(Element::trail());
    let handle = scene.get(id).unwrap().trail_handle().unwrap().clone();
    handle.set_maximum_points(50);

    let writer = {
        let handle = handle.clone();
        thread::spawn(move || {
            for i in 0..500 {
                let t = f64::from(i) * 0.01;
                handle.add_point(DVec3::new(t.cos(), t.sin(), t));
            }
        })
    };
    for _ in 0..20 {
        let n = scene.sorted_tiles().len();
        assert!(n <= 50);
    }
    writer.join().unwrap();
    assert_eq!(scene.sorted_tiles().len(), 50);
}

#[test]
fn test_axes_mode_swaps_drawn_axes() {
    init_logging();
    let mut scene = Scene::new();
    let id = scene.add(Element::new(Primitive::Segment).with_size_xyz(DVec3::new(0.0, 1.0, 0.0)));
    scene.set_axes_mode(AxesMode::XZY);
    let corners = scene.sorted_tiles()[0].corners.clone();
    assert_eq!(corners[1], DVec3::new(0.0, 0.0, 1.0));
    assert_eq!(scene.get(id).unwrap().size_xyz(), DVec3::new(0.0, 1.0, 0.0));
}

proptest! {
    #[test]
    fn prop_sorted_by_distance_from_camera(xs in prop::collection::vec(-10i32..10, 1..25)) {
        let mut scene = scene_looking_down_x();
        for x in &xs {
            scene.add(marker_at(f64::from(*x)));
        }
        let drawn: Vec<f64> = scene
            .sorted_tiles()
            .iter()
            .map(|t| t.centroid().x)
            .collect();
        prop_assert_eq!(drawn.len(), xs.len());
        for w in drawn.windows(2) {
            prop_assert!(w[0] <= w[1]);
        }
    }
}
