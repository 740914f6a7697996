use crate::asset::{Assets, Handle, Mesh};
use crate::renderer::driver::{aspect_ratio, TransformSlot, VideoDriver};
use crate::renderer::material::{Material, MaterialSwitches};
use crate::scene::bounds::Aabb;
use crate::scene::camera::CameraNode;
use crate::scene::components::{LodNode, MeshNode, NodeKind, RenderMode, SceneNode};
use crate::scene::light::LightNode;
use glam::{Mat4, Vec3};
use hecs::{Entity, World};

/// Recomputes the camera's matrices from its node and pushes PROJECTION and
/// VIEW. Returns the camera's world position.
pub(crate) fn render_camera(
    world: &mut World,
    entity: Entity,
    driver: &mut dyn VideoDriver,
) -> Option<Vec3> {
    let eye = world
        .get::<&SceneNode>(entity)
        .ok()?
        .absolute
        .w_axis
        .truncate();
    let aspect = aspect_ratio(driver.screen_size());

    let camera = world.query_one_mut::<&mut CameraNode>(entity).ok()?;
    camera.eye = eye;
    camera.update_view_transform();
    camera.update_projection_transform(aspect);

    driver.set_transform(TransformSlot::Projection, &camera.projection_matrix());
    driver.set_transform(TransformSlot::View, &camera.view());
    Some(eye)
}

fn shadow_matrices(world: &World, light: Entity) -> Option<(Mat4, Mat4)> {
    let camera = world.get::<&LightNode>(light).ok()?.shadow_camera;
    let shadow = world.get::<&CameraNode>(camera.0).ok()?;
    Some((shadow.view(), shadow.projection_matrix()))
}

/// Makes the light's shadow camera the active VIEW/PROJECTION.
pub(crate) fn render_shadow_view(world: &World, light: Entity, driver: &mut dyn VideoDriver) {
    if let Some((view, projection)) = shadow_matrices(world, light) {
        driver.set_transform(TransformSlot::Projection, &projection);
        driver.set_transform(TransformSlot::View, &view);
    }
}

/// Uploads the light into a dynamic light slot. With `light_space` the
/// shadow camera matrices go to the light-space slots for shadow sampling.
pub(crate) fn render_light(
    world: &mut World,
    entity: Entity,
    driver: &mut dyn VideoDriver,
    light_space: bool,
) -> Option<usize> {
    let data = world.get::<&LightNode>(entity).ok()?.data;
    let slot = driver.add_dynamic_light(&data);

    if light_space {
        if let Some((view, projection)) = shadow_matrices(world, entity) {
            driver.set_transform(TransformSlot::LightView, &view);
            driver.set_transform(TransformSlot::LightProjection, &projection);
        }
    }

    if let Ok(light) = world.query_one_mut::<&mut LightNode>(entity) {
        light.slot = slot;
    }
    slot
}

/// Draws a geometry node with its own absolute transform. Nodes without a
/// mesh draw nothing.
pub(crate) fn render_geometry(
    world: &World,
    assets: &Assets,
    entity: Entity,
    driver: &mut dyn VideoDriver,
    camera_position: Vec3,
) {
    let Ok(node) = world.get::<&SceneNode>(entity) else {
        return;
    };

    match node.kind {
        NodeKind::Mesh | NodeKind::Cube | NodeKind::Plane => {
            let Ok(mesh_node) = world.get::<&MeshNode>(entity) else {
                return;
            };
            let Some(mesh) = mesh_node.mesh.and_then(|h| assets.mesh(h)) else {
                log::trace!("Node {:?} has no mesh, nothing to draw", node.name);
                return;
            };
            let overrides = (!mesh_node.read_only_materials).then_some(mesh_node.materials.as_slice());
            draw_mesh(driver, mesh, overrides, &node.absolute, node.render_mode);
        }
        NodeKind::Lod => {
            let Ok(lod) = world.get::<&LodNode>(entity) else {
                return;
            };
            let distance = node.absolute.w_axis.truncate().distance(camera_position);
            let Some(mesh) = lod.select(distance).and_then(|l| assets.mesh(l.mesh)) else {
                return;
            };
            draw_mesh(driver, mesh, None, &node.absolute, node.render_mode);
        }
        _ => {}
    }
}

fn draw_mesh(
    driver: &mut dyn VideoDriver,
    mesh: &Mesh,
    overrides: Option<&[Material]>,
    absolute: &Mat4,
    render_mode: RenderMode,
) {
    driver.set_transform(TransformSlot::World, absolute);

    for (i, buffer) in mesh.mesh_buffers().iter().enumerate() {
        let mut material = overrides
            .and_then(|m| m.get(i))
            .copied()
            .unwrap_or(*buffer.material());
        if render_mode == RenderMode::Wireframe {
            material.switches.insert(MaterialSwitches::WIREFRAME);
        }
        driver.set_material(&material);
        driver.draw_mesh_buffer(buffer);
    }
}

fn mesh_handle(world: &World, entity: Entity, kind: NodeKind) -> Option<Handle<Mesh>> {
    match kind {
        NodeKind::Lod => world
            .get::<&LodNode>(entity)
            .ok()?
            .levels()
            .first()
            .map(|l| l.mesh),
        _ => world.get::<&MeshNode>(entity).ok()?.mesh,
    }
}

/// Texture of the first layer of the first material the node draws with.
pub(crate) fn texture_key(world: &World, assets: &Assets, entity: Entity, kind: NodeKind) -> Option<usize> {
    if kind != NodeKind::Lod {
        if let Ok(mesh_node) = world.get::<&MeshNode>(entity) {
            if !mesh_node.read_only_materials {
                if let Some(material) = mesh_node.materials.first() {
                    return material.texture(0).map(|t| t.index());
                }
            }
        }
    }
    let mesh = assets.mesh(mesh_handle(world, entity, kind)?)?;
    mesh.mesh_buffer(0)?.material().texture(0).map(|t| t.index())
}

/// Object-space box of a node.
///
/// # Panics
///
/// Camera nodes have no bounds; asking for them is a programming error.
pub(crate) fn local_bounding_box(world: &World, assets: &Assets, entity: Entity) -> Aabb {
    let Ok(kind) = world.get::<&SceneNode>(entity).map(|n| n.kind) else {
        return Aabb::ZERO;
    };
    match kind {
        NodeKind::Camera => panic!("camera nodes have no bounding box"),
        NodeKind::Mesh | NodeKind::Cube | NodeKind::Plane | NodeKind::Lod => {
            mesh_handle(world, entity, kind)
                .and_then(|h| assets.mesh(h))
                .map(|m| m.bounding_box())
                .unwrap_or(Aabb::ZERO)
        }
        NodeKind::Light | NodeKind::Empty => Aabb::ZERO,
    }
}
