use crate::renderer::LightType;
use crate::scene::bounds::Aabb;
use crate::scene::camera::{CameraNode, Projection};
use crate::scene::components::SceneNode;
use crate::scene::light::LightNode;
use glam::Vec3;
use hecs::{Entity, World};

pub(crate) fn safe_normalize(vec: Vec3, fallback: Vec3) -> Vec3 {
    if vec.length_squared() > 1e-6 {
        vec.normalize()
    } else {
        fallback
    }
}

/// World up, unless the light looks (almost) straight along it.
pub(crate) fn shadow_up(direction: Vec3) -> Vec3 {
    let up = Vec3::Y;
    if direction.dot(up).abs() > 0.999 {
        Vec3::Z
    } else {
        up
    }
}

/// Refreshes world-space light position and direction from the node's
/// absolute transform, then re-aims the shadow camera.
pub(crate) fn do_light_recalc(world: &mut World, entity: Entity) {
    let absolute = match world.get::<&SceneNode>(entity) {
        Ok(node) => node.absolute,
        Err(_) => return,
    };
    let Ok(light) = world.query_one_mut::<&mut LightNode>(entity) else {
        return;
    };

    let data = &mut light.data;
    if matches!(data.light_type, LightType::Spot | LightType::Directional) {
        data.direction = safe_normalize(absolute.transform_vector3(Vec3::Z), Vec3::Z);
    }
    if matches!(data.light_type, LightType::Spot | LightType::Point) {
        data.position = absolute.w_axis.truncate();
    }

    do_camera_recalc(world, entity);
}

/// Points the shadow camera from the light along its direction. Directional
/// lights look from a point `radius` units behind their position.
pub(crate) fn do_camera_recalc(world: &mut World, entity: Entity) {
    let (data, camera) = match world.get::<&LightNode>(entity) {
        Ok(light) => (light.data, light.shadow_camera),
        Err(_) => return,
    };

    let eye = match data.light_type {
        LightType::Directional => data.position - data.direction * data.radius.max(1.0),
        LightType::Point | LightType::Spot => data.position,
    };

    if let Ok(shadow) = world.query_one_mut::<&mut CameraNode>(camera.0) {
        shadow.eye = eye;
        shadow.target = data.position + data.direction;
        shadow.up = shadow_up(data.direction);
        shadow.far = data.radius.max(1.0) * 2.0;
        shadow.update_view_transform();
        shadow.update_projection_transform(1.0);
    }
}

/// Fits the light's shadow camera around `bounds` so that everything in the
/// solid bucket falls inside its frustum.
pub(crate) fn frame_shadow_camera(world: &mut World, entity: Entity, bounds: &Aabb) {
    let (data, camera) = match world.get::<&LightNode>(entity) {
        Ok(light) => (light.data, light.shadow_camera),
        Err(_) => return,
    };
    let Ok(shadow) = world.query_one_mut::<&mut CameraNode>(camera.0) else {
        log::warn!("Light {:?} lost its shadow camera", entity);
        return;
    };

    let center = bounds.center();
    let radius = bounds.radius().max(1.0);

    match data.light_type {
        LightType::Directional => {
            let direction = safe_normalize(data.direction, Vec3::Z);
            shadow.eye = center - direction * radius * 2.0;
            shadow.target = center;
            shadow.up = shadow_up(direction);
            shadow.near = radius * 0.01;
            shadow.far = radius * 4.0;
            shadow.projection = Projection::Orthogonal {
                width: radius * 2.0,
                aspect: Some(1.0),
            };
        }
        LightType::Point | LightType::Spot => {
            let to_center = center - data.position;
            let distance = to_center.length();
            let direction = match data.light_type {
                LightType::Spot => safe_normalize(data.direction, Vec3::Z),
                _ => safe_normalize(to_center, Vec3::Z),
            };
            let fov_y = match data.light_type {
                LightType::Spot => data.outer_cone.to_radians(),
                _ if distance > radius => 2.0 * (radius / distance).asin(),
                _ => std::f32::consts::FRAC_PI_2,
            };
            shadow.eye = data.position;
            shadow.target = data.position + direction;
            shadow.up = shadow_up(direction);
            shadow.near = (distance - radius).max(0.1);
            shadow.far = (distance + radius).max(shadow.near + 1.0);
            shadow.projection = Projection::Perspective {
                fov_y: fov_y.clamp(0.1, std::f32::consts::PI * 0.9),
                aspect: Some(1.0),
            };
        }
    }

    shadow.update_view_transform();
    shadow.update_projection_transform(1.0);
    log::trace!(
        "Shadow camera framed at {:?} looking at {:?}",
        shadow.eye,
        shadow.target
    );
}
