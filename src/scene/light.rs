use super::camera::{CameraKind, CameraNode, Projection};
use super::components::NodeId;
use crate::renderer::{LightData, LightType};

/// Light node component. The shadow camera is a detached node in the same
/// arena, owned by the light and destroyed with it.
#[derive(Debug, Clone)]
pub struct LightNode {
    pub(crate) data: LightData,
    pub(crate) shadow_camera: NodeId,
    /// Driver slot from the last light upload, `None` when it was rejected.
    pub(crate) slot: Option<usize>,
}

impl LightNode {
    pub fn data(&self) -> &LightData {
        &self.data
    }

    pub fn light_type(&self) -> LightType {
        self.data.light_type
    }

    pub fn shadow_camera(&self) -> NodeId {
        self.shadow_camera
    }

    pub fn driver_slot(&self) -> Option<usize> {
        self.slot
    }

    /// Changes radius and attenuation only; the shadow camera stays.
    pub fn set_radius(&mut self, radius: f32) {
        self.data.set_radius(radius);
    }
}

/// Camera kind used to render shadows for a light type.
pub fn shadow_camera_kind(light_type: LightType) -> CameraKind {
    match light_type {
        LightType::Directional => CameraKind::Orthogonal,
        LightType::Point | LightType::Spot => CameraKind::Perspective,
    }
}

/// Shadow maps are square, so the aspect is pinned to 1.
pub(crate) fn new_shadow_camera(light_type: LightType) -> CameraNode {
    let projection = match shadow_camera_kind(light_type) {
        CameraKind::Orthogonal => Projection::Orthogonal {
            width: 100.0,
            aspect: Some(1.0),
        },
        _ => Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_2,
            aspect: Some(1.0),
        },
    };
    CameraNode::with_projection(projection)
}
