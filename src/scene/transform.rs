use glam::{EulerRot, Mat4, Quat, Vec3};

/// Relative transform of a scene node. Rotation is stored as Euler angles in
/// degrees, applied X first, then Y, then Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_trs(t: Vec3, r: Vec3, s: Vec3) -> Self {
        Self {
            translation: t,
            rotation: r,
            scale: s,
        }
    }

    pub fn quat(&self) -> Quat {
        let r = self.rotation;
        Quat::from_euler(
            EulerRot::ZYX,
            r.z.to_radians(),
            r.y.to_radians(),
            r.x.to_radians(),
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.translation)
    }
}

/// Absolute transform of a node: its relative transform placed under the
/// parent's absolute transform, or on its own for parentless nodes.
pub fn compose(relative: &Transform, parent_absolute: Option<&Mat4>) -> Mat4 {
    match parent_absolute {
        Some(parent) => *parent * relative.matrix(),
        None => relative.matrix(),
    }
}
