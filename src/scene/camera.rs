use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::PI;

/// How a camera builds its projection matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// `aspect` of `None` follows the driver's screen size.
    Perspective { fov_y: f32, aspect: Option<f32> },
    /// Box projection `width` units wide.
    Orthogonal { width: f32, aspect: Option<f32> },
    Custom(Mat4),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraKind {
    Perspective,
    Orthogonal,
    Custom,
}

impl Projection {
    pub fn kind(&self) -> CameraKind {
        match self {
            Projection::Perspective { .. } => CameraKind::Perspective,
            Projection::Orthogonal { .. } => CameraKind::Orthogonal,
            Projection::Custom(_) => CameraKind::Custom,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CameraNode {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    pub projection: Projection,
    view: Mat4,
    proj: Mat4,
}

impl CameraNode {
    pub const DEFAULT_FOV_Y: f32 = PI / 2.5;

    pub fn perspective(fov_y: f32) -> Self {
        Self::with_projection(Projection::Perspective { fov_y, aspect: None })
    }

    pub fn orthogonal(width: f32) -> Self {
        Self::with_projection(Projection::Orthogonal { width, aspect: None })
    }

    pub fn custom(projection: Mat4) -> Self {
        Self::with_projection(Projection::Custom(projection))
    }

    pub fn with_projection(projection: Projection) -> Self {
        Self {
            eye: Vec3::ZERO,
            target: Vec3::new(0.0, 0.0, 100.0),
            up: Vec3::Y,
            near: 1.0,
            far: 3000.0,
            projection,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        }
    }

    pub fn kind(&self) -> CameraKind {
        self.projection.kind()
    }

    /// Rebuilds the view matrix from `eye`, `target` and `up`.
    pub fn update_view_transform(&mut self) {
        self.view = look_at(self.eye, self.target, self.up);
    }

    /// Rebuilds the projection matrix. `screen_aspect` is used by variants
    /// without a fixed aspect ratio.
    pub fn update_projection_transform(&mut self, screen_aspect: f32) {
        let near = self.near;
        let far = self.far.max(near + f32::EPSILON);
        self.proj = match self.projection {
            Projection::Perspective { fov_y, aspect } => {
                Mat4::perspective_lh(fov_y, aspect.unwrap_or(screen_aspect), near, far)
            }
            Projection::Orthogonal { width, aspect } => {
                let half_w = width * 0.5;
                let half_h = half_w / aspect.unwrap_or(screen_aspect);
                Mat4::orthographic_lh(-half_w, half_w, -half_h, half_h, near, far)
            }
            Projection::Custom(matrix) => matrix,
        };
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.proj
    }

    pub fn view_projection(&self) -> Mat4 {
        self.proj * self.view
    }

    pub fn direction(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }
}

impl Default for CameraNode {
    fn default() -> Self {
        Self::perspective(Self::DEFAULT_FOV_Y)
    }
}

/// Left-handed look-at basis: forward towards `at`, right = up x forward,
/// translation the negated basis projections of `eye`.
pub fn look_at(eye: Vec3, at: Vec3, up: Vec3) -> Mat4 {
    let direction = (at - eye).try_normalize().unwrap_or(Vec3::Z);
    let right = up
        .cross(direction)
        .try_normalize()
        .unwrap_or_else(|| direction.any_orthonormal_vector());
    let up = direction.cross(right);

    Mat4::from_cols(
        Vec4::new(right.x, up.x, direction.x, 0.0),
        Vec4::new(right.y, up.y, direction.y, 0.0),
        Vec4::new(right.z, up.z, direction.z, 0.0),
        Vec4::new(-right.dot(eye), -up.dot(eye), -direction.dot(eye), 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_matches_glam_lh() {
        let eye = Vec3::new(3.0, 4.0, -5.0);
        let at = Vec3::new(0.5, 0.0, 2.0);
        let ours = look_at(eye, at, Vec3::Y);
        let glam = Mat4::look_at_lh(eye, at, Vec3::Y);
        assert!(ours.abs_diff_eq(glam, 1e-5));
    }

    #[test]
    fn view_basis_is_orthonormal() {
        let view = look_at(Vec3::new(0.0, 0.0, -2.0), Vec3::ZERO, Vec3::Y);
        let rot = glam::Mat3::from_mat4(view);
        assert!((rot * rot.transpose()).abs_diff_eq(glam::Mat3::IDENTITY, 1e-6));
        // the eye lands on the view-space origin
        assert!(view
            .transform_point3(Vec3::new(0.0, 0.0, -2.0))
            .abs_diff_eq(Vec3::ZERO, 1e-6));
        // the target is in front, on +Z
        assert!(view
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
    }

    #[test]
    fn degenerate_up_still_gives_a_basis() {
        let view = look_at(Vec3::ZERO, Vec3::new(0.0, -10.0, 0.0), Vec3::Y);
        assert!(view.is_finite());
        assert!((view.determinant() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn perspective_uses_screen_aspect_when_unset() {
        let mut cam = CameraNode::default();
        cam.update_projection_transform(2.0);
        let expected = Mat4::perspective_lh(CameraNode::DEFAULT_FOV_Y, 2.0, 1.0, 3000.0);
        assert!(cam.projection_matrix().abs_diff_eq(expected, 1e-6));

        cam.projection = Projection::Perspective {
            fov_y: 1.0,
            aspect: Some(1.0),
        };
        cam.update_projection_transform(2.0);
        let expected = Mat4::perspective_lh(1.0, 1.0, 1.0, 3000.0);
        assert!(cam.projection_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn orthogonal_box_spans_width() {
        let mut cam = CameraNode::orthogonal(20.0);
        cam.near = 0.0;
        cam.far = 10.0;
        cam.update_projection_transform(2.0);
        let p = cam.projection_matrix();
        assert!(p
            .project_point3(Vec3::new(10.0, 5.0, 10.0))
            .abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), 1e-6));
        assert_eq!(cam.kind(), CameraKind::Orthogonal);
    }

    #[test]
    fn custom_projection_is_kept() {
        let m = Mat4::from_scale(Vec3::splat(2.0));
        let mut cam = CameraNode::custom(m);
        cam.update_projection_transform(1.5);
        assert_eq!(cam.projection_matrix(), m);
        assert_eq!(cam.kind(), CameraKind::Custom);
    }
}
