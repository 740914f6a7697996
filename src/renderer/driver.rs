// renderer/driver.rs

use super::color::{Color, Colorf};
use super::lights::LightData;
use super::material::{Material, MAX_TEXTURE_LAYERS};
use crate::asset::MeshBuffer;
use glam::{Mat4, UVec2};
use std::cell::RefCell;
use std::rc::Rc;

/// Matrix slots a driver keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformSlot {
    View,
    World,
    Projection,
    /// Texture matrix of a material layer, `0..MAX_TEXTURE_LAYERS`.
    Texture(u8),
    LightView,
    LightProjection,
}

impl TransformSlot {
    pub fn texture(layer: usize) -> Option<Self> {
        (layer < MAX_TEXTURE_LAYERS).then(|| TransformSlot::Texture(layer as u8))
    }
}

/// Command surface the scene manager renders through. Backends own all
/// graphics-API state; the scene side only issues these calls.
pub trait VideoDriver {
    fn name(&self) -> &str {
        "video driver"
    }

    fn begin_scene(&mut self, clear_back_buffer: bool, clear_z_buffer: bool, color: Color)
        -> bool;

    fn end_scene(&mut self) -> bool;

    fn set_transform(&mut self, slot: TransformSlot, matrix: &Mat4);

    fn transform(&self, slot: TransformSlot) -> Mat4;

    fn set_material(&mut self, material: &Material);

    fn draw_mesh_buffer(&mut self, buffer: &MeshBuffer);

    /// Puts material and world transform back to their defaults.
    fn reset_render_state(&mut self) {
        self.set_material(&Material::default());
        self.set_transform(TransformSlot::World, &Mat4::IDENTITY);
    }

    /// Returns the slot the light landed in, or `None` when all slots are taken.
    fn add_dynamic_light(&mut self, light: &LightData) -> Option<usize>;

    fn delete_all_dynamic_lights(&mut self);

    fn dynamic_light_count(&self) -> usize;

    fn max_dynamic_lights(&self) -> usize;

    fn set_ambient_light(&mut self, color: Colorf);

    fn enable_shadow(&mut self, enabled: bool);

    /// Edge length in texels of the square shadow target, used from the next
    /// `begin_shadow_render` on.
    fn set_shadow_map_size(&mut self, size: u32);

    fn shadow_map_size(&self) -> u32;

    /// Binds and clears the shadow target. `false` when the driver has no
    /// shadow target, in which case the shadow pass is skipped.
    fn begin_shadow_render(&mut self) -> bool;

    /// Unbinds the shadow target, restores the viewport and exposes the
    /// shadow depth map for sampling.
    fn end_shadow_render(&mut self);

    /// Switches to the geometry-buffer shader and binds the G-buffer target.
    fn render_first_pass(&mut self);

    /// Switches to the composition shader, unbinds the G-buffer target,
    /// drops dynamic lights and binds the G-buffer attachments as inputs.
    fn render_second_pass(&mut self);

    fn screen_size(&self) -> UVec2;
}

/// Driver handle shared between the device and the scene manager.
pub type SharedDriver = Rc<RefCell<dyn VideoDriver>>;

pub(crate) fn aspect_ratio(screen: UVec2) -> f32 {
    if screen.x == 0 || screen.y == 0 {
        4.0 / 3.0
    } else {
        screen.x as f32 / screen.y as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_slots_are_bounded() {
        assert_eq!(TransformSlot::texture(0), Some(TransformSlot::Texture(0)));
        assert_eq!(TransformSlot::texture(MAX_TEXTURE_LAYERS), None);
    }

    #[test]
    fn aspect_falls_back_for_empty_screen() {
        assert_eq!(aspect_ratio(UVec2::new(800, 400)), 2.0);
        assert!((aspect_ratio(UVec2::ZERO) - 4.0 / 3.0).abs() < 1e-6);
    }
}
