// renderer/recording.rs

use super::color::{Color, Colorf};
use super::driver::{TransformSlot, VideoDriver};
use super::lights::LightData;
use super::material::Material;
use super::vertex::VertexType;
use crate::asset::MeshBuffer;
use glam::{Mat4, UVec2};
use std::collections::HashMap;

/// One call received by a [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCommand {
    BeginScene {
        clear_back_buffer: bool,
        clear_z_buffer: bool,
        color: Color,
    },
    EndScene,
    ResetState,
    SetTransform(TransformSlot, Mat4),
    SetMaterial(Material),
    DrawMeshBuffer {
        vertex_count: usize,
        index_count: usize,
        vertex_type: VertexType,
    },
    AddDynamicLight(LightData),
    DeleteAllDynamicLights,
    SetAmbientLight(Colorf),
    EnableShadow(bool),
    SetShadowMapSize(u32),
    BeginShadowRender,
    EndShadowRender,
    RenderFirstPass,
    RenderSecondPass,
}

/// Which target geometry currently lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderTarget {
    #[default]
    Screen,
    ShadowMap,
    GeometryBuffer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub triangles: usize,
    pub material_changes: usize,
}

/// Headless driver that keeps every command it receives, plus the state a
/// real backend would hold. Used for tests and the demo binary.
#[derive(Debug)]
pub struct RecordingDriver {
    commands: Vec<DriverCommand>,
    transforms: HashMap<TransformSlot, Mat4>,
    material: Material,
    lights: Vec<LightData>,
    max_lights: usize,
    ambient: Colorf,
    screen_size: UVec2,
    shadow_target: bool,
    shadows_enabled: bool,
    shadow_map_ready: bool,
    shadow_map_size: u32,
    viewport: UVec2,
    target: RenderTarget,
    in_scene: bool,
    stats: FrameStats,
    frames: u64,
}

impl RecordingDriver {
    pub const DEFAULT_MAX_LIGHTS: usize = 8;
    pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 2048;

    pub fn new(screen_size: UVec2) -> Self {
        Self {
            commands: Vec::new(),
            transforms: HashMap::new(),
            material: Material::default(),
            lights: Vec::new(),
            max_lights: Self::DEFAULT_MAX_LIGHTS,
            ambient: Colorf::default(),
            screen_size,
            shadow_target: true,
            shadows_enabled: false,
            shadow_map_ready: false,
            shadow_map_size: Self::DEFAULT_SHADOW_MAP_SIZE,
            viewport: screen_size,
            target: RenderTarget::Screen,
            in_scene: false,
            stats: FrameStats::default(),
            frames: 0,
        }
    }

    pub fn with_max_lights(mut self, max_lights: usize) -> Self {
        self.max_lights = max_lights;
        self
    }

    /// A driver without a shadow target refuses `begin_shadow_render`.
    pub fn with_shadow_target(mut self, available: bool) -> Self {
        self.shadow_target = available;
        self
    }

    pub fn commands(&self) -> &[DriverCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DriverCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn count(&self, pred: impl Fn(&DriverCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn transform_count(&self, slot: TransformSlot) -> usize {
        self.count(|c| matches!(c, DriverCommand::SetTransform(s, _) if *s == slot))
    }

    pub fn draw_count(&self) -> usize {
        self.count(|c| matches!(c, DriverCommand::DrawMeshBuffer { .. }))
    }

    pub fn current_material(&self) -> &Material {
        &self.material
    }

    pub fn lights(&self) -> &[LightData] {
        &self.lights
    }

    pub fn ambient_light(&self) -> Colorf {
        self.ambient
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    /// Whether a finished shadow map is bound for sampling.
    pub fn shadow_map_ready(&self) -> bool {
        self.shadow_map_ready
    }

    pub fn target(&self) -> RenderTarget {
        self.target
    }

    /// Screen size, or the shadow map size while the shadow target is bound.
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// Statistics of the current (or last finished) frame.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_screen_size(&mut self, size: UVec2) {
        self.screen_size = size;
        if self.target != RenderTarget::ShadowMap {
            self.viewport = size;
        }
    }
}

impl VideoDriver for RecordingDriver {
    fn name(&self) -> &str {
        "recording"
    }

    fn begin_scene(&mut self, clear_back_buffer: bool, clear_z_buffer: bool, color: Color) -> bool {
        if self.in_scene {
            log::warn!("begin_scene called twice without end_scene");
        }
        self.in_scene = true;
        self.stats = FrameStats::default();
        self.commands.push(DriverCommand::BeginScene {
            clear_back_buffer,
            clear_z_buffer,
            color,
        });
        true
    }

    fn end_scene(&mut self) -> bool {
        self.commands.push(DriverCommand::EndScene);
        if !self.in_scene {
            log::warn!("end_scene called outside a scene");
            return false;
        }
        self.in_scene = false;
        self.frames += 1;
        log::debug!(
            "Frame {} done: {} draw calls, {} triangles",
            self.frames,
            self.stats.draw_calls,
            self.stats.triangles
        );
        true
    }

    fn set_transform(&mut self, slot: TransformSlot, matrix: &Mat4) {
        self.transforms.insert(slot, *matrix);
        self.commands.push(DriverCommand::SetTransform(slot, *matrix));
    }

    fn transform(&self, slot: TransformSlot) -> Mat4 {
        self.transforms
            .get(&slot)
            .copied()
            .unwrap_or(Mat4::IDENTITY)
    }

    fn set_material(&mut self, material: &Material) {
        if self.material != *material {
            self.stats.material_changes += 1;
        }
        self.material = *material;
        self.commands.push(DriverCommand::SetMaterial(*material));
    }

    fn draw_mesh_buffer(&mut self, buffer: &MeshBuffer) {
        self.stats.draw_calls += 1;
        self.stats.triangles += buffer.triangle_count();
        self.commands.push(DriverCommand::DrawMeshBuffer {
            vertex_count: buffer.vertex_count(),
            index_count: buffer.index_count(),
            vertex_type: buffer.vertex_type(),
        });
    }

    fn reset_render_state(&mut self) {
        self.material = Material::default();
        self.transforms.insert(TransformSlot::World, Mat4::IDENTITY);
        self.commands.push(DriverCommand::ResetState);
    }

    fn add_dynamic_light(&mut self, light: &LightData) -> Option<usize> {
        if self.lights.len() >= self.max_lights {
            log::trace!("Dynamic light rejected, all {} slots taken", self.max_lights);
            return None;
        }
        self.lights.push(*light);
        self.commands.push(DriverCommand::AddDynamicLight(*light));
        Some(self.lights.len() - 1)
    }

    fn delete_all_dynamic_lights(&mut self) {
        self.lights.clear();
        self.commands.push(DriverCommand::DeleteAllDynamicLights);
    }

    fn dynamic_light_count(&self) -> usize {
        self.lights.len()
    }

    fn max_dynamic_lights(&self) -> usize {
        self.max_lights
    }

    fn set_ambient_light(&mut self, color: Colorf) {
        self.ambient = color;
        self.commands.push(DriverCommand::SetAmbientLight(color));
    }

    fn enable_shadow(&mut self, enabled: bool) {
        self.shadows_enabled = enabled;
        if !enabled {
            self.shadow_map_ready = false;
        }
        self.commands.push(DriverCommand::EnableShadow(enabled));
    }

    fn set_shadow_map_size(&mut self, size: u32) {
        self.shadow_map_size = size;
        self.commands.push(DriverCommand::SetShadowMapSize(size));
    }

    fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    fn begin_shadow_render(&mut self) -> bool {
        if !self.shadow_target || self.shadow_map_size == 0 {
            log::debug!("No shadow target, skipping shadow pass");
            return false;
        }
        self.target = RenderTarget::ShadowMap;
        self.viewport = UVec2::splat(self.shadow_map_size);
        self.shadow_map_ready = false;
        self.commands.push(DriverCommand::BeginShadowRender);
        true
    }

    fn end_shadow_render(&mut self) {
        self.target = RenderTarget::Screen;
        self.viewport = self.screen_size;
        self.shadow_map_ready = true;
        self.commands.push(DriverCommand::EndShadowRender);
    }

    fn render_first_pass(&mut self) {
        self.target = RenderTarget::GeometryBuffer;
        self.commands.push(DriverCommand::RenderFirstPass);
    }

    fn render_second_pass(&mut self) {
        self.target = RenderTarget::Screen;
        self.lights.clear();
        self.commands.push(DriverCommand::RenderSecondPass);
    }

    fn screen_size(&self) -> UVec2 {
        self.screen_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_slots_are_limited() {
        let mut driver = RecordingDriver::new(UVec2::new(640, 480)).with_max_lights(2);
        let light = LightData::default();
        assert_eq!(driver.add_dynamic_light(&light), Some(0));
        assert_eq!(driver.add_dynamic_light(&light), Some(1));
        assert_eq!(driver.add_dynamic_light(&light), None);
        assert_eq!(driver.dynamic_light_count(), 2);
        driver.delete_all_dynamic_lights();
        assert_eq!(driver.dynamic_light_count(), 0);
    }

    #[test]
    fn shadow_pass_tracks_target() {
        let mut driver = RecordingDriver::new(UVec2::new(640, 480));
        assert!(driver.begin_shadow_render());
        assert_eq!(driver.target(), RenderTarget::ShadowMap);
        assert_eq!(driver.viewport(), UVec2::splat(2048));
        driver.end_shadow_render();
        assert_eq!(driver.target(), RenderTarget::Screen);
        assert_eq!(driver.viewport(), UVec2::new(640, 480));
        assert!(driver.shadow_map_ready());

        let mut bare = RecordingDriver::new(UVec2::new(640, 480)).with_shadow_target(false);
        assert!(!bare.begin_shadow_render());
        assert!(bare.commands().is_empty());
    }

    #[test]
    fn shadow_viewport_follows_map_size() {
        let mut driver = RecordingDriver::new(UVec2::new(640, 480));
        driver.set_shadow_map_size(512);
        assert!(driver.begin_shadow_render());
        assert_eq!(driver.viewport(), UVec2::splat(512));
        driver.end_shadow_render();

        driver.set_shadow_map_size(0);
        assert!(!driver.begin_shadow_render());
        assert_eq!(driver.target(), RenderTarget::Screen);
    }

    #[test]
    fn transforms_default_to_identity() {
        let mut driver = RecordingDriver::new(UVec2::new(1, 1));
        assert_eq!(driver.transform(TransformSlot::View), Mat4::IDENTITY);
        let m = Mat4::from_translation(glam::Vec3::X);
        driver.set_transform(TransformSlot::View, &m);
        assert_eq!(driver.transform(TransformSlot::View), m);
        assert_eq!(driver.transform_count(TransformSlot::View), 1);
    }

    #[test]
    fn frames_are_counted_on_end_scene() {
        let mut driver = RecordingDriver::new(UVec2::new(1, 1));
        assert!(!driver.end_scene());
        assert!(driver.begin_scene(true, true, Color::BLACK));
        assert!(driver.end_scene());
        assert_eq!(driver.frames(), 1);
    }
}
