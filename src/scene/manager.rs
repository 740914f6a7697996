use super::animator::Animator;
use super::bounds::Aabb;
use super::buckets::{RenderBuckets, RenderPass, SolidSortMode};
use super::camera::{CameraNode, Projection};
use super::components::{LodLevel, LodNode, MeshNode, NodeId, NodeKind, SceneNode};
use super::graph::SceneGraph;
use super::internal::{lights, registration, rendering};
use super::light::{new_shadow_camera, LightNode};
use super::transform::Transform;
use crate::asset::{Assets, Handle, Mesh, MeshBuffer, MeshError};
use crate::renderer::material::MaterialFlag;
use crate::renderer::primitives::{cube_mesh, plane_mesh};
use crate::renderer::{Color, Colorf, LightData, LightType, SharedDriver, VideoDriver};
use glam::{UVec2, Vec2, Vec3};

/// Placement of a new node. Without a parent the node goes under the root.
#[derive(Debug, Clone)]
pub struct NodeParams {
    pub parent: Option<NodeId>,
    pub id: i32,
    pub name: String,
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self {
            parent: None,
            id: -1,
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl NodeParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn under(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn transform(&self) -> Transform {
        Transform::from_trs(self.position, self.rotation, self.scale)
    }
}

/// Owns the scene graph, the shared assets and the per-frame render
/// buckets, and drives a frame through a video driver.
pub struct SceneManager {
    graph: SceneGraph,
    assets: Assets,
    buckets: RenderBuckets,
    driver: Option<SharedDriver>,
    active_camera: Option<NodeId>,
    camera_world_position: Vec3,
    shadow_color: Color,
    ambient_light: Colorf,
    shadows_enabled: bool,
    main_light: usize,
    solid_sort: SolidSortMode,
    time_ms: u32,
}

impl SceneManager {
    pub fn new(driver: Option<SharedDriver>) -> Self {
        Self {
            graph: SceneGraph::new(),
            assets: Assets::new(),
            buckets: RenderBuckets::new(),
            driver,
            active_camera: None,
            camera_world_position: Vec3::ZERO,
            shadow_color: Color::rgba(0, 0, 0, 150),
            ambient_light: Colorf::new(0.0, 0.0, 0.0, 1.0),
            shadows_enabled: false,
            main_light: 0,
            solid_sort: SolidSortMode::default(),
            time_ms: 0,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut Assets {
        &mut self.assets
    }

    pub fn buckets(&self) -> &RenderBuckets {
        &self.buckets
    }

    pub fn video_driver(&self) -> Option<SharedDriver> {
        self.driver.clone()
    }

    pub fn set_video_driver(&mut self, driver: Option<SharedDriver>) {
        self.driver = driver;
        if self.shadows_enabled {
            self.with_driver(|d| d.enable_shadow(true));
        }
    }

    fn with_driver(&self, f: impl FnOnce(&mut dyn VideoDriver)) {
        if let Some(driver) = &self.driver {
            match driver.try_borrow_mut() {
                Ok(mut guard) => f(&mut *guard),
                Err(_) => log::error!("Video driver is already in use"),
            }
        }
    }

    // ---- node creation ----

    fn spawn(&mut self, kind: NodeKind, params: &NodeParams) -> NodeId {
        let mut node = SceneNode::new(kind, params.transform());
        node.id = params.id;
        node.name = params.name.clone();
        let parent = params.parent.unwrap_or_else(|| self.graph.root());
        let id = self.graph.spawn(node, Some(parent));
        self.graph.update_absolute_position(id);
        log::trace!("Added {:?} node {:?} ({:?})", kind, id, params.name);
        id
    }

    pub fn add_empty_scene_node(&mut self, params: NodeParams) -> NodeId {
        self.spawn(NodeKind::Empty, &params)
    }

    fn add_mesh_node(&mut self, kind: NodeKind, mesh: Option<Handle<Mesh>>, params: &NodeParams) -> NodeId {
        let id = self.spawn(kind, params);
        let source = mesh.and_then(|h| self.assets.mesh(h));
        if mesh.is_some() && source.is_none() {
            log::warn!("Mesh node {:?} refers to an unknown mesh", id);
        }
        let component = MeshNode::new(mesh, source);
        self.graph.insert(id, component);
        id
    }

    fn add_generated(
        &mut self,
        kind: NodeKind,
        buffer: Result<MeshBuffer, MeshError>,
        params: &NodeParams,
    ) -> NodeId {
        let mesh = match buffer {
            Ok(buffer) => Some(self.assets.add_mesh(Mesh::from_buffer(buffer))),
            Err(err) => {
                log::warn!("Failed to build {:?} geometry: {}", kind, err);
                None
            }
        };
        self.add_mesh_node(kind, mesh, params)
    }

    pub fn add_cube_scene_node(&mut self, size: f32, params: NodeParams) -> NodeId {
        self.add_generated(NodeKind::Cube, cube_mesh(size), &params)
    }

    pub fn add_plane_scene_node(&mut self, tile_size: Vec2, tiles: UVec2, params: NodeParams) -> NodeId {
        self.add_generated(NodeKind::Plane, plane_mesh(tile_size, tiles), &params)
    }

    /// A `None` mesh gives a node that draws nothing.
    pub fn add_mesh_scene_node(&mut self, mesh: Option<Handle<Mesh>>, params: NodeParams) -> NodeId {
        self.add_mesh_node(NodeKind::Mesh, mesh, &params)
    }

    pub fn add_lod_scene_node(&mut self, levels: Vec<LodLevel>, params: NodeParams) -> NodeId {
        let id = self.spawn(NodeKind::Lod, &params);
        self.graph.insert(id, LodNode::new(levels));
        id
    }

    /// Perspective camera looking at `target`; becomes the active camera.
    pub fn add_camera_scene_node(&mut self, target: Vec3, params: NodeParams) -> NodeId {
        let projection = Projection::Perspective {
            fov_y: CameraNode::DEFAULT_FOV_Y,
            aspect: None,
        };
        self.add_camera_with_projection(projection, target, params)
    }

    pub fn add_orthogonal_camera_scene_node(&mut self, width: f32, target: Vec3, params: NodeParams) -> NodeId {
        let projection = Projection::Orthogonal {
            width,
            aspect: None,
        };
        self.add_camera_with_projection(projection, target, params)
    }

    pub fn add_camera_with_projection(&mut self, projection: Projection, target: Vec3, params: NodeParams) -> NodeId {
        let id = self.spawn(NodeKind::Camera, &params);
        let mut camera = CameraNode::with_projection(projection);
        camera.target = target;
        camera.eye = self.graph.absolute_position(id).unwrap_or(params.position);
        camera.update_view_transform();
        self.graph.insert(id, camera);
        self.set_active_camera(Some(id));
        id
    }

    /// Attenuation is derived from `data.radius`.
    pub fn add_light_scene_node(&mut self, mut data: LightData, params: NodeParams) -> NodeId {
        data.set_radius(data.radius);
        let shadow_camera = self.spawn_shadow_camera(data.light_type);
        let id = self.spawn(NodeKind::Light, &params);
        self.graph.insert(
            id,
            LightNode {
                data,
                shadow_camera,
                slot: None,
            },
        );
        lights::do_light_recalc(self.graph.world_mut(), id.0);
        id
    }

    fn spawn_shadow_camera(&mut self, light_type: LightType) -> NodeId {
        let mut node = SceneNode::new(NodeKind::Camera, Transform::IDENTITY);
        node.name = "shadow camera".to_string();
        let id = self.graph.spawn(node, None);
        self.graph.insert(id, new_shadow_camera(light_type));
        id
    }

    // ---- node access ----

    pub fn node(&self, id: NodeId) -> Option<hecs::Ref<'_, SceneNode>> {
        self.graph.node(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.graph.node_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains(id)
    }

    pub fn camera(&self, id: NodeId) -> Option<hecs::Ref<'_, CameraNode>> {
        self.graph.component::<CameraNode>(id)
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut CameraNode> {
        self.graph.component_mut::<CameraNode>(id)
    }

    pub fn light(&self, id: NodeId) -> Option<hecs::Ref<'_, LightNode>> {
        self.graph.component::<LightNode>(id)
    }

    pub fn mesh_node(&self, id: NodeId) -> Option<hecs::Ref<'_, MeshNode>> {
        self.graph.component::<MeshNode>(id)
    }

    pub fn mesh_node_mut(&mut self, id: NodeId) -> Option<&mut MeshNode> {
        self.graph.component_mut::<MeshNode>(id)
    }

    /// First node in traversal order carrying the user id.
    pub fn find_node_by_id(&self, user_id: i32) -> Option<NodeId> {
        self.graph
            .subtree(self.graph.root())
            .into_iter()
            .find(|n| self.graph.node(*n).is_some_and(|node| node.id == user_id))
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.graph
            .subtree(self.graph.root())
            .into_iter()
            .find(|n| self.graph.node(*n).is_some_and(|node| node.name == name))
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.graph.add_child(parent, child)
    }

    pub fn add_animator(&mut self, id: NodeId, animator: Animator) {
        if let Some(node) = self.graph.node_mut(id) {
            node.animators.push(animator);
        }
    }

    /// Sets a flag on the node's own material copies.
    pub fn set_material_flag(&mut self, id: NodeId, flag: MaterialFlag, value: bool) {
        if let Some(mesh_node) = self.graph.component_mut::<MeshNode>(id) {
            for material in &mut mesh_node.materials {
                material.set_flag(flag, value);
            }
        }
    }

    pub fn update_absolute_position(&mut self, id: NodeId) {
        self.graph.update_absolute_position(id);
    }

    /// Object-space bounding box.
    ///
    /// # Panics
    ///
    /// When `id` is a camera.
    pub fn bounding_box(&self, id: NodeId) -> Aabb {
        rendering::local_bounding_box(self.graph.world(), &self.assets, id.0)
    }

    /// Object box transformed by the node's current absolute transform.
    ///
    /// # Panics
    ///
    /// When `id` is a camera.
    pub fn transformed_bounding_box(&self, id: NodeId) -> Aabb {
        let local = self.bounding_box(id);
        match self.graph.absolute_transform(id) {
            Some(absolute) => local.transformed(&absolute),
            None => local,
        }
    }

    // ---- removal ----

    /// Destroys the node and its subtree. Removing the root removes
    /// everything below it.
    pub fn remove_node(&mut self, id: NodeId) {
        let destroyed = self.graph.destroy(id);
        self.forget(&destroyed);
    }

    pub fn remove_all(&mut self) {
        let root = self.graph.root();
        self.remove_node(root);
    }

    /// Removes every node, detached ones included, and resets all buckets
    /// and the active camera.
    pub fn clear(&mut self) {
        let destroyed = self.graph.destroy_all();
        log::debug!("Scene cleared, {} nodes destroyed", destroyed.len());
        self.buckets = RenderBuckets::new();
        self.active_camera = None;
    }

    fn forget(&mut self, destroyed: &[NodeId]) {
        for node in destroyed {
            self.buckets.forget(*node);
        }
        if let Some(camera) = self.active_camera {
            if destroyed.contains(&camera) {
                log::debug!("Active camera {:?} removed", camera);
                self.active_camera = None;
            }
        }
    }

    // ---- cameras and lights ----

    /// Returns `false` (and keeps the current camera) when `camera` is not a
    /// camera node.
    pub fn set_active_camera(&mut self, camera: Option<NodeId>) -> bool {
        match camera {
            Some(id) if self.graph.kind(id) != Some(NodeKind::Camera) => {
                log::warn!("Node {:?} is not a camera", id);
                false
            }
            _ => {
                self.active_camera = camera;
                true
            }
        }
    }

    pub fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    /// Active camera position as of the last rendered frame.
    pub fn camera_world_position(&self) -> Vec3 {
        self.camera_world_position
    }

    pub fn set_light_data(&mut self, id: NodeId, mut data: LightData) {
        data.set_radius(data.radius);
        let Some(light) = self.graph.component_mut::<LightNode>(id) else {
            return;
        };
        let old_type = light.data.light_type;
        light.data = data;
        if old_type != data.light_type {
            self.reset_shadow_camera(id);
        }
    }

    pub fn set_light_type(&mut self, id: NodeId, light_type: LightType) {
        let Some(light) = self.graph.component_mut::<LightNode>(id) else {
            return;
        };
        if light.data.light_type == light_type {
            return;
        }
        light.data.light_type = light_type;
        self.reset_shadow_camera(id);
    }

    pub fn set_light_radius(&mut self, id: NodeId, radius: f32) {
        if let Some(light) = self.graph.component_mut::<LightNode>(id) {
            light.set_radius(radius);
        }
    }

    /// Replaces the light's shadow camera with one matching its type.
    fn reset_shadow_camera(&mut self, id: NodeId) {
        let Some((old, light_type)) = self
            .graph
            .component::<LightNode>(id)
            .map(|l| (l.shadow_camera, l.data.light_type))
        else {
            return;
        };
        self.graph.despawn_detached(old);
        let camera = self.spawn_shadow_camera(light_type);
        if let Some(light) = self.graph.component_mut::<LightNode>(id) {
            light.shadow_camera = camera;
        }
        lights::do_light_recalc(self.graph.world_mut(), id.0);
        log::debug!("Light {:?} switched to {:?} shadow camera {:?}", id, light_type, camera);
    }

    /// Index into the frame's light list of the light casting shadows.
    pub fn set_main_light(&mut self, index: usize) {
        self.main_light = index;
    }

    pub fn main_light(&self) -> usize {
        self.main_light
    }

    pub fn enable_shadow(&mut self, enabled: bool) {
        self.shadows_enabled = enabled;
        self.with_driver(|d| d.enable_shadow(enabled));
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    pub fn set_shadow_color(&mut self, color: Color) {
        self.shadow_color = color;
    }

    pub fn shadow_color(&self) -> Color {
        self.shadow_color
    }

    pub fn set_ambient_light(&mut self, color: Colorf) {
        self.ambient_light = color;
    }

    pub fn ambient_light(&self) -> Colorf {
        self.ambient_light
    }

    pub fn set_solid_sort(&mut self, mode: SolidSortMode) {
        self.solid_sort = mode;
    }

    pub fn solid_sort(&self) -> SolidSortMode {
        self.solid_sort
    }

    /// Scene time handed to animators by the next draw.
    pub fn set_time_ms(&mut self, time_ms: u32) {
        self.time_ms = time_ms;
    }

    pub fn time_ms(&self) -> u32 {
        self.time_ms
    }

    /// Files a node into a bucket by hand, as the registration sweep would.
    /// Nodes whose kind does not belong in `pass` are refused.
    pub fn register_node_for_rendering(&mut self, id: NodeId, pass: RenderPass) -> bool {
        let Some(kind) = self.graph.kind(id) else {
            return false;
        };
        let fits = match pass {
            RenderPass::Camera => kind == NodeKind::Camera,
            RenderPass::Light => kind == NodeKind::Light,
            RenderPass::Solid | RenderPass::Shadow => kind.is_geometry(),
        };
        if !fits {
            log::warn!("{:?} node {:?} cannot render in the {:?} pass", kind, id, pass);
            return false;
        }
        let key = match pass {
            RenderPass::Solid => rendering::texture_key(self.graph.world(), &self.assets, id.0, kind),
            _ => None,
        };
        self.buckets.register(pass, id, key)
    }

    // ---- drawing ----

    /// Forward frame: animate, camera, register, optional shadow pass,
    /// lights, solids. Does nothing without a driver.
    pub fn draw_all(&mut self) {
        let Some(shared) = self.driver.clone() else {
            log::trace!("No video driver, draw_all skipped");
            return;
        };
        let Ok(mut guard) = shared.try_borrow_mut() else {
            log::error!("Video driver is already in use, draw_all skipped");
            return;
        };
        let driver: &mut dyn VideoDriver = &mut *guard;

        driver.reset_render_state();
        let root = self.graph.root();
        self.graph.animate(root, self.time_ms);
        self.render_active_camera(driver);
        self.register_all();
        log::debug!(
            "Forward frame at {} ms: {} lights, {} solids",
            self.time_ms,
            self.buckets.len(RenderPass::Light),
            self.buckets.len(RenderPass::Solid)
        );

        driver.set_ambient_light(self.ambient_light);
        if self.shadows_enabled {
            self.render_shadow_pass(driver);
        }
        self.render_lights(driver, self.shadows_enabled);
        self.render_solids(driver);

        self.buckets.clear_frame();
    }

    /// Deferred frame: geometry pass into the G-buffer, then a composition
    /// pass with lights. Does nothing without a driver.
    pub fn draw_all_deferred(&mut self) {
        let Some(shared) = self.driver.clone() else {
            log::trace!("No video driver, draw_all_deferred skipped");
            return;
        };
        let Ok(mut guard) = shared.try_borrow_mut() else {
            log::error!("Video driver is already in use, draw_all_deferred skipped");
            return;
        };
        let driver: &mut dyn VideoDriver = &mut *guard;

        driver.reset_render_state();
        let root = self.graph.root();
        self.graph.animate(root, self.time_ms);
        self.register_all();
        log::debug!(
            "Deferred frame at {} ms: {} lights, {} solids",
            self.time_ms,
            self.buckets.len(RenderPass::Light),
            self.buckets.len(RenderPass::Solid)
        );

        driver.render_first_pass();
        self.render_active_camera(driver);
        self.sort_solids();
        for node in self.buckets.nodes(RenderPass::Solid) {
            self.render_solid(driver, node);
        }

        driver.render_second_pass();
        self.render_active_camera(driver);
        driver.set_ambient_light(self.ambient_light);
        self.render_lights(driver, false);
        self.render_solids(driver);

        self.buckets.clear_frame();
    }

    fn register_all(&mut self) {
        let root = self.graph.root();
        registration::register_subtree(
            self.graph.world_mut(),
            &self.assets,
            root.0,
            self.active_camera,
            &mut self.buckets,
        );
    }

    fn render_active_camera(&mut self, driver: &mut dyn VideoDriver) {
        let Some(camera) = self.active_camera else {
            log::trace!("No active camera");
            return;
        };
        match rendering::render_camera(self.graph.world_mut(), camera.0, driver) {
            Some(eye) => self.camera_world_position = eye,
            None => log::warn!("Active camera {:?} is gone", camera),
        }
    }

    fn render_shadow_pass(&mut self, driver: &mut dyn VideoDriver) {
        // the main light must get a driver slot, or its light-space matrices never land
        let uploaded = driver.max_dynamic_lights().min(self.buckets.len(RenderPass::Light));
        if self.main_light >= uploaded {
            log::debug!(
                "Main light {} is outside the {} uploaded lights, shadow pass skipped",
                self.main_light,
                uploaded
            );
            return;
        }
        let Some(light) = self.buckets.light(self.main_light) else {
            return;
        };
        if !driver.begin_shadow_render() {
            return;
        }

        let solids = self.buckets.nodes(RenderPass::Solid);
        let bounds = solids
            .iter()
            .map(|n| self.transformed_bounding_box(*n))
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Aabb::ZERO);
        lights::frame_shadow_camera(self.graph.world_mut(), light.0, &bounds);
        rendering::render_shadow_view(self.graph.world(), light.0, driver);

        for node in &solids {
            self.render_solid(driver, *node);
        }
        driver.end_shadow_render();

        // solids that follow are drawn from the viewer again
        self.render_active_camera(driver);
    }

    fn render_lights(&mut self, driver: &mut dyn VideoDriver, light_space: bool) {
        driver.delete_all_dynamic_lights();
        let lights = self.buckets.nodes(RenderPass::Light);
        let count = driver.max_dynamic_lights().min(lights.len());
        for (index, light) in lights.into_iter().take(count).enumerate() {
            let main = light_space && index == self.main_light;
            rendering::render_light(self.graph.world_mut(), light.0, driver, main);
        }
        self.buckets.clear(RenderPass::Light);
    }

    fn sort_solids(&mut self) {
        if self.solid_sort == SolidSortMode::Texture {
            self.buckets.sort_solids_by_texture();
        }
    }

    fn render_solids(&mut self, driver: &mut dyn VideoDriver) {
        self.sort_solids();
        for node in self.buckets.nodes(RenderPass::Solid) {
            self.render_solid(driver, node);
        }
        self.buckets.clear(RenderPass::Solid);
    }

    fn render_solid(&self, driver: &mut dyn VideoDriver, node: NodeId) {
        rendering::render_geometry(
            self.graph.world(),
            &self.assets,
            node.0,
            driver,
            self.camera_world_position,
        );
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new(None)
    }
}
