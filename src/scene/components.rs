// scene/components.rs
// hecs components making up scene nodes

use super::animator::Animator;
use super::transform::Transform;
use crate::asset::{Handle, Mesh};
use crate::renderer::Material;
use glam::Mat4;
use std::fmt;

/// Stable reference to a node in the scene graph arena. Ids of destroyed
/// nodes are never reused for a different live node.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) hecs::Entity);

impl NodeId {
    pub fn to_bits(self) -> u64 {
        self.0.to_bits().get()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Empty,
    Camera,
    Light,
    Mesh,
    Cube,
    Plane,
    Lod,
}

impl NodeKind {
    /// Kinds that register into the solid bucket.
    pub fn is_geometry(self) -> bool {
        matches!(
            self,
            NodeKind::Mesh | NodeKind::Cube | NodeKind::Plane | NodeKind::Lod
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Mesh,
    Wireframe,
}

/// Data every node carries.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    /// User id, -1 when unset.
    pub id: i32,
    pub relative: Transform,
    /// Refreshed by the animate sweep or `update_absolute_position`.
    pub(crate) absolute: Mat4,
    pub visible: bool,
    pub render_mode: RenderMode,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub animators: Vec<Animator>,
    pub casts_shadow_volume: bool,
    pub(crate) kind: NodeKind,
}

impl SceneNode {
    pub(crate) fn new(kind: NodeKind, relative: Transform) -> Self {
        Self {
            name: String::new(),
            id: -1,
            relative,
            absolute: relative.matrix(),
            visible: true,
            render_mode: RenderMode::Mesh,
            parent: None,
            children: Vec::new(),
            animators: Vec::new(),
            casts_shadow_volume: false,
            kind,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn absolute_transform(&self) -> Mat4 {
        self.absolute
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Mesh, cube and plane nodes. Unless `read_only_materials` is set the node
/// draws with its own copies of the buffer materials.
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub mesh: Option<Handle<Mesh>>,
    pub materials: Vec<Material>,
    pub read_only_materials: bool,
}

impl MeshNode {
    pub(crate) fn new(mesh: Option<Handle<Mesh>>, source: Option<&Mesh>) -> Self {
        let materials = source
            .map(|m| m.mesh_buffers().iter().map(|b| *b.material()).collect())
            .unwrap_or_default();
        Self {
            mesh,
            materials,
            read_only_materials: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodLevel {
    /// Level is used up to this camera distance.
    pub max_distance: f32,
    pub mesh: Handle<Mesh>,
}

/// Distance-selected meshes, ordered by `max_distance`.
#[derive(Debug, Clone, Default)]
pub struct LodNode {
    levels: Vec<LodLevel>,
}

impl LodNode {
    pub fn new(levels: impl IntoIterator<Item = LodLevel>) -> Self {
        let mut node = Self::default();
        for level in levels {
            node.add_level(level);
        }
        node
    }

    pub fn add_level(&mut self, level: LodLevel) {
        let at = self
            .levels
            .partition_point(|l| l.max_distance <= level.max_distance);
        self.levels.insert(at, level);
    }

    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    /// First level covering `distance`; the last level covers everything
    /// beyond.
    pub fn select(&self, distance: f32) -> Option<&LodLevel> {
        self.levels
            .iter()
            .find(|l| distance <= l.max_distance)
            .or_else(|| self.levels.last())
    }
}
