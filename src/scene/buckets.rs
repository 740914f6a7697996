use super::components::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    Camera,
    Light,
    Solid,
    Shadow,
}

/// Order in which the solid bucket is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolidSortMode {
    /// Registration order, which is scene traversal order.
    #[default]
    Traversal,
    /// Grouped by first texture, traversal order within a group.
    Texture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SolidEntry {
    pub(crate) node: NodeId,
    /// Index of the first texture the node draws with, used by the
    /// texture sort.
    pub(crate) texture_key: Option<usize>,
}

/// Per-frame lists filled by the registration sweep and drained by the
/// draw. The camera list survives between frames.
#[derive(Debug, Default)]
pub struct RenderBuckets {
    cameras: Vec<NodeId>,
    lights: Vec<NodeId>,
    solids: Vec<SolidEntry>,
    shadows: Vec<NodeId>,
}

impl RenderBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the node was not added. Cameras are kept once.
    pub(crate) fn register(&mut self, pass: RenderPass, node: NodeId, texture_key: Option<usize>) -> bool {
        match pass {
            RenderPass::Camera => {
                if self.cameras.contains(&node) {
                    return false;
                }
                self.cameras.push(node);
            }
            RenderPass::Light => self.lights.push(node),
            RenderPass::Solid => self.solids.push(SolidEntry { node, texture_key }),
            RenderPass::Shadow => self.shadows.push(node),
        }
        true
    }

    pub fn len(&self, pass: RenderPass) -> usize {
        match pass {
            RenderPass::Camera => self.cameras.len(),
            RenderPass::Light => self.lights.len(),
            RenderPass::Solid => self.solids.len(),
            RenderPass::Shadow => self.shadows.len(),
        }
    }

    pub fn is_empty(&self, pass: RenderPass) -> bool {
        self.len(pass) == 0
    }

    pub fn nodes(&self, pass: RenderPass) -> Vec<NodeId> {
        match pass {
            RenderPass::Camera => self.cameras.clone(),
            RenderPass::Light => self.lights.clone(),
            RenderPass::Solid => self.solids.iter().map(|e| e.node).collect(),
            RenderPass::Shadow => self.shadows.clone(),
        }
    }

    pub(crate) fn light(&self, index: usize) -> Option<NodeId> {
        self.lights.get(index).copied()
    }

    /// Stable sort, so nodes sharing a texture keep traversal order.
    /// Untextured nodes go first.
    pub(crate) fn sort_solids_by_texture(&mut self) {
        self.solids.sort_by_key(|e| e.texture_key);
    }

    pub(crate) fn clear(&mut self, pass: RenderPass) {
        match pass {
            RenderPass::Camera => self.cameras.clear(),
            RenderPass::Light => self.lights.clear(),
            RenderPass::Solid => self.solids.clear(),
            RenderPass::Shadow => self.shadows.clear(),
        }
    }

    /// Clears everything except the camera list.
    pub(crate) fn clear_frame(&mut self) {
        self.lights.clear();
        self.solids.clear();
        self.shadows.clear();
    }

    /// Drops a destroyed node from every list.
    pub(crate) fn forget(&mut self, node: NodeId) {
        self.cameras.retain(|n| *n != node);
        self.lights.retain(|n| *n != node);
        self.solids.retain(|e| e.node != node);
        self.shadows.retain(|n| *n != node);
    }
}
