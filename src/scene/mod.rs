// scene/mod.rs

pub mod animator;
pub mod bounds;
pub mod buckets;
pub mod camera;
pub mod components;
pub mod graph;
mod internal;
pub mod light;
pub mod manager;
pub mod transform;

// Re-export commonly used types
pub use animator::Animator;
pub use bounds::Aabb;
pub use buckets::{RenderBuckets, RenderPass, SolidSortMode};
pub use camera::{CameraKind, CameraNode, Projection};
pub use graph::SceneGraph;
pub use light::LightNode;
pub use manager::{NodeParams, SceneManager};
pub use transform::Transform;

// Re-export all components
pub use components::{
    LodLevel,
    LodNode,
    MeshNode,
    NodeId,
    NodeKind,
    RenderMode,
    SceneNode,
};
