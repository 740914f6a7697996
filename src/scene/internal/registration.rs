use super::lights::do_light_recalc;
use super::rendering::texture_key;
use crate::asset::Assets;
use crate::scene::buckets::{RenderBuckets, RenderPass};
use crate::scene::components::{NodeId, NodeKind, SceneNode};
use hecs::{Entity, World};

/// Registration sweep: walks the visible part of the tree depth first,
/// parents before children, and files every node into its buckets. Lights
/// refresh their world-space data even when hidden.
pub(crate) fn register_subtree(
    world: &mut World,
    assets: &Assets,
    root: Entity,
    active_camera: Option<NodeId>,
    buckets: &mut RenderBuckets,
) {
    let mut stack = vec![root];

    while let Some(entity) = stack.pop() {
        let (kind, visible, shadow_volume, children) = match world.get::<&SceneNode>(entity) {
            Ok(node) => (
                node.kind,
                node.visible,
                node.casts_shadow_volume,
                node.children.clone(),
            ),
            Err(_) => continue,
        };

        if kind == NodeKind::Light {
            do_light_recalc(world, entity);
        }
        if !visible {
            continue;
        }

        let id = NodeId(entity);
        match kind {
            NodeKind::Camera if active_camera == Some(id) => {
                if buckets.register(RenderPass::Camera, id, None) {
                    log::debug!("Registered active camera {:?}", id);
                }
            }
            NodeKind::Light => {
                buckets.register(RenderPass::Light, id, None);
            }
            kind if kind.is_geometry() => {
                let key = texture_key(world, assets, entity, kind);
                buckets.register(RenderPass::Solid, id, key);
            }
            _ => {}
        }
        if shadow_volume {
            buckets.register(RenderPass::Shadow, id, None);
        }

        for child in children.iter().rev() {
            stack.push(child.0);
        }
    }
}
