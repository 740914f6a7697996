use crate::scene::components::SceneNode;
use crate::scene::transform::compose;
use glam::Mat4;
use hecs::{Entity, World};

/// Recomputes one node's absolute transform from its relative transform and
/// its parent's current absolute transform. Children are left alone.
pub(crate) fn update_absolute(world: &mut World, entity: Entity) {
    let (relative, parent) = match world.get::<&SceneNode>(entity) {
        Ok(node) => (node.relative, node.parent),
        Err(_) => return,
    };
    let parent_absolute: Option<Mat4> = parent.and_then(|p| {
        world
            .get::<&SceneNode>(p.0)
            .ok()
            .map(|node| node.absolute)
    });

    if let Ok(node) = world.query_one_mut::<&mut SceneNode>(entity) {
        node.absolute = compose(&relative, parent_absolute.as_ref());
    }
}

/// Animate sweep below and including `root`: for each visible node, run its
/// animators, refresh its absolute transform, then continue with its
/// children. Invisible nodes are skipped together with their subtree.
pub(crate) fn animate_subtree(world: &mut World, root: Entity, time_ms: u32) {
    let mut stack = vec![root];
    let mut visited = 0usize;

    while let Some(entity) = stack.pop() {
        let children = match world.query_one_mut::<&mut SceneNode>(entity) {
            Ok(node) => {
                if !node.visible {
                    continue;
                }
                let mut relative = node.relative;
                for animator in node.animators.iter_mut() {
                    animator.animate(&mut relative, time_ms);
                }
                node.relative = relative;
                node.children.clone()
            }
            Err(_) => {
                log::trace!("Entity {:?} is not a scene node, skipping", entity);
                continue;
            }
        };

        update_absolute(world, entity);
        visited += 1;

        for child in children.iter().rev() {
            stack.push(child.0);
        }
    }

    log::trace!("Animated {} nodes at {} ms", visited, time_ms);
}
