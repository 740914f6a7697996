use super::mesh_buffer::{BufferKind, MeshBuffer};
use crate::renderer::material::MaterialFlag;
use crate::scene::Aabb;

/// Ordered set of mesh buffers with an aggregate bounding box.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    buffers: Vec<MeshBuffer>,
    bounding_box: Aabb,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-buffer mesh with its box already computed.
    pub fn from_buffer(buffer: MeshBuffer) -> Self {
        let mut mesh = Self::new();
        mesh.add_mesh_buffer(buffer);
        mesh.recalculate_bounding_box();
        mesh
    }

    /// Adds a buffer and grows the aggregate box by the buffer's current box.
    pub fn add_mesh_buffer(&mut self, buffer: MeshBuffer) {
        if self.buffers.is_empty() {
            self.bounding_box = buffer.bounding_box();
        } else {
            self.bounding_box.add_box(&buffer.bounding_box());
        }
        self.buffers.push(buffer);
    }

    pub fn mesh_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn mesh_buffer(&self, index: usize) -> Option<&MeshBuffer> {
        self.buffers.get(index)
    }

    pub fn mesh_buffer_mut(&mut self, index: usize) -> Option<&mut MeshBuffer> {
        self.buffers.get_mut(index)
    }

    pub fn mesh_buffers(&self) -> &[MeshBuffer] {
        &self.buffers
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    pub fn set_bounding_box(&mut self, bounding_box: Aabb) {
        self.bounding_box = bounding_box;
    }

    /// Recalculates every buffer's box, then the union of them. A mesh
    /// without buffers gets the zero box.
    pub fn recalculate_bounding_box(&mut self) {
        let mut boxes = self.buffers.iter_mut().map(|buffer| {
            buffer.recalculate_bounding_box();
            buffer.bounding_box()
        });
        self.bounding_box = match boxes.next() {
            Some(first) => boxes.fold(first, |acc, bb| acc.union(&bb)),
            None => Aabb::ZERO,
        };
    }

    pub fn set_material_flag(&mut self, flag: MaterialFlag, value: bool) {
        for buffer in &mut self.buffers {
            buffer.material_mut().set_flag(flag, value);
        }
    }

    pub fn set_dirty(&mut self, kind: BufferKind) {
        for buffer in &mut self.buffers {
            buffer.set_dirty(kind);
        }
    }
}
