use crate::renderer::material::Material;
use crate::renderer::vertex::{VertexFormat, VertexType, Vertices};
use crate::scene::Aabb;
use glam::Vec3;
use thiserror::Error;

/// Largest vertex count 16-bit indices can address.
pub const MAX_INDEXED_VERTICES: usize = u16::MAX as usize + 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("cannot append {found:?} vertices to a {expected:?} buffer")]
    VertexTypeMismatch {
        expected: VertexType,
        found: VertexType,
    },
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: usize, vertex_count: usize },
    #[error("{0} vertices exceed what 16-bit indices can address")]
    TooManyVertices(usize),
}

/// Which half of a buffer changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
    VertexAndIndex,
}

/// One draw call's worth of geometry: vertices, 16-bit indices and a material.
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    vertices: Vertices,
    indices: Vec<u16>,
    material: Material,
    bounding_box: Aabb,
    vertex_changed_id: u32,
    index_changed_id: u32,
}

impl MeshBuffer {
    pub fn new(vertex_type: VertexType) -> Self {
        Self {
            vertices: Vertices::new(vertex_type),
            indices: Vec::new(),
            material: Material::default(),
            bounding_box: Aabb::ZERO,
            vertex_changed_id: 1,
            index_changed_id: 1,
        }
    }

    /// Buffer built from complete vertex and index data; the bounding box is
    /// computed right away.
    pub fn from_parts<V: VertexFormat>(vertices: &[V], indices: &[u16]) -> Result<Self, MeshError> {
        let mut buffer = Self::new(V::TYPE);
        buffer.append(vertices, indices)?;
        buffer.recalculate_bounding_box();
        Ok(buffer)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn vertex_type(&self) -> VertexType {
        self.vertices.vertex_type()
    }

    pub fn vertices(&self) -> &Vertices {
        &self.vertices
    }

    /// Callers changing positions must recalculate the bounding box and mark
    /// the buffer dirty themselves.
    pub fn vertices_mut(&mut self) -> &mut Vertices {
        &mut self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.vertices.position(index)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    pub fn set_bounding_box(&mut self, bounding_box: Aabb) {
        self.bounding_box = bounding_box;
    }

    /// Rebuilds the box from every vertex position; a buffer without vertices
    /// gets the zero box.
    pub fn recalculate_bounding_box(&mut self) {
        let vertices = &self.vertices;
        self.bounding_box = Aabb::from_points((0..vertices.len()).filter_map(|i| vertices.position(i)))
            .unwrap_or(Aabb::ZERO);
    }

    /// Appends geometry; appended indices are relative to the appended
    /// vertices and get offset by the current vertex count. Nothing changes
    /// when validation fails.
    pub fn append<V: VertexFormat>(&mut self, vertices: &[V], indices: &[u16]) -> Result<(), MeshError> {
        let offset = self.vertices.len();
        let vertex_count = offset + vertices.len();
        if vertex_count > MAX_INDEXED_VERTICES {
            return Err(MeshError::TooManyVertices(vertex_count));
        }
        if let Some(&bad) = indices.iter().find(|&&i| offset + i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index: offset + bad as usize,
                vertex_count,
            });
        }

        let found = V::TYPE;
        let expected = self.vertex_type();
        let storage = V::storage_mut(&mut self.vertices)
            .ok_or(MeshError::VertexTypeMismatch { expected, found })?;
        storage.extend_from_slice(vertices);
        self.indices
            .extend(indices.iter().map(|&i| (offset + i as usize) as u16));

        self.set_dirty(BufferKind::VertexAndIndex);
        Ok(())
    }

    pub fn set_dirty(&mut self, kind: BufferKind) {
        if matches!(kind, BufferKind::Vertex | BufferKind::VertexAndIndex) {
            self.vertex_changed_id = self.vertex_changed_id.wrapping_add(1);
        }
        if matches!(kind, BufferKind::Index | BufferKind::VertexAndIndex) {
            self.index_changed_id = self.index_changed_id.wrapping_add(1);
        }
    }

    /// Bumped whenever vertex data is marked dirty; drivers compare it to
    /// decide on re-uploads.
    pub fn vertex_changed_id(&self) -> u32 {
        self.vertex_changed_id
    }

    pub fn index_changed_id(&self) -> u32 {
        self.index_changed_id
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
