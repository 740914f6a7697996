use super::color::Color;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Which of the vertex layouts a buffer stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexType {
    Standard,
    TwoTCoords,
    Tangents,
}

impl VertexType {
    pub fn stride(self) -> usize {
        match self {
            VertexType::Standard => std::mem::size_of::<Vertex>(),
            VertexType::TwoTCoords => std::mem::size_of::<Vertex2TCoords>(),
            VertexType::Tangents => std::mem::size_of::<VertexTangents>(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, Default, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: Color,
    pub uv: [f32; 2],
}

/// Vertex with a second texture coordinate set (lightmaps, detail maps).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, Default, PartialEq)]
pub struct Vertex2TCoords {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: Color,
    pub uv: [f32; 2],
    pub uv2: [f32; 2],
}

/// Vertex carrying a tangent frame for normal and parallax mapping.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, Default, PartialEq)]
pub struct VertexTangents {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: Color,
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
    pub binormal: [f32; 3],
}

#[inline]
pub fn v(pos: [f32; 3], normal: [f32; 3], color: Color, uv: [f32; 2]) -> Vertex {
    Vertex {
        pos,
        normal,
        color,
        uv,
    }
}

/// Vertex storage of a mesh buffer, one variant per layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Vertices {
    Standard(Vec<Vertex>),
    TwoTCoords(Vec<Vertex2TCoords>),
    Tangents(Vec<VertexTangents>),
}

impl Vertices {
    pub fn new(vertex_type: VertexType) -> Self {
        match vertex_type {
            VertexType::Standard => Vertices::Standard(Vec::new()),
            VertexType::TwoTCoords => Vertices::TwoTCoords(Vec::new()),
            VertexType::Tangents => Vertices::Tangents(Vec::new()),
        }
    }

    pub fn vertex_type(&self) -> VertexType {
        match self {
            Vertices::Standard(_) => VertexType::Standard,
            Vertices::TwoTCoords(_) => VertexType::TwoTCoords,
            Vertices::Tangents(_) => VertexType::Tangents,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vertices::Standard(v) => v.len(),
            Vertices::TwoTCoords(v) => v.len(),
            Vertices::Tangents(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        let pos = match self {
            Vertices::Standard(v) => v.get(index).map(|v| v.pos),
            Vertices::TwoTCoords(v) => v.get(index).map(|v| v.pos),
            Vertices::Tangents(v) => v.get(index).map(|v| v.pos),
        };
        pos.map(Vec3::from)
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) {
        let slot = match self {
            Vertices::Standard(v) => v.get_mut(index).map(|v| &mut v.pos),
            Vertices::TwoTCoords(v) => v.get_mut(index).map(|v| &mut v.pos),
            Vertices::Tangents(v) => v.get_mut(index).map(|v| &mut v.pos),
        };
        if let Some(pos) = slot {
            *pos = position.to_array();
        }
    }

    /// Raw bytes for upload, laid out with `VertexType::stride`.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Vertices::Standard(v) => bytemuck::cast_slice(v),
            Vertices::TwoTCoords(v) => bytemuck::cast_slice(v),
            Vertices::Tangents(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Implemented by every vertex layout so buffers can be appended to generically.
pub trait VertexFormat: Pod {
    const TYPE: VertexType;

    fn storage_mut(vertices: &mut Vertices) -> Option<&mut Vec<Self>>;
}

impl VertexFormat for Vertex {
    const TYPE: VertexType = VertexType::Standard;

    fn storage_mut(vertices: &mut Vertices) -> Option<&mut Vec<Self>> {
        match vertices {
            Vertices::Standard(v) => Some(v),
            _ => None,
        }
    }
}

impl VertexFormat for Vertex2TCoords {
    const TYPE: VertexType = VertexType::TwoTCoords;

    fn storage_mut(vertices: &mut Vertices) -> Option<&mut Vec<Self>> {
        match vertices {
            Vertices::TwoTCoords(v) => Some(v),
            _ => None,
        }
    }
}

impl VertexFormat for VertexTangents {
    const TYPE: VertexType = VertexType::Tangents;

    fn storage_mut(vertices: &mut Vertices) -> Option<&mut Vec<Self>> {
        match vertices {
            Vertices::Tangents(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_have_no_padding() {
        assert_eq!(VertexType::Standard.stride(), 36);
        assert_eq!(VertexType::TwoTCoords.stride(), 44);
        assert_eq!(VertexType::Tangents.stride(), 60);
    }

    #[test]
    fn byte_view_matches_stride() {
        let verts = Vertices::Standard(vec![
            v([0.0; 3], [0.0, 1.0, 0.0], Color::WHITE, [0.0; 2]);
            3
        ]);
        assert_eq!(verts.as_bytes().len(), 3 * VertexType::Standard.stride());
    }

    #[test]
    fn position_lookup_is_bounds_checked() {
        let mut verts = Vertices::new(VertexType::Tangents);
        assert_eq!(verts.position(0), None);
        verts.set_position(0, Vec3::ONE);
        assert!(verts.is_empty());
    }
}
