use super::color::Color;
use super::vertex::{v, Vertex};
use crate::asset::{MeshBuffer, MeshError, MAX_INDEXED_VERTICES};
use glam::{UVec2, Vec2, Vec3};

/// Face normal, then the U and V directions across the face.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
];

/// Axis-aligned cube centred on the origin: 24 vertices with per-face
/// normals and 0..1 UVs on every face.
pub fn cube_vertices(size: f32) -> (Vec<Vertex>, Vec<u16>) {
    let h = size * 0.5;
    let corners = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    let verts = CUBE_FACES
        .iter()
        .flat_map(|&(n, u, w)| {
            let (n, u, w) = (Vec3::from(n), Vec3::from(u), Vec3::from(w));
            corners.map(|uv| {
                // uv (0,0) is the top-left corner, seen from outside
                let pos = (n + u * (uv[0] * 2.0 - 1.0) + w * (uv[1] * 2.0 - 1.0)) * h;
                v(pos.to_array(), n.to_array(), Color::WHITE, uv)
            })
        })
        .collect::<Vec<_>>();

    let idx = (0..6u16)
        .flat_map(|f| {
            let o = f * 4;
            [o, o + 1, o + 2, o, o + 2, o + 3]
        })
        .collect::<Vec<_>>();

    (verts, idx)
}

pub fn cube_mesh(size: f32) -> Result<MeshBuffer, MeshError> {
    let (verts, idx) = cube_vertices(size);
    MeshBuffer::from_parts(&verts, &idx)
}

/// Flat grid in the XZ plane facing +Y, `tiles` cells of `tile_size` each,
/// centred on the origin. UVs repeat once per tile. Grids with more
/// vertices than 16-bit indices reach are refused before allocating.
pub fn plane_vertices(tile_size: Vec2, tiles: UVec2) -> Result<(Vec<Vertex>, Vec<u16>), MeshError> {
    let tiles = tiles.max(UVec2::ONE);
    let vertex_count = (tiles.x as u64 + 1) * (tiles.y as u64 + 1);
    if vertex_count > MAX_INDEXED_VERTICES as u64 {
        return Err(MeshError::TooManyVertices(
            usize::try_from(vertex_count).unwrap_or(usize::MAX),
        ));
    }

    let extent = tile_size * tiles.as_vec2();
    let origin = -extent * 0.5;
    let columns = tiles.x + 1;

    let mut verts = Vec::with_capacity(vertex_count as usize);
    for z in 0..=tiles.y {
        for x in 0..=tiles.x {
            let pos = [
                origin.x + x as f32 * tile_size.x,
                0.0,
                origin.y + z as f32 * tile_size.y,
            ];
            verts.push(v(pos, [0.0, 1.0, 0.0], Color::WHITE, [x as f32, z as f32]));
        }
    }

    let mut idx = Vec::with_capacity((tiles.x * tiles.y * 6) as usize);
    for z in 0..tiles.y {
        for x in 0..tiles.x {
            let a = z * columns + x;
            let b = a + columns;
            for i in [a, b, b + 1, a, b + 1, a + 1] {
                idx.push(i as u16);
            }
        }
    }

    Ok((verts, idx))
}

pub fn plane_mesh(tile_size: Vec2, tiles: UVec2) -> Result<MeshBuffer, MeshError> {
    let (verts, idx) = plane_vertices(tile_size, tiles)?;
    MeshBuffer::from_parts(&verts, &idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Aabb;

    #[test]
    fn cube_counts_look_right() {
        let (v, i) = cube_vertices(1.0);
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), 36);
        assert!(i.iter().all(|&i| (i as usize) < v.len()));
    }

    #[test]
    fn cube_box_matches_size() {
        let mesh = cube_mesh(2.0).unwrap();
        assert_eq!(
            mesh.bounding_box(),
            Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
        );
    }

    #[test]
    fn cube_faces_point_outwards() {
        let (verts, _) = cube_vertices(1.0);
        for vert in verts {
            let p = Vec3::from(vert.pos);
            let n = Vec3::from(vert.normal);
            assert!((p.dot(n) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn plane_grid_counts() {
        let (v, i) = plane_vertices(Vec2::splat(10.0), UVec2::new(4, 2)).unwrap();
        assert_eq!(v.len(), 15);
        assert_eq!(i.len(), 48);
        let mesh = plane_mesh(Vec2::splat(10.0), UVec2::new(4, 2)).unwrap();
        let bb = mesh.bounding_box();
        assert_eq!(bb.min, Vec3::new(-20.0, 0.0, -10.0));
        assert_eq!(bb.max, Vec3::new(20.0, 0.0, 10.0));
    }

    #[test]
    fn zero_tiles_become_one() {
        let (v, i) = plane_vertices(Vec2::ONE, UVec2::ZERO).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(i.len(), 6);
    }

    #[test]
    fn oversized_grids_are_refused() {
        let err = plane_vertices(Vec2::ONE, UVec2::new(70_000, 70_000)).unwrap_err();
        assert_eq!(err, MeshError::TooManyVertices(70_001 * 70_001));

        // 255 x 255 tiles is exactly 65536 vertices
        let (v, i) = plane_vertices(Vec2::ONE, UVec2::new(255, 255)).unwrap();
        assert_eq!(v.len(), MAX_INDEXED_VERTICES);
        assert_eq!(i.iter().copied().max(), Some(u16::MAX));
        assert!(plane_vertices(Vec2::ONE, UVec2::new(256, 255)).is_err());
    }
}
