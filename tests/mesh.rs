use glam::Vec3;
use kong::asset::{BufferKind, Mesh, MeshBuffer, MeshError};
use kong::renderer::vertex::v;
use kong::renderer::{cube_mesh, Color, MaterialFlag, Vertex, VertexType};
use kong::scene::Aabb;

fn strip(n: usize) -> (Vec<Vertex>, Vec<u16>) {
    let vertices = (0..n)
        .map(|i| v([i as f32, (i % 3) as f32, 0.0], [0.0, 0.0, -1.0], Color::WHITE, [0.0, 0.0]))
        .collect();
    let indices = (0..n as u16).collect();
    (vertices, indices)
}

#[test]
fn appending_n_vertices_and_indices_counts_n() {
    let n = 12;
    let (vertices, indices) = strip(n);
    let mut buffer = MeshBuffer::new(VertexType::Standard);

    buffer.append(&vertices, &indices).unwrap();

    assert_eq!(buffer.vertex_count(), n);
    assert_eq!(buffer.index_count(), n);
    assert!(buffer.indices().iter().all(|&i| (i as usize) < n));
}

#[test]
fn appended_indices_are_offset() {
    let (vertices, indices) = strip(3);
    let mut buffer = MeshBuffer::from_parts(&vertices, &indices).unwrap();

    buffer.append(&vertices, &indices).unwrap();

    assert_eq!(buffer.indices(), &[0, 1, 2, 3, 4, 5]);
    assert!(buffer
        .indices()
        .iter()
        .all(|&i| (i as usize) < buffer.vertex_count()));
}

#[test]
fn out_of_range_indices_are_rejected() {
    let (vertices, _) = strip(3);
    let mut buffer = MeshBuffer::new(VertexType::Standard);

    let err = buffer.append(&vertices, &[0, 1, 3]).unwrap_err();

    assert_eq!(
        err,
        MeshError::IndexOutOfRange {
            index: 3,
            vertex_count: 3
        }
    );
    assert_eq!(buffer.vertex_count(), 0);
    assert_eq!(buffer.index_count(), 0);
}

#[test]
fn mesh_box_is_the_union_of_buffer_boxes() {
    let mut mesh = Mesh::new();
    let (a, ai) = strip(4);
    let far: Vec<Vertex> = a
        .iter()
        .map(|vertex| {
            let mut moved = *vertex;
            moved.pos[2] = 20.0;
            moved
        })
        .collect();
    mesh.add_mesh_buffer(MeshBuffer::from_parts(&a, &ai).unwrap());
    mesh.add_mesh_buffer(MeshBuffer::from_parts(&far, &ai).unwrap());
    mesh.add_mesh_buffer(cube_mesh(2.0).unwrap());

    mesh.recalculate_bounding_box();

    let expected = mesh
        .mesh_buffers()
        .iter()
        .map(|b| b.bounding_box())
        .reduce(|x, y| x.union(&y))
        .unwrap();
    assert_eq!(mesh.bounding_box(), expected);
    assert_eq!(expected.min, Vec3::new(-1.0, -1.0, -1.0));
    assert_eq!(expected.max, Vec3::new(3.0, 2.0, 20.0));
}

#[test]
fn recalculating_twice_gives_the_same_box() {
    let mut buffer = cube_mesh(3.0).unwrap();
    buffer.recalculate_bounding_box();
    let first = buffer.bounding_box();
    buffer.recalculate_bounding_box();
    assert_eq!(buffer.bounding_box(), first);

    let mut mesh = Mesh::from_buffer(buffer);
    mesh.recalculate_bounding_box();
    let first = mesh.bounding_box();
    mesh.recalculate_bounding_box();
    assert_eq!(mesh.bounding_box(), first);
}

#[test]
fn empty_mesh_has_a_zero_box() {
    let mut mesh = Mesh::new();
    mesh.recalculate_bounding_box();
    assert_eq!(mesh.bounding_box(), Aabb::ZERO);
    assert!(mesh.mesh_buffer(0).is_none());
}

#[test]
fn mesh_wide_helpers_reach_every_buffer() {
    let mut mesh = Mesh::from_buffer(cube_mesh(1.0).unwrap());
    mesh.add_mesh_buffer(cube_mesh(2.0).unwrap());
    let before: Vec<u32> = mesh.mesh_buffers().iter().map(|b| b.index_changed_id()).collect();

    mesh.set_material_flag(MaterialFlag::Lighting, false);
    mesh.set_dirty(BufferKind::Index);

    for (buffer, before) in mesh.mesh_buffers().iter().zip(before) {
        assert!(!buffer.material().flag(MaterialFlag::Lighting));
        assert_eq!(buffer.index_changed_id(), before + 1);
    }
}
