pub mod cache;
pub mod handle;
pub mod mesh;
pub mod mesh_buffer;

pub use cache::AssetCache;
pub use handle::Handle;
pub use mesh::Mesh;
pub use mesh_buffer::{BufferKind, MeshBuffer, MeshError, MAX_INDEXED_VERTICES};

use crate::renderer::Texture;

/// Meshes and textures shared between scene nodes.
#[derive(Default)]
pub struct Assets {
    pub meshes: AssetCache<Mesh>,
    pub textures: AssetCache<Texture>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> Handle<Mesh> {
        self.meshes.insert(mesh)
    }

    pub fn mesh(&self, handle: Handle<Mesh>) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    pub fn mesh_mut(&mut self, handle: Handle<Mesh>) -> Option<&mut Mesh> {
        self.meshes.get_mut(handle)
    }

    pub fn add_texture(&mut self, texture: Texture) -> Handle<Texture> {
        self.textures.insert(texture)
    }

    pub fn texture(&self, handle: Handle<Texture>) -> Option<&Texture> {
        self.textures.get(handle)
    }

    pub fn find_texture(&self, name: &str) -> Option<Handle<Texture>> {
        self.textures.find(|t| t.name() == name)
    }
}
