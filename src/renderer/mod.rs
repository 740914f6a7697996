pub mod color;
pub mod driver;
pub mod lights;
pub mod material;
pub mod primitives;
pub mod recording;
pub mod texture;
pub mod vertex;

pub use color::{Color, Colorf};
pub use driver::{SharedDriver, TransformSlot, VideoDriver};
pub use lights::{LightData, LightType};
pub use material::{Material, MaterialFlag, MaterialType, MAX_TEXTURE_LAYERS};
pub use primitives::{cube_mesh, plane_mesh};
pub use recording::{DriverCommand, RecordingDriver};
pub use texture::{ColorFormat, Texture, TextureError};
pub use vertex::{Vertex, VertexType, Vertices};
