// renderer/material.rs

use super::color::Color;
use super::texture::Texture;
use crate::asset::Handle;
use bitflags::bitflags;
use glam::Mat4;

/// Number of texture layers a material carries.
pub const MAX_TEXTURE_LAYERS: usize = 4;

/// Shading technique a driver selects for a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialType {
    #[default]
    Solid,
    Solid2Layer,
    Lightmap,
    DetailMap,
    TransparentAddColor,
    TransparentAlphaChannel,
    TransparentAlphaChannelRef,
    TransparentVertexAlpha,
    NormalMap,
    ParallaxMap,
}

impl MaterialType {
    pub fn is_transparent(self) -> bool {
        matches!(
            self,
            MaterialType::TransparentAddColor
                | MaterialType::TransparentAlphaChannel
                | MaterialType::TransparentAlphaChannelRef
                | MaterialType::TransparentVertexAlpha
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureClamp {
    #[default]
    Repeat,
    Clamp,
    ClampToEdge,
    MirroredRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthTest {
    Disabled,
    #[default]
    LessEqual,
    Equal,
    Less,
    NotEqual,
    GreaterEqual,
    Greater,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    #[default]
    None,
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Which vertex color channel feeds the lighting equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMaterial {
    None,
    #[default]
    Diffuse,
    Ambient,
    Emissive,
    Specular,
    DiffuseAndAmbient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonOffset {
    #[default]
    Back,
    Front,
}

bitflags! {
    /// Boolean render switches of a material.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialSwitches: u32 {
        const WIREFRAME = 1 << 0;
        const POINT_CLOUD = 1 << 1;
        const GOURAUD_SHADING = 1 << 2;
        const LIGHTING = 1 << 3;
        const ZWRITE_ENABLE = 1 << 4;
        const BACK_FACE_CULLING = 1 << 5;
        const FRONT_FACE_CULLING = 1 << 6;
        const FOG_ENABLE = 1 << 7;
        const NORMALIZE_NORMALS = 1 << 8;
        const USE_MIP_MAPS = 1 << 9;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AntiAliasing: u8 {
        const SIMPLE = 1 << 0;
        const QUALITY = 1 << 1 | Self::SIMPLE.bits();
        const LINE_SMOOTH = 1 << 2;
        const POINT_SMOOTH = 1 << 3;
        const ALPHA_TO_COVERAGE = 1 << 4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const RGB = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
        const ALL = Self::RGB.bits() | Self::ALPHA.bits();
    }
}

/// Properties addressable through `Material::set_flag`. Several of them fan
/// out to more than one field (the filter flags touch every texture layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialFlag {
    Wireframe,
    PointCloud,
    GouraudShading,
    Lighting,
    ZBuffer,
    ZWriteEnable,
    BackFaceCulling,
    FrontFaceCulling,
    BilinearFilter,
    TrilinearFilter,
    AnisotropicFilter,
    FogEnable,
    NormalizeNormals,
    TextureWrap,
    AntiAliasing,
    ColorMask,
    ColorMaterial,
    UseMipMaps,
    BlendOperation,
    PolygonOffset,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureLayer {
    pub texture: Option<Handle<Texture>>,
    pub wrap_u: TextureClamp,
    pub wrap_v: TextureClamp,
    pub bilinear_filter: bool,
    pub trilinear_filter: bool,
    /// 0 disables anisotropic filtering, otherwise the maximum anisotropy.
    pub anisotropic_filter: u8,
    pub lod_bias: i8,
    pub texture_matrix: Mat4,
}

impl Default for TextureLayer {
    fn default() -> Self {
        Self {
            texture: None,
            wrap_u: TextureClamp::Repeat,
            wrap_v: TextureClamp::Repeat,
            bilinear_filter: true,
            trilinear_filter: false,
            anisotropic_filter: 0,
            lod_bias: 0,
            texture_matrix: Mat4::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub material_type: MaterialType,
    pub material_type_param: f32,
    pub ambient_color: Color,
    pub diffuse_color: Color,
    pub emissive_color: Color,
    pub specular_color: Color,
    pub shininess: f32,
    pub thickness: f32,
    pub switches: MaterialSwitches,
    pub z_buffer: DepthTest,
    pub anti_aliasing: AntiAliasing,
    pub color_mask: ColorMask,
    pub color_material: ColorMaterial,
    pub blend_operation: BlendOperation,
    pub polygon_offset_factor: u8,
    pub polygon_offset_direction: PolygonOffset,
    pub texture_layers: [TextureLayer; MAX_TEXTURE_LAYERS],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            material_type: MaterialType::Solid,
            material_type_param: 0.0,
            ambient_color: Color::WHITE,
            diffuse_color: Color::WHITE,
            emissive_color: Color::BLACK,
            specular_color: Color::WHITE,
            shininess: 0.0,
            thickness: 1.0,
            switches: MaterialSwitches::GOURAUD_SHADING
                | MaterialSwitches::LIGHTING
                | MaterialSwitches::ZWRITE_ENABLE
                | MaterialSwitches::BACK_FACE_CULLING
                | MaterialSwitches::USE_MIP_MAPS,
            z_buffer: DepthTest::LessEqual,
            anti_aliasing: AntiAliasing::SIMPLE,
            color_mask: ColorMask::ALL,
            color_material: ColorMaterial::Diffuse,
            blend_operation: BlendOperation::None,
            polygon_offset_factor: 0,
            polygon_offset_direction: PolygonOffset::Back,
            texture_layers: [TextureLayer::default(); MAX_TEXTURE_LAYERS],
        }
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, material_type: MaterialType) -> Self {
        self.material_type = material_type;
        self
    }

    pub fn with_diffuse(mut self, color: Color) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn with_flag(mut self, flag: MaterialFlag, value: bool) -> Self {
        self.set_flag(flag, value);
        self
    }

    pub fn with_texture(mut self, layer: usize, texture: Handle<Texture>) -> Self {
        self.set_texture(layer, Some(texture));
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.material_type.is_transparent()
    }

    pub fn texture_layer(&self, layer: usize) -> Option<&TextureLayer> {
        self.texture_layers.get(layer)
    }

    pub fn texture(&self, layer: usize) -> Option<Handle<Texture>> {
        self.texture_layers.get(layer).and_then(|l| l.texture)
    }

    /// Out-of-range layers are ignored.
    pub fn set_texture(&mut self, layer: usize, texture: Option<Handle<Texture>>) {
        match self.texture_layers.get_mut(layer) {
            Some(slot) => slot.texture = texture,
            None => log::trace!("Ignoring texture for layer {} (max {})", layer, MAX_TEXTURE_LAYERS),
        }
    }

    pub fn texture_matrix(&self, layer: usize) -> Option<Mat4> {
        self.texture_layers.get(layer).map(|l| l.texture_matrix)
    }

    pub fn set_texture_matrix(&mut self, layer: usize, matrix: Mat4) {
        if let Some(slot) = self.texture_layers.get_mut(layer) {
            slot.texture_matrix = matrix;
        }
    }

    pub fn set_flag(&mut self, flag: MaterialFlag, value: bool) {
        match flag {
            MaterialFlag::Wireframe => self.switches.set(MaterialSwitches::WIREFRAME, value),
            MaterialFlag::PointCloud => self.switches.set(MaterialSwitches::POINT_CLOUD, value),
            MaterialFlag::GouraudShading => {
                self.switches.set(MaterialSwitches::GOURAUD_SHADING, value)
            }
            MaterialFlag::Lighting => self.switches.set(MaterialSwitches::LIGHTING, value),
            MaterialFlag::ZBuffer => {
                self.z_buffer = if value {
                    DepthTest::LessEqual
                } else {
                    DepthTest::Disabled
                }
            }
            MaterialFlag::ZWriteEnable => self.switches.set(MaterialSwitches::ZWRITE_ENABLE, value),
            MaterialFlag::BackFaceCulling => {
                self.switches.set(MaterialSwitches::BACK_FACE_CULLING, value)
            }
            MaterialFlag::FrontFaceCulling => {
                self.switches.set(MaterialSwitches::FRONT_FACE_CULLING, value)
            }
            MaterialFlag::BilinearFilter => {
                for layer in &mut self.texture_layers {
                    layer.bilinear_filter = value;
                }
            }
            MaterialFlag::TrilinearFilter => {
                for layer in &mut self.texture_layers {
                    layer.trilinear_filter = value;
                }
            }
            MaterialFlag::AnisotropicFilter => {
                let strength = if value { u8::MAX } else { 0 };
                for layer in &mut self.texture_layers {
                    layer.anisotropic_filter = strength;
                }
            }
            MaterialFlag::FogEnable => self.switches.set(MaterialSwitches::FOG_ENABLE, value),
            MaterialFlag::NormalizeNormals => {
                self.switches.set(MaterialSwitches::NORMALIZE_NORMALS, value)
            }
            MaterialFlag::TextureWrap => {
                let clamp = if value {
                    TextureClamp::Clamp
                } else {
                    TextureClamp::Repeat
                };
                for layer in &mut self.texture_layers {
                    layer.wrap_u = clamp;
                    layer.wrap_v = clamp;
                }
            }
            MaterialFlag::AntiAliasing => {
                self.anti_aliasing = if value {
                    AntiAliasing::SIMPLE
                } else {
                    AntiAliasing::empty()
                }
            }
            MaterialFlag::ColorMask => {
                self.color_mask = if value {
                    ColorMask::ALL
                } else {
                    ColorMask::empty()
                }
            }
            MaterialFlag::ColorMaterial => {
                self.color_material = if value {
                    ColorMaterial::Diffuse
                } else {
                    ColorMaterial::None
                }
            }
            MaterialFlag::UseMipMaps => self.switches.set(MaterialSwitches::USE_MIP_MAPS, value),
            MaterialFlag::BlendOperation => {
                self.blend_operation = if value {
                    BlendOperation::Add
                } else {
                    BlendOperation::None
                }
            }
            MaterialFlag::PolygonOffset => {
                self.polygon_offset_factor = u8::from(value);
                self.polygon_offset_direction = PolygonOffset::Back;
            }
        }
    }

    /// Layer-wide flags report the state of the first layer.
    pub fn flag(&self, flag: MaterialFlag) -> bool {
        let first = &self.texture_layers[0];
        match flag {
            MaterialFlag::Wireframe => self.switches.contains(MaterialSwitches::WIREFRAME),
            MaterialFlag::PointCloud => self.switches.contains(MaterialSwitches::POINT_CLOUD),
            MaterialFlag::GouraudShading => {
                self.switches.contains(MaterialSwitches::GOURAUD_SHADING)
            }
            MaterialFlag::Lighting => self.switches.contains(MaterialSwitches::LIGHTING),
            MaterialFlag::ZBuffer => self.z_buffer != DepthTest::Disabled,
            MaterialFlag::ZWriteEnable => self.switches.contains(MaterialSwitches::ZWRITE_ENABLE),
            MaterialFlag::BackFaceCulling => {
                self.switches.contains(MaterialSwitches::BACK_FACE_CULLING)
            }
            MaterialFlag::FrontFaceCulling => {
                self.switches.contains(MaterialSwitches::FRONT_FACE_CULLING)
            }
            MaterialFlag::BilinearFilter => first.bilinear_filter,
            MaterialFlag::TrilinearFilter => first.trilinear_filter,
            MaterialFlag::AnisotropicFilter => first.anisotropic_filter != 0,
            MaterialFlag::FogEnable => self.switches.contains(MaterialSwitches::FOG_ENABLE),
            MaterialFlag::NormalizeNormals => {
                self.switches.contains(MaterialSwitches::NORMALIZE_NORMALS)
            }
            MaterialFlag::TextureWrap => {
                first.wrap_u != TextureClamp::Repeat || first.wrap_v != TextureClamp::Repeat
            }
            MaterialFlag::AntiAliasing => !self.anti_aliasing.is_empty(),
            MaterialFlag::ColorMask => !self.color_mask.is_empty(),
            MaterialFlag::ColorMaterial => self.color_material != ColorMaterial::None,
            MaterialFlag::UseMipMaps => self.switches.contains(MaterialSwitches::USE_MIP_MAPS),
            MaterialFlag::BlendOperation => self.blend_operation != BlendOperation::None,
            MaterialFlag::PolygonOffset => self.polygon_offset_factor != 0,
        }
    }
}
