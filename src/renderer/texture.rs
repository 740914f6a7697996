// renderer/texture.rs

use crate::io::{FileError, ReadFile};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    Luma8,
    LumaAlpha8,
    Rgb8,
    Rgba8,
}

impl ColorFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorFormat::Luma8 => 1,
            ColorFormat::LumaAlpha8 => 2,
            ColorFormat::Rgb8 => 3,
            ColorFormat::Rgba8 => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ColorFormat::LumaAlpha8 | ColorFormat::Rgba8)
    }
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode image {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("pixel buffer for {name:?} holds {actual} bytes, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("texture {0:?} has zero width or height")]
    Empty(String),
    #[error(transparent)]
    File(#[from] FileError),
}

/// Decoded pixel data, the form image loaders hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    name: String,
    width: u32,
    height: u32,
    format: ColorFormat,
    pixels: Vec<u8>,
}

impl Texture {
    pub fn from_pixels(
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: ColorFormat,
        pixels: Vec<u8>,
    ) -> Result<Self, TextureError> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(name));
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                name,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            name,
            width,
            height,
            format,
            pixels,
        })
    }

    /// Decode an encoded image (PNG, JPEG, TGA, ...) from memory.
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> Result<Self, TextureError> {
        let name = name.into();
        let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            name: name.clone(),
            source,
        })?;

        let (width, height) = (img.width(), img.height());
        let color = img.color();
        let (format, pixels) = match (color.channel_count(), color.has_alpha()) {
            (1, _) => (ColorFormat::Luma8, img.into_luma8().into_raw()),
            (2, _) => (ColorFormat::LumaAlpha8, img.into_luma_alpha8().into_raw()),
            (_, false) => (ColorFormat::Rgb8, img.into_rgb8().into_raw()),
            (_, true) => (ColorFormat::Rgba8, img.into_rgba8().into_raw()),
        };

        log::debug!(
            "Decoded texture {:?}: {}x{} {:?}",
            name,
            width,
            height,
            format
        );
        Self::from_pixels(name, width, height, format, pixels)
    }

    /// Read the whole stream and decode it.
    pub fn load(file: &mut dyn ReadFile) -> Result<Self, TextureError> {
        let name = file.file_name().to_string_lossy().into_owned();
        let bytes = file.read_to_end()?;
        Self::decode(name, &bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn pitch(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of mip levels a full chain for this texture needs.
    pub fn mip_levels(&self) -> u32 {
        let max_dimension = self.width.max(self.height).max(1);
        u32::BITS - max_dimension.leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(img: image::DynamicImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png)
            .expect("encode png");
        bytes.into_inner()
    }

    #[test]
    fn decodes_rgba_png() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgba([10, 20, 30, 40]));
        let bytes = encode_png(image::DynamicImage::ImageRgba8(img));

        let tex = Texture::decode("checker.png", &bytes).unwrap();
        assert_eq!(tex.dimensions(), (3, 2));
        assert_eq!(tex.format(), ColorFormat::Rgba8);
        assert_eq!(tex.pitch(), 12);
        assert_eq!(&tex.pixels()[16..20], &[10, 20, 30, 40]);
    }

    #[test]
    fn decodes_rgb_png_without_alpha() {
        let img = image::RgbImage::new(4, 4);
        let bytes = encode_png(image::DynamicImage::ImageRgb8(img));
        let tex = Texture::decode("flat.png", &bytes).unwrap();
        assert_eq!(tex.format(), ColorFormat::Rgb8);
        assert_eq!(tex.pixels().len(), 48);
        assert_eq!(tex.mip_levels(), 3);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = Texture::decode("broken", &[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn pixel_length_is_validated() {
        let err = Texture::from_pixels("bad", 2, 2, ColorFormat::Rgb8, vec![0; 11]).unwrap_err();
        assert!(matches!(
            err,
            TextureError::SizeMismatch {
                expected: 12,
                actual: 11,
                ..
            }
        ));
        assert!(Texture::from_pixels("none", 0, 2, ColorFormat::Luma8, vec![]).is_err());
    }
}
