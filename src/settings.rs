use crate::io::{load_binary, FileError, FileSystem, NativeFileSystem};
use crate::renderer::{Color, Colorf};
use crate::scene::SolidSortMode;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    File(#[from] FileError),
    #[error("malformed render settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub pipeline: RenderPipeline,
    #[serde(default)]
    pub shadows: bool,
    #[serde(default = "RenderSettings::default_shadow_map_size")]
    pub shadow_map_size: u32,
    #[serde(default = "RenderSettings::default_clear_color")]
    pub clear_color: Color,
    #[serde(default = "RenderSettings::default_shadow_color")]
    pub shadow_color: Color,
    #[serde(default = "RenderSettings::default_ambient_light")]
    pub ambient_light: Colorf,
    #[serde(default)]
    pub solid_sort: SolidSortMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            pipeline: RenderPipeline::default(),
            shadows: false,
            shadow_map_size: Self::default_shadow_map_size(),
            clear_color: Self::default_clear_color(),
            shadow_color: Self::default_shadow_color(),
            ambient_light: Self::default_ambient_light(),
            solid_sort: SolidSortMode::default(),
        }
    }
}

impl RenderSettings {
    pub const FILE_NAME: &'static str = "settings.json";

    pub fn load() -> Self {
        Self::load_or_default(&NativeFileSystem, Path::new(Self::FILE_NAME))
    }

    /// Missing or malformed files fall back to the defaults.
    pub fn load_or_default(fs: &dyn FileSystem, path: &Path) -> Self {
        match Self::try_load(fs, path) {
            Ok(settings) => {
                info!("Loaded render settings from {:?}", path);
                settings
            }
            Err(SettingsError::File(FileError::NotFound(_))) => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to load {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    pub fn try_load(fs: &dyn FileSystem, path: &Path) -> Result<Self, SettingsError> {
        let bytes = load_binary(fs, path)?;
        let settings = serde_json::from_slice::<RenderSettings>(&bytes)?;
        Ok(settings.validate())
    }

    pub fn parse(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str::<RenderSettings>(json)?.validate())
    }

    fn validate(mut self) -> Self {
        if self.shadow_map_size == 0 || !self.shadow_map_size.is_power_of_two() {
            warn!(
                "Shadow map size {} is not a power of two. Using default value.",
                self.shadow_map_size
            );
            self.shadow_map_size = Self::default_shadow_map_size();
        }

        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        self
    }

    pub fn deferred(&self) -> bool {
        self.pipeline == RenderPipeline::Deferred
    }

    const fn default_shadow_map_size() -> u32 {
        2048
    }

    const fn default_clear_color() -> Color {
        Color::rgba(100, 101, 140, 255)
    }

    const fn default_shadow_color() -> Color {
        Color::rgba(0, 0, 0, 150)
    }

    const fn default_ambient_light() -> Colorf {
        Colorf::new(0.1, 0.1, 0.1, 1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn size(&self) -> glam::UVec2 {
        glam::UVec2::new(self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPipeline {
    #[default]
    Forward,
    Deferred,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryFileSystem;

    fn invalid_settings() -> RenderSettings {
        RenderSettings {
            shadow_map_size: 1000,
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            ..RenderSettings::default()
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();

        assert_eq!(
            validated.shadow_map_size,
            RenderSettings::default().shadow_map_size
        );
        assert_eq!(validated.resolution.width, Resolution::default().width);
        assert_eq!(validated.resolution.height, Resolution::default().height);
    }

    #[test]
    fn validate_preserves_valid_values() {
        let valid = RenderSettings {
            shadow_map_size: 4096,
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            ..RenderSettings::default()
        };

        let validated = valid.clone().validate();

        assert_eq!(validated.shadow_map_size, valid.shadow_map_size);
        assert_eq!(validated.resolution.width, valid.resolution.width);
        assert_eq!(validated.resolution.height, valid.resolution.height);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings = RenderSettings::parse(r#"{ "pipeline": "deferred", "shadows": true }"#)
            .unwrap();

        assert!(settings.deferred());
        assert!(settings.shadows);
        assert_eq!(settings.shadow_map_size, 2048);
        assert_eq!(settings.solid_sort, SolidSortMode::Traversal);
        assert_eq!(settings.shadow_color, Color::rgba(0, 0, 0, 150));
    }

    #[test]
    fn solid_sort_is_snake_case() {
        let settings = RenderSettings::parse(r#"{ "solid_sort": "texture" }"#).unwrap();
        assert_eq!(settings.solid_sort, SolidSortMode::Texture);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let fs = MemoryFileSystem::new();
        let settings = RenderSettings::load_or_default(&fs, Path::new("settings.json"));
        assert_eq!(settings.pipeline, RenderPipeline::Forward);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut fs = MemoryFileSystem::new();
        fs.insert("settings.json", b"{ not json".to_vec());

        assert!(matches!(
            RenderSettings::try_load(&fs, Path::new("settings.json")),
            Err(SettingsError::Parse(_))
        ));
        let settings = RenderSettings::load_or_default(&fs, Path::new("settings.json"));
        assert!(!settings.shadows);
    }

    #[test]
    fn loads_through_file_system() {
        let mut fs = MemoryFileSystem::new();
        fs.insert(
            "settings.json",
            br#"{ "resolution": { "width": 640, "height": 480 }, "shadows": true }"#.to_vec(),
        );

        let settings = RenderSettings::load_or_default(&fs, Path::new("settings.json"));
        assert_eq!(settings.resolution.size(), glam::UVec2::new(640, 480));
        assert!(settings.shadows);
    }
}
