use crate::asset::Handle;
use crate::io::{FileSystem, NativeFileSystem};
use crate::renderer::{SharedDriver, Texture, TextureError};
use crate::scene::SceneManager;
use crate::settings::RenderSettings;
use crate::time::FrameTimer;
use std::path::Path;

/// Headless frame loop. Owns the scene manager and hands it a shared video
/// driver; the embedding application calls [`Device::run`] once per frame.
pub struct Device {
    scene: SceneManager,
    driver: SharedDriver,
    file_system: Box<dyn FileSystem>,
    settings: RenderSettings,
    timer: FrameTimer,
    closed: bool,
}

impl Device {
    pub fn new(driver: SharedDriver, settings: RenderSettings) -> Self {
        Self::with_file_system(driver, Box::new(NativeFileSystem), settings)
    }

    pub fn with_file_system(
        driver: SharedDriver,
        file_system: Box<dyn FileSystem>,
        settings: RenderSettings,
    ) -> Self {
        let mut scene = SceneManager::new(Some(driver.clone()));
        scene.enable_shadow(settings.shadows);
        scene.set_shadow_color(settings.shadow_color);
        scene.set_ambient_light(settings.ambient_light);
        scene.set_solid_sort(settings.solid_sort);
        match driver.try_borrow_mut() {
            Ok(mut guard) => guard.set_shadow_map_size(settings.shadow_map_size),
            Err(_) => log::error!("Video driver is already in use, shadow map size not applied"),
        }

        log::info!(
            "Device created: {}x{}, {:?} pipeline, shadows {}",
            settings.resolution.width,
            settings.resolution.height,
            settings.pipeline,
            if settings.shadows { "on" } else { "off" }
        );

        Self {
            scene,
            driver,
            file_system,
            settings,
            timer: FrameTimer::new(),
            closed: false,
        }
    }

    /// Replaces the frame clock, e.g. with a fixed-step one.
    pub fn with_timer(mut self, timer: FrameTimer) -> Self {
        self.timer = timer;
        self
    }

    /// Renders one frame. Returns `false` once the device was closed.
    pub fn run(&mut self) -> bool {
        if self.closed {
            return false;
        }

        self.timer.tick();
        self.scene.set_time_ms(self.timer.time_ms());

        let began = match self.driver.try_borrow_mut() {
            Ok(mut driver) => driver.begin_scene(true, true, self.settings.clear_color),
            Err(_) => {
                log::error!("Video driver is already in use, frame skipped");
                return !self.closed;
            }
        };
        if !began {
            log::warn!("Video driver refused to begin a scene");
            return !self.closed;
        }

        if self.settings.deferred() {
            self.scene.draw_all_deferred();
        } else {
            self.scene.draw_all();
        }

        if let Ok(mut driver) = self.driver.try_borrow_mut() {
            driver.end_scene();
        }

        !self.closed
    }

    pub fn close_device(&mut self) {
        log::info!("Closing device after {} frames", self.timer.frames());
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Loads and caches a texture by path. Failures are logged and give
    /// `None`.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Option<Handle<Texture>> {
        let path = path.as_ref();
        let name = path.to_string_lossy();
        if let Some(handle) = self.scene.assets().find_texture(&name) {
            return Some(handle);
        }

        let texture = self
            .file_system
            .open_read(path)
            .map_err(TextureError::from)
            .and_then(|mut file| Texture::load(file.as_mut()));
        match texture {
            Ok(texture) => {
                log::debug!(
                    "Loaded texture {:?} ({}x{})",
                    texture.name(),
                    texture.width(),
                    texture.height()
                );
                Some(self.scene.assets_mut().add_texture(texture))
            }
            Err(err) => {
                log::warn!("Failed to load texture {:?}: {}", path, err);
                None
            }
        }
    }

    pub fn scene_manager(&self) -> &SceneManager {
        &self.scene
    }

    pub fn scene_manager_mut(&mut self) -> &mut SceneManager {
        &mut self.scene
    }

    pub fn video_driver(&self) -> SharedDriver {
        self.driver.clone()
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.file_system.as_ref()
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }
}
