pub mod asset;
pub mod device;
pub mod io;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod time;

pub use device::Device;
pub use renderer::{RecordingDriver, SharedDriver, VideoDriver};
pub use scene::{NodeId, NodeParams, SceneManager};
pub use settings::{RenderPipeline, RenderSettings};

/// Installs the `env_logger` backend with an `Info` default that `RUST_LOG`
/// overrides. Calling it again is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
