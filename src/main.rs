use glam::{UVec2, Vec2, Vec3};
use kong::renderer::{Colorf, LightData, LightType, RecordingDriver};
use kong::scene::Animator;
use kong::time::FrameTimer;
use kong::{Device, NodeParams, RenderSettings, SharedDriver};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const FRAMES: u32 = 5;

fn build_scene(device: &mut Device) {
    let scene = device.scene_manager_mut();

    scene.add_camera_scene_node(
        Vec3::ZERO,
        NodeParams::new().named("camera").at(Vec3::new(0.0, 30.0, -60.0)),
    );

    scene.add_plane_scene_node(
        Vec2::splat(10.0),
        UVec2::new(8, 8),
        NodeParams::new().named("floor").at(Vec3::new(0.0, -10.0, 0.0)),
    );

    let hub = scene.add_cube_scene_node(10.0, NodeParams::new().named("hub"));
    scene.add_animator(hub, Animator::rotation(Vec3::new(0.0, 0.3, 0.0)));
    for i in 0..4 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_2;
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * 20.0;
        let satellite = scene.add_cube_scene_node(
            4.0,
            NodeParams::new()
                .under(hub)
                .named(format!("satellite {i}"))
                .at(offset),
        );
        scene.add_animator(satellite, Animator::rotation(Vec3::new(1.0, 0.0, 0.0)));
    }

    let sun = LightData {
        light_type: LightType::Directional,
        diffuse_color: Colorf::new(1.0, 0.95, 0.8, 1.0),
        ..LightData::default()
    };
    scene.add_light_scene_node(
        sun,
        NodeParams::new().named("sun").rotated(Vec3::new(45.0, 30.0, 0.0)),
    );

    let mut lamp = LightData::default();
    lamp.set_radius(40.0);
    let lamp = scene.add_light_scene_node(lamp, NodeParams::new().named("lamp"));
    scene.add_animator(
        lamp,
        Animator::fly_circle(Vec3::new(0.0, 15.0, 0.0), 25.0, 0.001, Vec3::Y, 0),
    );
}

fn main() {
    kong::init_logging();

    let settings = RenderSettings::load();
    let recorder = Rc::new(RefCell::new(
        RecordingDriver::new(settings.resolution.size()).with_shadow_target(true),
    ));
    let driver: SharedDriver = recorder.clone();

    let mut device =
        Device::new(driver, settings).with_timer(FrameTimer::fixed(Duration::from_millis(16)));
    build_scene(&mut device);

    log::info!(
        "Scene ready with {} nodes",
        device.scene_manager().graph().node_count()
    );

    while device.run() {
        let stats = recorder.borrow().stats();
        log::info!(
            "Frame {}: {} draw calls, {} triangles, {} material changes",
            device.timer().frames(),
            stats.draw_calls,
            stats.triangles,
            stats.material_changes
        );
        if device.timer().frames() >= u64::from(FRAMES) {
            device.close_device();
        }
    }
}
