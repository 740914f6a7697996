use super::transform::Transform;
use glam::Vec3;

/// Animators attached to a node run during the animate sweep, before the
/// node's absolute transform is refreshed. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum Animator {
    /// Adds `degrees_per_10ms` to the rotation for every 10 ms elapsed.
    Rotation {
        degrees_per_10ms: Vec3,
        last_ms: Option<u32>,
    },
    /// Moves around `center` in the plane perpendicular to `axis`.
    FlyCircle {
        center: Vec3,
        radius: f32,
        /// Radians per millisecond.
        speed: f32,
        axis: Vec3,
        start_ms: u32,
    },
    /// Moves from `start` to `end` over `duration_ms`.
    FlyStraight {
        start: Vec3,
        end: Vec3,
        duration_ms: u32,
        looping: bool,
        start_ms: u32,
    },
}

impl Animator {
    pub fn rotation(degrees_per_10ms: Vec3) -> Self {
        Animator::Rotation {
            degrees_per_10ms,
            last_ms: None,
        }
    }

    pub fn fly_circle(center: Vec3, radius: f32, speed: f32, axis: Vec3, start_ms: u32) -> Self {
        Animator::FlyCircle {
            center,
            radius,
            speed,
            axis,
            start_ms,
        }
    }

    pub fn fly_straight(start: Vec3, end: Vec3, duration_ms: u32, looping: bool, start_ms: u32) -> Self {
        Animator::FlyStraight {
            start,
            end,
            duration_ms,
            looping,
            start_ms,
        }
    }

    pub fn animate(&mut self, transform: &mut Transform, time_ms: u32) {
        match self {
            Animator::Rotation {
                degrees_per_10ms,
                last_ms,
            } => {
                let Some(last) = *last_ms else {
                    *last_ms = Some(time_ms);
                    return;
                };
                let elapsed = time_ms.saturating_sub(last);
                if elapsed >= 10 {
                    let rotation = transform.rotation + *degrees_per_10ms * (elapsed as f32 / 10.0);
                    transform.rotation = wrap_degrees(rotation);
                    *last_ms = Some(time_ms);
                }
            }
            Animator::FlyCircle {
                center,
                radius,
                speed,
                axis,
                start_ms,
            } => {
                let axis = axis.try_normalize().unwrap_or(Vec3::Y);
                let (u, v) = axis.any_orthonormal_pair();
                let t = time_ms.saturating_sub(*start_ms) as f32 * *speed;
                transform.translation = *center + (u * t.cos() + v * t.sin()) * *radius;
            }
            Animator::FlyStraight {
                start,
                end,
                duration_ms,
                looping,
                start_ms,
            } => {
                let elapsed = time_ms.saturating_sub(*start_ms);
                let duration = (*duration_ms).max(1);
                let progress = if elapsed >= duration && !*looping {
                    1.0
                } else {
                    (elapsed % duration) as f32 / duration as f32
                };
                transform.translation = start.lerp(*end, progress);
            }
        }
    }
}

fn wrap_degrees(rotation: Vec3) -> Vec3 {
    Vec3::new(
        rotation.x.rem_euclid(360.0),
        rotation.y.rem_euclid(360.0),
        rotation.z.rem_euclid(360.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_accumulates_per_ten_ms() {
        let mut anim = Animator::rotation(Vec3::new(0.0, 1.0, 0.0));
        let mut t = Transform::IDENTITY;
        anim.animate(&mut t, 1000);
        assert_eq!(t.rotation, Vec3::ZERO);
        anim.animate(&mut t, 1005);
        assert_eq!(t.rotation, Vec3::ZERO);
        anim.animate(&mut t, 1100);
        assert!((t.rotation.y - 10.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_wraps() {
        let mut anim = Animator::rotation(Vec3::new(0.0, 0.0, 100.0));
        let mut t = Transform::IDENTITY;
        anim.animate(&mut t, 0);
        anim.animate(&mut t, 40);
        assert!((t.rotation.z - 40.0).abs() < 1e-4);
    }

    #[test]
    fn fly_circle_keeps_radius() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let mut anim = Animator::fly_circle(center, 5.0, 0.001, Vec3::Y, 0);
        let mut t = Transform::IDENTITY;
        for time in [0, 250, 1000, 3333] {
            anim.animate(&mut t, time);
            let offset = t.translation - center;
            assert!((offset.length() - 5.0).abs() < 1e-4);
            assert!(offset.y.abs() < 1e-4);
        }
    }

    #[test]
    fn fly_straight_stops_or_loops() {
        let mut once = Animator::fly_straight(Vec3::ZERO, Vec3::X * 10.0, 100, false, 0);
        let mut t = Transform::IDENTITY;
        once.animate(&mut t, 50);
        assert!((t.translation.x - 5.0).abs() < 1e-5);
        once.animate(&mut t, 500);
        assert_eq!(t.translation, Vec3::X * 10.0);

        let mut looping = Animator::fly_straight(Vec3::ZERO, Vec3::X * 10.0, 100, true, 0);
        looping.animate(&mut t, 125);
        assert!((t.translation.x - 2.5).abs() < 1e-5);
    }
}
