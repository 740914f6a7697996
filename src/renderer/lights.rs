use super::color::Colorf;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightType {
    #[default]
    Point,
    Spot,
    Directional,
}

/// Light parameters as uploaded to a driver's dynamic light slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightData {
    pub light_type: LightType,
    pub ambient_color: Colorf,
    pub diffuse_color: Colorf,
    pub specular_color: Colorf,
    /// Constant, linear and quadratic attenuation.
    pub attenuation: Vec3,
    /// Outer cone angle of spot lights, in degrees.
    pub outer_cone: f32,
    pub inner_cone: f32,
    pub falloff: f32,
    /// World position; meaningful for point and spot lights.
    pub position: Vec3,
    /// World direction; meaningful for spot and directional lights.
    pub direction: Vec3,
    pub radius: f32,
    pub cast_shadows: bool,
}

impl Default for LightData {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            ambient_color: Colorf::new(0.0, 0.0, 0.0, 1.0),
            diffuse_color: Colorf::new(1.0, 1.0, 1.0, 1.0),
            specular_color: Colorf::new(1.0, 1.0, 1.0, 1.0),
            attenuation: Vec3::new(1.0, 0.01, 0.0),
            outer_cone: 45.0,
            inner_cone: 0.0,
            falloff: 2.0,
            position: Vec3::ZERO,
            direction: Vec3::Z,
            radius: 100.0,
            cast_shadows: true,
        }
    }
}

impl LightData {
    /// Sets the radius and the matching linear attenuation `1 / radius`.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
        let linear = if radius > 0.0 { 1.0 / radius } else { 0.0 };
        self.attenuation = Vec3::new(1.0, linear, 0.0);
    }

    /// Cosines of the inner and outer cone half angles, inner first.
    pub fn cone_cosines(&self) -> (f32, f32) {
        let mut inner = self.inner_cone;
        let mut outer = self.outer_cone;
        if inner > outer {
            std::mem::swap(&mut inner, &mut outer);
        }
        (
            (inner * 0.5).to_radians().cos(),
            (outer * 0.5).to_radians().cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_drives_linear_attenuation() {
        let mut light = LightData::default();
        light.set_radius(10.0);
        assert_eq!(light.attenuation, Vec3::new(1.0, 0.1, 0.0));
        light.set_radius(0.0);
        assert_eq!(light.attenuation, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn cone_cosines_are_ordered() {
        let light = LightData {
            inner_cone: 90.0,
            outer_cone: 30.0,
            ..LightData::default()
        };
        let (inner, outer) = light.cone_cosines();
        assert!(inner > outer);
        assert!((outer - 45f32.to_radians().cos()).abs() < 1e-6);
    }
}
