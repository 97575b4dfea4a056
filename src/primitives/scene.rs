use cgmath::{Rad, Vector3};
use winit::event::*;

use crate::config::DemoConfig;
use crate::primitives::lights::PointLight;
use crate::primitives::surface::{kiss_point, map_range};
use crate::wasm::state::StateJS;

/// Texture scale uniform is `SCALE_CEILING - slider`.
pub const SCALE_CEILING: f32 = 5.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrbitKey {
    IncreaseAngle,
    DecreaseAngle,
    IncreaseDepth,
    DecreaseDepth,
}

impl OrbitKey {
    pub fn from_keycode(keycode: VirtualKeyCode) -> Option<Self> {
        match keycode {
            VirtualKeyCode::W => Some(OrbitKey::IncreaseAngle),
            VirtualKeyCode::S => Some(OrbitKey::DecreaseAngle),
            VirtualKeyCode::D => Some(OrbitKey::IncreaseDepth),
            VirtualKeyCode::A => Some(OrbitKey::DecreaseDepth),
            _ => None,
        }
    }
}

/// Everything input handlers may change between frames.
#[derive(Clone, Debug)]
pub struct SceneState {
    /// Orbit coordinates, both in [0, 1]. `[0]` picks the angle, `[1]` the height.
    pub orbit: [f32; 2],
    pub orbit_step: f32,
    pub light: PointLight,
    /// Raw slider value, see [`SceneState::texture_scale`].
    pub scale: f32,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            orbit: [0.0, 0.0],
            orbit_step: 0.01,
            light: PointLight::new(Vector3::new(0.0, 0.0, 0.0), true),
            scale: 0.0,
        }
    }
}

impl From<&DemoConfig> for SceneState {
    fn from(config: &DemoConfig) -> Self {
        Self {
            orbit: [0.0, 0.0],
            orbit_step: config.orbit_step,
            light: PointLight::new(Vector3::from(config.light_offset), config.animate_light),
            scale: config.scale,
        }
    }
}

impl SceneState {
    pub fn nudge_orbit(&mut self, key: OrbitKey) {
        let step = self.orbit_step;
        match key {
            OrbitKey::IncreaseAngle => self.orbit[0] = (self.orbit[0] + step).min(1.0),
            OrbitKey::DecreaseAngle => self.orbit[0] = (self.orbit[0] - step).max(0.0),
            OrbitKey::IncreaseDepth => self.orbit[1] = (self.orbit[1] + step).min(1.0),
            OrbitKey::DecreaseDepth => self.orbit[1] = (self.orbit[1] - step).max(0.0),
        }
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => match OrbitKey::from_keycode(*keycode) {
                Some(key) => {
                    self.nudge_orbit(key);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn apply_controls(&mut self, controls: &StateJS) {
        self.light.offset = Vector3::from(controls.light);
        self.scale = controls.scale;
    }

    pub fn texture_scale(&self) -> f32 {
        SCALE_CEILING - self.scale
    }

    /// Where the orbiter sits: a sample of the kiss surface at the orbit coordinates.
    pub fn orbiter_offset(&self) -> Vector3<f32> {
        let z = map_range(self.orbit[1], 0.0, 1.0, -500.0, 500.0) / 500.0;
        let angle = map_range(self.orbit[0], 0.0, 1.0, 0.0, std::f32::consts::TAU);
        kiss_point(Rad(angle), z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::surface::kiss_profile;
    use approx::assert_relative_eq;

    #[test]
    fn increments_clamp_at_one() {
        let mut scene = SceneState::default();
        for _ in 0..250 {
            scene.nudge_orbit(OrbitKey::IncreaseAngle);
            scene.nudge_orbit(OrbitKey::IncreaseDepth);
            assert!(scene.orbit[0] <= 1.0);
            assert!(scene.orbit[1] <= 1.0);
        }
        assert_eq!(scene.orbit, [1.0, 1.0]);
    }

    #[test]
    fn decrements_clamp_at_zero() {
        let mut scene = SceneState {
            orbit: [0.5, 0.03],
            ..SceneState::default()
        };
        for _ in 0..100 {
            scene.nudge_orbit(OrbitKey::DecreaseAngle);
            scene.nudge_orbit(OrbitKey::DecreaseDepth);
            assert!(scene.orbit[0] >= 0.0);
            assert!(scene.orbit[1] >= 0.0);
        }
        assert_eq!(scene.orbit, [0.0, 0.0]);
    }

    #[test]
    fn keys_map_to_orbit_axes() {
        assert_eq!(OrbitKey::from_keycode(VirtualKeyCode::W), Some(OrbitKey::IncreaseAngle));
        assert_eq!(OrbitKey::from_keycode(VirtualKeyCode::S), Some(OrbitKey::DecreaseAngle));
        assert_eq!(OrbitKey::from_keycode(VirtualKeyCode::D), Some(OrbitKey::IncreaseDepth));
        assert_eq!(OrbitKey::from_keycode(VirtualKeyCode::A), Some(OrbitKey::DecreaseDepth));
        assert_eq!(OrbitKey::from_keycode(VirtualKeyCode::Q), None);
    }

    #[test]
    fn orbiter_starts_at_bottom_of_surface() {
        let scene = SceneState::default();
        let p = scene.orbiter_offset();
        assert_relative_eq!(p.z, -1.0);
        assert_relative_eq!(p.x, 2.0_f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn orbiter_lies_on_the_surface() {
        let scene = SceneState {
            orbit: [0.3, 0.75],
            ..SceneState::default()
        };
        let p = scene.orbiter_offset();
        assert_relative_eq!(p.z, 0.5, epsilon = 1e-6);
        let radius = (p.x * p.x + p.y * p.y).sqrt();
        assert_relative_eq!(radius, kiss_profile(0.5), epsilon = 1e-6);
    }

    #[test]
    fn config_seeds_light_and_step() {
        let config = DemoConfig {
            animate_light: false,
            light_offset: [0.0, 1.0, 2.0],
            orbit_step: 0.25,
            ..DemoConfig::default()
        };
        let mut scene = SceneState::from(&config);
        assert!(!scene.light.animated);
        assert_eq!(scene.light.position(3.0), Vector3::new(0.0, 1.0, 2.0));
        scene.nudge_orbit(OrbitKey::IncreaseDepth);
        assert_eq!(scene.orbit, [0.0, 0.25]);
    }

    #[test]
    fn controls_set_light_offset_and_scale() {
        let mut scene = SceneState::default();
        scene.apply_controls(&StateJS {
            light: [1.0, 2.0, 3.0],
            scale: 1.5,
        });
        assert_eq!(scene.light.offset, Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(scene.texture_scale(), 3.5);
    }
}
