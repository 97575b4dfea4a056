use cgmath::{InnerSpace, Matrix, Matrix4, Rad, SquareMatrix, Vector3};

use crate::primitives::camera::Projection;
use crate::primitives::scene::SceneState;

/// Uniform block shared by both shader stages. Layout matches `Uniforms` in the WGSL sources.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub light_position: [f32; 3],
    pub light: u32,
    pub coords: [f32; 2],
    pub scale: f32,
    _padding: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshSlot {
    Surface,
    Orbiter,
}

#[derive(Copy, Clone, Debug)]
pub struct DrawCommand {
    pub mesh: MeshSlot,
    pub uniforms: FrameUniforms,
}

/// Matrices derived once per frame, before any draw.
#[derive(Copy, Clone, Debug)]
pub struct FrameTransforms {
    pub projection: Matrix4<f32>,
    pub model_view: Matrix4<f32>,
    pub normal: Matrix4<f32>,
    pub model_view_projection: Matrix4<f32>,
}

#[derive(Copy, Clone, Debug)]
pub struct FrameCommands {
    pub transforms: FrameTransforms,
    pub light_position: Vector3<f32>,
    pub orbiter_offset: Vector3<f32>,
    pub draws: [DrawCommand; 2],
}

/// Rotation applied after the camera view so the default orbit faces the viewer.
pub fn recenter_rotation() -> Matrix4<f32> {
    Matrix4::from_axis_angle(Vector3::new(0.707, 0.707, 0.0).normalize(), Rad(0.7))
}

pub fn recenter_translation() -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(0.0, 0.0, -10.0))
}

impl FrameTransforms {
    pub fn new(camera_view: &Matrix4<f32>, projection: &Projection) -> Self {
        let projection = projection.matrix();
        let model_view = recenter_translation() * (recenter_rotation() * camera_view);
        let normal = model_view
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .transpose();

        Self {
            projection,
            model_view,
            normal,
            model_view_projection: projection * model_view,
        }
    }
}

/// Builds the two draws of a frame: the surface, then the lit orbiter placed on it.
pub fn render_frame(
    camera_view: &Matrix4<f32>,
    time: f32,
    scene: &SceneState,
    projection: &Projection,
) -> FrameCommands {
    let transforms = FrameTransforms::new(camera_view, projection);
    let light_position = scene.light.position(time);
    let orbiter_offset = scene.orbiter_offset();

    let surface = FrameUniforms {
        model_view_projection: transforms.model_view_projection.into(),
        normal_matrix: transforms.normal.into(),
        light_position: light_position.into(),
        light: 0,
        coords: scene.orbit,
        scale: scene.texture_scale(),
        _padding: 0.0,
    };

    let orbiter = FrameUniforms {
        model_view_projection: (transforms.model_view_projection
            * Matrix4::from_translation(orbiter_offset))
        .into(),
        light: 1,
        ..surface
    };

    FrameCommands {
        transforms,
        light_position,
        orbiter_offset,
        draws: [
            DrawCommand {
                mesh: MeshSlot::Surface,
                uniforms: surface,
            },
            DrawCommand {
                mesh: MeshSlot::Orbiter,
                uniforms: orbiter,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector4;

    fn identity_frame(scene: &SceneState) -> FrameCommands {
        render_frame(&Matrix4::identity(), 0.0, scene, &Projection::default())
    }

    #[test]
    fn light_at_time_zero() {
        let frame = identity_frame(&SceneState::default());
        assert_relative_eq!(frame.light_position.x, 0.0);
        assert_relative_eq!(frame.light_position.y, 2.0);
        assert_eq!(frame.draws[0].uniforms.light_position[1], 2.0);
    }

    #[test]
    fn surface_unlit_then_orbiter_lit() {
        let frame = identity_frame(&SceneState::default());
        assert_eq!(frame.draws[0].mesh, MeshSlot::Surface);
        assert_eq!(frame.draws[0].uniforms.light, 0);
        assert_eq!(frame.draws[1].mesh, MeshSlot::Orbiter);
        assert_eq!(frame.draws[1].uniforms.light, 1);
        assert_eq!(frame.draws[0].uniforms.normal_matrix, frame.draws[1].uniforms.normal_matrix);
    }

    #[test]
    fn origin_lands_ten_units_ahead() {
        let frame = identity_frame(&SceneState::default());
        let p = frame.transforms.model_view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.z, -10.0);
        let clip = frame.transforms.model_view_projection * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn normal_matrix_of_rigid_view_is_its_rotation() {
        let frame = identity_frame(&SceneState::default());
        let expected = recenter_rotation();
        for c in 0..3 {
            for r in 0..3 {
                assert_relative_eq!(frame.transforms.normal[c][r], expected[c][r], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn orbiter_draw_is_translated_to_its_offset() {
        let scene = SceneState {
            orbit: [0.25, 0.9],
            ..SceneState::default()
        };
        let frame = identity_frame(&scene);
        let orbiter = Matrix4::from(frame.draws[1].uniforms.model_view_projection);
        let expected = frame.transforms.model_view_projection
            * Vector4::new(
                frame.orbiter_offset.x,
                frame.orbiter_offset.y,
                frame.orbiter_offset.z,
                1.0,
            );
        let actual = orbiter * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((actual - expected).magnitude() < 1e-5);
    }

    #[test]
    fn uniforms_carry_coords_and_scale() {
        let mut scene = SceneState {
            orbit: [0.2, 0.4],
            ..SceneState::default()
        };
        scene.scale = 2.0;
        let frame = identity_frame(&scene);
        for draw in frame.draws.iter() {
            assert_eq!(draw.uniforms.coords, [0.2, 0.4]);
            assert_relative_eq!(draw.uniforms.scale, 3.0);
        }
    }

    #[test]
    fn uniform_block_is_160_bytes() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160);
    }
}
