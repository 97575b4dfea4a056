use cgmath::{InnerSpace, Matrix4, Quaternion, Rad, Rotation3, Vector3};
use winit::dpi::PhysicalPosition;
use winit::event::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Fixed perspective used for every frame.
#[derive(Copy, Clone, Debug)]
pub struct Projection {
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fovy: Rad(std::f32::consts::PI / 8.0),
            aspect: 1.0,
            near: 8.0,
            far: 12.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.near, self.far)
    }
}

/// Mouse-drag rotator. Supplies the camera view as a pure rotation.
pub struct TrackballRotator {
    rotation: Quaternion<f32>,
    sensitivity: f32,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl TrackballRotator {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            sensitivity,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation)
    }

    /// Rotates by a drag of `(dx, dy)` pixels about the screen axis perpendicular to it.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        let axis = Vector3::new(dy, dx, 0.0);
        let length = axis.magnitude();
        if length <= f32::EPSILON {
            return;
        }
        let turn = Quaternion::from_axis_angle(axis / length, Rad(length * self.sensitivity));
        self.rotation = (turn * self.rotation).normalize();
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some(last) = self.last_cursor {
                        self.drag(
                            (position.x - last.x) as f32,
                            (position.y - last.y) as f32,
                        );
                    }
                }
                self.last_cursor = Some(*position);
                self.dragging
            }
            WindowEvent::CursorLeft { .. } => {
                self.dragging = false;
                self.last_cursor = None;
                false
            }
            _ => false,
        }
    }
}
