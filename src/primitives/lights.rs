use cgmath::Vector3;

/// Point light driven either by the clock or by the slider offset.
#[derive(Copy, Clone, Debug)]
pub struct PointLight {
    pub offset: Vector3<f32>,
    pub animated: bool,
}

impl PointLight {
    pub fn new(offset: Vector3<f32>, animated: bool) -> Self {
        Self { offset, animated }
    }

    /// Position at `time` seconds. Animated lights circle an ellipse in x/y and keep the offset's z.
    pub fn position(&self, time: f32) -> Vector3<f32> {
        if self.animated {
            Vector3::new(time.sin(), 2.0 * time.cos(), self.offset.z)
        } else {
            self.offset
        }
    }
}
