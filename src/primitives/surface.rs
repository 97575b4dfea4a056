use cgmath::{Rad, Vector3};

/// Kiss surface samples: interleaved strip positions plus parallel texcoords.
#[derive(Clone, Debug, Default)]
pub struct SurfaceData {
    pub positions: Vec<f32>,
    pub texcoords: Vec<f32>,
}

/// Linearly maps `value` from `a..b` to `c..d`.
pub fn map_range(value: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = (value - a) / (b - a);
    c + t * (d - c)
}

/// Radius of the surface's cross-section at height `z`, `z² · sqrt(1 − z)`.
pub fn kiss_profile(z: f32) -> f32 {
    z * z * (1.0 - z).sqrt()
}

/// Point of the kiss surface at longitude `angle` and height `z`.
pub fn kiss_point(angle: Rad<f32>, z: f32) -> Vector3<f32> {
    let r = kiss_profile(z);
    Vector3::new(r * angle.0.cos(), r * angle.0.sin(), z)
}

/// Tessellates the kiss surface for `u` in [0°, 360°] and `z` in [-1, 1].
///
/// Every sample is followed by its neighbour one step ahead in both `u` and
/// `z`, so the output can be drawn directly as a triangle strip. The
/// neighbour is held at the domain end on the last row and column.
pub fn generate_kiss_surface(angle_step_deg: f32, depth_steps: u32) -> SurfaceData {
    let angle_samples = (360.0 / angle_step_deg).floor() as u32;
    let depth = depth_steps as i64;
    let z_step = 1.0 / depth_steps as f32;

    let vertex_count = 2 * (angle_samples as usize + 1) * (2 * depth_steps as usize + 1);
    let mut data = SurfaceData {
        positions: Vec::with_capacity(vertex_count * 3),
        texcoords: Vec::with_capacity(vertex_count * 2),
    };

    for i in 0..=angle_samples {
        let u = i as f32 * angle_step_deg;
        let u_next = (u + angle_step_deg).min(360.0);

        for k in -depth..=depth {
            let z = k as f32 / depth_steps as f32;
            let z_next = (z + z_step).min(1.0);

            data.push_sample(u, z);
            data.push_sample(u_next, z_next);
        }
    }

    data
}

impl SurfaceData {
    fn push_sample(&mut self, u_deg: f32, z: f32) {
        let p = kiss_point(Rad(u_deg.to_radians()), z);
        self.positions.extend_from_slice(&[p.x, p.y, p.z]);
        self.texcoords
            .extend_from_slice(&[u_deg / 360.0, map_range(z, -1.0, 1.0, 0.0, 1.0)]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn map_range_endpoints_and_midpoint() {
        assert_relative_eq!(map_range(0.5, 0.0, 1.0, -500.0, 500.0), 0.0);
        assert_relative_eq!(map_range(0.0, 0.0, 1.0, -500.0, 500.0), -500.0);
        assert_relative_eq!(map_range(1.0, 0.0, 1.0, -500.0, 500.0), 500.0);
        assert_relative_eq!(map_range(0.0, -1.0, 1.0, 0.0, 1.0), 0.5);
    }

    #[test]
    fn profile_vanishes_at_origin_and_top() {
        assert_eq!(kiss_profile(0.0), 0.0);
        assert_eq!(kiss_profile(1.0), 0.0);
        assert_relative_eq!(kiss_profile(-1.0), 2.0_f32.sqrt());
    }

    #[test]
    fn strip_has_whole_vertex_pairs() {
        let data = generate_kiss_surface(10.0, 20);
        assert_eq!(data.positions.len() % 6, 0);
        assert_eq!(data.positions.len() % 2, 0);
        assert_eq!(data.texcoords.len() * 3, data.positions.len() * 2);
        // 37 longitudes, 41 heights, two vertices per sample
        assert_eq!(data.vertex_count(), 37 * 41 * 2);
    }

    #[test]
    fn sampled_heights_stay_in_domain() {
        let data = generate_kiss_surface(5.0, 50);
        for v in data.positions.chunks(3) {
            let z = v[2];
            assert!((-1.0..=1.0).contains(&z), "z out of range: {}", z);
            assert!(1.0 - z >= 0.0);
        }
        assert!(data.positions.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn texcoords_stay_in_unit_square() {
        let data = generate_kiss_surface(0.5, 10);
        assert!(data
            .texcoords
            .iter()
            .all(|t| t.is_finite() && (0.0..=1.0).contains(t)));
    }

    #[test]
    fn first_pair_starts_at_bottom_of_seam() {
        let data = generate_kiss_surface(90.0, 2);
        // u = 0, z = -1: radius sqrt(2) along +x
        assert_relative_eq!(data.positions[0], 2.0_f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(data.positions[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(data.positions[2], -1.0);
        // neighbour: u = 90, z = -0.5
        let r = kiss_profile(-0.5);
        assert_relative_eq!(data.positions[3], 0.0, epsilon = 1e-6);
        assert_relative_eq!(data.positions[4], r, epsilon = 1e-6);
        assert_relative_eq!(data.positions[5], -0.5);
        assert_relative_eq!(data.texcoords[2], 0.25);
        assert_relative_eq!(data.texcoords[3], 0.25);
    }
}
