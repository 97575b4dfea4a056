use std::f32::consts::{PI, TAU};

use cgmath::Vector3;

fn sphere_vertex(radius: f32, long: f32, lat: f32) -> Vector3<f32> {
    Vector3::new(
        radius * long.cos() * lat.sin(),
        radius * long.sin() * lat.sin(),
        radius * lat.cos(),
    )
}

fn steps_below(limit: f32, step: f32) -> impl Iterator<Item = f32> {
    (0u32..)
        .map(move |i| i as f32 * step)
        .take_while(move |a| *a < limit)
}

/// Triangle list for a sphere of `radius`, two triangles per grid cell.
///
/// Longitude covers [0, 2π) and latitude [0, π) in increments of
/// `angle_step` radians. Vertices are duplicated per triangle.
pub fn generate_sphere(radius: f32, angle_step: f32) -> Vec<f32> {
    let mut vertices = Vec::new();

    for long in steps_below(TAU, angle_step) {
        for lat in steps_below(PI, angle_step) {
            let v = sphere_vertex(radius, long, lat);
            let w = sphere_vertex(radius, long + angle_step, lat);
            let wv = sphere_vertex(radius, long, lat + angle_step);
            let ww = sphere_vertex(radius, long + angle_step, lat + angle_step);

            for p in [v, w, wv, wv, w, ww].iter() {
                vertices.extend_from_slice(&[p.x, p.y, p.z]);
            }
        }
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_vertex_lies_on_the_sphere() {
        let vertices = generate_sphere(0.1, 0.1);
        assert!(!vertices.is_empty());
        for v in vertices.chunks(3) {
            let d = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert_relative_eq!(d, 0.1, epsilon = 1e-5);
        }
    }

    #[test]
    fn emits_six_vertices_per_cell() {
        let vertices = generate_sphere(1.0, 0.1);
        assert_eq!(vertices.len() % 18, 0);
        // 63 longitudes (0.0..=6.2) by 32 latitudes (0.0..=3.1)
        assert_eq!(vertices.len() / 18, 63 * 32);
    }

    #[test]
    fn second_triangle_shares_an_edge_with_the_first() {
        let vertices = generate_sphere(1.0, 0.5);
        let tri = |n: usize| &vertices[n * 3..n * 3 + 3];
        assert_eq!(tri(2), tri(3));
        assert_eq!(tri(1), tri(4));
    }

    #[test]
    fn starts_at_the_pole() {
        let vertices = generate_sphere(2.0, 0.25);
        assert_relative_eq!(vertices[0], 0.0);
        assert_relative_eq!(vertices[1], 0.0);
        assert_relative_eq!(vertices[2], 2.0);
    }
}
