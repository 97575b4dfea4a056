use wgpu::util::DeviceExt;

use crate::primitives::sphere::generate_sphere;
use crate::primitives::surface::generate_kiss_surface;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleStrip,
    TriangleList,
}

impl Topology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// CPU side vertex data, flat `[x, y, z, ...]` positions with optional `[u, v, ...]`.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: &'static str,
    pub positions: Vec<f32>,
    pub texcoords: Option<Vec<f32>>,
    pub topology: Topology,
}

impl Mesh {
    pub fn kiss_surface(angle_step_deg: f32, depth_steps: u32, textured: bool) -> Self {
        let data = generate_kiss_surface(angle_step_deg, depth_steps);
        Self {
            name: "Kiss Surface",
            positions: data.positions,
            texcoords: if textured { Some(data.texcoords) } else { None },
            topology: Topology::TriangleStrip,
        }
    }

    pub fn sphere(radius: f32, angle_step: f32) -> Self {
        Self {
            name: "Orbiter",
            positions: generate_sphere(radius, angle_step),
            texcoords: None,
            topology: Topology::TriangleList,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    pub fn is_textured(&self) -> bool {
        self.texcoords.is_some()
    }

    pub fn is_valid(&self) -> bool {
        let n = self.vertex_count() as usize;
        self.positions.len() == 3 * n
            && self.texcoords.as_ref().map_or(true, |t| t.len() == 2 * n)
    }
}

/// GPU resident copy of a [`Mesh`]. Buffers live as long as the renderer.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub texcoord_buffer: Option<wgpu::Buffer>,
    pub count: u32,
    pub topology: Topology,
}

impl GpuMesh {
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        if let Some(texcoords) = &self.texcoord_buffer {
            render_pass.set_vertex_buffer(1, texcoords.slice(..));
        }
        render_pass.draw(0..self.count, 0..1);
    }
}

impl Mesh {
    pub fn to_buffer(&self, device: &wgpu::Device) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(self.name),
            contents: bytemuck::cast_slice(&self.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let texcoord_buffer = self.texcoords.as_ref().map(|texcoords| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Texcoord Buffer"),
                contents: bytemuck::cast_slice(texcoords),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        GpuMesh {
            vertex_buffer,
            texcoord_buffer,
            count: self.vertex_count(),
            topology: self.topology,
        }
    }
}
