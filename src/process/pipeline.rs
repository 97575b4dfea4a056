use crate::primitives::mesh::Topology;
use crate::process::frame::FrameUniforms;

/// Shader compilation or pipeline link failure, tagged by stage.
#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
    #[error("Error in vertex shader: {0}")]
    Vertex(String),
    #[error("Error in fragment shader: {0}")]
    Fragment(String),
    #[error("Link error in program: {0}")]
    Link(String),
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex layout of one mesh: positions at location 0, texcoords at location 1 when present.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeshLayout {
    pub topology: Topology,
    pub textured: bool,
}

pub struct ShaderProgram {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
    format: wgpu::TextureFormat,
}

async fn compile_module(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, wgpu::Error> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match device.pop_error_scope().await {
        Some(err) => Err(err),
        None => Ok(module),
    }
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const TEXCOORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    }
}

fn texcoord_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (2 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TEXCOORD_ATTRIBUTES,
    }
}

pub fn uniform_size() -> wgpu::BufferAddress {
    std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress
}

impl ShaderProgram {
    pub async fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let vertex_module = compile_module(device, "Vertex Shader", vertex_source)
            .await
            .map_err(|err| ShaderError::Vertex(err.to_string()))?;
        let fragment_module = compile_module(device, "Fragment Shader", fragment_source)
            .await
            .map_err(|err| ShaderError::Fragment(err.to_string()))?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size()),
                },
                count: None,
            }],
            label: Some("Uniform Bind Group Layout"),
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("Texture Bind Group Layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        Ok(Self {
            uniform_layout,
            texture_layout,
            pipeline_layout,
            vertex_module,
            fragment_module,
            format,
        })
    }

    /// Links a pipeline for one mesh. Topology and vertex layout are fixed per pipeline.
    pub async fn link(
        &self,
        device: &wgpu::Device,
        name: &str,
        layout: MeshLayout,
    ) -> Result<wgpu::RenderPipeline, ShaderError> {
        let (vs_entry, fs_entry) = if layout.textured {
            ("vs_textured", "fs_textured")
        } else {
            ("vs_plain", "fs_plain")
        };
        let buffers = [position_layout(), texcoord_layout()];
        let buffers = if layout.textured { &buffers[..] } else { &buffers[..1] };

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.vertex_module,
                entry_point: vs_entry,
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.fragment_module,
                entry_point: fs_entry,
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: layout.topology.to_wgpu(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        match device.pop_error_scope().await {
            Some(err) => Err(ShaderError::Link(format!("{}: {}", name, err))),
            None => Ok(pipeline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_their_stage() {
        let vertex = ShaderError::Vertex("expected ';'".to_string());
        let fragment = ShaderError::Fragment("unknown type".to_string());
        let link = ShaderError::Link("Orbiter: entry point missing".to_string());
        assert_eq!(vertex.to_string(), "Error in vertex shader: expected ';'");
        assert_eq!(fragment.to_string(), "Error in fragment shader: unknown type");
        assert_eq!(link.to_string(), "Link error in program: Orbiter: entry point missing");
    }

    #[test]
    fn vertex_layouts_match_flat_buffers() {
        assert_eq!(position_layout().array_stride, 12);
        assert_eq!(texcoord_layout().array_stride, 8);
        assert_eq!(texcoord_layout().attributes[0].shader_location, 1);
    }
}
