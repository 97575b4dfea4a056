pub mod config;
pub mod primitives;
pub mod process;
pub mod wasm;

use std::iter;

use anyhow::Context;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use config::DemoConfig;
use primitives::camera::{Projection, TrackballRotator};
use primitives::mesh::{GpuMesh, Mesh};
use primitives::scene::SceneState;
use primitives::texture::Texture;
use process::frame::{render_frame, FrameUniforms, MeshSlot};
use process::pipeline::{uniform_size, MeshLayout, ShaderProgram, ShaderError, DEPTH_FORMAT};
use wasm::state::ControlFeed;

pub const CANVAS_ELEMENT_ID: &str = "kiss-surface";
pub const MESSAGE_ELEMENT_ID: &str = "canvas-holder";

/// Seconds since the epoch. Only differences and sin/cos of it matter.
fn wall_clock_seconds() -> f64 {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            js_sys::Date::now() * 0.001
        } else {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0)
        }
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn load_texture(device: &wgpu::Device, queue: &wgpu::Queue, config: &DemoConfig) -> Texture {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = &config.texture_path {
            let loaded = std::fs::read(path)
                .with_context(|| format!("reading {}", path))
                .and_then(|bytes| Texture::from_bytes(device, queue, &bytes, path));
            match loaded {
                Ok(texture) => return texture,
                Err(err) => log::warn!("Texture unavailable, using checker: {:#}", err),
            }
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = config;
    Texture::checker(device, queue)
}

struct MeshPass {
    mesh: GpuMesh,
    pipeline: wgpu::RenderPipeline,
}

pub struct State {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_view: wgpu::TextureView,
    surface_pass: MeshPass,
    orbiter_pass: MeshPass,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: wgpu::BufferAddress,
    texture_bind_group: wgpu::BindGroup,
    projection: Projection,
    rotator: TrackballRotator,
    scene: SceneState,
    controls: ControlFeed,
    window: Window,
}

impl State {
    async fn new(window: Window, demo: &DemoConfig, controls: ControlFeed) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = unsafe { instance.create_surface(&window) }.context("creating surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;

        log::info!("{:#?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default()
                    },
                },
                None,
            )
            .await
            .context("requesting device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        // MESHES
        let surface_mesh = Mesh::kiss_surface(
            demo.surface.angle_step_deg,
            demo.surface.depth_steps,
            demo.textured,
        );
        let orbiter_mesh = Mesh::sphere(demo.orbiter.radius, demo.orbiter.angle_step);
        log::info!(
            "{}: {} vertices, {}: {} vertices",
            surface_mesh.name,
            surface_mesh.vertex_count(),
            orbiter_mesh.name,
            orbiter_mesh.vertex_count()
        );

        // SHADERS
        let program = ShaderProgram::new(
            &device,
            surface_format,
            include_str!("./shaders/vertex.wgsl"),
            include_str!("./shaders/fragment.wgsl"),
        )
        .await?;

        let surface_pipeline = program
            .link(
                &device,
                surface_mesh.name,
                MeshLayout {
                    topology: surface_mesh.topology,
                    textured: surface_mesh.is_textured(),
                },
            )
            .await?;
        let orbiter_pipeline = program
            .link(
                &device,
                orbiter_mesh.name,
                MeshLayout {
                    topology: orbiter_mesh.topology,
                    textured: orbiter_mesh.is_textured(),
                },
            )
            .await?;

        // UNIFORMS, one aligned slot per draw
        let alignment = device.limits().min_uniform_buffer_offset_alignment as wgpu::BufferAddress;
        let uniform_stride = uniform_size().div_ceil_to(alignment);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: uniform_stride * 2,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &program.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniform_size()),
                }),
            }],
            label: Some("Uniform Bind Group"),
        });

        let texture = load_texture(&device, &queue, demo);
        let texture_bind_group = texture.bind_group(&device, &program.texture_layout);

        Ok(Self {
            surface_pass: MeshPass {
                mesh: surface_mesh.to_buffer(&device),
                pipeline: surface_pipeline,
            },
            orbiter_pass: MeshPass {
                mesh: orbiter_mesh.to_buffer(&device),
                pipeline: orbiter_pipeline,
            },
            surface,
            device,
            queue,
            config,
            size,
            depth_view,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            texture_bind_group,
            projection: Projection::default(),
            rotator: TrackballRotator::new(0.01),
            scene: SceneState::from(demo),
            controls,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        self.scene.process_events(event) || self.rotator.process_events(event)
    }

    fn update(&mut self) {
        if let Some(state_js) = self.controls.poll() {
            self.scene.apply_controls(&state_js);
        }
    }

    fn pass(&self, slot: MeshSlot) -> &MeshPass {
        match slot {
            MeshSlot::Surface => &self.surface_pass,
            MeshSlot::Orbiter => &self.orbiter_pass,
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let time = (wall_clock_seconds() % 3600.0) as f32;
        let frame = render_frame(&self.rotator.view_matrix(), time, &self.scene, &self.projection);

        for (i, draw) in frame.draws.iter().enumerate() {
            let uniforms: &FrameUniforms = &draw.uniforms;
            self.queue.write_buffer(
                &self.uniform_buffer,
                i as wgpu::BufferAddress * self.uniform_stride,
                bytemuck::bytes_of(uniforms),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            for (i, draw) in frame.draws.iter().enumerate() {
                let pass = self.pass(draw.mesh);
                let offset = (i as wgpu::BufferAddress * self.uniform_stride) as wgpu::DynamicOffset;
                render_pass.set_pipeline(&pass.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                pass.mesh.draw(&mut render_pass);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

trait AlignTo {
    fn div_ceil_to(self, alignment: Self) -> Self;
}

impl AlignTo for wgpu::BufferAddress {
    fn div_ceil_to(self, alignment: Self) -> Self {
        (self + alignment - 1) / alignment * alignment
    }
}

/// Shows a fatal error where the canvas would have been.
fn report_fatal(err: &anyhow::Error) {
    if let Some(shader) = err.downcast_ref::<ShaderError>() {
        log::error!("Shader setup failed: {}", shader);
    } else {
        log::error!("Initialization failed: {:#}", err);
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Some(holder) = web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| doc.get_element_by_id(MESSAGE_ELEMENT_ID))
        {
            holder.set_inner_html(&format!(
                "<p>Sorry, could not initialize the graphics context: {}</p>",
                err
            ));
        }
    }
}

async fn launch(demo: DemoConfig, controls: ControlFeed) -> anyhow::Result<()> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(demo.title.as_str())
        .with_inner_size(winit::dpi::LogicalSize::new(demo.size[0], demo.size[1]))
        .build(&event_loop)
        .context("creating window")?;

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::WindowExtWebSys;
        web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| {
                let dst = doc.get_element_by_id(CANVAS_ELEMENT_ID)?;
                let canvas = web_sys::Element::from(window.canvas());
                dst.append_child(&canvas).ok()?;
                Some(())
            })
            .context("couldn't append canvas to document")?;
    }

    let mut state = match State::new(window, &demo, controls).await {
        Ok(state) => state,
        Err(err) => {
            report_fatal(&err);
            return Err(err);
        }
    };

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == state.window().id() => {
            if !state.input(event) {
                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        state.resize(**new_inner_size);
                    }
                    _ => {}
                }
            }
        }
        Event::RedrawRequested(window_id) if window_id == state.window().id() => {
            state.update();
            match state.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    state.resize(state.size)
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of GPU memory");
                    *control_flow = ControlFlow::Exit
                }
                Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
            }
        }
        Event::MainEventsCleared => {
            state.window().request_redraw();
        }
        _ => {}
    });
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn run(get_js: js_sys::Function) {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    let _ = console_log::init_with_level(log::Level::Warn);

    if let Err(err) = launch(DemoConfig::default(), ControlFeed::new(get_js)).await {
        log::error!("{:#}", err);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn run() -> anyhow::Result<()> {
    env_logger::init();

    let demo = DemoConfig::from_env().context("loading config")?;
    launch(demo, ControlFeed::new()).await
}
