//! Virtual aquarium: descriptor-driven fish simulation and wgpu renderer.
//!
//! The library splits cleanly between the simulation core (descriptor,
//! physics, motion, factory, scene: all CPU, deterministic under a seeded
//! RNG, fully testable without a GPU) and the rendering shell (this module,
//! gpu, camera), which re-uploads the scene's world-space geometry every
//! frame.

pub mod behavior;
pub mod camera;
pub mod descriptor;
pub mod factory;
pub mod gpu;
pub mod loader;
pub mod mesh;
pub mod motion;
pub mod physics;
pub mod scene;

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use camera::Camera;
use descriptor::FishId;
use gpu::GpuContext;
use loader::LoadedImage;
use mesh::{SolidVertex, TexturedVertex};
use scene::Aquarium;

/// Upper bound on solid vertices per frame: ground + 15 plants + 50 fully
/// rigged fish fit comfortably.
const MAX_SOLID_VERTICES: usize = 65536;
/// One image plane: 8 segments, 6 vertices each.
const IMAGE_PLANE_VERTICES: usize = 48;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.04,
    g: 0.13,
    b: 0.20,
    a: 1.0,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewProjectionUniform {
    matrix: [[f32; 4]; 4],
}

/// GPU state for one image fish: its texture and a small dedicated vertex
/// buffer rewritten each frame with the bent, billboarded plane.
struct ImageEntry {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl ImageEntry {
    /// Explicit release; graphics memory is never left to garbage
    /// collection semantics.
    fn release(self) {
        self.texture.destroy();
        self.vertex_buffer.destroy();
    }
}

pub struct Renderer {
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,

    solid_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,
    solid_vertex_buffer: wgpu::Buffer,
    solid_vertex_count: u32,
    solid_bind_group: wgpu::BindGroup,

    view_projection_buffer: wgpu::Buffer,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    image_entries: HashMap<FishId, ImageEntry>,

    depth_view: wgpu::TextureView,
    camera: Camera,

    // Frame capture resources (headless mode and screenshots)
    capture_texture: Option<wgpu::Texture>,
    capture_view: Option<wgpu::TextureView>,
    staging_buffer: Option<wgpu::Buffer>,
    bytes_per_row: u32,

    solid_scratch: Vec<SolidVertex>,
    textured_scratch: Vec<TexturedVertex>,
}

impl Renderer {
    /// `window: None` runs fully offscreen (capture only).
    pub async fn new(
        window: Option<&winit::window::Window>,
        gpu: &GpuContext,
        enable_capture: bool,
    ) -> anyhow::Result<Self> {
        let (surface, config) = match window {
            Some(window) => {
                let surface = unsafe {
                    let surface = gpu
                        .instance
                        .create_surface_unsafe(wgpu::SurfaceTargetUnsafe::from_window(window)?)?;
                    std::mem::transmute::<wgpu::Surface<'_>, wgpu::Surface<'static>>(surface)
                };
                let caps = surface.get_capabilities(&gpu.adapter);
                let format = caps
                    .formats
                    .iter()
                    .find(|f| f.is_srgb())
                    .copied()
                    .unwrap_or(caps.formats[0]);
                let size = window.inner_size();
                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width: size.width.max(1),
                    height: size.height.max(1),
                    present_mode: wgpu::PresentMode::Fifo,
                    alpha_mode: caps.alpha_modes[0],
                    view_formats: vec![],
                    desired_maximum_frame_latency: 2,
                };
                surface.configure(&gpu.device, &config);
                (Some(surface), config)
            }
            None => {
                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format: wgpu::TextureFormat::Bgra8UnormSrgb,
                    width: 800,
                    height: 600,
                    present_mode: wgpu::PresentMode::Fifo,
                    alpha_mode: wgpu::CompositeAlphaMode::Opaque,
                    view_formats: vec![],
                    desired_maximum_frame_latency: 2,
                };
                (None, config)
            }
        };

        let camera = Camera::new(config.width as f32 / config.height as f32);
        let uniform = ViewProjectionUniform {
            matrix: camera.view_projection_matrix_transposed(),
        };
        let view_projection_buffer =
            gpu.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("View Projection Buffer"),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });

        let solid_vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Solid Vertex Buffer"),
            size: (MAX_SOLID_VERTICES * std::mem::size_of::<SolidVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let solid_layout = Self::create_solid_bind_group_layout(gpu);
        let solid_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Solid Bind Group"),
            layout: &solid_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_projection_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = Self::create_texture_bind_group_layout(gpu);
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Fish Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let solid_shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Solid Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/solid.wgsl").into()),
            });
        let textured_shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Textured Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/textured.wgsl").into()),
            });

        let solid_pipeline = Self::create_pipeline(
            gpu,
            &solid_shader,
            &solid_layout,
            config.format,
            Self::solid_vertex_layout(),
            "Solid Pipeline",
        );
        let textured_pipeline = Self::create_pipeline(
            gpu,
            &textured_shader,
            &texture_layout,
            config.format,
            Self::textured_vertex_layout(),
            "Textured Pipeline",
        );

        let depth_view = Self::create_depth_view(gpu, config.width, config.height);

        let (capture_texture, capture_view, staging_buffer, bytes_per_row) = if enable_capture {
            let unpadded = config.width * 4;
            let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
            let padded = ((unpadded + align - 1) / align) * align;

            let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Capture Texture"),
                size: wgpu::Extent3d {
                    width: config.width,
                    height: config.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: config.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Capture Staging Buffer"),
                size: padded as u64 * config.height as u64,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });
            (Some(texture), Some(view), Some(buffer), padded)
        } else {
            (None, None, None, 0)
        };

        Ok(Self {
            surface,
            config,
            solid_pipeline,
            textured_pipeline,
            solid_vertex_buffer,
            solid_vertex_count: 0,
            solid_bind_group,
            view_projection_buffer,
            texture_layout,
            sampler,
            image_entries: HashMap::new(),
            depth_view,
            camera,
            capture_texture,
            capture_view,
            staging_buffer,
            bytes_per_row,
            solid_scratch: Vec::new(),
            textured_scratch: Vec::new(),
        })
    }

    /// Upload the scene's current geometry: solid pass in one buffer write,
    /// image fish into their per-entity buffers. Entries whose fish has
    /// been reconciled away are destroyed here, before any new uploads.
    pub fn update(&mut self, gpu: &GpuContext, scene: &Aquarium) {
        let live = scene.live_ids();
        let stale: Vec<FishId> = self
            .image_entries
            .keys()
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(entry) = self.image_entries.remove(&id) {
                log::debug!("releasing GPU resources for {}", id);
                entry.release();
            }
        }

        self.solid_scratch.clear();
        scene.emit_solid_vertices(&mut self.solid_scratch);
        if self.solid_scratch.len() > MAX_SOLID_VERTICES {
            log::warn!(
                "solid vertex overflow: {} > {}, truncating",
                self.solid_scratch.len(),
                MAX_SOLID_VERTICES
            );
            self.solid_scratch.truncate(MAX_SOLID_VERTICES);
        }
        self.solid_vertex_count = self.solid_scratch.len() as u32;
        if !self.solid_scratch.is_empty() {
            gpu.queue.write_buffer(
                &self.solid_vertex_buffer,
                0,
                bytemuck::cast_slice(&self.solid_scratch),
            );
        }

        for (id, transform, plane, pixels) in scene.image_fish() {
            if !self.image_entries.contains_key(id) {
                let entry = Self::create_image_entry(
                    gpu,
                    pixels,
                    &self.texture_layout,
                    &self.view_projection_buffer,
                    &self.sampler,
                );
                self.image_entries.insert(id.clone(), entry);
            }
            self.textured_scratch.clear();
            plane.emit_textured(transform, &mut self.textured_scratch);
            if let Some(entry) = self.image_entries.get_mut(id) {
                entry.vertex_count = self.textured_scratch.len() as u32;
                gpu.queue.write_buffer(
                    &entry.vertex_buffer,
                    0,
                    bytemuck::cast_slice(&self.textured_scratch),
                );
            }
        }
    }

    pub fn render(&self, gpu: &GpuContext) -> Result<(), wgpu::SurfaceError> {
        self.update_uniform_buffer(gpu);

        let Some(surface) = &self.surface else {
            self.render_to_texture(gpu);
            return Ok(());
        };
        let output = surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        if let Some(capture_view) = &self.capture_view {
            self.encode_render_pass(&mut encoder, capture_view);
        }
        self.encode_render_pass(&mut encoder, &surface_view);
        let submission = gpu.queue.submit(Some(encoder.finish()));

        if self.capture_texture.is_some() {
            gpu.device
                .poll(wgpu::Maintain::WaitForSubmissionIndex(submission));
        }
        output.present();
        Ok(())
    }

    /// Offscreen render into the capture texture only.
    pub fn render_to_texture(&self, gpu: &GpuContext) {
        self.update_uniform_buffer(gpu);
        let Some(capture_view) = &self.capture_view else {
            return;
        };
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Encoder"),
            });
        self.encode_render_pass(&mut encoder, capture_view);
        let submission = gpu.queue.submit(Some(encoder.finish()));
        gpu.device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(submission));
    }

    /// Read back the last captured frame as tightly packed pixels in the
    /// surface format (BGRA on most platforms).
    pub fn capture_frame(&self, gpu: &GpuContext) -> Option<Vec<u8>> {
        let capture_texture = self.capture_texture.as_ref()?;
        let staging_buffer = self.staging_buffer.as_ref()?;

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: capture_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: staging_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(self.bytes_per_row),
                    rows_per_image: Some(self.config.height),
                },
            },
            wgpu::Extent3d {
                width: self.config.width,
                height: self.config.height,
                depth_or_array_layers: 1,
            },
        );
        let submission = gpu.queue.submit(Some(encoder.finish()));
        gpu.device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(submission));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.device.poll(wgpu::Maintain::Wait);
        pollster::block_on(rx).ok()?.ok()?;

        let data = buffer_slice.get_mapped_range();
        let unpadded = (self.config.width * 4) as usize;
        let mut frame = Vec::with_capacity(unpadded * self.config.height as usize);
        for y in 0..self.config.height {
            let start = (y * self.bytes_per_row) as usize;
            frame.extend_from_slice(&data[start..start + unpadded]);
        }
        drop(data);
        staging_buffer.unmap();
        Some(frame)
    }

    pub fn resize(&mut self, gpu: &GpuContext, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            if let Some(surface) = &self.surface {
                surface.configure(&gpu.device, &self.config);
            }
            self.depth_view = Self::create_depth_view(gpu, self.config.width, self.config.height);
            self.camera
                .update_aspect_ratio(self.config.width as f32 / self.config.height as f32);
            self.update_uniform_buffer(gpu);
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Destroy every cached per-fish GPU resource. Called on teardown so
    /// nothing outlives the scene.
    pub fn release_image_entries(&mut self) {
        for (_, entry) in self.image_entries.drain() {
            entry.release();
        }
    }

    fn create_image_entry(
        gpu: &GpuContext,
        pixels: &LoadedImage,
        layout: &wgpu::BindGroupLayout,
        view_projection_buffer: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
    ) -> ImageEntry {
        let size = wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Fish Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels.rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * pixels.width),
                rows_per_image: Some(pixels.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fish Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: view_projection_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        let vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fish Plane Buffer"),
            size: (IMAGE_PLANE_VERTICES * std::mem::size_of::<TexturedVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ImageEntry {
            texture,
            bind_group,
            vertex_buffer,
            vertex_count: 0,
        }
    }

    fn create_depth_view(gpu: &GpuContext, width: u32, height: u32) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
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

    fn create_solid_bind_group_layout(gpu: &GpuContext) -> wgpu::BindGroupLayout {
        gpu.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Solid Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            })
    }

    fn create_texture_bind_group_layout(gpu: &GpuContext) -> wgpu::BindGroupLayout {
        gpu.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            })
    }

    fn create_pipeline(
        gpu: &GpuContext,
        shader: &wgpu::ShaderModule,
        bind_group_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        vertex_layout: wgpu::VertexBufferLayout<'static>,
        label: &str,
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            });
        gpu.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: "vs_main",
                    buffers: &[vertex_layout],
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Fins and image planes are double-sided.
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
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
            })
    }

    fn solid_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: 9 * 4,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 3 * 4,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 6 * 4,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }

    fn textured_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: 5 * 4,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 3 * 4,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }

    fn encode_render_pass(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Aquarium Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if self.solid_vertex_count > 0 {
            render_pass.set_pipeline(&self.solid_pipeline);
            render_pass.set_bind_group(0, &self.solid_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.solid_vertex_buffer.slice(..));
            render_pass.draw(0..self.solid_vertex_count, 0..1);
        }

        render_pass.set_pipeline(&self.textured_pipeline);
        for entry in self.image_entries.values() {
            if entry.vertex_count == 0 {
                continue;
            }
            render_pass.set_bind_group(0, &entry.bind_group, &[]);
            render_pass.set_vertex_buffer(0, entry.vertex_buffer.slice(..));
            render_pass.draw(0..entry.vertex_count, 0..1);
        }
    }

    fn update_uniform_buffer(&self, gpu: &GpuContext) {
        let uniform = ViewProjectionUniform {
            matrix: self.camera.view_projection_matrix_transposed(),
        };
        gpu.queue.write_buffer(
            &self.view_projection_buffer,
            0,
            bytemuck::cast_slice(&[uniform]),
        );
    }
}
