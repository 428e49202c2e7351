//! Tile pipeline: instanced, tinted, alpha-blended blits from atlas
//! textures.
//!
//! Each uploaded atlas gets its own bind group (group 1); a draw covers a
//! run of instances that all sample the same texture.

use std::ops::Range;

use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    ColorTargetState, ColorWrites, Device, Extent3d, FilterMode, FragmentState, FrontFace,
    MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode,
    PrimitiveState, PrimitiveTopology, Queue, RenderPass, RenderPipeline,
    RenderPipelineDescriptor, Sampler, SamplerBindingType, SamplerDescriptor,
    ShaderModuleDescriptor, ShaderStages, Texture, TextureDescriptor, TextureDimension,
    TextureFormat, TextureSampleType, TextureUsages, TextureViewDimension, VertexState,
};

use super::{Camera, InstanceBuffer, QuadGeometry};
use crate::backend::TextureFilter;
use crate::vertex::{QuadVertex, TileInstance};

const INITIAL_INSTANCES: usize = 4096;

/// An uploaded atlas and the bind group sampling it.
pub struct TileTexture {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: BindGroup,
    pub width: u32,
    pub height: u32,
    /// Tint applied to draws recorded from now on.
    pub tint: [u8; 3],
}

pub struct TilePipeline {
    pipeline: RenderPipeline,
    texture_bgl: BindGroupLayout,
    nearest: Sampler,
    linear: Sampler,
    instances: InstanceBuffer<TileInstance>,
}

impl TilePipeline {
    pub fn new(device: &Device, surface_format: TextureFormat, camera: &Camera) -> Self {
        // ── Shader ──────────────────────────────────────────────
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("tile_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/tile.wgsl").into()),
        });

        // ── Texture bind group layout (group 1) ─────────────────
        let texture_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("tile_texture_bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // ── Pipeline layout ─────────────────────────────────────
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("tile_pipeline_layout"),
            bind_group_layouts: &[camera.layout(), &texture_bgl],
            push_constant_ranges: &[],
        });

        // ── Render pipeline ─────────────────────────────────────
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("tile_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[QuadVertex::layout(), TileInstance::layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ── Samplers ────────────────────────────────────────────
        let sampler = |label, filter| {
            device.create_sampler(&SamplerDescriptor {
                label: Some(label),
                address_mode_u: AddressMode::ClampToEdge,
                address_mode_v: AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                ..Default::default()
            })
        };
        let nearest = sampler("tile_sampler_nearest", FilterMode::Nearest);
        let linear = sampler("tile_sampler_linear", FilterMode::Linear);

        Self {
            pipeline,
            texture_bgl,
            nearest,
            linear,
            instances: InstanceBuffer::new(device, "tile_instances", INITIAL_INSTANCES),
        }
    }

    /// Upload RGBA8 pixels as a new atlas texture.
    pub fn create_texture(
        &self,
        device: &Device,
        queue: &Queue,
        pixels: &[u8],
        width: u32,
        height: u32,
        filter: TextureFilter,
    ) -> TileTexture {
        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("tile_atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            // Alpha is already display-space coverage.
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4), // RGBA = 4 bytes per pixel
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = match filter {
            TextureFilter::Nearest => &self.nearest,
            TextureFilter::Linear => &self.linear,
        };
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("tile_atlas_bg"),
            layout: &self.texture_bgl,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(sampler),
                },
            ],
        });

        TileTexture {
            texture,
            bind_group,
            width,
            height,
            tint: [255, 255, 255],
        }
    }

    /// Upload every blit of the frame.
    pub fn upload(&mut self, device: &Device, queue: &Queue, instances: &[TileInstance]) {
        self.instances.upload(device, queue, instances);
    }

    /// Draw a run of uploaded instances that all sample `texture`.
    pub fn draw(
        &self,
        pass: &mut RenderPass<'_>,
        camera: &Camera,
        quad: &QuadGeometry,
        texture: &TileTexture,
        range: Range<u32>,
    ) {
        if range.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera.bind_group(), &[]);
        pass.set_bind_group(1, &texture.bind_group, &[]);
        quad.bind(pass);
        pass.set_vertex_buffer(1, self.instances.buffer().slice(..));
        pass.draw_indexed(0..QuadVertex::INDICES.len() as u32, 0, range);
    }

    /// Number of instances uploaded for the current frame.
    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }
}
