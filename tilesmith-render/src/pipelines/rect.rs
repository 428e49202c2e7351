//! Rect pipeline: opaque instanced fills for cell backgrounds.
//!
//! Fills replace the destination (no blending).

use std::ops::Range;

use wgpu::{
    BlendState, ColorTargetState, ColorWrites, Device, FragmentState, FrontFace,
    MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode,
    PrimitiveState, PrimitiveTopology, Queue, RenderPass, RenderPipeline,
    RenderPipelineDescriptor, ShaderModuleDescriptor, TextureFormat, VertexState,
};

use super::{Camera, InstanceBuffer, QuadGeometry};
use crate::vertex::{QuadVertex, RectInstance};

/// Initial instance capacity: one per cell of the default grid.
const INITIAL_INSTANCES: usize = 4096;

pub struct RectPipeline {
    pipeline: RenderPipeline,
    instances: InstanceBuffer<RectInstance>,
}

impl RectPipeline {
    pub fn new(device: &Device, surface_format: TextureFormat, camera: &Camera) -> Self {
        // ── Shader ──────────────────────────────────────────────
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("rect_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/rect.wgsl").into()),
        });

        // ── Pipeline layout ─────────────────────────────────────
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("rect_pipeline_layout"),
            bind_group_layouts: &[camera.layout()],
            push_constant_ranges: &[],
        });

        // ── Render pipeline ─────────────────────────────────────
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("rect_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[QuadVertex::layout(), RectInstance::layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
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

        Self {
            pipeline,
            instances: InstanceBuffer::new(device, "rect_instances", INITIAL_INSTANCES),
        }
    }

    /// Upload every fill of the frame.
    pub fn upload(&mut self, device: &Device, queue: &Queue, instances: &[RectInstance]) {
        self.instances.upload(device, queue, instances);
    }

    /// Draw a run of uploaded instances.
    pub fn draw(&self, pass: &mut RenderPass<'_>, camera: &Camera, quad: &QuadGeometry, range: Range<u32>) {
        if range.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera.bind_group(), &[]);
        quad.bind(pass);
        pass.set_vertex_buffer(1, self.instances.buffer().slice(..));
        pass.draw_indexed(0..QuadVertex::INDICES.len() as u32, 0, range);
    }

    /// Number of instances uploaded for the current frame.
    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }
}
