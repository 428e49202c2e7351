//! wgpu implementation of [`RenderBackend`].
//!
//! Draws are recorded as commands during the frame and flushed at
//! `present()`: all fill instances go into one buffer and all tile
//! instances into another, then consecutive commands of the same kind
//! (and, for tiles, the same texture) become one instanced draw call.
//! Recording order is preserved.

use std::collections::HashMap;
use std::ops::Range;

use log::{debug, warn};
use tilesmith_raster::AtlasSurface;
use wgpu::{
    Color, CommandEncoderDescriptor, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureView, TextureViewDescriptor,
};

use crate::backend::{BackendError, PixelRect, RenderBackend, TextureFilter, TextureId};
use crate::context::GpuContext;
use crate::pipelines::rect::RectPipeline;
use crate::pipelines::tile::{TilePipeline, TileTexture};
use crate::pipelines::{Camera, QuadGeometry};
use crate::vertex::{CameraUniform, RectInstance, TileInstance};

/// One recorded draw.
#[derive(Clone, Copy, Debug, PartialEq)]
enum DrawCommand {
    Fill(RectInstance),
    Tile(TextureId, TileInstance),
}

/// A contiguous range of instances drawn with one call.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Run {
    Fills(Range<u32>),
    Tiles(TextureId, Range<u32>),
}

/// Commands split into instance arrays plus the draw runs over them.
#[derive(Debug, Default)]
struct Batches {
    fills: Vec<RectInstance>,
    tiles: Vec<TileInstance>,
    runs: Vec<Run>,
}

fn batch(commands: &[DrawCommand]) -> Batches {
    let mut out = Batches::default();
    for command in commands {
        match *command {
            DrawCommand::Fill(instance) => {
                let at = out.fills.len() as u32;
                out.fills.push(instance);
                if let Some(Run::Fills(range)) = out.runs.last_mut() {
                    range.end = at + 1;
                    continue;
                }
                out.runs.push(Run::Fills(at..at + 1));
            }
            DrawCommand::Tile(id, instance) => {
                let at = out.tiles.len() as u32;
                out.tiles.push(instance);
                if let Some(Run::Tiles(last, range)) = out.runs.last_mut() {
                    if *last == id {
                        range.end = at + 1;
                        continue;
                    }
                }
                out.runs.push(Run::Tiles(id, at..at + 1));
            }
        }
    }
    out
}

/// Statistics of one flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub fills: u32,
    pub tiles: u32,
    pub draw_calls: u32,
}

/// Renders through a [`GpuContext`], to its window surface or to any
/// texture view.
pub struct GpuBackend {
    gpu: GpuContext,
    camera: Camera,
    quad: QuadGeometry,
    rects: RectPipeline,
    tiles: TilePipeline,
    textures: HashMap<TextureId, TileTexture>,
    next_id: u32,
    clear_color: Color,
    commands: Vec<DrawCommand>,
    viewport: (u32, u32),
}

impl GpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let camera = Camera::new(&gpu.device);
        let quad = QuadGeometry::new(&gpu.device);
        let rects = RectPipeline::new(&gpu.device, gpu.surface_format, &camera);
        let tiles = TilePipeline::new(&gpu.device, gpu.surface_format, &camera);
        let viewport = gpu.surface_size();
        Self {
            gpu,
            camera,
            quad,
            rects,
            tiles,
            textures: HashMap::new(),
            next_id: 0,
            clear_color: Color::BLACK,
            commands: Vec::new(),
            viewport,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Resize the window surface and the projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.viewport = (width, height);
    }

    /// Set the projection size without touching a surface (headless).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Draws recorded since the last flush.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Flush the recorded frame into `target`.
    pub fn render_to_texture(&mut self, target: &TextureView) -> FlushStats {
        self.flush(target)
    }

    fn flush(&mut self, target: &TextureView) -> FlushStats {
        let commands = std::mem::take(&mut self.commands);
        let batches = batch(&commands);

        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        self.camera.upload(
            queue,
            &CameraUniform::for_viewport(self.viewport.0 as f32, self.viewport.1 as f32),
        );
        self.rects.upload(device, queue, &batches.fills);
        self.tiles.upload(device, queue, &batches.tiles);

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("tilesmith_frame_encoder"),
        });
        let mut draw_calls = 0;
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("tilesmith_frame_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for run in &batches.runs {
                match run {
                    Run::Fills(range) => {
                        self.rects.draw(&mut pass, &self.camera, &self.quad, range.clone());
                    }
                    Run::Tiles(id, range) => {
                        // Texture destroyed mid-frame: drop its draws.
                        let Some(texture) = self.textures.get(id) else {
                            continue;
                        };
                        self.tiles
                            .draw(&mut pass, &self.camera, &self.quad, texture, range.clone());
                    }
                }
                draw_calls += 1;
            }
        }
        queue.submit(std::iter::once(encoder.finish()));

        FlushStats {
            fills: batches.fills.len() as u32,
            tiles: batches.tiles.len() as u32,
            draw_calls,
        }
    }
}

impl RenderBackend for GpuBackend {
    fn create_texture(
        &mut self,
        surface: &AtlasSurface,
        filter: TextureFilter,
    ) -> Result<TextureId, BackendError> {
        let (width, height) = (surface.width() as u32, surface.height() as u32);
        let max = self.gpu.max_texture_size();
        if width > max || height > max {
            return Err(BackendError::TextureCreation {
                width,
                height,
                reason: format!("device limit is {max}"),
            });
        }

        let texture = self.tiles.create_texture(
            &self.gpu.device,
            &self.gpu.queue,
            surface.pixels(),
            width,
            height,
            filter,
        );
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.textures.insert(id, texture);
        debug!("Uploaded {width}×{height} tile texture {id:?} ({filter:?})");
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
    }

    fn set_texture_tint(&mut self, id: TextureId, rgb: [u8; 3]) -> Result<(), BackendError> {
        let texture = self
            .textures
            .get_mut(&id)
            .ok_or(BackendError::UnknownTexture(id))?;
        texture.tint = rgb;
        Ok(())
    }

    fn clear(&mut self, rgb: [u8; 3]) {
        self.commands.clear();
        self.clear_color = Color {
            r: rgb[0] as f64 / 255.0,
            g: rgb[1] as f64 / 255.0,
            b: rgb[2] as f64 / 255.0,
            a: 1.0,
        };
    }

    fn fill_rect(&mut self, rect: PixelRect, rgb: [u8; 3]) {
        if !rect.is_empty() {
            self.commands.push(DrawCommand::Fill(RectInstance::new(rect, rgb)));
        }
    }

    fn draw_texture(
        &mut self,
        id: TextureId,
        src: PixelRect,
        dest: PixelRect,
    ) -> Result<(), BackendError> {
        let texture = self.textures.get(&id).ok_or(BackendError::UnknownTexture(id))?;
        if !dest.is_empty() {
            let instance =
                TileInstance::new(src, dest, (texture.width, texture.height), texture.tint);
            self.commands.push(DrawCommand::Tile(id, instance));
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        let Some(surface) = self.gpu.surface.as_ref() else {
            self.commands.clear();
            return Err(BackendError::Present("no surface (headless context)".into()));
        };
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                let (w, h) = self.viewport;
                self.gpu.resize(w, h);
                self.commands.clear();
                return Ok(());
            }
            Err(e) => {
                self.commands.clear();
                return Err(BackendError::Present(e.to_string()));
            }
        };
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        self.flush(&view);
        frame.present();
        Ok(())
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(x: i32) -> DrawCommand {
        DrawCommand::Fill(RectInstance::new(PixelRect::new(x, 0, 1, 1), [1, 2, 3]))
    }

    fn tile(id: u32, x: i32) -> DrawCommand {
        let r = PixelRect::new(x, 0, 1, 1);
        DrawCommand::Tile(TextureId(id), TileInstance::new(r, r, (16, 16), [9, 9, 9]))
    }

    #[test]
    fn test_batch_merges_runs() {
        let b = batch(&[fill(0), fill(1), tile(1, 0), tile(1, 1), tile(2, 0), tile(1, 2), fill(2)]);
        assert_eq!(b.fills.len(), 3);
        assert_eq!(b.tiles.len(), 4);
        assert_eq!(
            b.runs,
            vec![
                Run::Fills(0..2),
                Run::Tiles(TextureId(1), 0..2),
                Run::Tiles(TextureId(2), 2..3),
                Run::Tiles(TextureId(1), 3..4),
                Run::Fills(2..3),
            ]
        );
    }

    #[test]
    fn test_batch_empty() {
        let b = batch(&[]);
        assert!(b.runs.is_empty());
        assert!(b.fills.is_empty() && b.tiles.is_empty());
    }

    #[test]
    fn test_headless_backend_records_and_flushes() {
        use tilesmith_raster::TileSize;

        // Skipped when no adapter is available.
        let Ok(gpu) = pollster::block_on(GpuContext::new_headless()) else {
            return;
        };
        let mut backend = GpuBackend::new(gpu);
        backend.set_viewport(64, 64);

        let surface = AtlasSurface::new(TileSize::new(2, 2)).unwrap();
        let id = backend.create_texture(&surface, TextureFilter::Nearest).unwrap();
        assert_eq!(backend.texture_count(), 1);

        backend.clear([0, 0, 0]);
        backend.fill_rect(PixelRect::new(0, 0, 8, 8), [255, 0, 0]);
        backend.fill_rect(PixelRect::new(8, 0, 0, 8), [255, 0, 0]);
        backend.set_texture_tint(id, [0, 255, 0]).unwrap();
        backend
            .draw_texture(id, PixelRect::new(0, 0, 2, 2), PixelRect::new(0, 0, 8, 8))
            .unwrap();
        assert_eq!(backend.pending_commands(), 2);
        assert!(matches!(
            backend.draw_texture(TextureId(99), PixelRect::default(), PixelRect::default()),
            Err(BackendError::UnknownTexture(TextureId(99)))
        ));

        let target = backend.gpu().device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test_target"),
            size: wgpu::Extent3d {
                width: 64,
                height: 64,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: backend.gpu().surface_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&TextureViewDescriptor::default());
        let stats = backend.render_to_texture(&view);
        assert_eq!(stats, FlushStats { fills: 1, tiles: 1, draw_calls: 2 });
        assert_eq!(backend.pending_commands(), 0);

        assert!(backend.present().is_err());
        backend.destroy_texture(id);
        assert_eq!(backend.texture_count(), 0);
    }
}
