//! GPU vertex and instance data types.
//!
//! All types derive `bytemuck::Pod` + `Zeroable` for zero-copy upload
//! to GPU buffers.

use bytemuck::{Pod, Zeroable};
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::backend::PixelRect;

/// RGB bytes to a `[0, 1]` colour with full alpha.
pub fn rgb_to_color(rgb: [u8; 3]) -> [f32; 4] {
    [
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        1.0,
    ]
}

// ───────────────────────────────────────────────────────────────────
// Vertex (unit quad)
// ───────────────────────────────────────────────────────────────────

/// A single vertex of the unit quad (0,0)→(1,1).
///
/// The quad is shared by every instance; per-instance data places and
/// sizes it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    /// Position in [0, 1] space.
    pub position: [f32; 2],
}

impl QuadVertex {
    pub const VERTICES: [QuadVertex; 4] = [
        QuadVertex { position: [0.0, 0.0] }, // top-left
        QuadVertex { position: [1.0, 0.0] }, // top-right
        QuadVertex { position: [0.0, 1.0] }, // bottom-left
        QuadVertex { position: [1.0, 1.0] }, // bottom-right
    ];

    pub const INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(0) = position
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Instance data
// ───────────────────────────────────────────────────────────────────

/// A solid cell background. 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    /// Top-left corner in output pixels.
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// RGBA, each channel in [0.0, 1.0].
    pub color: [f32; 4],
}

impl RectInstance {
    pub fn new(rect: PixelRect, rgb: [u8; 3]) -> Self {
        Self {
            position: [rect.x as f32, rect.y as f32],
            size: [rect.width as f32, rect.height as f32],
            color: rgb_to_color(rgb),
        }
    }

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(1) = position
            VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
            // location(2) = size
            VertexAttribute {
                offset: 8,
                shader_location: 2,
                format: VertexFormat::Float32x2,
            },
            // location(3) = color
            VertexAttribute {
                offset: 16,
                shader_location: 3,
                format: VertexFormat::Float32x4,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: ATTRS,
        }
    }
}

/// A tinted blit of one atlas tile. 48 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TileInstance {
    /// Destination top-left in output pixels.
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// Texture UV top-left.
    pub uv_min: [f32; 2],
    /// Texture UV bottom-right.
    pub uv_max: [f32; 2],
    /// Multiplied into the texel colour.
    pub tint: [f32; 4],
}

impl TileInstance {
    /// Map `src` (texture pixels of a `texture_size` texture) onto `dest`.
    pub fn new(src: PixelRect, dest: PixelRect, texture_size: (u32, u32), tint: [u8; 3]) -> Self {
        let (tw, th) = (texture_size.0.max(1) as f32, texture_size.1.max(1) as f32);
        Self {
            position: [dest.x as f32, dest.y as f32],
            size: [dest.width as f32, dest.height as f32],
            uv_min: [src.x as f32 / tw, src.y as f32 / th],
            uv_max: [
                (src.x as f32 + src.width as f32) / tw,
                (src.y as f32 + src.height as f32) / th,
            ],
            tint: rgb_to_color(tint),
        }
    }

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(1) = position
            VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
            // location(2) = size
            VertexAttribute {
                offset: 8,
                shader_location: 2,
                format: VertexFormat::Float32x2,
            },
            // location(3) = uv_min
            VertexAttribute {
                offset: 16,
                shader_location: 3,
                format: VertexFormat::Float32x2,
            },
            // location(4) = uv_max
            VertexAttribute {
                offset: 24,
                shader_location: 4,
                format: VertexFormat::Float32x2,
            },
            // location(5) = tint
            VertexAttribute {
                offset: 32,
                shader_location: 5,
                format: VertexFormat::Float32x4,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<TileInstance>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: ATTRS,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Camera uniform
// ───────────────────────────────────────────────────────────────────

/// Pixel-space projection uploaded once per frame. 64 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// 4×4 orthographic projection matrix (column-major).
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Map (0,0) to the top-left and (width, height) to the bottom-right.
    pub fn for_viewport(width: f32, height: f32) -> Self {
        let sx = 2.0 / width.max(1.0);
        let sy = -2.0 / height.max(1.0); // flip Y for top-left origin
        Self {
            view_proj: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0, 1.0],
            ],
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn project(cam: &CameraUniform, x: f32, y: f32) -> (f32, f32) {
        let vp = cam.view_proj;
        (
            x * vp[0][0] + y * vp[1][0] + vp[3][0],
            x * vp[0][1] + y * vp[1][1] + vp[3][1],
        )
    }

    #[test]
    fn test_instance_sizes() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 8);
        assert_eq!(std::mem::size_of::<RectInstance>(), 32);
        assert_eq!(std::mem::size_of::<TileInstance>(), 48);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
    }

    #[test]
    fn test_camera_corners() {
        let cam = CameraUniform::for_viewport(800.0, 600.0);
        let (x, y) = project(&cam, 0.0, 0.0);
        assert!((x + 1.0).abs() < 1e-5 && (y - 1.0).abs() < 1e-5);
        let (x, y) = project(&cam, 800.0, 600.0);
        assert!((x - 1.0).abs() < 1e-5 && (y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tile_instance_uvs() {
        let inst = TileInstance::new(
            PixelRect::new(10, 20, 10, 20),
            PixelRect::new(100, 40, 10, 20),
            (160, 480),
            [255, 0, 0],
        );
        assert_eq!(inst.position, [100.0, 40.0]);
        assert_eq!(inst.uv_min, [10.0 / 160.0, 20.0 / 480.0]);
        assert_eq!(inst.uv_max, [20.0 / 160.0, 40.0 / 480.0]);
        assert_eq!(inst.tint, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rect_instance_color() {
        let inst = RectInstance::new(PixelRect::new(1, 2, 3, 4), [0, 255, 0]);
        assert_eq!(inst.position, [1.0, 2.0]);
        assert_eq!(inst.size, [3.0, 4.0]);
        assert_eq!(inst.color, [0.0, 1.0, 0.0, 1.0]);
    }
}
