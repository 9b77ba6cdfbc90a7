//! Vertex type for the slope scene

use bytemuck::{Pod, Zeroable};

/// World-space vertex. `uv.z` blends from flat color (0) to the sprite
/// texture modulated by color (1).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn flat(position: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            uv: [0.0, 0.0, 0.0],
            color,
        }
    }

    pub const fn textured(position: [f32; 3], u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position,
            uv: [u, v, 1.0],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const SKY: [f32; 4] = [0.62, 0.80, 0.95, 1.0];
    pub const SNOW_LIGHT: [f32; 4] = [0.97, 0.98, 1.0, 1.0];
    pub const SNOW_SHADE: [f32; 4] = [0.70, 0.78, 0.90, 1.0];
    pub const TREE: [f32; 4] = [0.13, 0.45, 0.22, 1.0];
    pub const TRUNK: [f32; 4] = [0.40, 0.26, 0.13, 1.0];
    pub const ROCK: [f32; 4] = [0.45, 0.45, 0.50, 1.0];
    pub const RAMP: [f32; 4] = [0.30, 0.65, 0.95, 1.0];
    pub const BANANA: [f32; 4] = [1.0, 0.88, 0.20, 1.0];
    pub const MANGO: [f32; 4] = [1.0, 0.55, 0.10, 1.0];
    pub const PIZZA: [f32; 4] = [0.90, 0.25, 0.15, 1.0];
    pub const SPAGHETTI: [f32; 4] = [0.95, 0.80, 0.55, 1.0];
    pub const SKIER: [f32; 4] = [0.85, 0.15, 0.30, 1.0];
    pub const SKIS: [f32; 4] = [0.10, 0.10, 0.15, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Tint over the skier while invincible
    pub const INVINCIBLE: [f32; 4] = [1.0, 0.95, 0.55, 1.0];
}
