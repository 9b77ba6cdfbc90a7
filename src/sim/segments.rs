//! Ground segment recycler
//!
//! A fixed ring of terrain tiles scrolls toward the camera. When a tile has
//! fully passed the player it jumps to the back of the ring, so a handful of
//! meshes look like an endless slope.

use glam::Vec3;

use super::terrain::{HeightField, TerrainSample};
use crate::tuning::TerrainTuning;

/// Grid resolution of a baked segment mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshResolution {
    /// Vertices across x
    pub cols: usize,
    /// Vertices along z
    pub rows: usize,
}

impl Default for MeshResolution {
    fn default() -> Self {
        Self { cols: 31, rows: 26 }
    }
}

/// Height-mapped grid in segment-local coordinates. Heights are baked once
/// and never recomputed per frame.
#[derive(Debug, Clone)]
pub struct SegmentMesh {
    pub resolution: MeshResolution,
    pub width: f32,
    pub length: f32,
    /// Row-major (row = z, col = x)
    heights: Vec<f32>,
}

impl SegmentMesh {
    fn new(resolution: MeshResolution, width: f32, length: f32) -> Self {
        let resolution = MeshResolution {
            cols: resolution.cols.max(2),
            rows: resolution.rows.max(2),
        };
        Self {
            resolution,
            width,
            length,
            heights: vec![0.0; resolution.cols * resolution.rows],
        }
    }

    /// Local (x, z) of a grid vertex; z runs from -length/2 to +length/2
    pub fn grid_point(&self, col: usize, row: usize) -> (f32, f32) {
        let fx = col as f32 / (self.resolution.cols - 1) as f32;
        let fz = row as f32 / (self.resolution.rows - 1) as f32;
        (
            -self.width / 2.0 + fx * self.width,
            -self.length / 2.0 + fz * self.length,
        )
    }

    fn bake(&mut self, field: &HeightField) {
        for row in 0..self.resolution.rows {
            for col in 0..self.resolution.cols {
                let (x, z) = self.grid_point(col, row);
                self.heights[row * self.resolution.cols + col] = field.height(x, z);
            }
        }
    }

    /// Local-space vertex position
    pub fn vertex(&self, col: usize, row: usize) -> Vec3 {
        let (x, z) = self.grid_point(col, row);
        Vec3::new(x, self.heights[row * self.resolution.cols + col], z)
    }
}

/// One renderable terrain tile
#[derive(Debug, Clone)]
pub struct GroundSegment {
    pub index: usize,
    /// World-space depth of the tile center
    pub z_position: f32,
    pub mesh: SegmentMesh,
}

impl GroundSegment {
    /// Convert a world z into this tile's local z
    #[inline]
    pub fn local_z(&self, world_z: f32) -> f32 {
        world_z - self.z_position
    }
}

/// Owns the ring of ground segments
#[derive(Debug, Clone)]
pub struct GroundRecycler {
    segments: Vec<GroundSegment>,
    segment_length: f32,
    field: HeightField,
}

impl GroundRecycler {
    /// Lay out `segment_count` tiles back to back, ahead of the player
    pub fn new(tuning: &TerrainTuning, field: HeightField, resolution: MeshResolution) -> Self {
        let segments = (0..tuning.segment_count)
            .map(|index| {
                let mut mesh =
                    SegmentMesh::new(resolution, tuning.segment_width, tuning.segment_length);
                mesh.bake(&field);
                GroundSegment {
                    index,
                    z_position: -(index as f32) * tuning.segment_length,
                    mesh,
                }
            })
            .collect();

        Self {
            segments,
            segment_length: tuning.segment_length,
            field,
        }
    }

    pub fn segments(&self) -> &[GroundSegment] {
        &self.segments
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    /// Total length covered by the ring
    pub fn span(&self) -> f32 {
        self.segment_length * self.segments.len() as f32
    }

    /// Scroll every tile toward the camera, wrapping passed tiles to the back
    pub fn advance(&mut self, speed: f32) {
        let span = self.span();
        for segment in &mut self.segments {
            segment.z_position += speed;
            while segment.z_position > self.segment_length {
                segment.z_position -= span;
            }
        }
    }

    /// Re-bake every tile in place for a new height field (level start)
    pub fn rebake(&mut self, field: HeightField) {
        self.field = field;
        for segment in &mut self.segments {
            segment.mesh.bake(&field);
        }
    }

    /// Segment whose center is nearest to `world_z`
    pub fn active_segment(&self, world_z: f32) -> Option<&GroundSegment> {
        self.segments.iter().min_by(|a, b| {
            let da = (a.z_position - world_z).abs();
            let db = (b.z_position - world_z).abs();
            da.total_cmp(&db)
        })
    }

    /// Ground under (x, world z); flat when the ring is empty
    pub fn sample(&self, x: f32, world_z: f32) -> TerrainSample {
        match self.active_segment(world_z) {
            Some(segment) => self.field.sample(x, segment.local_z(world_z)),
            None => TerrainSample::FLAT,
        }
    }

    /// Ground height only
    pub fn height_at(&self, x: f32, world_z: f32) -> f32 {
        self.sample(x, world_z).height
    }
}
