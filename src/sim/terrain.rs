//! Terrain height field
//!
//! A stateless function from world (x, local z) to ground elevation. The same
//! function bakes the ground segment meshes and answers physics queries, so
//! what the player sees is what the player rides on.
//!
//! The z terms are periodic with the segment length, so adjacent recycled
//! segments always meet without a seam.

use std::f32::consts::TAU;

use crate::tuning::TerrainTuning;

/// Parameters of the height field for one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightField {
    /// z period (one ground segment)
    pub period: f32,
    pub half_width: f32,
    pub base_amplitude: f32,
    pub detail_amplitude: f32,
    pub bowl_amplitude: f32,
    pub offset: f32,
    /// Finite-difference step for slopes
    pub delta: f32,
}

impl HeightField {
    /// Build the field for a level; `aggressiveness` scales the rolling waves
    /// but never the centering bowl.
    pub fn new(tuning: &TerrainTuning, aggressiveness: f32) -> Self {
        Self {
            period: tuning.segment_length,
            half_width: tuning.half_width,
            base_amplitude: tuning.base_amplitude * aggressiveness,
            detail_amplitude: tuning.detail_amplitude * aggressiveness,
            bowl_amplitude: tuning.bowl_amplitude,
            offset: tuning.vertical_offset,
            delta: tuning.slope_delta,
        }
    }

    /// Perfectly flat ground at zero
    pub fn flat() -> Self {
        Self {
            period: 1.0,
            half_width: 1.0,
            base_amplitude: 0.0,
            detail_amplitude: 0.0,
            bowl_amplitude: 0.0,
            offset: 0.0,
            delta: 0.5,
        }
    }

    /// Ground elevation at (x, z)
    #[inline]
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let base = (x * 0.1).sin() * (z * TAU / self.period).cos() * self.base_amplitude;
        let detail = (x * 0.2 + z * 2.0 * TAU / self.period).cos() * self.detail_amplitude;
        let edge = x.abs() / self.half_width;
        let bowl = edge * edge * self.bowl_amplitude;
        base + detail + bowl - self.offset
    }

    /// Lateral slope (central difference). Positive means the ground rises toward +x.
    #[inline]
    pub fn slope_x(&self, x: f32, z: f32) -> f32 {
        let d = self.delta;
        (self.height(x + d, z) - self.height(x - d, z)) / (2.0 * d)
    }

    /// Slope along z (backward difference)
    #[inline]
    pub fn slope_z(&self, x: f32, z: f32) -> f32 {
        let d = self.delta;
        (self.height(x, z) - self.height(x, z - d)) / d
    }

    /// Height and both slopes in one call
    pub fn sample(&self, x: f32, z: f32) -> TerrainSample {
        TerrainSample {
            height: self.height(x, z),
            slope_x: self.slope_x(x, z),
            slope_z: self.slope_z(x, z),
        }
    }
}

/// Everything physics needs to know about the ground under one point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerrainSample {
    pub height: f32,
    pub slope_x: f32,
    pub slope_z: f32,
}

impl TerrainSample {
    /// Degenerate sample used when no ground segment is available
    pub const FLAT: TerrainSample = TerrainSample {
        height: 0.0,
        slope_x: 0.0,
        slope_z: 0.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field() -> HeightField {
        HeightField::new(&TerrainTuning::default(), 1.0)
    }

    #[test]
    fn test_tiles_meet_at_segment_edge() {
        let f = field();
        let a = f.height(5.0, 49.9);
        let b = f.height(5.0, -0.1);
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }

    #[test]
    fn test_bowl_pulls_toward_center() {
        let f = field();
        // Far from center the bowl dominates the waves
        assert!(f.slope_x(15.0, 0.0) > 0.0);
        assert!(f.slope_x(-15.0, 0.0) < 0.0);
    }

    #[test]
    fn test_flat_field_is_flat() {
        let f = HeightField::flat();
        assert_eq!(f.sample(3.0, 7.0), TerrainSample::FLAT);
    }

    #[test]
    fn test_aggressiveness_scales_waves_only() {
        let tuning = TerrainTuning::default();
        let calm = HeightField::new(&tuning, 1.0);
        let rough = HeightField::new(&tuning, 2.0);
        assert_eq!(calm.bowl_amplitude, rough.bowl_amplitude);
        assert_eq!(rough.base_amplitude, calm.base_amplitude * 2.0);
    }

    proptest! {
        #[test]
        fn prop_height_is_periodic_in_z(x in -30.0f32..30.0, z in -200.0f32..200.0) {
            let f = field();
            let a = f.height(x, z);
            let b = f.height(x, z + f.period);
            prop_assert!((a - b).abs() < 1e-2, "h({x},{z})={a} but one period later {b}");
        }

        #[test]
        fn prop_height_is_finite(x in -1.0e4f32..1.0e4, z in -1.0e4f32..1.0e4) {
            prop_assert!(field().height(x, z).is_finite());
        }
    }
}
