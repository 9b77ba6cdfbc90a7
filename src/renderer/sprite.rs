//! Skier sprite sheet
//!
//! Four equal frames laid out left to right: front, back, back-left,
//! back-right. The sheet arrives asynchronously; until then (or if it never
//! loads) the renderer draws a flat placeholder skier.

use thiserror::Error;

use crate::sim::Facing;

pub const FRAME_COUNT: u32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpriteError {
    #[error("sprite sheet is empty")]
    Empty,
    #[error("sprite width {0} is not divisible into {FRAME_COUNT} frames")]
    UnevenFrames(u32),
    #[error("expected {expected} bytes of RGBA8 data, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("sprite sheet {width}x{height} exceeds the {limit}px texture limit")]
    TooLarge { width: u32, height: u32, limit: u32 },
}

/// Decoded RGBA8 pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheet {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteSheet {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, SpriteError> {
        if width == 0 || height == 0 {
            return Err(SpriteError::Empty);
        }
        if width % FRAME_COUNT != 0 {
            return Err(SpriteError::UnevenFrames(width));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(SpriteError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Check the sheet fits a texture of at most `limit` pixels per side
    pub fn fits(&self, limit: u32) -> Result<(), SpriteError> {
        if self.width > limit || self.height > limit {
            return Err(SpriteError::TooLarge {
                width: self.width,
                height: self.height,
                limit,
            });
        }
        Ok(())
    }

    /// Width over height of one frame
    pub fn frame_aspect(&self) -> f32 {
        (self.width / FRAME_COUNT) as f32 / self.height as f32
    }
}

/// Horizontal texture range of a frame
pub fn frame_uv(facing: Facing) -> (f32, f32) {
    let u0 = facing.uv_offset();
    (u0, u0 + 1.0 / FRAME_COUNT as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_four_frame_sheet() {
        let sheet = SpriteSheet::new(8, 2, vec![255; 8 * 2 * 4]).unwrap();
        assert_eq!(sheet.frame_aspect(), 1.0);
    }

    #[test]
    fn test_rejects_bad_sheets() {
        assert_eq!(SpriteSheet::new(0, 4, vec![]), Err(SpriteError::Empty));
        assert_eq!(
            SpriteSheet::new(6, 1, vec![0; 24]),
            Err(SpriteError::UnevenFrames(6))
        );
        assert_eq!(
            SpriteSheet::new(4, 1, vec![0; 3]),
            Err(SpriteError::SizeMismatch {
                expected: 16,
                actual: 3
            })
        );
    }

    #[test]
    fn test_oversized_sheet_does_not_fit() {
        // Four 1024px frames side by side
        let sheet = SpriteSheet::new(4096, 1, vec![0; 4096 * 4]).unwrap();
        assert_eq!(
            sheet.fits(2048),
            Err(SpriteError::TooLarge {
                width: 4096,
                height: 1,
                limit: 2048
            })
        );
        assert_eq!(sheet.fits(4096), Ok(()));
    }

    #[test]
    fn test_frame_ranges() {
        assert_eq!(frame_uv(Facing::Front), (0.0, 0.25));
        assert_eq!(frame_uv(Facing::BackLeft), (0.5, 0.75));
        assert_eq!(frame_uv(Facing::BackRight), (0.75, 1.0));
    }
}
