//! Chase camera
//!
//! Sits behind and above the skier, looking down the slope, and eases toward
//! the skier's position instead of snapping.

use glam::{Mat4, Vec3};

/// Camera offset from the skier
const EYE_OFFSET: Vec3 = Vec3::new(0.0, 4.0, 8.0);
/// Look-at point relative to the skier
const TARGET_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -10.0);
/// Fraction of the gap closed per step
const FOLLOW_RATE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
}

impl Camera {
    pub fn looking_at(subject: Vec3) -> Self {
        Self {
            eye: subject + EYE_OFFSET,
            target: subject + TARGET_OFFSET,
            fov_y: 60f32.to_radians(),
        }
    }

    /// Ease toward the skier; only x and y follow, depth is fixed
    pub fn follow(&mut self, subject: Vec3) {
        let eye = subject + EYE_OFFSET;
        let target = subject + TARGET_OFFSET;
        self.eye.x += (eye.x - self.eye.x) * FOLLOW_RATE;
        self.eye.y += (eye.y - self.eye.y) * FOLLOW_RATE;
        self.eye.z = eye.z;
        self.target.x += (target.x - self.target.x) * FOLLOW_RATE;
        self.target.y += (target.y - self.target.y) * FOLLOW_RATE;
        self.target.z = target.z;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, aspect.max(0.01), 0.1, 300.0);
        proj * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_converges() {
        let mut cam = Camera::looking_at(Vec3::ZERO);
        let subject = Vec3::new(6.0, -2.0, 0.0);
        for _ in 0..200 {
            cam.follow(subject);
        }
        assert!((cam.eye - (subject + EYE_OFFSET)).length() < 1e-3);
    }

    #[test]
    fn test_follow_is_smoothed() {
        let mut cam = Camera::looking_at(Vec3::ZERO);
        cam.follow(Vec3::new(10.0, 0.0, 0.0));
        assert!(cam.eye.x > 0.0 && cam.eye.x < 10.0);
    }

    #[test]
    fn test_subject_in_front_of_camera() {
        let cam = Camera::looking_at(Vec3::ZERO);
        let clip = cam.view_proj(16.0 / 9.0) * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
    }
}
