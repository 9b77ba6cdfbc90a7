//! Player controller
//!
//! Owns where the skier is and how input moves them. Lateral steering writes a
//! clamped target, the visible position chases it, and vertical motion is a
//! two-state machine (grounded / airborne). All rates are per simulation step;
//! invincibility runs on wall-clock deadlines so it expires on time whatever
//! the frame rate.

use glam::Vec3;

use super::terrain::TerrainSample;
use crate::tuning::{Difficulty, PlayerTuning};

/// Sprite frame, matching a 4-tile horizontal sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Front,
    #[default]
    Back,
    BackLeft,
    BackRight,
}

impl Facing {
    /// Horizontal texture offset of this frame within the sheet
    pub fn uv_offset(self) -> f32 {
        match self {
            Facing::Front => 0.0,
            Facing::Back => 0.25,
            Facing::BackLeft => 0.5,
            Facing::BackRight => 0.75,
        }
    }

    fn from_direction(direction: i8) -> Self {
        match direction.signum() {
            -1 => Facing::BackLeft,
            1 => Facing::BackRight,
            _ => Facing::Back,
        }
    }
}

/// Things the controller reports back to the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Landed,
    DirectionChanged,
    InvincibilityExpired,
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Steering target, clamped to the play width
    pub lateral: f32,
    /// Smoothed x actually drawn and used for collisions
    pub render_x: f32,
    pub y: f32,
    pub vertical_velocity: f32,
    pub airborne: bool,
    pub invincible: bool,
    invincible_since_ms: f64,
    invincible_until_ms: Option<f64>,
    /// Current forward speed (world units per step)
    pub speed: f32,
    /// Permanent speed gained from ramps this level
    pub speed_bonus: f32,
    /// Last effective steering direction
    pub move_direction: i8,
    pub facing: Facing,
    /// Forward lean in radians
    pub tilt: f32,
    /// Squash/stretch amount, 1 right after an impact, decays to 0
    pub squash: f32,
    /// Steps left facing the camera after a crash
    pub crash_recovery: u32,
    /// Blink state while invincible
    pub visible: bool,
}

impl Player {
    pub fn new(ground_y: f32, difficulty: &Difficulty) -> Self {
        Self {
            lateral: 0.0,
            render_x: 0.0,
            y: ground_y,
            vertical_velocity: 0.0,
            airborne: false,
            invincible: false,
            invincible_since_ms: 0.0,
            invincible_until_ms: None,
            speed: difficulty.speed_baseline,
            speed_bonus: 0.0,
            move_direction: 0,
            facing: Facing::Back,
            tilt: 0.0,
            squash: 0.0,
            crash_recovery: 0,
            visible: true,
        }
    }

    /// Apply steering input. `drag` (pixels) wins over the held direction
    /// when present. Returns true when the effective direction changed.
    pub fn steer(&mut self, move_direction: i8, drag: f32, tuning: &PlayerTuning) -> bool {
        let direction = if drag != 0.0 {
            self.lateral += drag * tuning.drag_sensitivity;
            if drag > 0.0 { 1 } else { -1 }
        } else {
            let direction = move_direction.signum();
            self.lateral += direction as f32 * tuning.steer_speed;
            direction
        };
        self.clamp_lateral(tuning);

        let changed = direction != self.move_direction;
        self.move_direction = direction;
        changed
    }

    fn clamp_lateral(&mut self, tuning: &PlayerTuning) {
        self.lateral = self.lateral.clamp(-tuning.play_width, tuning.play_width);
    }

    /// One physics step against the ground under the player
    pub fn update(
        &mut self,
        ground: TerrainSample,
        difficulty: &Difficulty,
        tuning: &PlayerTuning,
    ) -> Option<PlayerEvent> {
        // Steeper lateral slopes push the skier downhill sideways
        self.lateral -= ground.slope_x * tuning.drift_coefficient;
        self.clamp_lateral(tuning);
        self.render_x += (self.lateral - self.render_x) * tuning.lateral_convergence;

        let ground_y = ground.height + tuning.ride_height;
        let mut event = None;
        if self.airborne {
            self.vertical_velocity -= tuning.gravity;
            self.y += self.vertical_velocity;
            self.tilt = (self.tilt + tuning.air_tilt_rate).min(tuning.max_air_tilt);
            if self.y <= ground_y {
                self.land(ground_y);
                event = Some(PlayerEvent::Landed);
            }
        } else {
            self.y += (ground_y - self.y) * tuning.ground_smoothing;
            self.tilt *= 0.9;
        }

        let target = (difficulty.speed_baseline
            + self.speed_bonus
            + ground.slope_z * tuning.downhill_factor)
            .clamp(tuning.min_speed, tuning.max_speed);
        self.speed += (target - self.speed) * tuning.speed_smoothing;

        self.squash = (self.squash - 0.1).max(0.0);
        self.crash_recovery = self.crash_recovery.saturating_sub(1);
        self.facing = if self.crash_recovery > 0 {
            Facing::Front
        } else {
            Facing::from_direction(self.move_direction)
        };

        event
    }

    fn land(&mut self, ground_y: f32) {
        self.y = ground_y;
        self.vertical_velocity = 0.0;
        self.airborne = false;
        self.squash = 1.0;
    }

    /// Leave the ground. Ignored while already airborne.
    pub fn launch(&mut self, tuning: &PlayerTuning) -> bool {
        if self.airborne {
            return false;
        }
        self.airborne = true;
        self.vertical_velocity = tuning.launch_velocity;
        self.speed += tuning.ramp_speed_boost;
        self.speed_bonus += tuning.ramp_speed_boost;
        true
    }

    /// Obstacle impact: near stop, then relax back up to speed
    pub fn crash(&mut self, tuning: &PlayerTuning) {
        self.speed = tuning.crash_speed;
        self.crash_recovery = tuning.crash_recovery_steps;
        self.squash = 1.0;
    }

    /// Negative feedback squash (pizza)
    pub fn flinch(&mut self) {
        self.squash = 1.0;
    }

    /// Start (or extend) invincibility, expiring `duration_ms` after `now_ms`
    pub fn grant_invincibility(&mut self, now_ms: f64, duration_ms: f64) {
        if !self.invincible {
            self.invincible_since_ms = now_ms;
        }
        self.invincible = true;
        self.invincible_until_ms = Some(now_ms + duration_ms);
    }

    /// Wall-clock deadline of the current invincibility, if any
    pub fn invincible_until(&self) -> Option<f64> {
        self.invincible_until_ms
    }

    /// Expire invincibility and drive the blink. Independent of step count.
    pub fn poll_timers(&mut self, now_ms: f64, blink_interval_ms: f64) -> Option<PlayerEvent> {
        let Some(until) = self.invincible_until_ms else {
            self.visible = true;
            return None;
        };

        if now_ms >= until {
            self.invincible = false;
            self.invincible_until_ms = None;
            self.visible = true;
            return Some(PlayerEvent::InvincibilityExpired);
        }

        let blink = blink_interval_ms.max(1.0);
        let phase = ((now_ms - self.invincible_since_ms) / blink).floor() as i64;
        self.visible = phase % 2 == 0;
        None
    }

    /// Position used for rendering and collision checks
    pub fn position(&self, z: f32) -> Vec3 {
        Vec3::new(self.render_x, self.y, z)
    }

    /// Non-uniform scale for the squash/stretch effect
    pub fn scale(&self) -> Vec3 {
        let s = self.squash * 0.3;
        Vec3::new(1.0 + s, 1.0 - s, 1.0 + s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn setup() -> (Player, Difficulty, PlayerTuning) {
        let tuning = Tuning::default();
        let difficulty = tuning.difficulty(1);
        (Player::new(0.0, &difficulty), difficulty, tuning.player)
    }

    fn flat() -> TerrainSample {
        TerrainSample::FLAT
    }

    #[test]
    fn test_steering_is_smoothed() {
        let (mut p, d, t) = setup();
        p.steer(1, 0.0, &t);
        p.update(flat(), &d, &t);
        assert!(p.lateral > 0.0);
        assert!(p.render_x > 0.0 && p.render_x < p.lateral);
    }

    #[test]
    fn test_lateral_clamped_at_edge() {
        let (mut p, d, t) = setup();
        for _ in 0..500 {
            p.steer(-1, 0.0, &t);
            p.update(flat(), &d, &t);
        }
        assert_eq!(p.lateral, -t.play_width);
        assert!(p.render_x >= -t.play_width);
    }

    #[test]
    fn test_drag_overrides_keys() {
        let (mut p, _, t) = setup();
        let changed = p.steer(-1, 100.0, &t);
        assert!(changed);
        assert_eq!(p.move_direction, 1);
        assert!((p.lateral - 100.0 * t.drag_sensitivity).abs() < 1e-6);
    }

    #[test]
    fn test_direction_change_reported_once() {
        let (mut p, _, t) = setup();
        assert!(p.steer(1, 0.0, &t));
        assert!(!p.steer(1, 0.0, &t));
        assert!(p.steer(0, 0.0, &t));
    }

    #[test]
    fn test_facing_follows_direction() {
        let (mut p, d, t) = setup();
        p.steer(-1, 0.0, &t);
        p.update(flat(), &d, &t);
        assert_eq!(p.facing, Facing::BackLeft);
        p.steer(1, 0.0, &t);
        p.update(flat(), &d, &t);
        assert_eq!(p.facing, Facing::BackRight);
        p.steer(0, 0.0, &t);
        p.update(flat(), &d, &t);
        assert_eq!(p.facing, Facing::Back);
        assert_eq!(Facing::BackRight.uv_offset(), 0.75);
    }

    #[test]
    fn test_slope_drifts_downhill() {
        let (mut p, d, t) = setup();
        let tilted = TerrainSample {
            height: 0.0,
            slope_x: 0.5,
            slope_z: 0.0,
        };
        p.update(tilted, &d, &t);
        assert!(p.lateral < 0.0);
    }

    #[test]
    fn test_jump_round_trip() {
        let (mut p, d, t) = setup();
        assert!(p.launch(&t));
        assert!(p.airborne);
        assert!(!p.launch(&t), "cannot launch twice");

        let mut steps = 0;
        let mut landed = false;
        while steps < 200 {
            let event = p.update(flat(), &d, &t);
            steps += 1;
            if event == Some(PlayerEvent::Landed) {
                landed = true;
                break;
            }
            assert!(p.airborne);
            assert!(p.y > 0.0);
        }
        assert!(landed);
        assert!(!p.airborne);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.vertical_velocity, 0.0);
        assert!(p.squash > 0.0);
        // 2 * launch / gravity, give or take a step
        let expected = (2.0 * t.launch_velocity / t.gravity).ceil() as i32;
        assert!((steps - expected).abs() <= 1, "landed after {steps} steps");
    }

    #[test]
    fn test_crash_then_reaccelerate() {
        let (mut p, d, t) = setup();
        p.crash(&t);
        assert_eq!(p.speed, t.crash_speed);
        assert_eq!(p.crash_recovery, t.crash_recovery_steps);
        for _ in 0..400 {
            p.update(flat(), &d, &t);
        }
        assert!(p.speed > d.speed_baseline * 0.95);
        assert_eq!(p.facing, Facing::Back);
    }

    #[test]
    fn test_crash_faces_camera() {
        let (mut p, d, t) = setup();
        p.crash(&t);
        p.update(flat(), &d, &t);
        assert_eq!(p.facing, Facing::Front);
    }

    #[test]
    fn test_ramp_boost_is_permanent() {
        let (mut p, d, t) = setup();
        p.speed = 0.15;
        p.launch(&t);
        assert!((p.speed - 0.18).abs() < 1e-6);
        for _ in 0..1000 {
            p.update(flat(), &d, &t);
        }
        assert!((p.speed - (d.speed_baseline + t.ramp_speed_boost)).abs() < 1e-3);
    }

    #[test]
    fn test_speed_never_targets_below_floor() {
        let (mut p, d, t) = setup();
        let uphill = TerrainSample {
            height: 0.0,
            slope_x: 0.0,
            slope_z: -100.0,
        };
        for _ in 0..2000 {
            p.update(uphill, &d, &t);
        }
        assert!(p.speed >= t.min_speed * 0.99);
    }

    #[test]
    fn test_invincibility_expires_on_wall_clock() {
        let (mut p, _, _) = setup();
        p.grant_invincibility(1_000.0, 5_000.0);
        assert!(p.invincible);
        assert_eq!(p.poll_timers(5_999.0, 100.0), None);
        assert!(p.invincible);
        assert_eq!(p.poll_timers(6_000.0, 100.0), Some(PlayerEvent::InvincibilityExpired));
        assert!(!p.invincible);
        assert!(p.visible);
    }

    #[test]
    fn test_invincibility_blinks() {
        let (mut p, _, _) = setup();
        p.grant_invincibility(0.0, 5_000.0);
        p.poll_timers(50.0, 100.0);
        assert!(p.visible);
        p.poll_timers(150.0, 100.0);
        assert!(!p.visible);
        p.poll_timers(250.0, 100.0);
        assert!(p.visible);
    }

    proptest! {
        #[test]
        fn prop_lateral_stays_in_bounds(
            inputs in proptest::collection::vec((-1i8..=1, -400.0f32..400.0, -3.0f32..3.0), 0..300)
        ) {
            let (mut p, d, t) = setup();
            for (direction, drag, slope_x) in inputs {
                let drag = if drag.abs() < 200.0 { 0.0 } else { drag };
                p.steer(direction, drag, &t);
                p.update(TerrainSample { height: 0.0, slope_x, slope_z: 0.0 }, &d, &t);
                prop_assert!(p.lateral >= -t.play_width && p.lateral <= t.play_width);
            }
        }
    }
}
