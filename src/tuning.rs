//! Data-driven game balance
//!
//! Every gameplay constant lives here so balance changes never touch the
//! simulation code. `Tuning::default()` is the shipped table; a JSON file
//! with any subset of fields can override it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::objects::{CollectibleKind, ObjectKind, ObstacleKind};

/// Terrain height field and ground segment geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTuning {
    /// Length of one ground segment along z (also the z period of the height field)
    pub segment_length: f32,
    /// Number of recycled segments
    pub segment_count: usize,
    /// Full width of a segment mesh along x
    pub segment_width: f32,
    /// Half-width used by the bowl term
    pub half_width: f32,
    /// Amplitude of the rolling base wave
    pub base_amplitude: f32,
    /// Amplitude of the diagonal detail wave
    pub detail_amplitude: f32,
    /// Amplitude of the centering bowl
    pub bowl_amplitude: f32,
    /// Constant vertical bias subtracted from every sample
    pub vertical_offset: f32,
    /// Finite-difference step for slope sampling
    pub slope_delta: f32,
}

impl Default for TerrainTuning {
    fn default() -> Self {
        Self {
            segment_length: 50.0,
            segment_count: 5,
            segment_width: 60.0,
            half_width: 20.0,
            base_amplitude: 2.0,
            detail_amplitude: 0.5,
            bowl_amplitude: 8.0,
            vertical_offset: 2.0,
            slope_delta: 0.5,
        }
    }
}

/// Player movement, all rates are per simulation step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Lateral half-width the player may occupy
    pub play_width: f32,
    /// Lateral distance per step while a direction is held
    pub steer_speed: f32,
    /// Lateral distance per pixel of pointer drag
    pub drag_sensitivity: f32,
    /// Sideways push per unit of lateral slope
    pub drift_coefficient: f32,
    /// Fraction of the remaining lateral gap closed per step
    pub lateral_convergence: f32,
    /// Fraction of the remaining vertical gap closed per step while grounded
    pub ground_smoothing: f32,
    /// Height of the skier's origin above the terrain surface
    pub ride_height: f32,
    pub gravity: f32,
    pub launch_velocity: f32,
    /// Forward tilt gained per airborne step
    pub air_tilt_rate: f32,
    pub max_air_tilt: f32,
    /// Base forward speed before level and slope contributions
    pub base_speed: f32,
    pub level_speed_factor: f32,
    pub downhill_factor: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Fraction of the gap to the target speed closed per step
    pub speed_smoothing: f32,
    /// Speed after crashing into an obstacle
    pub crash_speed: f32,
    /// Speed added by a ramp (also raises the target for the rest of the level)
    pub ramp_speed_boost: f32,
    /// Steps the skier faces the camera after a crash
    pub crash_recovery_steps: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            play_width: 12.0,
            steer_speed: 0.25,
            drag_sensitivity: 0.02,
            drift_coefficient: 0.1,
            lateral_convergence: 0.15,
            ground_smoothing: 0.3,
            ride_height: 0.0,
            gravity: 0.015,
            launch_velocity: 0.35,
            air_tilt_rate: 0.02,
            max_air_tilt: 0.6,
            base_speed: 0.15,
            level_speed_factor: 0.02,
            downhill_factor: 0.05,
            min_speed: 0.03,
            max_speed: 1.2,
            speed_smoothing: 0.02,
            crash_speed: 0.02,
            ramp_speed_boost: 0.03,
            crash_recovery_steps: 45,
        }
    }
}

/// Hitbox and score table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub hitbox_x: f32,
    pub hitbox_z: f32,
    pub banana_points: u64,
    pub mango_points: u64,
    pub spaghetti_points: u64,
    pub pizza_penalty: u64,
    pub ramp_bonus: u64,
    pub invincibility_ms: f64,
    pub blink_interval_ms: f64,
    /// Scale applied to an obstacle smashed while invincible
    pub smashed_scale: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            hitbox_x: 1.2,
            hitbox_z: 1.5,
            banana_points: 100,
            mango_points: 500,
            spaghetti_points: 1000,
            pizza_penalty: 50,
            ramp_bonus: 200,
            invincibility_ms: 5000.0,
            blink_interval_ms: 100.0,
            smashed_scale: 0.2,
        }
    }
}

/// One row of the weighted spawn table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnWeight {
    pub kind: ObjectKind,
    pub weight: f32,
}

/// Spawn placement and cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub weights: Vec<SpawnWeight>,
    /// Depth (distance ahead of the player) where new objects appear
    pub spawn_distance: f32,
    /// Nearest depth used when pre-seeding a level
    pub preseed_near: f32,
    /// Objects are retired once they scroll this far behind the player
    pub despawn_distance: f32,
    pub initial_objects_first_level: usize,
    pub initial_objects: usize,
    /// Chance that an obstacle hugs the track edges instead of the open band
    pub obstacle_edge_bias: f32,
    /// Collectibles and ramps stay inside this fraction of the play width
    pub central_band: f32,
    /// Collectible spin per step (radians)
    pub spin_rate: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        use CollectibleKind::*;
        use ObstacleKind::*;
        let weights = vec![
            SpawnWeight { kind: ObjectKind::Obstacle(Tree), weight: 30.0 },
            SpawnWeight { kind: ObjectKind::Obstacle(Rock), weight: 18.0 },
            SpawnWeight { kind: ObjectKind::Collectible(Banana), weight: 24.0 },
            SpawnWeight { kind: ObjectKind::Collectible(Pizza), weight: 12.0 },
            SpawnWeight { kind: ObjectKind::Collectible(Mango), weight: 6.0 },
            SpawnWeight { kind: ObjectKind::Collectible(Spaghetti), weight: 3.0 },
            SpawnWeight { kind: ObjectKind::Ramp, weight: 7.0 },
        ];
        Self {
            weights,
            spawn_distance: 150.0,
            preseed_near: 20.0,
            despawn_distance: 10.0,
            initial_objects_first_level: 15,
            initial_objects: 25,
            obstacle_edge_bias: 0.7,
            central_band: 0.8,
            spin_rate: 0.05,
        }
    }
}

/// Level pacing and difficulty scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    /// Seconds on the clock at the start of every level
    pub time_budget_secs: u32,
    pub base_spawn_chance: f32,
    pub spawn_chance_per_level: f32,
    /// Terrain amplitude multiplier added per level after the first
    pub terrain_growth_per_level: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            time_budget_secs: 60,
            base_spawn_chance: 0.25,
            spawn_chance_per_level: 0.05,
            terrain_growth_per_level: 0.1,
        }
    }
}

/// Why a tuning table was rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub terrain: TerrainTuning,
    pub player: PlayerTuning,
    pub scoring: ScoringTuning,
    pub spawn: SpawnTuning,
    pub level: LevelTuning,
}

/// Per-level parameters, a pure function of the level index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub level: u32,
    /// Speed the skier relaxes toward on flat ground
    pub speed_baseline: f32,
    /// Per-step spawn probability before scaling by current speed
    pub spawn_chance: f32,
    /// Multiplier on the terrain wave amplitudes
    pub terrain_scale: f32,
    pub initial_objects: usize,
}

impl Tuning {
    /// Parse a (possibly partial) tuning table; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.terrain.segment_count == 0 {
            return Err(TuningError::Invalid("segment_count must be at least 1"));
        }
        if self.terrain.segment_length <= 0.0 {
            return Err(TuningError::Invalid("segment_length must be positive"));
        }
        if self.player.play_width <= 0.0 {
            return Err(TuningError::Invalid("play_width must be positive"));
        }
        if self.player.min_speed <= 0.0 || self.player.min_speed > self.player.max_speed {
            return Err(TuningError::Invalid("speed floor must be positive and below the ceiling"));
        }
        // Zero here divides by zero in the height field and slopes
        if !positive(self.terrain.half_width) {
            return Err(TuningError::Invalid("half_width must be positive"));
        }
        if !positive(self.terrain.slope_delta) {
            return Err(TuningError::Invalid("slope_delta must be positive"));
        }
        if !positive(self.scoring.hitbox_x) || !positive(self.scoring.hitbox_z) {
            return Err(TuningError::Invalid("hitbox extents must be positive"));
        }
        if self.spawn.spawn_distance.is_nan() || self.spawn.spawn_distance < 0.0 {
            return Err(TuningError::Invalid("spawn_distance must not be negative"));
        }
        if self.spawn.spawn_distance > self.guaranteed_terrain_depth() {
            return Err(TuningError::Invalid(
                "spawn_distance reaches past the terrain ring",
            ));
        }
        if !positive(self.total_spawn_weight()) {
            return Err(TuningError::Invalid("spawn table needs a positive weight"));
        }
        if self.level.time_budget_secs == 0 {
            return Err(TuningError::Invalid("time_budget_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn difficulty(&self, level: u32) -> Difficulty {
        let level = level.max(1);
        let steps = (level - 1) as f32;
        Difficulty {
            level,
            speed_baseline: self.player.base_speed + level as f32 * self.player.level_speed_factor,
            spawn_chance: self.level.base_spawn_chance
                + level as f32 * self.level.spawn_chance_per_level,
            terrain_scale: 1.0 + steps * self.level.terrain_growth_per_level,
            initial_objects: if level == 1 {
                self.spawn.initial_objects_first_level
            } else {
                self.spawn.initial_objects
            },
        }
    }

    /// Sum of all spawn weights
    pub fn total_spawn_weight(&self) -> f32 {
        self.spawn.weights.iter().map(|w| w.weight.max(0.0)).sum()
    }

    /// Full travel distance of the segment ring
    pub fn track_span(&self) -> f32 {
        self.terrain.segment_length * self.terrain.segment_count as f32
    }

    /// Depth ahead of the player that the ring always covers. Tile centers
    /// wrap once they pass one segment length behind the player, so the far
    /// edge can sit as close as one and a half segments short of the span.
    pub fn guaranteed_terrain_depth(&self) -> f32 {
        self.track_span() - 1.5 * self.terrain.segment_length
    }
}

/// False for zero, negatives and NaN
fn positive(value: f32) -> bool {
    value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_is_monotonic() {
        let tuning = Tuning::default();
        let mut prev = tuning.difficulty(1);
        for level in 2..30 {
            let next = tuning.difficulty(level);
            assert!(next.speed_baseline > prev.speed_baseline);
            assert!(next.spawn_chance > prev.spawn_chance);
            assert!(next.terrain_scale > prev.terrain_scale);
            prev = next;
        }
    }

    #[test]
    fn test_first_level_seeds_fewer_objects() {
        let tuning = Tuning::default();
        assert!(tuning.difficulty(1).initial_objects < tuning.difficulty(2).initial_objects);
        assert_eq!(tuning.difficulty(2).initial_objects, tuning.difficulty(9).initial_objects);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player": { "play_width": 8.0 } }"#).unwrap();
        assert_eq!(tuning.player.play_width, 8.0);
        assert_eq!(tuning.player.gravity, PlayerTuning::default().gravity);
        assert_eq!(tuning.terrain.segment_count, 5);
    }

    #[test]
    fn test_spawn_table_round_trips_through_json() {
        let json = serde_json::to_string(&Tuning::default()).unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.spawn.weights, Tuning::default().spawn.weights);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_unrunnable_table_rejected() {
        let result = Tuning::from_json(r#"{ "terrain": { "segment_count": 0 } }"#);
        assert!(matches!(result, Err(TuningError::Invalid(_))));
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        for json in [
            r#"{ "terrain": { "slope_delta": 0.0 } }"#,
            r#"{ "terrain": { "slope_delta": -0.5 } }"#,
            r#"{ "terrain": { "half_width": 0.0 } }"#,
            r#"{ "scoring": { "hitbox_x": 0.0 } }"#,
            r#"{ "scoring": { "hitbox_z": -1.0 } }"#,
            r#"{ "spawn": { "spawn_distance": -5.0 } }"#,
            r#"{ "spawn": { "weights": [] } }"#,
        ] {
            assert!(
                matches!(Tuning::from_json(json), Err(TuningError::Invalid(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_spawns_stay_on_terrain() {
        let tuning = Tuning::default();
        assert!(tuning.spawn.spawn_distance <= tuning.guaranteed_terrain_depth());

        // Three tiles can leave the far edge 75 units out, short of a 150 spawn
        let short_ring = Tuning::from_json(r#"{ "terrain": { "segment_count": 3 } }"#);
        assert!(matches!(short_ring, Err(TuningError::Invalid(_))));
        let closer = Tuning::from_json(
            r#"{ "terrain": { "segment_count": 3 }, "spawn": { "spawn_distance": 70.0 } }"#,
        );
        assert!(closer.is_ok());
    }
}
