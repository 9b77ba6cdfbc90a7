//! Game state and the level state machine
//!
//! `GameState` owns every piece of simulation data. Levels cycle
//! PLAYING -> LEVEL_COMPLETE -> PLAYING; there is no way to lose, the clock
//! simply runs out and the host decides when to advance.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::Camera;
use super::countdown::Countdown;
use super::objects::{CollectibleKind, ObstacleKind, Spawner};
use super::player::{Facing, Player};
use super::segments::{GroundRecycler, MeshResolution};
use super::terrain::HeightField;
use crate::consts::PLAYER_Z;
use crate::tuning::{Difficulty, Tuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Clock running, world moving
    Playing,
    /// Clock ran out; gameplay frozen until the host advances
    LevelComplete,
}

/// Discrete happenings for sound, HUD toasts and the score sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    /// Ramp launch, with the bonus it paid
    Jump { bonus: u64 },
    Land,
    Collected { item: CollectibleKind, points: u64 },
    Penalty { item: CollectibleKind, points: u64 },
    PowerUp { points: u64 },
    PowerDown,
    Crash { obstacle: ObstacleKind },
    ObstacleSmashed { obstacle: ObstacleKind },
    DirectionChange,
    LevelComplete { score: u64, level: u32 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// 1-based, only ever increases
    pub level: u32,
    /// Never negative
    pub score: u64,
    /// Seconds left on the level clock
    pub time_remaining: u32,
    pub phase: GamePhase,
    /// Derived from `level` at level start
    pub difficulty: Difficulty,
    pub ground: GroundRecycler,
    pub spawner: Spawner,
    pub player: Player,
    pub camera: Camera,
    /// One-second level clock
    pub countdown: Countdown,
    /// Crash shake amount, decays each step
    pub shake: f32,
    /// Simulation steps taken this session
    pub steps: u64,
    /// Events produced since the host last drained them
    pub events: Vec<GameEvent>,
    torn_down: bool,
}

impl GameState {
    /// Build a session and enter PLAYING at level 1
    pub fn new(seed: u64, tuning: Tuning, resolution: MeshResolution, now_ms: f64) -> Self {
        let difficulty = tuning.difficulty(1);
        let field = HeightField::new(&tuning.terrain, difficulty.terrain_scale);
        let ground = GroundRecycler::new(&tuning.terrain, field, resolution);
        let spawner = Spawner::new(tuning.spawn.clone(), tuning.player.play_width);
        let player = Player::new(ground.height_at(0.0, PLAYER_Z), &difficulty);
        let camera = Camera::looking_at(player.position(PLAYER_Z));

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            score: 0,
            time_remaining: tuning.level.time_budget_secs,
            phase: GamePhase::Playing,
            difficulty,
            ground,
            spawner,
            player,
            camera,
            countdown: Countdown::new(1000.0),
            shake: 0.0,
            steps: 0,
            events: Vec::new(),
            torn_down: false,
            tuning,
        };
        state.start_level(now_ms);
        state
    }

    /// Default tuning and mesh resolution, clock starting at zero
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), MeshResolution::default(), 0.0)
    }

    /// Reset everything a level owns and start its clock
    fn start_level(&mut self, now_ms: f64) {
        self.difficulty = self.tuning.difficulty(self.level);
        let field = HeightField::new(&self.tuning.terrain, self.difficulty.terrain_scale);
        self.ground.rebake(field);
        self.spawner
            .reseed(&self.difficulty, &self.ground, &mut self.rng);

        self.score = 0;
        self.time_remaining = self.tuning.level.time_budget_secs;
        self.player = Player::new(self.ground.height_at(0.0, PLAYER_Z), &self.difficulty);
        self.camera = Camera::looking_at(self.player.position(PLAYER_Z));
        self.shake = 0.0;

        self.countdown.start(now_ms);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::LevelStarted { level: self.level });

        log::info!(
            "Level {} started: speed {:.3}, spawn chance {:.3}, terrain x{:.2}, {} objects",
            self.level,
            self.difficulty.speed_baseline,
            self.difficulty.spawn_chance,
            self.difficulty.terrain_scale,
            self.spawner.pool.len()
        );
    }

    /// Drive the level clock from the host's timer callback
    pub fn poll_countdown(&mut self, now_ms: f64) {
        if self.torn_down {
            return;
        }
        let fired = self.countdown.poll(now_ms);
        for _ in 0..fired {
            self.countdown_second();
        }
    }

    /// One second elapsed on the level clock
    pub fn countdown_second(&mut self) {
        if self.phase != GamePhase::Playing || self.torn_down {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.complete_level();
        }
    }

    fn complete_level(&mut self) {
        self.phase = GamePhase::LevelComplete;
        self.countdown.cancel();
        self.player.facing = Facing::Front;
        self.events.push(GameEvent::LevelComplete {
            score: self.score,
            level: self.level,
        });
        log::info!("Level {} complete with {} points", self.level, self.score);
    }

    /// Explicit "next level" action. Only valid in LEVEL_COMPLETE.
    pub fn advance_level(&mut self, now_ms: f64) -> bool {
        if self.phase != GamePhase::LevelComplete || self.torn_down {
            return false;
        }
        self.level += 1;
        self.start_level(now_ms);
        true
    }

    /// Stop the clock for good. Safe to call any number of times.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.countdown.cancel();
        log::info!("Session torn down at level {}", self.level);
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_playing_at_level_one() {
        let state = GameState::with_seed(1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_remaining, 60);
        assert!(state.countdown.is_running());
        assert_eq!(
            state.spawner.pool.len(),
            state.tuning.spawn.initial_objects_first_level
        );
        assert_eq!(state.events, vec![GameEvent::LevelStarted { level: 1 }]);
    }

    #[test]
    fn test_clock_runs_out_into_level_complete() {
        let mut state = GameState::with_seed(2);
        state.score = 1234;
        state.drain_events();
        state.poll_countdown(59_000.0);
        assert_eq!(state.time_remaining, 1);
        assert_eq!(state.phase, GamePhase::Playing);

        state.poll_countdown(60_000.0);
        assert_eq!(state.time_remaining, 0);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert!(!state.countdown.is_running());
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::LevelComplete { score: 1234, level: 1 }]
        );

        // Further polls do nothing
        state.poll_countdown(120_000.0);
        assert_eq!(state.time_remaining, 0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_advance_resets_level() {
        let mut state = GameState::with_seed(3);
        assert!(!state.advance_level(0.0), "cannot advance while playing");

        state.score = 999;
        state.player.lateral = 7.0;
        state.player.speed_bonus = 0.3;
        state.poll_countdown(60_000.0);
        assert_eq!(state.phase, GamePhase::LevelComplete);

        assert!(state.advance_level(61_000.0));
        assert_eq!(state.level, 2);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_remaining, state.tuning.level.time_budget_secs);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.lateral, 0.0);
        assert_eq!(state.player.speed_bonus, 0.0);
        assert_eq!(state.difficulty, state.tuning.difficulty(2));
        assert_eq!(state.spawner.pool.len(), state.tuning.spawn.initial_objects);
        assert!(state.spawner.pool.live().iter().all(|o| !o.hit));

        // New clock starts from the advance time
        state.poll_countdown(61_999.0);
        assert_eq!(state.time_remaining, 60);
        state.poll_countdown(62_000.0);
        assert_eq!(state.time_remaining, 59);
    }

    #[test]
    fn test_teardown_stops_clock() {
        let mut state = GameState::with_seed(4);
        state.teardown();
        state.teardown();
        assert!(state.is_torn_down());
        state.poll_countdown(1_000_000.0);
        assert_eq!(state.time_remaining, 60);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_teardown_blocks_advance() {
        let mut state = GameState::with_seed(5);
        state.poll_countdown(60_000.0);
        state.teardown();
        assert!(!state.advance_level(70_000.0));
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_terrain_grows_with_level() {
        let mut state = GameState::with_seed(6);
        let calm = state.ground.field().base_amplitude;
        state.poll_countdown(60_000.0);
        state.advance_level(60_000.0);
        assert!(state.ground.field().base_amplitude > calm);
    }
}
