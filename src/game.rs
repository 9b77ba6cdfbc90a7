//! Session driver
//!
//! Wraps a `GameState` with the host-facing surface: input intent, the
//! fixed-step frame accumulator, the level clock and event dispatch to the
//! injected services. Browser and headless builds both drive the game
//! through this type.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::services::{Cue, HudSnapshot, PlayerProfile, RunRecord, Services};
use crate::sim::{GameEvent, GamePhase, GameState, MeshResolution, TickInput, tick, toast_for};
use crate::tuning::Tuning;

const STEP_MS: f64 = SIM_DT * 1000.0;
/// Longest frame gap fed to the accumulator
const MAX_FRAME_MS: f64 = 250.0;

pub struct Session {
    pub state: GameState,
    profile: PlayerProfile,
    services: Services,
    /// Held direction from keys
    direction: i8,
    /// Pointer drag not yet consumed by a step
    pending_drag: f32,
    accumulator_ms: f64,
    last_frame_ms: Option<f64>,
}

impl Session {
    pub fn new(
        seed: u64,
        tuning: Tuning,
        resolution: MeshResolution,
        profile: PlayerProfile,
        services: Services,
        now_ms: f64,
    ) -> Self {
        log::info!("Session for {} starting with seed {}", profile.name, seed);
        let mut session = Self {
            state: GameState::new(seed, tuning, resolution, now_ms),
            profile,
            services,
            direction: 0,
            pending_drag: 0.0,
            accumulator_ms: 0.0,
            last_frame_ms: None,
        };
        session.dispatch();
        session
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Held steering direction, -1, 0 or 1
    pub fn set_direction(&mut self, direction: i8) {
        self.direction = direction.signum();
    }

    /// Accumulate a horizontal pointer drag in pixels
    pub fn add_drag(&mut self, dx: f32) {
        self.pending_drag += dx;
    }

    /// Run as many fixed steps as the elapsed time allows. Returns the number
    /// of steps taken.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        if self.state.is_torn_down() {
            return 0;
        }

        let elapsed = match self.last_frame_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => STEP_MS,
        };
        self.last_frame_ms = Some(now_ms);
        self.accumulator_ms += elapsed.min(MAX_FRAME_MS);

        let mut substeps = 0;
        while self.accumulator_ms >= STEP_MS && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                move_direction: self.direction,
                drag_delta: std::mem::take(&mut self.pending_drag),
            };
            tick(&mut self.state, &input, now_ms);
            self.accumulator_ms -= STEP_MS;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Long stalls (tab in background) are dropped, not replayed
            self.accumulator_ms = 0.0;
        }

        self.dispatch();
        substeps
    }

    /// Drive the level clock; called from the host's one-second timer
    pub fn clock(&mut self, now_ms: f64) {
        self.state.poll_countdown(now_ms);
        self.dispatch();
    }

    /// Explicit "next level" action from the level-complete screen
    pub fn advance_level(&mut self, now_ms: f64) -> bool {
        if !self.state.advance_level(now_ms) {
            return false;
        }
        self.accumulator_ms = 0.0;
        self.last_frame_ms = None;
        self.pending_drag = 0.0;
        self.dispatch();
        true
    }

    /// Stop the clock and refuse further steps. Idempotent.
    pub fn teardown(&mut self) {
        self.state.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.is_torn_down()
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.state.score,
            time_remaining: self.state.time_remaining,
            level: self.state.level,
            phase: self.state.phase,
            invincible: self.state.player.invincible,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    fn dispatch(&mut self) {
        let events = self.state.drain_events();
        for event in &events {
            if let Some(cue) = Cue::for_event(event) {
                self.services.feedback.cue(cue);
            }
            if let Some((item, delta)) = toast_for(event) {
                self.services.hud.toast(item, delta);
            }
            if let GameEvent::LevelComplete { score, level } = *event {
                self.services.scores.record(RunRecord {
                    name: self.profile.name.clone(),
                    thumbnail: self.profile.thumbnail.clone(),
                    score,
                    level,
                });
            }
        }
        let hud = self.hud();
        self.services.hud.update(&hud);
    }
}
