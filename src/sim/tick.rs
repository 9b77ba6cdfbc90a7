//! Simulation tick - one fixed step of gameplay
//!
//! Order matters: the world scrolls first, then the player reacts to the
//! ground it is now standing on, then collisions resolve against the
//! player's smoothed position.

use super::collision::{Outcome, check_collisions};
use super::objects::CollectibleKind;
use super::player::PlayerEvent;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::PLAYER_Z;

/// Crash shake applied on impact, decays each step
const CRASH_SHAKE: f32 = 0.6;
const SHAKE_DECAY: f32 = 0.9;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Held direction: -1 left, 0 straight, 1 right
    pub move_direction: i8,
    /// Pointer drag accumulated since the last step, in pixels
    pub drag_delta: f32,
}

/// Advance the simulation by one fixed step
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64) {
    if state.phase != GamePhase::Playing || state.is_torn_down() {
        return;
    }
    state.steps += 1;

    let speed = state.player.speed;
    state.ground.advance(speed);
    state.spawner.tick(speed);
    let difficulty = state.difficulty;
    state
        .spawner
        .maybe_spawn(&difficulty, speed, &state.ground, &mut state.rng);

    if state
        .player
        .steer(input.move_direction, input.drag_delta, &state.tuning.player)
    {
        state.events.push(GameEvent::DirectionChange);
    }

    if let Some(PlayerEvent::InvincibilityExpired) = state
        .player
        .poll_timers(now_ms, state.tuning.scoring.blink_interval_ms)
    {
        state.events.push(GameEvent::PowerDown);
    }

    let ground = state.ground.sample(state.player.render_x, PLAYER_Z);
    if let Some(PlayerEvent::Landed) = state
        .player
        .update(ground, &difficulty, &state.tuning.player)
    {
        state.events.push(GameEvent::Land);
    }

    let outcomes = check_collisions(
        state.spawner.pool.live_mut(),
        &mut state.player,
        PLAYER_Z,
        &mut state.score,
        &state.tuning,
        now_ms,
    );
    for outcome in outcomes {
        if let Some(event) = event_for(outcome) {
            if matches!(event, GameEvent::Crash { .. }) {
                state.shake = CRASH_SHAKE;
            }
            state.events.push(event);
        }
    }

    state.camera.follow(state.player.position(PLAYER_Z));
    state.shake *= SHAKE_DECAY;
    if state.shake < 1e-3 {
        state.shake = 0.0;
    }
}

fn event_for(outcome: Outcome) -> Option<GameEvent> {
    match outcome {
        Outcome::Collected { item, points } => Some(GameEvent::Collected { item, points }),
        Outcome::Penalized { item, points } => Some(GameEvent::Penalty { item, points }),
        Outcome::PoweredUp { points } => Some(GameEvent::PowerUp { points }),
        Outcome::Crashed { obstacle } => Some(GameEvent::Crash { obstacle }),
        Outcome::Smashed { obstacle } => Some(GameEvent::ObstacleSmashed { obstacle }),
        Outcome::Launched { bonus } => Some(GameEvent::Jump { bonus }),
        Outcome::RampIgnored => None,
    }
}

/// Item and signed point delta for HUD toasts
pub fn toast_for(event: &GameEvent) -> Option<(CollectibleKind, i64)> {
    match *event {
        GameEvent::Collected { item, points } => Some((item, points as i64)),
        GameEvent::Penalty { item, points } => Some((item, -(points as i64))),
        GameEvent::PowerUp { points } => Some((CollectibleKind::Mango, points as i64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::objects::{ObjectKind, ObstacleKind};
    use crate::sim::player::Facing;
    use glam::Vec3;

    fn playing() -> GameState {
        let mut state = GameState::with_seed(42);
        state.spawner.pool.clear();
        state.drain_events();
        state
    }

    fn place(state: &mut GameState, kind: ObjectKind, z: f32) -> u32 {
        let x = state.player.render_x;
        state.spawner.pool.insert(kind, Vec3::new(x, 0.0, z))
    }

    #[test]
    fn test_world_scrolls_toward_player() {
        let mut state = playing();
        let before: Vec<f32> = state.ground.segments().iter().map(|s| s.z_position).collect();
        tick(&mut state, &TickInput::default(), 16.0);
        let after: Vec<f32> = state.ground.segments().iter().map(|s| s.z_position).collect();
        for (b, a) in before.iter().zip(&after) {
            assert!(a > b || *a < *b - state.ground.segment_length());
        }
        assert_eq!(state.steps, 1);
    }

    #[test]
    fn test_collects_object_reaching_player() {
        let mut state = playing();
        place(&mut state, ObjectKind::Collectible(CollectibleKind::Banana), -0.5);
        tick(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.score, 100);
        assert!(state.events.contains(&GameEvent::Collected {
            item: CollectibleKind::Banana,
            points: 100
        }));
        let banana = &state.spawner.pool.live()[0];
        assert!(banana.hit);
        assert!(!banana.visible);
    }

    #[test]
    fn test_crash_sets_shake_and_event() {
        let mut state = playing();
        place(&mut state, ObjectKind::Obstacle(ObstacleKind::Rock), -0.2);
        tick(&mut state, &TickInput::default(), 16.0);
        assert!(state.shake > 0.0);
        assert!(state.events.contains(&GameEvent::Crash {
            obstacle: ObstacleKind::Rock
        }));
        tick(&mut state, &TickInput::default(), 32.0);
        assert_eq!(state.player.facing, Facing::Front);
    }

    #[test]
    fn test_ramp_jump_then_land() {
        let mut state = playing();
        place(&mut state, ObjectKind::Ramp, -0.2);
        tick(&mut state, &TickInput::default(), 16.0);
        assert!(state.player.airborne);
        assert_eq!(state.score, 200);

        let mut landed = false;
        for step in 0..200 {
            tick(&mut state, &TickInput::default(), 16.0 * step as f64);
            if state.drain_events().contains(&GameEvent::Land) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(!state.player.airborne);
    }

    #[test]
    fn test_direction_change_event() {
        let mut state = playing();
        let right = TickInput {
            move_direction: 1,
            drag_delta: 0.0,
        };
        tick(&mut state, &right, 0.0);
        tick(&mut state, &right, 16.0);
        let changes = state
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::DirectionChange)
            .count();
        assert_eq!(changes, 1);
        assert!(state.player.lateral > 0.0);
    }

    #[test]
    fn test_power_down_on_wall_clock() {
        let mut state = playing();
        place(&mut state, ObjectKind::Collectible(CollectibleKind::Mango), -0.2);
        tick(&mut state, &TickInput::default(), 1_000.0);
        assert!(state.player.invincible);
        tick(&mut state, &TickInput::default(), 5_999.0);
        assert!(state.player.invincible);
        tick(&mut state, &TickInput::default(), 6_000.0);
        assert!(!state.player.invincible);
        assert!(state.events.contains(&GameEvent::PowerDown));
    }

    #[test]
    fn test_frozen_when_level_complete() {
        let mut state = playing();
        state.poll_countdown(60_000.0);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        let z = state.ground.segments()[0].z_position;
        let steps = state.steps;
        tick(
            &mut state,
            &TickInput {
                move_direction: 1,
                drag_delta: 0.0,
            },
            60_016.0,
        );
        assert_eq!(state.ground.segments()[0].z_position, z);
        assert_eq!(state.steps, steps);
        assert_eq!(state.player.lateral, 0.0);
        assert_eq!(state.player.facing, Facing::Front);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let run = |seed| {
            let mut state = GameState::with_seed(seed);
            for i in 0..600 {
                let input = TickInput {
                    move_direction: ((i / 40) % 3) as i8 - 1,
                    drag_delta: 0.0,
                };
                tick(&mut state, &input, i as f64 * 16.0);
            }
            (
                state.score,
                state.player.lateral,
                state
                    .spawner
                    .pool
                    .live()
                    .iter()
                    .map(|o| (o.id, o.pos.x))
                    .collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_toasts_carry_signed_delta() {
        assert_eq!(
            toast_for(&GameEvent::Penalty {
                item: CollectibleKind::Pizza,
                points: 50
            }),
            Some((CollectibleKind::Pizza, -50))
        );
        assert_eq!(
            toast_for(&GameEvent::PowerUp { points: 500 }),
            Some((CollectibleKind::Mango, 500))
        );
        assert_eq!(toast_for(&GameEvent::Land), None);
    }
}
