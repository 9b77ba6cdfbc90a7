//! Collision and scoring
//!
//! Each step every live object is tested against the skier with a simple
//! box check on x and z. The first overlap flags the object as hit before
//! anything else happens, so no object can score or penalize twice.

use glam::Vec3;

use super::objects::{CollectibleKind, ObjectKind, ObstacleKind, WorldObject};
use super::player::Player;
use crate::tuning::Tuning;

/// What a single resolved collision did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Points gained from a collectible
    Collected { item: CollectibleKind, points: u64 },
    /// Points lost to a bad collectible (actual amount removed after the floor)
    Penalized { item: CollectibleKind, points: u64 },
    /// Mango: points plus invincibility
    PoweredUp { points: u64 },
    /// Hit an obstacle without protection
    Crashed { obstacle: ObstacleKind },
    /// Hit an obstacle while invincible
    Smashed { obstacle: ObstacleKind },
    /// Ramp launched the skier
    Launched { bonus: u64 },
    /// Ramp touched while already in the air
    RampIgnored,
}

/// Hitbox test between the skier and an object
#[inline]
pub fn overlaps(player: Vec3, object: Vec3, tuning: &Tuning) -> bool {
    let dx = (object.x - player.x).abs();
    let dz = (object.z - player.z).abs();
    dx < tuning.scoring.hitbox_x && dz < tuning.scoring.hitbox_z
}

/// Resolve one overlapping, not-yet-hit object
pub fn resolve(
    object: &mut WorldObject,
    player: &mut Player,
    score: &mut u64,
    tuning: &Tuning,
    now_ms: f64,
) -> Outcome {
    object.hit = true;
    let scoring = &tuning.scoring;

    match object.kind {
        ObjectKind::Collectible(item) => {
            object.visible = false;
            match item {
                CollectibleKind::Pizza => {
                    let before = *score;
                    *score = score.saturating_sub(scoring.pizza_penalty);
                    player.flinch();
                    Outcome::Penalized {
                        item,
                        points: before - *score,
                    }
                }
                CollectibleKind::Banana => {
                    *score += scoring.banana_points;
                    Outcome::Collected {
                        item,
                        points: scoring.banana_points,
                    }
                }
                CollectibleKind::Spaghetti => {
                    *score += scoring.spaghetti_points;
                    Outcome::Collected {
                        item,
                        points: scoring.spaghetti_points,
                    }
                }
                CollectibleKind::Mango => {
                    *score += scoring.mango_points;
                    player.grant_invincibility(now_ms, scoring.invincibility_ms);
                    Outcome::PoweredUp {
                        points: scoring.mango_points,
                    }
                }
            }
        }
        ObjectKind::Obstacle(obstacle) => {
            if player.invincible {
                object.scale = scoring.smashed_scale;
                Outcome::Smashed { obstacle }
            } else {
                player.crash(&tuning.player);
                Outcome::Crashed { obstacle }
            }
        }
        ObjectKind::Ramp => {
            if player.launch(&tuning.player) {
                *score += scoring.ramp_bonus;
                Outcome::Launched {
                    bonus: scoring.ramp_bonus,
                }
            } else {
                Outcome::RampIgnored
            }
        }
    }
}

/// Test every live object against the skier at depth `player_z`
pub fn check_collisions(
    objects: &mut [WorldObject],
    player: &mut Player,
    player_z: f32,
    score: &mut u64,
    tuning: &Tuning,
    now_ms: f64,
) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    for object in objects.iter_mut() {
        if object.hit {
            continue;
        }
        if overlaps(player.position(player_z), object.pos, tuning) {
            let outcome = resolve(object, player, score, tuning, now_ms);
            log::debug!("Object {} ({:?}) -> {:?}", object.id, object.kind, outcome);
            outcomes.push(outcome);
        }
    }
    outcomes
}
